//! Vendor-neutral response shape declarations.
//!
//! A `Shape` is declared once per generation stage and used twice: rendered
//! into the model vendor's schema dialect so the model is steered toward it,
//! and rendered into standard JSON Schema to check what actually came back.

pub mod validation;

use serde_json::{json, Map, Value};

pub use validation::{decode_structured, validate_shape};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    String,
    Number,
    /// A string the model should pick from `tokens`. Membership is checked by
    /// the typed decode, which may accept more spellings than listed here.
    Enum(&'static [&'static str]),
    Array(Box<Shape>),
    Object(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

impl Field {
    pub fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: true,
        }
    }

    pub fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: false,
        }
    }
}

impl Shape {
    pub fn array(item: Shape) -> Self {
        Shape::Array(Box::new(item))
    }

    pub fn string_list() -> Self {
        Shape::array(Shape::String)
    }

    /// Names of required fields when this is an object shape.
    pub fn required_fields(&self) -> Vec<&'static str> {
        match self {
            Shape::Object(fields) => fields.iter().filter(|f| f.required).map(|f| f.name).collect(),
            _ => Vec::new(),
        }
    }

    /// Standard JSON Schema used for post-parse validation.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Shape::String | Shape::Enum(_) => json!({ "type": "string" }),
            Shape::Number => json!({ "type": "number" }),
            Shape::Array(item) => json!({ "type": "array", "items": item.to_json_schema() }),
            Shape::Object(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.name.to_string(), f.shape.to_json_schema()))
                    .collect();
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": self.required_fields(),
                })
            }
        }
    }
}
