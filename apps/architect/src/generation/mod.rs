// Generation stages: persona → topics → outline → feasibility report.
// All model calls go through llm_client, never direct HTTP.

pub mod gateway;
pub mod prompts;
pub mod shapes;

pub use gateway::{GenerationGateway, TARGET_TOPIC_COUNT};
