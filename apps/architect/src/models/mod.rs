//! Domain entities carried through the wizard.

pub mod persona;
pub mod profile;
pub mod topic;

pub use persona::Persona;
pub use profile::{ProfileField, ResumeAttachment, UserProfile};
pub use topic::{FeasibilityReport, Feasibility, Outline, ThesisTopic};
