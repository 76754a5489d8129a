//! MBA thesis architect core.
//!
//! Turns a working professional's profile and resume into a research persona,
//! a shortlist of thesis topics, a chapter outline and a feasibility report,
//! one model round-trip per stage. Presentation layers drive a
//! [`WizardState`] (or a shared [`WizardSession`]) and render its snapshots.

pub mod config;
pub mod errors;
pub mod generation;
pub mod llm_client;
pub mod models;
pub mod schema;
pub mod telemetry;
pub mod wizard;

pub use config::Config;
pub use errors::{AttachmentError, GatewayError, WizardError};
pub use generation::GenerationGateway;
pub use models::{
    Feasibility, FeasibilityReport, Outline, Persona, ProfileField, ResumeAttachment, ThesisTopic,
    UserProfile,
};
pub use wizard::{Stage, Transition, TransitionOutcome, WizardSession, WizardState};
