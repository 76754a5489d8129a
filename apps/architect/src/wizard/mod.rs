// Five-stage thesis wizard: input → persona → topics → outline → feasibility.

pub mod session;
pub mod stage;
pub mod state;

pub use session::WizardSession;
pub use stage::{Stage, Transition};
pub use state::{PendingRequest, StageOutput, TransitionOutcome, WizardState};
