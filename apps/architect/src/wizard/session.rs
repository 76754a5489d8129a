use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::error;

use crate::errors::WizardError;
use crate::generation::GenerationGateway;
use crate::wizard::stage::Transition;
use crate::wizard::state::{TransitionOutcome, WizardState};

/// Shared handle to one wizard run.
///
/// The write lock is held only while a transition begins and completes, never
/// across the model call, so readers can render the busy state meanwhile.
/// The call and its completion run on their own task: dropping a `run` future
/// does not stop the transition from finishing.
#[derive(Clone)]
pub struct WizardSession {
    state: Arc<RwLock<WizardState>>,
    gateway: Arc<GenerationGateway>,
}

impl WizardSession {
    pub fn new(gateway: GenerationGateway) -> Self {
        Self::with_initial_state(WizardState::new(), gateway)
    }

    pub fn with_initial_state(state: WizardState, gateway: GenerationGateway) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            gateway: Arc::new(gateway),
        }
    }

    pub async fn run(&self, transition: Transition) -> Result<TransitionOutcome, WizardError> {
        let pending = self.state.write().await.begin(transition)?;
        let Some(pending) = pending else {
            return Ok(TransitionOutcome::Skipped);
        };

        let state = Arc::clone(&self.state);
        let gateway = Arc::clone(&self.gateway);
        let task = tokio::spawn(async move {
            let outcome = pending.dispatch(&gateway).await;
            state.write().await.complete(outcome)
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Generation task for {transition} did not finish: {e}");
                self.state.write().await.interrupt()
            }
        }
    }

    pub async fn snapshot(&self) -> WizardState {
        self.state.read().await.clone()
    }

    pub async fn with_state<R>(&self, f: impl FnOnce(&WizardState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Scoped write access for selection and profile edits.
    pub async fn update<R>(&self, f: impl FnOnce(&mut WizardState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state)
    }
}
