//! Wizard state and its transition operations.
//!
//! A transition runs in three steps: `begin` checks legality and guards and
//! marks the state busy, the returned `PendingRequest` is dispatched to the
//! gateway with no borrow of the state held, and `complete` applies the
//! outcome. `advance` chains the three for callers that own the state.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{GatewayError, WizardError};
use crate::generation::GenerationGateway;
use crate::models::{
    FeasibilityReport, Outline, Persona, ProfileField, ResumeAttachment, ThesisTopic, UserProfile,
};
use crate::wizard::stage::{Stage, Transition};

/// Stored as `last_error` when a request is abandoned before its outcome arrived.
pub const INTERRUPTED_MESSAGE: &str = "Generation was interrupted before it completed";

/// Owned inputs for one generation call, detached from the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    Persona(UserProfile),
    Topics(Persona),
    Outline(ThesisTopic),
    Feasibility { topic: ThesisTopic, outline: Outline },
}

impl PendingRequest {
    pub fn transition(&self) -> Transition {
        match self {
            PendingRequest::Persona(_) => Transition::SynthesizePersona,
            PendingRequest::Topics(_) => Transition::SynthesizeTopics,
            PendingRequest::Outline(_) => Transition::SynthesizeOutline,
            PendingRequest::Feasibility { .. } => Transition::SynthesizeFeasibility,
        }
    }

    pub async fn dispatch(self, gateway: &GenerationGateway) -> Result<StageOutput, GatewayError> {
        match self {
            PendingRequest::Persona(profile) => gateway
                .synthesize_persona(&profile)
                .await
                .map(StageOutput::Persona),
            PendingRequest::Topics(persona) => gateway
                .synthesize_topics(&persona)
                .await
                .map(StageOutput::Topics),
            PendingRequest::Outline(topic) => gateway
                .synthesize_outline(&topic)
                .await
                .map(StageOutput::Outline),
            PendingRequest::Feasibility { topic, outline } => gateway
                .synthesize_feasibility(&topic, &outline)
                .await
                .map(StageOutput::Feasibility),
        }
    }
}

/// A successful generation result, tagged by the stage it feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutput {
    Persona(Persona),
    Topics(Vec<ThesisTopic>),
    Outline(Outline),
    Feasibility(FeasibilityReport),
}

impl StageOutput {
    pub fn transition(&self) -> Transition {
        match self {
            StageOutput::Persona(_) => Transition::SynthesizePersona,
            StageOutput::Topics(_) => Transition::SynthesizeTopics,
            StageOutput::Outline(_) => Transition::SynthesizeOutline,
            StageOutput::Feasibility(_) => Transition::SynthesizeFeasibility,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// A guard failed; nothing was sent and nothing changed.
    Skipped,
    Advanced(Stage),
    /// The generation failed. Carries the message now stored as `last_error`.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardState {
    session_id: Uuid,
    stage: Stage,
    profile: UserProfile,
    persona: Option<Persona>,
    topics: Vec<ThesisTopic>,
    selected_topic: Option<ThesisTopic>,
    outline: Option<Outline>,
    feasibility_report: Option<FeasibilityReport>,
    in_flight: Option<Transition>,
    last_error: Option<String>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self::with_profile(UserProfile::default())
    }

    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            stage: Stage::Input,
            profile,
            persona: None,
            topics: Vec::new(),
            selected_topic: None,
            outline: None,
            feasibility_report: None,
            in_flight: None,
            last_error: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    pub fn topics(&self) -> &[ThesisTopic] {
        &self.topics
    }

    pub fn selected_topic(&self) -> Option<&ThesisTopic> {
        self.selected_topic.as_ref()
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    pub fn feasibility_report(&self) -> Option<&FeasibilityReport> {
        self.feasibility_report.as_ref()
    }

    pub fn in_flight(&self) -> Option<Transition> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_profile_field(
        &mut self,
        field: ProfileField,
        value: impl Into<String>,
    ) -> Result<(), WizardError> {
        self.ensure_profile_editable()?;
        self.profile.set(field, value);
        Ok(())
    }

    pub fn set_resume(&mut self, resume: Option<ResumeAttachment>) -> Result<(), WizardError> {
        self.ensure_profile_editable()?;
        self.profile.resume = resume;
        Ok(())
    }

    fn ensure_profile_editable(&self) -> Result<(), WizardError> {
        if self.stage != Stage::Input || self.is_busy() {
            return Err(WizardError::ProfileLocked);
        }
        Ok(())
    }

    /// Picks `topics[index]` as the working topic. Does not advance the stage.
    pub fn select_topic(&mut self, index: usize) -> Result<(), WizardError> {
        if self.is_busy() {
            return Err(WizardError::Busy);
        }
        if self.stage != Stage::Topics {
            return Err(WizardError::NotOnStage {
                expected: Stage::Topics,
                actual: self.stage,
            });
        }
        let topic = self
            .topics
            .get(index)
            .cloned()
            .ok_or(WizardError::TopicOutOfRange {
                index,
                len: self.topics.len(),
            })?;

        debug!("Session {}: selected topic {index} '{}'", self.session_id, topic.title);
        self.selected_topic = Some(topic);
        Ok(())
    }

    /// Back-edge Feasibility → Topics. Keeps the persona and the topic list.
    pub fn select_another_topic(&mut self) -> Result<(), WizardError> {
        if self.stage != Stage::Feasibility || !self.stage.can_transition_to(Stage::Topics) {
            return Err(WizardError::IllegalTransition {
                from: self.stage,
                to: Stage::Topics,
            });
        }
        self.selected_topic = None;
        self.outline = None;
        self.feasibility_report = None;
        self.stage = Stage::Topics;
        info!("Session {}: feasibility -> topics", self.session_id);
        Ok(())
    }

    /// Starts a forward transition.
    ///
    /// Returns `Ok(None)` when the upstream input is missing; the state is
    /// untouched and no request should be sent.
    pub fn begin(&mut self, transition: Transition) -> Result<Option<PendingRequest>, WizardError> {
        if self.is_busy() {
            return Err(WizardError::Busy);
        }
        if self.stage != transition.source() {
            return Err(WizardError::IllegalTransition {
                from: self.stage,
                to: transition.target(),
            });
        }

        let pending = match transition {
            Transition::SynthesizePersona => self
                .profile
                .is_ready()
                .then(|| PendingRequest::Persona(self.profile.clone())),
            Transition::SynthesizeTopics => self.persona.clone().map(PendingRequest::Topics),
            Transition::SynthesizeOutline => self.selected_topic.clone().map(PendingRequest::Outline),
            Transition::SynthesizeFeasibility => match (&self.selected_topic, &self.outline) {
                (Some(topic), Some(outline)) if !outline.is_blank() => {
                    Some(PendingRequest::Feasibility {
                        topic: topic.clone(),
                        outline: outline.clone(),
                    })
                }
                _ => None,
            },
        };

        let Some(pending) = pending else {
            debug!("Session {}: {transition} skipped, input not ready", self.session_id);
            return Ok(None);
        };

        self.in_flight = Some(transition);
        self.last_error = None;
        info!("Session {}: {transition} started on {}", self.session_id, self.stage);
        Ok(Some(pending))
    }

    /// Applies the outcome of the in-flight request and clears busy.
    pub fn complete(
        &mut self,
        outcome: Result<StageOutput, GatewayError>,
    ) -> Result<TransitionOutcome, WizardError> {
        let transition = self.in_flight.ok_or(WizardError::Idle)?;

        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                let message = e.to_string();
                warn!("Session {}: {transition} failed: {message}", self.session_id);
                self.in_flight = None;
                self.last_error = Some(message.clone());
                return Ok(TransitionOutcome::Failed(message));
            }
        };

        if output.transition() != transition {
            return Err(WizardError::UnexpectedOutput);
        }

        match output {
            StageOutput::Persona(persona) => self.persona = Some(persona),
            StageOutput::Topics(topics) => {
                self.topics = topics;
                self.selected_topic = None;
            }
            StageOutput::Outline(outline) => self.outline = Some(outline),
            StageOutput::Feasibility(report) => self.feasibility_report = Some(report),
        }

        let from = self.stage;
        self.stage = transition.target();
        self.in_flight = None;
        info!("Session {}: {from} -> {}", self.session_id, self.stage);
        Ok(TransitionOutcome::Advanced(self.stage))
    }

    /// Runs one forward transition to completion against `gateway`.
    pub async fn advance(
        &mut self,
        gateway: &GenerationGateway,
        transition: Transition,
    ) -> Result<TransitionOutcome, WizardError> {
        let Some(pending) = self.begin(transition)? else {
            return Ok(TransitionOutcome::Skipped);
        };
        let mut guard = InterruptOnDrop(self);
        let outcome = pending.dispatch(gateway).await;
        guard.0.complete(outcome)
    }

    /// Abandons the in-flight request as a failure: busy clears, the stage
    /// stays put and `last_error` explains what happened.
    pub fn interrupt(&mut self) -> Result<TransitionOutcome, WizardError> {
        self.complete(Err(GatewayError::TransportFailure(
            INTERRUPTED_MESSAGE.to_string(),
        )))
    }

    pub async fn synthesize_persona(
        &mut self,
        gateway: &GenerationGateway,
    ) -> Result<TransitionOutcome, WizardError> {
        self.advance(gateway, Transition::SynthesizePersona).await
    }

    pub async fn synthesize_topics(
        &mut self,
        gateway: &GenerationGateway,
    ) -> Result<TransitionOutcome, WizardError> {
        self.advance(gateway, Transition::SynthesizeTopics).await
    }

    pub async fn synthesize_outline(
        &mut self,
        gateway: &GenerationGateway,
    ) -> Result<TransitionOutcome, WizardError> {
        self.advance(gateway, Transition::SynthesizeOutline).await
    }

    pub async fn synthesize_feasibility(
        &mut self,
        gateway: &GenerationGateway,
    ) -> Result<TransitionOutcome, WizardError> {
        self.advance(gateway, Transition::SynthesizeFeasibility).await
    }
}

/// Keeps the state usable when an `advance` future is dropped mid-request.
struct InterruptOnDrop<'a>(&'a mut WizardState);

impl Drop for InterruptOnDrop<'_> {
    fn drop(&mut self) {
        if self.0.is_busy() {
            let _ = self.0.interrupt();
        }
    }
}
