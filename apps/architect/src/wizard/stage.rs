//! Wizard stages and the transitions between them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The five stages of the wizard.
///
/// Progresses linearly: Input → Persona → Topics → Outline → Feasibility,
/// with one back-edge Feasibility → Topics for picking another topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Input,
    Persona,
    Topics,
    Outline,
    Feasibility,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Input,
        Stage::Persona,
        Stage::Topics,
        Stage::Outline,
        Stage::Feasibility,
    ];

    /// Check if a transition from `self` to `target` is legal.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            (Input, Persona)
                | (Persona, Topics)
                | (Topics, Outline)
                | (Outline, Feasibility)
                | (Feasibility, Topics)
        )
    }

    /// Next stage in the forward progression, if any.
    pub fn next(&self) -> Option<Stage> {
        use Stage::*;
        match self {
            Input => Some(Persona),
            Persona => Some(Topics),
            Topics => Some(Outline),
            Outline => Some(Feasibility),
            Feasibility => None,
        }
    }

    pub fn ordinal(&self) -> usize {
        match self {
            Stage::Input => 0,
            Stage::Persona => 1,
            Stage::Topics => 2,
            Stage::Outline => 3,
            Stage::Feasibility => 4,
        }
    }

    /// Share of the wizard completed once this stage is showing, for progress bars.
    pub fn progress_percent(&self) -> u8 {
        ((self.ordinal() + 1) * 100 / Stage::ALL.len()) as u8
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Feasibility)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Input => "input",
            Stage::Persona => "persona",
            Stage::Topics => "topics",
            Stage::Outline => "outline",
            Stage::Feasibility => "feasibility",
        };
        write!(f, "{s}")
    }
}

/// A forward transition that requires one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    SynthesizePersona,
    SynthesizeTopics,
    SynthesizeOutline,
    SynthesizeFeasibility,
}

impl Transition {
    pub const ALL: [Transition; 4] = [
        Transition::SynthesizePersona,
        Transition::SynthesizeTopics,
        Transition::SynthesizeOutline,
        Transition::SynthesizeFeasibility,
    ];

    /// Stage the wizard must be on for this transition to start.
    pub fn source(&self) -> Stage {
        match self {
            Transition::SynthesizePersona => Stage::Input,
            Transition::SynthesizeTopics => Stage::Persona,
            Transition::SynthesizeOutline => Stage::Topics,
            Transition::SynthesizeFeasibility => Stage::Outline,
        }
    }

    /// Stage the wizard lands on when the generation succeeds.
    pub fn target(&self) -> Stage {
        match self {
            Transition::SynthesizePersona => Stage::Persona,
            Transition::SynthesizeTopics => Stage::Topics,
            Transition::SynthesizeOutline => Stage::Outline,
            Transition::SynthesizeFeasibility => Stage::Feasibility,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Transition::SynthesizePersona => "synthesize_persona",
            Transition::SynthesizeTopics => "synthesize_topics",
            Transition::SynthesizeOutline => "synthesize_outline",
            Transition::SynthesizeFeasibility => "synthesize_feasibility",
        };
        write!(f, "{s}")
    }
}
