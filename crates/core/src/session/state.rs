use std::collections::HashSet;

use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info};

use crate::{
    config::GameConfig,
    geodesy::Coordinate,
    identifiers::WaypointId,
    riddle::{FixedQuestion, ProximityDetector, Question, QuestionSource, Waypoint, WaypointGenerator},
    session::SessionError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Configuring,
    Active,
    Cleared,
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Cleared | SessionPhase::Failed)
    }
}

/// How the player's position reaches the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum TrackingMode {
    /// The player drags their own marker around the map
    Manual,
    /// Every GPS fix is a position update
    RealTime,
}

impl TrackingMode {
    pub fn label(&self) -> &'static str {
        match self {
            TrackingMode::Manual => "Drag my marker",
            TrackingMode::RealTime => "Follow my GPS",
        }
    }
}

/// The question the player has to answer before anything else can trigger.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionRequest {
    pub waypoint_id: WaypointId,
    pub question: Question,
    pub attempts_remaining: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PositionOutcome {
    /// A question is already pending; the update was ignored
    Suppressed,
    NoHit,
    QuestionRequested(QuestionRequest),
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnswerOutcome {
    /// Waypoint cleared, others remain
    Correct { waypoint: Waypoint, remaining: usize },
    /// Last waypoint cleared; the session is won
    Cleared { waypoint: Waypoint },
    /// Same question stays pending
    Incorrect { attempts_remaining: u32 },
    /// Out of attempts; the session is lost
    Failed { waypoint_id: WaypointId },
}

/// Point-in-time copy of everything observable about a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub mode: Option<TrackingMode>,
    pub waypoints: Vec<Waypoint>,
    pub attempts_used: u32,
    pub active_waypoint: Option<WaypointId>,
}

impl SessionSnapshot {
    pub fn real_time_tracking(&self) -> bool {
        self.mode == Some(TrackingMode::RealTime)
    }
}

/// Owns the waypoints of one game and moves it through its phases.
///
/// Every operation either applies completely or returns an error having changed
/// nothing.
pub struct GameSession {
    phase: SessionPhase,
    mode: Option<TrackingMode>,
    waypoints: Vec<Waypoint>,
    attempts_used: u32,
    active_waypoint: Option<WaypointId>,

    max_attempts: u32,
    detector: ProximityDetector,
    generator: WaypointGenerator,
    questions: Box<dyn QuestionSource + Send>,
}

impl GameSession {
    /// A session asking the demo question at every waypoint.
    pub fn new(config: &GameConfig) -> Self {
        Self::with_parts(
            config,
            WaypointGenerator::from_config(config),
            Box::new(FixedQuestion::demo()),
        )
    }

    pub fn with_parts(
        config: &GameConfig,
        generator: WaypointGenerator,
        questions: Box<dyn QuestionSource + Send>,
    ) -> Self {
        Self {
            phase: SessionPhase::Idle,
            mode: None,
            waypoints: Vec::new(),
            attempts_used: 0,
            active_waypoint: None,
            max_attempts: config.max_attempts.max(1),
            detector: ProximityDetector::from_config(config),
            generator,
            questions,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode(&self) -> Option<TrackingMode> {
        self.mode
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts - self.attempts_used
    }

    pub fn active_waypoint(&self) -> Option<&Waypoint> {
        let id = self.active_waypoint.as_ref()?;
        self.waypoints.iter().find(|w| w.id() == id)
    }

    pub fn pending_question(&self) -> Option<QuestionRequest> {
        self.active_waypoint().map(|waypoint| QuestionRequest {
            waypoint_id: waypoint.id().clone(),
            question: waypoint.question().clone(),
            attempts_remaining: self.attempts_remaining(),
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            mode: self.mode,
            waypoints: self.waypoints.clone(),
            attempts_used: self.attempts_used,
            active_waypoint: self.active_waypoint.clone(),
        }
    }

    /// Enter the configuration dialogs. Nothing else changes yet.
    pub fn begin_configuring(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Cleared | SessionPhase::Failed => {
                self.set_phase(SessionPhase::Configuring);
                Ok(())
            }
            phase => Err(SessionError::InvalidTransition {
                operation: "configure a new game",
                phase,
            }),
        }
    }

    /// Generate `count` waypoints around `origin` and go live.
    pub fn start(
        &mut self,
        origin: Coordinate,
        count: usize,
        mode: TrackingMode,
    ) -> Result<&[Waypoint], SessionError> {
        self.check_can_start()?;

        let waypoints = self
            .generator
            .generate(origin, count, self.questions.as_mut())?;

        self.activate(waypoints, mode)
    }

    /// Go live with waypoints produced elsewhere, e.g. a waypoint server.
    pub fn start_with_waypoints(
        &mut self,
        waypoints: Vec<Waypoint>,
        mode: TrackingMode,
    ) -> Result<&[Waypoint], SessionError> {
        self.check_can_start()?;

        if waypoints.is_empty() {
            return Err(SessionError::InvalidArgument(
                "a session needs at least one waypoint".into(),
            ));
        }

        // the pending question is tracked by id, so ids must not alias
        let mut seen = HashSet::with_capacity(waypoints.len());
        if let Some(duplicate) = waypoints.iter().map(Waypoint::id).find(|id| !seen.insert(*id)) {
            return Err(SessionError::InvalidArgument(format!(
                "waypoint id {duplicate} is used more than once"
            )));
        }

        self.activate(waypoints, mode)
    }

    pub fn on_position_update(
        &mut self,
        position: Coordinate,
    ) -> Result<PositionOutcome, SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(SessionError::InvalidTransition {
                operation: "process a position update",
                phase: self.phase,
            });
        }

        let suppressed = self.active_waypoint.is_some();
        if suppressed {
            return Ok(PositionOutcome::Suppressed);
        }

        let Some(hit) = self.detector.evaluate(position, &self.waypoints, suppressed) else {
            return Ok(PositionOutcome::NoHit);
        };

        let request = QuestionRequest {
            waypoint_id: hit.id().clone(),
            question: hit.question().clone(),
            attempts_remaining: self.attempts_remaining(),
        };

        info!(waypoint = %request.waypoint_id, "question requested");
        self.active_waypoint = Some(request.waypoint_id.clone());

        Ok(PositionOutcome::QuestionRequested(request))
    }

    pub fn resolve_answer(&mut self, selected_index: usize) -> Result<AnswerOutcome, SessionError> {
        let Some(active_id) = self.active_waypoint.clone() else {
            return Err(SessionError::InvalidTransition {
                operation: "resolve an answer with no pending question",
                phase: self.phase,
            });
        };

        let position = self
            .waypoints
            .iter()
            .position(|w| *w.id() == active_id)
            .ok_or_else(|| SessionError::InvalidTransition {
                operation: "resolve an answer for a waypoint no longer in play",
                phase: self.phase,
            })?;

        let answer_count = self.waypoints[position].question().answers().len();
        if selected_index >= answer_count {
            return Err(SessionError::InvalidArgument(format!(
                "answer index {selected_index} out of range for {answer_count} answers"
            )));
        }

        if self.waypoints[position].question().is_correct(selected_index) {
            let mut waypoint = self.waypoints.remove(position);
            waypoint.mark_cleared();
            self.active_waypoint = None;
            self.attempts_used = 0;

            info!(waypoint = %waypoint.id(), remaining = self.waypoints.len(), "waypoint cleared");

            if self.waypoints.is_empty() {
                self.set_phase(SessionPhase::Cleared);
                return Ok(AnswerOutcome::Cleared { waypoint });
            }

            return Ok(AnswerOutcome::Correct {
                waypoint,
                remaining: self.waypoints.len(),
            });
        }

        self.attempts_used += 1;
        debug!(
            waypoint = %active_id,
            attempts_used = self.attempts_used,
            "wrong answer"
        );

        if self.attempts_used >= self.max_attempts {
            self.active_waypoint = None;
            self.set_phase(SessionPhase::Failed);
            return Ok(AnswerOutcome::Failed {
                waypoint_id: active_id,
            });
        }

        Ok(AnswerOutcome::Incorrect {
            attempts_remaining: self.attempts_remaining(),
        })
    }

    /// Drop everything and go back to idle. Valid from any phase.
    pub fn reset(&mut self) {
        self.waypoints.clear();
        self.active_waypoint = None;
        self.attempts_used = 0;
        self.mode = None;
        self.set_phase(SessionPhase::Idle);
    }

    /// Fails with `InvalidTransition` while a game is running.
    pub fn check_can_start(&self) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Active {
            return Err(SessionError::InvalidTransition {
                operation: "start a game",
                phase: self.phase,
            });
        }

        Ok(())
    }

    fn activate(
        &mut self,
        waypoints: Vec<Waypoint>,
        mode: TrackingMode,
    ) -> Result<&[Waypoint], SessionError> {
        self.waypoints = waypoints;
        self.mode = Some(mode);
        self.attempts_used = 0;
        self.active_waypoint = None;
        self.set_phase(SessionPhase::Active);

        info!(count = self.waypoints.len(), %mode, "session started");

        Ok(&self.waypoints)
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            info!(from = %self.phase, to = %phase, "session phase changed");
        }
        self.phase = phase;
    }
}
