use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::calc::{self, CalcError, MarksRecord, SessionResult};
use crate::catalog::{Subject, SUBJECTS};
use crate::validate::{self, ValidationError};
use crate::view::{self, FormView, ResultView};

pub const DEFAULT_FALLBACK_NAME: &str = "User";
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Welcome,
    MarksEntry,
    Calculating,
    Result,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Welcome => "welcome",
            Stage::MarksEntry => "marksEntry",
            Stage::Calculating => "calculating",
            Stage::Result => "result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Overlay {
    Instructions,
    Breakdown,
}

impl Overlay {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "instructions" => Some(Self::Instructions),
            "breakdown" => Some(Self::Breakdown),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Overlay::Instructions => "instructions",
            Overlay::Breakdown => "breakdown",
        }
    }

    /// The only stage each overlay can be opened from.
    fn home(self) -> Stage {
        match self {
            Overlay::Instructions => Stage::MarksEntry,
            Overlay::Breakdown => Stage::Result,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    Content,
}

impl ClickTarget {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "backdrop" => Some(Self::Backdrop),
            "content" => Some(Self::Content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub reveal_delay: Duration,
    pub fallback_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
            fallback_name: DEFAULT_FALLBACK_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReveal {
    pub ready_at: Instant,
}

impl PendingReveal {
    pub fn remaining(&self, now: Instant) -> Duration {
        self.ready_at.saturating_duration_since(now)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{action} is not allowed in stage {}", .stage.as_str())]
    InvalidTransition { action: &'static str, stage: Stage },
    #[error("{} subject(s) have invalid marks", .0.len())]
    Validation(Vec<ValidationError>),
    #[error("result is not ready yet ({remaining_ms} ms remaining)")]
    RevealPending { remaining_ms: u64 },
    #[error("close the {} overlay first", .0.as_str())]
    OverlayOpen(Overlay),
    #[error("the {} overlay is not available in stage {}", .overlay.as_str(), .stage.as_str())]
    OverlayUnavailable { overlay: Overlay, stage: Stage },
    #[error(transparent)]
    Calc(#[from] CalcError),
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::InvalidTransition { .. } => "invalid_transition",
            SessionError::Validation(_) => "validation_failed",
            SessionError::RevealPending { .. } => "reveal_pending",
            SessionError::OverlayOpen(_) => "overlay_open",
            SessionError::OverlayUnavailable { .. } => "overlay_unavailable",
            SessionError::Calc(_) => "calc_failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub session_id: String,
    pub stage: Stage,
    pub display_name: Option<String>,
    pub overlay: Option<Overlay>,
    pub has_marks: bool,
    pub has_result: bool,
    pub calculated_at: Option<String>,
    pub reveal_ready: bool,
    pub reveal_in_ms: Option<u64>,
}

/// One wizard run. Every user action is a method here; rejected actions leave
/// the session exactly as it was.
#[derive(Debug)]
pub struct Session {
    id: uuid::Uuid,
    config: SessionConfig,
    subjects: &'static [Subject],
    stage: Stage,
    overlay: Option<Overlay>,
    display_name: Option<String>,
    marks: Option<MarksRecord>,
    result: Option<SessionResult>,
    calculated_at: Option<DateTime<Utc>>,
    pending_reveal: Option<PendingReveal>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_subjects(config, &SUBJECTS)
    }

    pub fn with_subjects(config: SessionConfig, subjects: &'static [Subject]) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            config,
            subjects,
            stage: Stage::Welcome,
            overlay: None,
            display_name: None,
            marks: None,
            result: None,
            calculated_at: None,
            pending_reveal: None,
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn subjects(&self) -> &'static [Subject] {
        self.subjects
    }

    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or(&self.config.fallback_name)
    }

    #[allow(dead_code)]
    pub fn marks(&self) -> Option<&MarksRecord> {
        self.marks.as_ref()
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Takes effect for the next calculation; a pending reveal keeps its deadline.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    fn expect_stage(&self, action: &'static str, stage: Stage) -> Result<(), SessionError> {
        if let Some(o) = self.overlay {
            return Err(SessionError::OverlayOpen(o));
        }
        if self.stage != stage {
            return Err(SessionError::InvalidTransition {
                action,
                stage: self.stage,
            });
        }
        Ok(())
    }

    pub fn form(&self) -> FormView {
        view::render_form(self.display_name(), self.subjects, self.marks.as_ref())
    }

    pub fn start(&mut self, name: &str) -> Result<FormView, SessionError> {
        self.expect_stage("start", Stage::Welcome)?;
        let name = name.trim();
        self.display_name = Some(if name.is_empty() {
            self.config.fallback_name.clone()
        } else {
            name.to_string()
        });
        self.stage = Stage::MarksEntry;
        tracing::info!(session = %self.id, "session started");
        Ok(self.form())
    }

    /// Validates the whole submission, then commits marks and result together.
    pub fn calculate(
        &mut self,
        raw: &serde_json::Value,
        now: Instant,
    ) -> Result<&SessionResult, SessionError> {
        self.expect_stage("calculate", Stage::MarksEntry)?;
        let record = validate::validate_submission(self.subjects, raw).map_err(|errors| {
            tracing::info!(session = %self.id, failed = errors.len(), "submission rejected");
            SessionError::Validation(errors)
        })?;
        let result = calc::compute_sgpa(&record, self.subjects)?;

        self.marks = Some(record);
        self.calculated_at = Some(Utc::now());
        self.pending_reveal = Some(PendingReveal {
            ready_at: now + self.config.reveal_delay,
        });
        self.stage = Stage::Calculating;
        tracing::info!(session = %self.id, sgpa = result.sgpa, "sgpa calculated");
        Ok(&*self.result.insert(result))
    }

    pub fn reveal(&mut self, now: Instant) -> Result<ResultView, SessionError> {
        self.expect_stage("reveal", Stage::Calculating)?;
        if let Some(p) = self.pending_reveal {
            let remaining = p.remaining(now);
            if !remaining.is_zero() {
                return Err(SessionError::RevealPending {
                    remaining_ms: remaining.as_millis().try_into().unwrap_or(u64::MAX),
                });
            }
        }
        let Some(result) = self.result.as_ref() else {
            return Err(SessionError::InvalidTransition {
                action: "reveal",
                stage: self.stage,
            });
        };
        let view = view::render_result(self.display_name(), result);
        self.pending_reveal = None;
        self.stage = Stage::Result;
        Ok(view)
    }

    pub fn back(&mut self) -> Result<FormView, SessionError> {
        self.expect_stage("back", Stage::Result)?;
        self.stage = Stage::MarksEntry;
        Ok(self.form())
    }

    pub fn open_overlay(&mut self, overlay: Overlay) -> Result<(), SessionError> {
        if let Some(o) = self.overlay {
            if o == overlay {
                return Ok(());
            }
            return Err(SessionError::OverlayOpen(o));
        }
        if overlay.home() != self.stage {
            return Err(SessionError::OverlayUnavailable {
                overlay,
                stage: self.stage,
            });
        }
        self.overlay = Some(overlay);
        Ok(())
    }

    /// Returns whether the overlay was open.
    pub fn close_overlay(&mut self, overlay: Overlay) -> bool {
        if self.overlay == Some(overlay) {
            self.overlay = None;
            true
        } else {
            false
        }
    }

    /// Clicks inside the overlay content keep it open.
    pub fn click_overlay(&mut self, overlay: Overlay, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Backdrop => self.close_overlay(overlay),
            ClickTarget::Content => false,
        }
    }

    pub fn status(&self, now: Instant) -> SessionStatus {
        let remaining = match (self.stage, self.pending_reveal) {
            (Stage::Calculating, Some(p)) => Some(p.remaining(now)),
            _ => None,
        };
        SessionStatus {
            session_id: self.id.to_string(),
            stage: self.stage,
            display_name: self.display_name.clone(),
            overlay: self.overlay,
            has_marks: self.marks.is_some(),
            has_result: self.result.is_some(),
            calculated_at: self.calculated_at.map(|t| t.to_rfc3339()),
            reveal_ready: self.stage == Stage::Calculating
                && remaining.map(|r| r.is_zero()).unwrap_or(true),
            reveal_in_ms: remaining.map(|r| r.as_millis().try_into().unwrap_or(u64::MAX)),
        }
    }
}
