//! UI-agnostic application state.
//!
//! The [`Controller`] sequences one audit cycle as pure transitions; network
//! calls are issued by an outer driver and fed back in as completion events.
//! The audit report lives inside [`Phase::Results`], so a results phase
//! without a report is unrepresentable.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A chat message in the counsel conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: DeliveryStatus,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            status: DeliveryStatus::Delivered,
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Model,
}

/// Whether a message made it to the model.
///
/// A user message whose send failed stays in the transcript marked `Failed`
/// instead of being silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Delivered,
    Failed,
}

/// The audit report for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditResult {
    pub full_report: String,
    /// Founder friendliness score, when the report carries one.
    pub score: Option<u8>,
}

static SCORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)founder friendliness score:?\s*\[?\s*(\d{1,3})\s*%?\s*/\s*100")
        .expect("score pattern compiles")
});

impl AuditResult {
    /// Wrap a report, pulling the friendliness score out of it if present.
    pub fn from_report(full_report: String) -> Self {
        let score = SCORE_PATTERN
            .captures(&full_report)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u8>().ok())
            .filter(|value| *value <= 100);
        Self { full_report, score }
    }
}

/// Where an audit cycle currently stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Analyzing {
        file_name: String,
    },
    Results {
        file_name: String,
        audit: AuditResult,
    },
    Error {
        message: String,
    },
}

/// Copyable discriminant of [`Phase`], for dispatch without borrowing the
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Idle,
    Analyzing,
    Results,
    Error,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Idle => PhaseKind::Idle,
            Phase::Analyzing { .. } => PhaseKind::Analyzing,
            Phase::Results { .. } => PhaseKind::Results,
            Phase::Error { .. } => PhaseKind::Error,
        }
    }
}

/// A transition that is not legal from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("an analysis is already in progress")]
    AnalysisInProgress,
    #[error("reset before starting a new audit")]
    NotIdle,
    #[error("no analysis is in progress")]
    NotAnalyzing,
    #[error("chat requires a completed audit")]
    NoActiveReport,
    #[error("a reply is still pending")]
    ReplyPending,
    #[error("no reply is pending")]
    NoPendingReply,
}

/// Sequences one audit cycle: Idle -> Analyzing -> Results or Error -> Idle.
#[derive(Debug, Default)]
pub struct Controller {
    phase: Phase,
    transcript: Vec<ChatMessage>,
    reply_pending: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// True while a sent message is waiting on its reply. New sends are
    /// rejected until the pending one resolves.
    pub fn reply_pending(&self) -> bool {
        self.reply_pending
    }

    pub fn audit(&self) -> Option<&AuditResult> {
        match &self.phase {
            Phase::Results { audit, .. } => Some(audit),
            _ => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match &self.phase {
            Phase::Analyzing { file_name } | Phase::Results { file_name, .. } => Some(file_name),
            _ => None,
        }
    }

    /// Accept a validated file and enter the analyzing phase.
    pub fn select_file(&mut self, file_name: impl Into<String>) -> Result<(), TransitionError> {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Analyzing {
                    file_name: file_name.into(),
                };
                Ok(())
            }
            Phase::Analyzing { .. } => Err(TransitionError::AnalysisInProgress),
            Phase::Results { .. } | Phase::Error { .. } => Err(TransitionError::NotIdle),
        }
    }

    /// Record a completed audit and enter the results phase.
    pub fn audit_succeeded(&mut self, report: String) -> Result<(), TransitionError> {
        match std::mem::take(&mut self.phase) {
            Phase::Analyzing { file_name } => {
                self.phase = Phase::Results {
                    file_name,
                    audit: AuditResult::from_report(report),
                };
                Ok(())
            }
            other => {
                self.phase = other;
                Err(TransitionError::NotAnalyzing)
            }
        }
    }

    /// Record a failed audit and enter the error phase.
    pub fn audit_failed(&mut self, message: String) -> Result<(), TransitionError> {
        match self.phase {
            Phase::Analyzing { .. } => {
                self.phase = Phase::Error { message };
                Ok(())
            }
            _ => Err(TransitionError::NotAnalyzing),
        }
    }

    /// Append a user message and mark its reply pending. Returns the
    /// message id. Rejected outside the results phase and while a prior
    /// reply is outstanding.
    pub fn begin_user_message(&mut self, text: &str) -> Result<String, TransitionError> {
        match self.phase {
            Phase::Results { .. } => {}
            _ => return Err(TransitionError::NoActiveReport),
        }
        if self.reply_pending {
            return Err(TransitionError::ReplyPending);
        }

        let message = ChatMessage::new(ChatRole::User, text);
        let id = message.id.clone();
        self.transcript.push(message);
        self.reply_pending = true;
        Ok(id)
    }

    /// Append the model reply for the pending message.
    pub fn complete_reply(&mut self, text: String) -> Result<(), TransitionError> {
        if !self.reply_pending {
            return Err(TransitionError::NoPendingReply);
        }
        self.transcript.push(ChatMessage::new(ChatRole::Model, text));
        self.reply_pending = false;
        Ok(())
    }

    /// Mark the pending user message as failed. The phase is unchanged and
    /// the message stays visible in the transcript.
    pub fn fail_reply(&mut self) -> Result<(), TransitionError> {
        if !self.reply_pending {
            return Err(TransitionError::NoPendingReply);
        }
        if let Some(message) = self
            .transcript
            .iter_mut()
            .rev()
            .find(|m| m.role == ChatRole::User)
        {
            message.status = DeliveryStatus::Failed;
        }
        self.reply_pending = false;
        Ok(())
    }

    /// Return to idle, clearing the report and the transcript. Rejected
    /// while an analysis is in flight.
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Analyzing { .. } => Err(TransitionError::AnalysisInProgress),
            Phase::Results { .. } | Phase::Error { .. } => {
                self.phase = Phase::Idle;
                self.transcript.clear();
                self.reply_pending = false;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with_results() -> Controller {
        let mut controller = Controller::new();
        controller.select_file("term-sheet.pdf").unwrap();
        controller
            .audit_succeeded("1. EXECUTIVE SUMMARY\n...".to_string())
            .unwrap();
        controller
    }

    // ===== Score parsing =====

    #[test]
    fn test_score_parsed_from_report() {
        let audit = AuditResult::from_report(
            "EXECUTIVE SUMMARY\n- Founder Friendliness Score: 62/100%\n- Verdict: risky".to_string(),
        );
        assert_eq!(audit.score, Some(62));
    }

    #[test]
    fn test_score_parsed_from_bracketed_form() {
        let audit =
            AuditResult::from_report("Founder Friendliness Score: [85/100%]".to_string());
        assert_eq!(audit.score, Some(85));
    }

    #[test]
    fn test_score_absent_when_report_has_none() {
        let audit = AuditResult::from_report("No score line here.".to_string());
        assert_eq!(audit.score, None);
    }

    #[test]
    fn test_score_out_of_range_is_discarded() {
        let audit =
            AuditResult::from_report("Founder Friendliness Score: 250/100%".to_string());
        assert_eq!(audit.score, None);
    }

    // ===== Phase transitions =====

    #[test]
    fn test_full_cycle_idle_analyzing_results_reset() {
        let mut controller = Controller::new();
        assert_eq!(controller.phase().kind(), PhaseKind::Idle);

        controller.select_file("term-sheet.pdf").unwrap();
        assert_eq!(controller.phase().kind(), PhaseKind::Analyzing);
        assert_eq!(controller.file_name(), Some("term-sheet.pdf"));

        controller.audit_succeeded("report".to_string()).unwrap();
        assert_eq!(controller.phase().kind(), PhaseKind::Results);
        assert_eq!(controller.audit().unwrap().full_report, "report");

        controller.reset().unwrap();
        assert_eq!(controller.phase().kind(), PhaseKind::Idle);
        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn test_audit_failure_enters_error_phase() {
        let mut controller = Controller::new();
        controller.select_file("term-sheet.pdf").unwrap();
        controller.audit_failed("credential missing".to_string()).unwrap();
        assert_eq!(controller.phase().kind(), PhaseKind::Error);

        controller.reset().unwrap();
        assert_eq!(controller.phase().kind(), PhaseKind::Idle);
    }

    #[test]
    fn test_select_file_rejected_outside_idle() {
        let mut controller = Controller::new();
        controller.select_file("a.pdf").unwrap();
        assert_eq!(
            controller.select_file("b.pdf"),
            Err(TransitionError::AnalysisInProgress)
        );

        controller.audit_succeeded("report".to_string()).unwrap();
        assert_eq!(controller.select_file("b.pdf"), Err(TransitionError::NotIdle));
    }

    #[test]
    fn test_audit_completion_rejected_outside_analyzing() {
        let mut controller = Controller::new();
        assert_eq!(
            controller.audit_succeeded("report".to_string()),
            Err(TransitionError::NotAnalyzing)
        );
        assert_eq!(
            controller.audit_failed("boom".to_string()),
            Err(TransitionError::NotAnalyzing)
        );
        assert_eq!(controller.phase().kind(), PhaseKind::Idle);
    }

    #[test]
    fn test_reset_rejected_while_analyzing() {
        let mut controller = Controller::new();
        controller.select_file("a.pdf").unwrap();
        assert_eq!(controller.reset(), Err(TransitionError::AnalysisInProgress));
    }

    #[test]
    fn test_reset_from_idle_is_a_no_op() {
        let mut controller = Controller::new();
        assert_eq!(controller.reset(), Ok(()));
        assert_eq!(controller.phase().kind(), PhaseKind::Idle);
    }

    // ===== Transcript =====

    #[test]
    fn test_exchange_appends_user_then_model_message() {
        let mut controller = controller_with_results();

        controller.begin_user_message("Explain clause 3").unwrap();
        assert!(controller.reply_pending());

        controller
            .complete_reply("Clause 3 says...".to_string())
            .unwrap();
        assert!(!controller.reply_pending());

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, ChatRole::User);
        assert_eq!(transcript[0].content, "Explain clause 3");
        assert_eq!(transcript[0].status, DeliveryStatus::Delivered);
        assert_eq!(transcript[1].role, ChatRole::Model);
        assert_eq!(transcript[1].content, "Clause 3 says...");
        assert_ne!(transcript[0].id, transcript[1].id);
    }

    #[test]
    fn test_send_rejected_while_reply_pending() {
        let mut controller = controller_with_results();
        controller.begin_user_message("first").unwrap();

        assert_eq!(
            controller.begin_user_message("second"),
            Err(TransitionError::ReplyPending)
        );
        assert_eq!(controller.transcript().len(), 1);
    }

    #[test]
    fn test_send_rejected_without_results() {
        let mut controller = Controller::new();
        assert_eq!(
            controller.begin_user_message("hello"),
            Err(TransitionError::NoActiveReport)
        );

        controller.select_file("a.pdf").unwrap();
        assert_eq!(
            controller.begin_user_message("hello"),
            Err(TransitionError::NoActiveReport)
        );
    }

    #[test]
    fn test_failed_send_marks_user_message_and_keeps_phase() {
        let mut controller = controller_with_results();
        controller.begin_user_message("Explain clause 3").unwrap();

        controller.fail_reply().unwrap();
        assert_eq!(controller.phase().kind(), PhaseKind::Results);
        assert!(!controller.reply_pending());

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].status, DeliveryStatus::Failed);

        // The failure is recoverable: the next send is accepted.
        controller.begin_user_message("try again").unwrap();
        assert_eq!(controller.transcript().len(), 2);
    }

    #[test]
    fn test_reply_events_rejected_without_pending_send() {
        let mut controller = controller_with_results();
        assert_eq!(
            controller.complete_reply("reply".to_string()),
            Err(TransitionError::NoPendingReply)
        );
        assert_eq!(controller.fail_reply(), Err(TransitionError::NoPendingReply));
    }

    #[test]
    fn test_transcript_grows_without_changing_phase() {
        let mut controller = controller_with_results();
        for i in 0..3 {
            controller.begin_user_message(&format!("question {i}")).unwrap();
            controller.complete_reply(format!("answer {i}")).unwrap();
        }
        assert_eq!(controller.phase().kind(), PhaseKind::Results);
        assert_eq!(controller.transcript().len(), 6);
    }

    // ===== Invariants =====

    #[test]
    fn test_never_idle_with_a_transcript() {
        let mut controller = controller_with_results();
        controller.begin_user_message("q").unwrap();
        controller.complete_reply("a".to_string()).unwrap();

        controller.reset().unwrap();
        assert_eq!(controller.phase().kind(), PhaseKind::Idle);
        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn test_results_always_carries_a_report() {
        let controller = controller_with_results();
        match controller.phase() {
            Phase::Results { audit, .. } => assert!(!audit.full_report.is_empty()),
            other => panic!("expected results, got {other:?}"),
        }
    }
}
