use std::path::PathBuf;

use anyhow::anyhow;
use tokio::task::JoinHandle;

use equityeye_core::encode::{self, UploadedFile};
use equityeye_core::session::SessionError;
use equityeye_core::state::PhaseKind;
use equityeye_core::{audit, Controller, GeminiClient, SessionManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// A chat send in flight, stamped with the session generation it was
/// prepared against.
struct ChatTask {
    generation: u64,
    user_text: String,
    handle: JoinHandle<Result<String, SessionError>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub controller: Controller,
    pub session: SessionManager,

    // Model access
    pub client: Option<GeminiClient>,
    pub model: String,
    pub persona: String,

    // Input state
    pub path_input: String,
    pub chat_input: String,

    // Validation alerts and send rejections, shown in the footer
    pub status: Option<String>,

    // Presentation state
    pub report_scroll: u16,
    pub animation_frame: u8,

    // In-flight work, polled from the UI loop
    analyze_task: Option<JoinHandle<anyhow::Result<(UploadedFile, String)>>>,
    chat_task: Option<ChatTask>,
}

impl App {
    pub fn new(client: Option<GeminiClient>, model: String, persona: String) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            controller: Controller::new(),
            session: SessionManager::new(),
            client,
            model,
            persona,
            path_input: String::new(),
            chat_input: String::new(),
            status: None,
            report_scroll: 0,
            animation_frame: 0,
            analyze_task: None,
            chat_task: None,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.controller.phase().kind() == PhaseKind::Analyzing
            || self.controller.reply_pending()
        {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Validate the entered path and, if it passes, kick off the analysis
    /// sequence: encode, audit, then chat-session seeding.
    ///
    /// Validation failures surface as a status alert and nothing else
    /// happens; the file is never read and the phase stays idle.
    pub fn submit_document(&mut self) {
        let raw = self.path_input.trim();
        if raw.is_empty() {
            return;
        }
        let path = PathBuf::from(raw);

        if let Err(err) = encode::validate_path(&path) {
            self.status = Some(err.to_string());
            return;
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        if let Err(err) = self.controller.select_file(name) {
            self.status = Some(err.to_string());
            return;
        }

        self.status = None;
        let client = self.client.clone();
        let model = self.model.clone();
        let persona = self.persona.clone();
        self.analyze_task = Some(tokio::spawn(async move {
            let file = encode::encode_file(&path).await?;
            let client = client.ok_or_else(|| anyhow!("GEMINI_API_KEY is not set"))?;
            let report = audit::analyze_document(&client, &model, &file, &persona).await?;
            Ok((file, report))
        }));
    }

    /// Send the entered chat message. Ignored while a reply is pending: a
    /// new send is only accepted once the previous one resolves.
    pub fn submit_chat_message(&mut self) {
        if self.chat_task.is_some() {
            return;
        }
        let text = self.chat_input.trim().to_string();
        if text.is_empty() {
            return;
        }

        if self.controller.begin_user_message(&text).is_err() {
            return;
        }
        self.chat_input.clear();

        match self.session.prepare_send(&text) {
            Ok(pending) => {
                self.chat_task = Some(ChatTask {
                    generation: pending.generation,
                    user_text: text,
                    handle: tokio::spawn(async move { pending.execute().await }),
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat send failed");
                self.controller.fail_reply().ok();
            }
        }
    }

    /// Apply finished background work. Called from the UI loop on every
    /// tick; completions that outlived a reset are discarded by the
    /// session generation check.
    pub async fn poll_tasks(&mut self) {
        if let Some(task) = self.analyze_task.take_if(|t| t.is_finished()) {
            match task.await {
                Ok(Ok((file, report))) => {
                    self.session.initialize(
                        self.client.as_ref(),
                        &self.model,
                        &self.persona,
                        &file,
                        &report,
                    );
                    self.controller.audit_succeeded(report).ok();
                }
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "analysis failed");
                    self.controller.audit_failed(err.to_string()).ok();
                }
                Err(err) => {
                    tracing::error!(error = %err, "analysis task aborted");
                    self.controller
                        .audit_failed("analysis task aborted".to_string())
                        .ok();
                }
            }
        }

        if let Some(task) = self.chat_task.take_if(|t| t.handle.is_finished()) {
            match task.handle.await {
                Ok(Ok(reply)) => {
                    // A reset or session replacement since the send makes
                    // this reply stale; the transcript was cleared with it.
                    if self
                        .session
                        .commit_exchange(task.generation, &task.user_text, &reply)
                    {
                        self.controller.complete_reply(reply).ok();
                    }
                }
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "chat send failed");
                    if self.session.generation() == task.generation {
                        self.controller.fail_reply().ok();
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "chat task aborted");
                    if self.session.generation() == task.generation {
                        self.controller.fail_reply().ok();
                    }
                }
            }
        }
    }

    /// Return to idle, clearing the report, transcript, and inputs. The
    /// chat session is closed; an in-flight reply is left to finish and
    /// discarded when it does.
    pub fn reset(&mut self) {
        if self.controller.reset().is_err() {
            return;
        }
        self.session.close();
        self.chat_task = None;
        self.path_input.clear();
        self.chat_input.clear();
        self.status = None;
        self.report_scroll = 0;
        self.input_mode = InputMode::Normal;
    }
}
