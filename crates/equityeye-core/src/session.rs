//! The counsel chat session.
//!
//! Gemini chat state is client-held: the session keeps the seeded turn
//! history and ships the whole history on every send. Exactly one session
//! exists at a time. `initialize` replaces it, `close` drops it, and the
//! generation counter lets a driver discard replies that raced a
//! replacement or reset.

use thiserror::Error;

use crate::ai::gemini::{
    Content, GeminiClient, GeminiError, GenerateContentRequest, GenerationConfig, Part,
    SystemInstruction,
};
use crate::encode::UploadedFile;
use crate::persona;

/// Sampling temperature for the follow-up counsel chat.
pub const CHAT_TEMPERATURE: f32 = 0.4;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("chat session not initialized")]
    NotInitialized,
    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

struct ActiveSession {
    client: GeminiClient,
    model: String,
    system_instruction: String,
    history: Vec<Content>,
}

/// Owns the single chat session for the process.
#[derive(Default)]
pub struct SessionManager {
    active: Option<ActiveSession>,
    generation: u64,
}

/// A send prepared against a specific session generation.
///
/// Carries everything needed to issue the call off the owning thread; the
/// exchange is recorded afterwards with [`SessionManager::commit_exchange`].
pub struct PendingSend {
    pub generation: u64,
    client: GeminiClient,
    model: String,
    request: GenerateContentRequest,
}

impl PendingSend {
    /// Issue the prepared call. One attempt, one outcome; a response with no
    /// text yields the empty string.
    pub async fn execute(&self) -> Result<String, SessionError> {
        let response = self
            .client
            .generate_content(&self.model, &self.request)
            .await?;
        Ok(response.text().unwrap_or_default())
    }

    /// Conversation turns this send will carry, the staged user turn last.
    pub fn contents(&self) -> &[Content] {
        &self.request.contents
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the current session; bumped on every replace or close.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_initialized(&self) -> bool {
        self.active.is_some()
    }

    /// Turn history of the active session, seeded turns included.
    pub fn history(&self) -> Option<&[Content]> {
        self.active.as_ref().map(|s| s.history.as_slice())
    }

    /// Start a session grounded in the audited document and its report.
    ///
    /// Without a client (no credential) this silently leaves everything as
    /// it was. With one, any previous session is replaced and outstanding
    /// sends against it become stale.
    pub fn initialize(
        &mut self,
        client: Option<&GeminiClient>,
        model: &str,
        persona_text: &str,
        file: &UploadedFile,
        report: &str,
    ) {
        let Some(client) = client else {
            return;
        };

        self.generation += 1;
        self.active = Some(ActiveSession {
            client: client.clone(),
            model: model.to_string(),
            system_instruction: persona::with_grounding(persona_text, report),
            history: seed_history(file),
        });
    }

    /// Drop the active session. Outstanding sends against it become stale.
    pub fn close(&mut self) {
        if self.active.take().is_some() {
            self.generation += 1;
        }
    }

    /// Stage a user turn for sending. The history is not touched until the
    /// exchange is committed.
    pub fn prepare_send(&self, text: &str) -> Result<PendingSend, SessionError> {
        let session = self.active.as_ref().ok_or(SessionError::NotInitialized)?;

        let mut contents = session.history.clone();
        contents.push(Content::user(vec![Part::text(text)]));

        Ok(PendingSend {
            generation: self.generation,
            client: session.client.clone(),
            model: session.model.clone(),
            request: GenerateContentRequest {
                contents,
                system_instruction: Some(SystemInstruction::new(&session.system_instruction)),
                generation_config: Some(GenerationConfig {
                    temperature: CHAT_TEMPERATURE,
                    thinking_config: None,
                }),
            },
        })
    }

    /// Record a completed exchange, unless the session was replaced or
    /// closed since the send was prepared. Returns whether it was recorded.
    pub fn commit_exchange(&mut self, generation: u64, user_text: &str, reply: &str) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale chat exchange"
            );
            return false;
        }
        let Some(session) = self.active.as_mut() else {
            return false;
        };

        session.history.push(Content::user(vec![Part::text(user_text)]));
        session.history.push(Content::model(vec![Part::text(reply)]));
        true
    }

    /// Send a user turn and wait for the reply.
    pub async fn send_message(&mut self, text: &str) -> Result<String, SessionError> {
        let pending = self.prepare_send(text)?;
        let reply = pending.execute().await?;
        self.commit_exchange(pending.generation, text, &reply);
        Ok(reply)
    }
}

fn seed_history(file: &UploadedFile) -> Vec<Content> {
    vec![
        Content::user(vec![
            Part::text(persona::DOCUMENT_ATTACHMENT_NOTE),
            Part::inline_data(&file.mime_type, &file.data),
        ]),
        Content::model(vec![Part::text(persona::COUNSEL_ACKNOWLEDGMENT)]),
    ]
}
