//! Conversation store and dispatcher
//!
//! `ChatSession` owns the conversation, the draft input and the busy flag,
//! and writes the conversation through to its storage after every change.
//! A submission is split into `begin_submit` and `finish_submit` so the
//! request itself can run on a background task while the UI keeps drawing.

use tracing::{debug, trace, warn};

use crate::backend::Backend;
use crate::error::BackendError;
use crate::message::{Conversation, Message};
use crate::storage::{Storage, CONVERSATION_KEY};

pub struct ChatSession<S: Storage> {
    conversation: Conversation,
    draft: String,
    busy: bool,
    storage: S,
}

impl<S: Storage> ChatSession<S> {
    /// Create a session and load any stored conversation
    pub fn open(storage: S) -> Self {
        let mut session = Self {
            conversation: Conversation::new(),
            draft: String::new(),
            busy: false,
            storage,
        };
        session.restore();
        session
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace the in-memory conversation with what storage holds.
    ///
    /// A missing, unreadable or unparsable value leaves the conversation
    /// empty. Nothing is surfaced to the user.
    pub fn restore(&mut self) {
        self.conversation = match self.storage.get(CONVERSATION_KEY) {
            Ok(Some(raw)) => match Conversation::from_json(&raw) {
                Ok(conversation) => conversation,
                Err(err) => {
                    warn!(error = %err, "stored conversation is not valid JSON, starting empty");
                    Conversation::new()
                }
            },
            Ok(None) => Conversation::new(),
            Err(err) => {
                warn!(error = %err, "failed to read stored conversation, starting empty");
                Conversation::new()
            }
        };
        debug!(messages = self.conversation.len(), "conversation restored");
    }

    /// Write the whole conversation back to storage
    pub fn persist(&mut self) {
        let raw = match self.conversation.to_json() {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "failed to serialize conversation");
                return;
            }
        };
        if let Err(err) = self.storage.set(CONVERSATION_KEY, &raw) {
            warn!(error = %err, "failed to persist conversation");
        }
    }

    fn append(&mut self, message: Message) {
        self.conversation.push(message);
        self.persist();
    }

    /// Start a submission of the current draft.
    ///
    /// Returns the query to send, or `None` when the draft is blank. The
    /// user message keeps the draft exactly as typed.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.draft.trim().is_empty() {
            trace!("ignoring blank submission");
            return None;
        }

        let query = self.draft.clone();
        self.append(Message::user(query.clone()));
        self.busy = true;
        Some(query)
    }

    /// Record the outcome of a request started with `begin_submit`
    pub fn finish_submit(&mut self, outcome: Result<String, BackendError>) {
        let message = match outcome {
            Ok(answer) => Message::assistant(answer),
            Err(err) => {
                warn!(error = %err, "assistant request failed");
                Message::assistant(err.user_message())
            }
        };
        self.append(message);
        self.draft.clear();
        self.busy = false;
    }

    /// Submit the draft and wait for the answer.
    ///
    /// Returns `false` without touching anything when the draft is blank.
    pub async fn submit<B: Backend + ?Sized>(&mut self, backend: &B) -> bool {
        let Some(query) = self.begin_submit() else {
            return false;
        };
        let outcome = backend.ask(&query).await;
        self.finish_submit(outcome);
        true
    }
}
