use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::backend::QueryClient;
use crate::chat_view::ChatView;
use crate::error::BackendError;
use crate::session::ChatSession;
use crate::storage::Storage;

pub type SessionStorage = Box<dyn Storage + Send>;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,

    pub session: ChatSession<SessionStorage>,
    pub client: QueryClient,
    pub query_task: Option<JoinHandle<Result<String, BackendError>>>,

    // Input state
    pub cursor: usize, // cursor position in the draft, in chars

    // Chat view state
    pub chat_scroll: u16,
    pub follow_bottom: bool,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_lines: u16,  // Wrapped line count from the last render
    pub chat_view: ChatView,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(session: ChatSession<SessionStorage>, client: QueryClient) -> Self {
        let cursor = session.draft().chars().count();
        Self {
            should_quit: false,
            session,
            client,
            query_task: None,
            cursor,
            chat_scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            chat_lines: 0,
            chat_view: ChatView::new(),
            animation_frame: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Send the draft on a background task.
    ///
    /// Nothing happens while a request is already in flight; the store
    /// itself would accept it, the terminal UI just doesn't offer it.
    pub fn submit(&mut self) {
        if self.query_task.is_some() {
            debug!("request already in flight, ignoring submit");
            return;
        }
        let Some(query) = self.session.begin_submit() else {
            return;
        };

        let client = self.client.clone();
        self.query_task = Some(tokio::spawn(async move { client.query(&query).await }));
        self.follow_bottom = true;
    }

    /// Apply the result of a finished request, if there is one
    pub async fn poll_query(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.query_task.take() else {
            return;
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "query task failed");
                Err(BackendError::Task(err.to_string()))
            }
        };
        self.session.finish_submit(outcome);
        self.cursor = 0;
        self.follow_bottom = true;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Draft editing
    pub fn insert_char(&mut self, c: char) {
        let draft = self.session.draft_mut();
        let byte_pos = char_to_byte_index(draft, self.cursor);
        draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let draft = self.session.draft_mut();
            let byte_pos = char_to_byte_index(draft, self.cursor);
            draft.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        let draft = self.session.draft_mut();
        if self.cursor < draft.chars().count() {
            let byte_pos = char_to_byte_index(draft, self.cursor);
            draft.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.session.draft().chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.session.draft().chars().count();
    }

    // Chat scrolling
    pub fn max_scroll(&self) -> u16 {
        self.chat_lines.saturating_sub(self.chat_height)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.min(self.max_scroll()).saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
        if self.chat_scroll >= self.max_scroll() {
            self.chat_scroll = self.max_scroll();
            self.follow_bottom = true;
        }
    }

    pub fn page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}
