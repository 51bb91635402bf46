use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_query().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.page()),
        KeyCode::PageDown => app.scroll_down(app.page()),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_LINES),
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SessionStorage;
    use crate::backend::QueryClient;
    use crate::session::ChatSession;
    use crate::storage::MemoryStorage;

    fn app() -> App {
        let storage: SessionStorage = Box::new(MemoryStorage::new());
        App::new(ChatSession::open(storage), QueryClient::new("http://localhost:1"))
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn typing_fills_the_draft() {
        let mut app = app();
        for c in "brakes".chars() {
            handle_event(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        handle_event(&mut app, key(KeyCode::Backspace)).await.unwrap();

        assert_eq!(app.session.draft(), "brake");
    }

    #[tokio::test]
    async fn ctrl_c_and_esc_quit() {
        let mut app = app();
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_event(&mut app, ctrl_c).await.unwrap();
        assert!(app.should_quit);
        assert_eq!(app.session.draft(), "");

        let mut app = self::app();
        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn enter_on_blank_draft_does_nothing() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char(' '))).await.unwrap();
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert!(app.session.conversation().is_empty());
        assert!(!app.is_busy());
    }
}
