use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::error;

use crate::app::{App, Focus};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.chat.tick(),
        AppEvent::Answer { token, result } => app.chat.complete(token, result),
        AppEvent::PageLoaded { url, result } => match result {
            Ok(page) => {
                app.chat.load_page(url, page);
                app.page_loaded();
            }
            Err(e) => {
                error!(%url, error = %e, "page load failed");
                app.chat.navigation_failed();
                app.loading_page = false;
                app.status = Some(format!("Could not load {}: {}", url, e));
            }
        },
    }

    if app.chat.take_scroll_to_bottom() {
        app.scroll_to_bottom();
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any focus
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('n') => {
                app.new_chat();
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        _ => match app.focus {
            Focus::Prompt => handle_prompt(app, key),
            Focus::Transcript => handle_transcript(app, key),
        },
    }
}

fn handle_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        // Never falls through to inserting a newline
        KeyCode::Enter => app.press_submit(key.kind == KeyEventKind::Repeat),
        KeyCode::Esc => app.toggle_focus(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_transcript(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('v') => app.toggle_range(),
        KeyCode::Char('y') => {
            app.copy_selection();
        }
        KeyCode::Char('g') => app.scroll = 0,
        KeyCode::Char('G') => app.scroll_to_bottom(),
        KeyCode::Char('i') | KeyCode::Esc => {
            app.selection = None;
            app.status = None;
            app.focus = Focus::Prompt;
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_transcript = app
        .transcript_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_transcript {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use ragchat_core::{Answer, Config, Layout, Location, Message, Page, Transcript, Url};
    use tokio::sync::mpsc;

    fn app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(&Config::new(), tx).unwrap(), rx)
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c), KeyEventKind::Press)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_enter_submits_once_and_never_inserts_newline() {
        let (mut app, _rx) = app();
        type_text(&mut app, "hi").await;

        handle_event(&mut app, key(KeyCode::Enter, KeyEventKind::Press)).await.unwrap();
        handle_event(&mut app, key(KeyCode::Enter, KeyEventKind::Repeat)).await.unwrap();
        handle_event(&mut app, key(KeyCode::Enter, KeyEventKind::Press)).await.unwrap();

        assert!(app.chat.is_pending());
        assert_eq!(app.chat.transcript().len(), 1);
        assert!(!app.chat.input().value.contains('\n'));
        assert_eq!(app.chat.layout(), Layout::Conversation);
    }

    #[tokio::test]
    async fn test_blank_enter_does_nothing() {
        let (mut app, _rx) = app();
        type_text(&mut app, "   ").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyEventKind::Press)).await.unwrap();
        assert!(!app.chat.is_pending());
        assert_eq!(app.chat.input().value, "   ");
    }

    #[tokio::test]
    async fn test_answer_event_completes_request() {
        let (mut app, _rx) = app();
        type_text(&mut app, "hi").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyEventKind::Press)).await.unwrap();
        let token = app.chat.pending().unwrap().token;

        handle_event(&mut app, AppEvent::Tick).await.unwrap();
        handle_event(
            &mut app,
            AppEvent::Answer {
                token,
                result: Ok(Answer { answer: "<p>hello</p>".into(), elapsed: 0.4 }),
            },
        )
        .await
        .unwrap();

        assert!(!app.chat.is_pending());
        assert!(app.chat.input().enabled);
        assert_eq!(app.chat.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_question_during_new_chat_load_is_refused() {
        let (mut app, _rx) = app();
        app.chat.load_page(
            Url::parse("http://localhost:8000/").unwrap(),
            Page {
                title: None,
                header: None,
                transcript: Transcript::from_messages(vec![
                    Message::human("old question"),
                    Message::ai("old answer", 1.0),
                ]),
            },
        );

        app.new_chat();
        assert!(app.loading_page);
        type_text(&mut app, "hi").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyEventKind::Press)).await.unwrap();
        assert!(!app.chat.is_pending());
        assert_eq!(app.chat.transcript().len(), 2);

        handle_event(
            &mut app,
            AppEvent::PageLoaded {
                url: Url::parse("http://localhost:8000/?newchat=1").unwrap(),
                result: Ok(Page::default()),
            },
        )
        .await
        .unwrap();
        assert!(!app.loading_page);
        assert!(app.chat.transcript().is_empty());
        assert!(app.chat.input().enabled);

        type_text(&mut app, "hi").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyEventKind::Press)).await.unwrap();
        assert!(app.chat.is_pending());
        assert_eq!(app.chat.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_page_load_restores_prompt() {
        let (mut app, _rx) = app();
        let navigation = app.chat.initial_navigation();
        app.loading_page = true;
        assert!(!app.chat.input().enabled);

        let err = Location::parse("not a url").unwrap_err();
        handle_event(&mut app, AppEvent::PageLoaded { url: navigation.url, result: Err(err) })
            .await
            .unwrap();
        assert!(!app.loading_page);
        assert!(app.chat.input().enabled);
        assert!(app.status.is_some());
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let (mut app, _rx) = app();
        handle_event(&mut app, key(KeyCode::Char('q'), KeyEventKind::Press)).await.unwrap();
        // 'q' in the prompt is just text
        assert!(!app.should_quit);
        assert_eq!(app.chat.input().value, "q");

        app.chat.load_page(
            Url::parse("http://localhost:8000/").unwrap(),
            Page {
                title: None,
                header: None,
                transcript: Transcript::from_messages(vec![Message::human("q1")]),
            },
        );
        handle_event(&mut app, key(KeyCode::Tab, KeyEventKind::Press)).await.unwrap();
        assert_eq!(app.focus, Focus::Transcript);
        handle_event(&mut app, key(KeyCode::Char('q'), KeyEventKind::Press)).await.unwrap();
        assert!(app.should_quit);

        let (mut app, _rx) = self::app();

        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        )
        .await
        .unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_resize_keeps_state() {
        let (mut app, _rx) = app();
        type_text(&mut app, "abc").await;
        handle_event(&mut app, AppEvent::Resize).await.unwrap();
        assert_eq!(app.chat.input().value, "abc");
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 2, 4, 4);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(5, 5, rect));
        assert!(!point_in_rect(6, 2, rect));
        assert!(!point_in_rect(1, 3, rect));
    }
}
