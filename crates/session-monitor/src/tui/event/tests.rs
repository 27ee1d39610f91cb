use super::*;
use crate::tui::test_utils::make_app;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

fn make_key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

#[test]
fn test_should_quit_on_q() {
    assert!(should_quit(make_key(KeyCode::Char('q'), KeyModifiers::NONE)));
}

#[test]
fn test_should_quit_on_ctrl_c() {
    assert!(should_quit(make_key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
}

#[test]
fn test_should_not_quit_on_plain_c() {
    assert!(!should_quit(make_key(KeyCode::Char('c'), KeyModifiers::NONE)));
    assert!(!should_quit(make_key(KeyCode::Esc, KeyModifiers::NONE)));
}

#[test]
fn test_handle_key_quit() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path(), &[]);
    let action = handle_key_event(&mut app, make_key(KeyCode::Char('q'), KeyModifiers::NONE));
    assert_eq!(action, Action::Quit);
}

#[test]
fn test_p_toggles_summary() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path(), &[]);
    assert!(!app.options.show_summary);

    let p = make_key(KeyCode::Char('p'), KeyModifiers::NONE);
    assert_eq!(handle_key_event(&mut app, p), Action::None);
    assert!(app.options.show_summary);
    handle_key_event(&mut app, p);
    assert!(!app.options.show_summary);
}

#[test]
fn test_d_toggles_debug() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path(), &[]);
    handle_key_event(&mut app, make_key(KeyCode::Char('d'), KeyModifiers::NONE));
    assert!(app.options.debug);
    assert!(app.options.interactive);
}

#[test]
fn test_release_events_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path(), &[]);
    let mut key = make_key(KeyCode::Char('p'), KeyModifiers::NONE);
    key.kind = KeyEventKind::Release;
    assert_eq!(handle_key_event(&mut app, key), Action::None);
    assert!(!app.options.show_summary);
}

#[test]
fn test_c_copies_hovered_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = make_app(dir.path(), &[]);
    let c = make_key(KeyCode::Char('c'), KeyModifiers::NONE);
    assert_eq!(handle_key_event(&mut app, c), Action::None);

    app.hover = Some("abc".to_string());
    assert_eq!(
        handle_key_event(&mut app, c),
        Action::CopySessionId("abc".to_string())
    );
}

#[tokio::test]
async fn test_event_handler_periods() {
    let handler = EventHandler::new(Duration::from_secs(1), Duration::from_millis(100));
    assert_eq!(handler.refresh_period(), Duration::from_secs(1));
    assert_eq!(handler.flash_period(), Duration::from_millis(100));
}
