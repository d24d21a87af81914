use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;

pub enum KeyAction {
    Continue,
    Quit,
}

pub async fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }

    // A dialog swallows everything; any close key dismisses it
    if app.is_dialog_open() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            app.close_dialog();
        }
        return KeyAction::Continue;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('r') => {
            // Refresh is disabled while a request is outstanding
            if !app.is_requesting() {
                app.refresh().await;
            }
        }
        KeyCode::Char('f') => app.request_files(),
        KeyCode::Enter | KeyCode::Char('v') => app.view_selected(),
        KeyCode::Char('s') => app.share_selected(),
        KeyCode::Char('x') => app.export_selected(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Up | KeyCode::Char('k') => app.screen.move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.screen.move_down(),
        KeyCode::Char('`') => app.show_debug = !app.show_debug,
        _ => {}
    }
    KeyAction::Continue
}
