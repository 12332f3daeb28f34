use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use linkboost_core::{Action, View};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Applies a line-editing key to `text`. Returns false for keys that are
/// not editing keys.
fn edit_line(text: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    let len = text.chars().count();
    *cursor = (*cursor).min(len);

    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            text.clear();
            *cursor = 0;
        }
        KeyCode::Char(c) => {
            let byte_idx = char_to_byte_index(text, *cursor);
            text.insert(byte_idx, c);
            *cursor += 1;
        }
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_idx = char_to_byte_index(text, *cursor);
                text.remove(byte_idx);
            }
        }
        KeyCode::Delete => {
            if *cursor < len {
                let byte_idx = char_to_byte_index(text, *cursor);
                text.remove(byte_idx);
            }
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(len),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = len,
        _ => return false,
    }
    true
}

/// Inserts pasted text at the cursor. Inputs are single-line, so line
/// breaks become spaces.
fn paste_line(text: &mut String, cursor: &mut usize, pasted: &str) {
    let pasted: String = pasted
        .trim_end_matches(['\r', '\n'])
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    *cursor = (*cursor).min(text.chars().count());
    let byte_idx = char_to_byte_index(text, *cursor);
    text.insert_str(byte_idx, &pasted);
    *cursor += pasted.chars().count();
}

fn handle_paste(app: &mut App, pasted: &str) {
    if app.show_provider_picker || app.show_model_picker || app.state().nav_open {
        return;
    }
    match (app.view(), app.input_mode) {
        (View::Onboarding, _) => {
            app.input_mode = InputMode::Editing;
            paste_line(&mut app.url_input, &mut app.url_cursor, pasted.trim());
        }
        (View::AiOptimizer, InputMode::Editing) => {
            paste_line(&mut app.feedback_input, &mut app.feedback_cursor, pasted);
        }
        (View::PostGenerator, InputMode::Editing) => {
            let mut text = app.state().chat_input.clone();
            paste_line(&mut text, &mut app.chat_cursor, pasted);
            app.dispatch(Action::SetChatInput(text));
        }
        _ => {}
    }
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await?,
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    if app.show_provider_picker {
        handle_provider_picker(app, key);
        return Ok(());
    }
    if app.show_model_picker {
        handle_model_picker(app, key);
        return Ok(());
    }
    if app.state().nav_open {
        handle_navigation(app, key);
        return Ok(());
    }

    match app.input_mode {
        InputMode::Editing => handle_editing_mode(app, key),
        InputMode::Normal => handle_normal_mode(app, key).await,
    }
    Ok(())
}

fn handle_navigation(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab | KeyCode::Char('n') => app.toggle_navigation(),
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter | KeyCode::Char('l') => app.nav_enter(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_provider_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_provider_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.provider_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.provider_picker_nav_up(),
        KeyCode::Enter => app.select_provider(),
        _ => {}
    }
}

fn handle_model_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_model_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.model_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.model_picker_nav_up(),
        KeyCode::Enter => app.select_model(),
        _ => {}
    }
}

async fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Keys shared by every view
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab | KeyCode::Char('n') => {
            app.toggle_navigation();
            return;
        }
        KeyCode::Char('x') | KeyCode::Esc if app.state().notice.is_some() => {
            app.dispatch(Action::DismissNotice);
            return;
        }
        _ => {}
    }

    match app.view() {
        View::Onboarding => handle_onboarding_normal(app, key),
        View::ProfileView => handle_profile_normal(app, key),
        View::AiOptimizer => handle_optimizer_normal(app, key),
        View::PostGenerator => handle_post_normal(app, key),
        View::Settings => handle_settings_normal(app, key).await,
    }
}

fn handle_onboarding_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        _ => {}
    }
}

fn handle_profile_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') => app.dispatch(Action::Enhance),
        KeyCode::Char('o') => app.return_to_onboarding(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.profile_scroll = app.profile_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.profile_scroll = app.profile_scroll.saturating_sub(1);
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.profile_scroll = app.profile_scroll.saturating_add(10);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.profile_scroll = app.profile_scroll.saturating_sub(10);
        }
        KeyCode::Char('g') => app.profile_scroll = 0,
        _ => {}
    }
}

fn handle_optimizer_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.section_down(),
        KeyCode::Char('k') | KeyCode::Up => app.section_up(),
        KeyCode::Char('r') => app.regenerate_selected(String::new()),
        KeyCode::Char('f') | KeyCode::Enter => {
            if app.state().optimized.is_some() {
                app.feedback_input.clear();
                app.feedback_cursor = 0;
                app.input_mode = InputMode::Editing;
            }
        }
        KeyCode::Char('e') => app.dispatch(Action::Enhance),
        KeyCode::Char('o') => app.return_to_onboarding(),
        _ => {}
    }
}

fn handle_post_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.chat_cursor = app.state().chat_input.chars().count();
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Char('G') => app.chat_follow = true,
        _ => {}
    }
}

async fn handle_settings_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('p') => app.open_provider_picker(),
        KeyCode::Char('m') => app.open_model_picker().await,
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.view() {
        View::Onboarding => handle_url_editing(app, key),
        View::AiOptimizer => handle_feedback_editing(app, key),
        View::PostGenerator => handle_chat_editing(app, key),
        View::ProfileView | View::Settings => app.input_mode = InputMode::Normal,
    }
}

fn handle_url_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_url(),
        KeyCode::Tab => app.toggle_navigation(),
        _ => {
            edit_line(&mut app.url_input, &mut app.url_cursor, key);
        }
    }
}

fn handle_feedback_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            let feedback = std::mem::take(&mut app.feedback_input);
            app.feedback_cursor = 0;
            app.input_mode = InputMode::Normal;
            app.regenerate_selected(feedback);
        }
        _ => {
            edit_line(&mut app.feedback_input, &mut app.feedback_cursor, key);
        }
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.send_chat(),
        _ => {
            let mut text = app.state().chat_input.clone();
            if edit_line(&mut text, &mut app.chat_cursor, key) {
                app.dispatch(Action::SetChatInput(text));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use linkboost_core::{
        ApifyScraper, Config, LlmClient, LlmOptimizer, OllamaClient, Provider, Session, Status,
    };
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char(c))
        }
    }

    fn test_app() -> App {
        // Nothing here reaches the network: URLs are invalid and no
        // collaborator-backed action is dispatched.
        let scraper = ApifyScraper::new("http://127.0.0.1:9", "actor", None).unwrap();
        let optimizer = LlmOptimizer::new(
            LlmClient::Ollama(OllamaClient::new("http://127.0.0.1:9")),
            "llama3.2",
        );
        let session = Session::new(Arc::new(scraper), Arc::new(optimizer));
        let dir = std::env::temp_dir().join("linkboost-handler-tests");
        App::new(
            session,
            Config::new(),
            dir.join("config.json"),
            Provider::Ollama,
            "llama3.2".into(),
        )
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("hello", 2), 2);
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[test]
    fn edit_line_inserts_and_deletes_at_cursor() {
        let mut text = String::from("ac");
        let mut cursor = 1;
        assert!(edit_line(&mut text, &mut cursor, key(KeyCode::Char('b'))));
        assert_eq!(text, "abc");
        assert_eq!(cursor, 2);

        edit_line(&mut text, &mut cursor, key(KeyCode::Home));
        edit_line(&mut text, &mut cursor, key(KeyCode::Delete));
        assert_eq!(text, "bc");

        edit_line(&mut text, &mut cursor, key(KeyCode::End));
        edit_line(&mut text, &mut cursor, key(KeyCode::Backspace));
        assert_eq!(text, "b");
        assert!(!edit_line(&mut text, &mut cursor, key(KeyCode::Enter)));
    }

    #[test]
    fn edit_line_handles_multibyte_text() {
        let mut text = String::from("né");
        let mut cursor = 2;
        edit_line(&mut text, &mut cursor, key(KeyCode::Backspace));
        assert_eq!(text, "n");
        edit_line(&mut text, &mut cursor, ctrl('u'));
        assert!(text.is_empty());
        assert_eq!(cursor, 0);
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_from_the_input() {
        let mut app = test_app();
        type_text(&mut app, "example.com/ada").await;
        handle_key(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.state().status, Status::Error);
        assert_eq!(app.state().message, "Invalid LinkedIn URL");
        assert_eq!(app.session.in_flight(), 0);
        assert_eq!(app.url_input, "example.com/ada");
    }

    #[tokio::test]
    async fn typing_q_in_url_field_does_not_quit() {
        let mut app = test_app();
        type_text(&mut app, "q").await;
        assert!(!app.should_quit);
        assert_eq!(app.url_input, "q");

        handle_key(&mut app, key(KeyCode::Esc)).await.unwrap();
        handle_key(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn navigation_overlay_selects_view() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Tab)).await.unwrap();
        assert!(app.state().nav_open);

        handle_key(&mut app, key(KeyCode::Char('j'))).await.unwrap();
        handle_key(&mut app, key(KeyCode::Char('j'))).await.unwrap();
        handle_key(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert!(!app.state().nav_open);
        assert_eq!(app.view(), View::PostGenerator);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn chat_input_is_mirrored_into_state() {
        let mut app = test_app();
        app.dispatch(Action::Navigate(View::PostGenerator));
        handle_key(&mut app, key(KeyCode::Char('i'))).await.unwrap();
        type_text(&mut app, "hi").await;
        assert_eq!(app.state().chat_input, "hi");
        assert_eq!(app.chat_cursor, 2);
    }

    #[tokio::test]
    async fn enhance_without_profile_is_ignored() {
        let mut app = test_app();
        app.dispatch(Action::Navigate(View::ProfileView));
        handle_key(&mut app, key(KeyCode::Char('e'))).await.unwrap();
        assert_eq!(app.state().status, Status::Idle);
        assert_eq!(app.session.in_flight(), 0);
    }

    #[test]
    fn paste_line_flattens_line_breaks() {
        let mut text = String::from("ab");
        let mut cursor = 1;
        paste_line(&mut text, &mut cursor, "x\ny\n");
        assert_eq!(text, "ax yb");
        assert_eq!(cursor, 4);
    }

    #[tokio::test]
    async fn paste_on_onboarding_fills_url_field() {
        let mut app = test_app();
        app.input_mode = InputMode::Normal;
        handle_event(&mut app, AppEvent::Paste(" https://www.linkedin.com/in/ada\n".into()))
            .await
            .unwrap();
        assert_eq!(app.url_input, "https://www.linkedin.com/in/ada");
        assert_eq!(app.url_cursor, app.url_input.chars().count());
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn paste_outside_an_input_is_ignored() {
        let mut app = test_app();
        app.dispatch(Action::Navigate(View::PostGenerator));
        handle_event(&mut app, AppEvent::Paste("hello".into())).await.unwrap();
        assert!(app.state().chat_input.is_empty());
    }
}
