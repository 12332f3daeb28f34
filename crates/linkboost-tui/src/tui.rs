use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Drives the "working..." ellipsis while a request is in flight.
const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    /// A bracketed paste, delivered whole so a pasted profile URL is one edit.
    Paste(String),
    Resize(u16, u16),
    Tick,
}

impl AppEvent {
    /// Maps a raw terminal event. Release and repeat key events are dropped
    /// since some terminals report every keystroke twice.
    fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Paste(text) => Some(AppEvent::Paste(text)),
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            _ => None,
        }
    }
}

/// Merges terminal input and the animation tick onto one channel, read by
/// the main loop next to session completions.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    task: JoinHandle<()>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut ticks = tokio::time::interval(TICK_RATE);
            loop {
                let event = tokio::select! {
                    _ = ticks.tick() => Some(AppEvent::Tick),
                    next = reader.next() => match next {
                        Some(Ok(raw)) => AppEvent::from_terminal(raw),
                        Some(Err(err)) => {
                            warn!(error = %err, "terminal event stream error");
                            None
                        }
                        None => break,
                    },
                };
                if let Some(event) = event {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            }
            debug!("terminal event reader stopped");
        });
        Self { rx, task }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableBracketedPaste)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stderr()))?)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableBracketedPaste, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Puts the terminal back before the panic message prints.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key_event(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn keeps_only_key_presses() {
        assert!(matches!(
            AppEvent::from_terminal(key_event(KeyEventKind::Press)),
            Some(AppEvent::Key(_))
        ));
        assert_eq!(AppEvent::from_terminal(key_event(KeyEventKind::Release)), None);
        assert_eq!(AppEvent::from_terminal(key_event(KeyEventKind::Repeat)), None);
    }

    #[test]
    fn forwards_paste_and_resize() {
        assert_eq!(
            AppEvent::from_terminal(Event::Paste("linkedin.com/in/ada".into())),
            Some(AppEvent::Paste("linkedin.com/in/ada".into()))
        );
        assert_eq!(AppEvent::from_terminal(Event::Resize(80, 24)), Some(AppEvent::Resize(80, 24)));
        assert_eq!(AppEvent::from_terminal(Event::FocusGained), None);
    }
}
