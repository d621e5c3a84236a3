use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    input::KeyAction,
    runtime::AppEvent,
    session::{Event, Session, Update},
};

/// What the host loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue { redraw: bool },
    Quit,
}

/// Terminal host state: the active session plus what the header shows
#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub corpus_name: String,
}

impl App {
    pub fn new(session: Session, corpus_name: impl Into<String>) -> Self {
        Self {
            session,
            corpus_name: corpus_name.into(),
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Resize => Flow::Continue { redraw: true },
            AppEvent::Tick(id) => self.apply(Event::Tick(id)),
            AppEvent::Key(key) => {
                if is_quit(&key) {
                    return Flow::Quit;
                }
                match Event::from_key(KeyAction::from(key)) {
                    Some(event) => self.apply(event),
                    None => Flow::Continue { redraw: false },
                }
            }
        }
    }

    fn apply(&mut self, event: Event) -> Flow {
        match self.session.apply(event) {
            Ok(Update::Unchanged) => Flow::Continue { redraw: false },
            Ok(Update::Finished) => {
                if let Ok(json) = serde_json::to_string(&self.session.snapshot()) {
                    tracing::debug!(snapshot = %json, "final snapshot");
                }
                Flow::Continue { redraw: true }
            }
            Ok(_) => Flow::Continue { redraw: true },
            Err(e) => {
                tracing::error!("session rejected {event:?}: {e}");
                if cfg!(debug_assertions) {
                    panic!("session rejected {event:?}: {e}");
                }
                Flow::Continue { redraw: true }
            }
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Esc => true,
        // ctrl+c to quit
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
