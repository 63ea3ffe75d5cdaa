//! Keyboard state of the terminal browser: focus, address bar and field
//! editing.

use crossterm::event::KeyCode;
use tracing::debug;

use crate::view::{Action, MemorySurface, NodeId, OutlineLine, WidgetKind};

/// What the keyboard currently edits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Moving focus and activating widgets.
    #[default]
    Browse,
    /// Typing a URL.
    Address(String),
    /// Typing into an input field.
    Edit {
        /// Field being edited.
        node: NodeId,
        /// Text typed so far.
        buffer: String,
    },
}

/// Effect of a key press.
#[derive(Debug, Clone, Default)]
pub enum Command {
    /// Nothing to do.
    #[default]
    None,
    /// Leave the browser.
    Quit,
    /// Run a widget action.
    Dispatch(Action),
    /// Resolve and open a URL.
    Navigate(String),
    /// History back.
    Back,
    /// History forward.
    Forward,
    /// Store the text of an input field.
    SetValue(NodeId, String),
}

/// Focus and mode of the browser.
#[derive(Debug, Default)]
pub struct Browser {
    mode: Mode,
    focus: usize,
}

/// Focusable nodes in display order.
pub fn focusables(outline: &[OutlineLine]) -> Vec<NodeId> {
    outline
        .iter()
        .flat_map(|line| line.spans.iter())
        .filter(|span| span.focusable)
        .map(|span| span.node)
        .collect()
}

impl Browser {
    /// Fresh browser state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Focused node, clamped to what is on screen.
    pub fn focused(&self, outline: &[OutlineLine]) -> Option<NodeId> {
        let nodes = focusables(outline);
        if nodes.is_empty() {
            return None;
        }
        nodes.get(self.focus.min(nodes.len() - 1)).copied()
    }

    /// Handles one key press.
    pub fn handle_key(&mut self, key: KeyCode, surface: &MemorySurface) -> Command {
        match std::mem::take(&mut self.mode) {
            Mode::Browse => self.browse_key(key, surface),
            Mode::Address(mut buffer) => match key {
                KeyCode::Enter => Command::Navigate(buffer),
                KeyCode::Esc => Command::None,
                KeyCode::Backspace => {
                    buffer.pop();
                    self.mode = Mode::Address(buffer);
                    Command::None
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    self.mode = Mode::Address(buffer);
                    Command::None
                }
                _ => {
                    self.mode = Mode::Address(buffer);
                    Command::None
                }
            },
            Mode::Edit { node, mut buffer } => match key {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => Command::SetValue(node, buffer),
                KeyCode::Backspace => {
                    buffer.pop();
                    self.mode = Mode::Edit { node, buffer };
                    Command::None
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    self.mode = Mode::Edit { node, buffer };
                    Command::None
                }
                _ => {
                    self.mode = Mode::Edit { node, buffer };
                    Command::None
                }
            },
        }
    }

    fn browse_key(&mut self, key: KeyCode, surface: &MemorySurface) -> Command {
        let outline = surface.outline();
        let count = focusables(&outline).len();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            KeyCode::Char(':') | KeyCode::Char('g') => {
                self.mode = Mode::Address(String::new());
                Command::None
            }
            KeyCode::Left | KeyCode::Char('b') => Command::Back,
            KeyCode::Right | KeyCode::Char('f') => Command::Forward,
            KeyCode::Down | KeyCode::Tab => {
                if count > 0 {
                    self.focus = (self.focus.min(count - 1) + 1) % count;
                }
                Command::None
            }
            KeyCode::Up | KeyCode::BackTab => {
                if count > 0 {
                    self.focus = (self.focus.min(count - 1) + count - 1) % count;
                }
                Command::None
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                let cells = surface.find(|w| matches!(w.kind, WidgetKind::Cell { .. }));
                match cells.get(index).and_then(|node| surface.action_of(*node)) {
                    Some(action) => Command::Dispatch(action),
                    None => Command::None,
                }
            }
            KeyCode::Enter => {
                let Some(node) = self.focused(&outline) else {
                    return Command::None;
                };
                match surface.widget(node).map(|w| w.kind) {
                    Some(WidgetKind::Input { .. }) => {
                        let buffer = surface.value_of(node).unwrap_or_default();
                        debug!(%node, "Editing field");
                        self.mode = Mode::Edit { node, buffer };
                        Command::None
                    }
                    Some(_) => surface
                        .action_of(node)
                        .map(Command::Dispatch)
                        .unwrap_or_default(),
                    None => Command::None,
                }
            }
            _ => Command::None,
        }
    }

    /// Puts focus back on the first widget, after a new screen appeared.
    pub fn reset_focus(&mut self) {
        self.focus = 0;
    }
}
