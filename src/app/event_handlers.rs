use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    clock::{format_hours, parse_hours},
    constants::SCHEDULE_SETTINGS,
    domain::next_palette_color,
    planner::{Intent, Outcome},
    storage::KeyValueStore,
};

use super::{App, InputMode, Tab, ui_helpers};

impl<S: KeyValueStore> App<S> {
    /// Returns `true` when the app should quit.
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        self.render_needed = true;

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.input == InputMode::Normal {
            self.handle_normal_key(key)
        } else {
            self.handle_input_key(key);
            false
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => {
                self.tab = self.tab.next();
                self.notice = None;
            }
            KeyCode::BackTab => {
                self.tab = self.tab.prev();
                self.notice = None;
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(true),
            _ => match self.tab {
                Tab::Schedule => self.handle_schedule_key(key),
                Tab::Todos => self.handle_todo_key(key),
                Tab::Presets => self.handle_preset_key(key),
            },
        }
        false
    }

    fn move_cursor(&mut self, forward: bool) {
        let state = self.planner.state();
        let (index, len) = match self.tab {
            Tab::Schedule => (&mut self.block_index, state.schedule.len()),
            Tab::Todos => (&mut self.todo_index, state.todos.len()),
            Tab::Presets => (&mut self.preset_index, state.presets.len()),
        };
        *index = if forward {
            ui_helpers::wrap_next_index(*index, len)
        } else {
            ui_helpers::wrap_prev_index(*index, len)
        };
    }

    fn handle_schedule_key(&mut self, key: KeyEvent) {
        let Some(block) = self.cursor_block().cloned() else {
            return;
        };

        match key.code {
            KeyCode::Enter => {
                self.planner.toggle_selection(&block.id);
            }
            KeyCode::Char('e') => self.input = InputMode::EditEnd(format_hours(block.end)),
            KeyCode::Char('r') => self.input = InputMode::Rename(block.name.clone()),
            KeyCode::Char('c') => {
                let mut recoloured = block.clone();
                recoloured.color = next_palette_color(&block.color).to_string();
                self.apply(Intent::UpdateBlock(recoloured));
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.set_cursor_end(block.end + SCHEDULE_SETTINGS.nudge_hours);
            }
            KeyCode::Char('-') => {
                self.set_cursor_end(block.end - SCHEDULE_SETTINGS.nudge_hours);
            }
            KeyCode::Char('s') => {
                if self.apply(Intent::SplitBlock(block.id.clone())) == Outcome::Unchanged {
                    self.notice = Some(format!("{} is too short to split", block.name));
                }
            }
            KeyCode::Char('x') => {
                self.apply(Intent::DeleteBlock(block.id.clone()));
            }
            _ => {}
        }
    }

    fn handle_todo_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('a') {
            self.input = InputMode::AddTodo(String::new());
            return;
        }

        let Some(todo) = self.planner.state().todos.items().get(self.todo_index).cloned() else {
            return;
        };
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.apply(Intent::ToggleTodo(todo.id));
            }
            KeyCode::Char('x') => {
                self.apply(Intent::DeleteTodo(todo.id));
            }
            _ => {}
        }
    }

    fn handle_preset_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('n') {
            self.input = InputMode::SavePreset(String::new());
            return;
        }

        let Some(preset) = self
            .planner
            .state()
            .presets
            .presets()
            .get(self.preset_index)
            .cloned()
        else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                if self.apply(Intent::LoadPreset(preset.id)) == Outcome::Applied {
                    self.notice = Some(format!("Loaded {}", preset.name));
                }
            }
            KeyCode::Char('x') => {
                self.apply(Intent::DeletePreset(preset.id));
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input = InputMode::Normal,
            KeyCode::Enter => {
                let submitted = std::mem::replace(&mut self.input, InputMode::Normal);
                self.submit_input(submitted);
            }
            KeyCode::Backspace => {
                if let Some(buf) = self.input.buffer_mut() {
                    buf.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buf) = self.input.buffer_mut() {
                    buf.push(c);
                }
            }
            _ => {}
        }
    }

    fn submit_input(&mut self, submitted: InputMode) {
        match submitted {
            InputMode::Normal => {}
            InputMode::EditEnd(raw) => match parse_hours(&raw) {
                Some(end) => self.set_cursor_end(end),
                None => self.notice = Some(format!("'{}' is not a time, use HH:MM", raw)),
            },
            InputMode::Rename(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return;
                }
                if let Some(mut renamed) = self.cursor_block().cloned() {
                    renamed.name = name.to_string();
                    self.apply(Intent::UpdateBlock(renamed));
                }
            }
            InputMode::AddTodo(text) => {
                if self.apply(Intent::AddTodo(text)) == Outcome::Applied {
                    self.todo_index = 0;
                }
            }
            InputMode::SavePreset(name) => {
                if self.apply(Intent::SavePreset(name.trim().to_string())) == Outcome::Applied {
                    self.preset_index = self.planner.state().presets.len().saturating_sub(1);
                }
            }
        }
    }
}
