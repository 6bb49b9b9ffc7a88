use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{
    clock::format_hours,
    config::Config,
    constants::TIME_SETTINGS,
    domain::TimeBlock,
    planner::{Intent, Outcome, Planner},
    storage::KeyValueStore,
};

mod event_handlers;
mod pie;
mod render_views;
mod ui_helpers;
mod view_style;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
    Schedule,
    Todos,
    Presets,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Schedule, Tab::Todos, Tab::Presets];

    fn title(self) -> &'static str {
        match self {
            Tab::Schedule => "Schedule",
            Tab::Todos => "Todo",
            Tab::Presets => "Presets",
        }
    }

    fn position(self) -> usize {
        Tab::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        Tab::ALL[ui_helpers::wrap_next_index(self.position(), Tab::ALL.len())]
    }

    fn prev(self) -> Tab {
        Tab::ALL[ui_helpers::wrap_prev_index(self.position(), Tab::ALL.len())]
    }
}

/// Line-editing prompts. Each variant owns the text typed so far.
#[derive(Clone, Debug, PartialEq, Eq)]
enum InputMode {
    Normal,
    EditEnd(String),
    Rename(String),
    AddTodo(String),
    SavePreset(String),
}

impl InputMode {
    fn prompt(&self) -> Option<(&'static str, &str)> {
        match self {
            InputMode::Normal => None,
            InputMode::EditEnd(buf) => Some(("End (HH:MM)", buf)),
            InputMode::Rename(buf) => Some(("Name", buf)),
            InputMode::AddTodo(buf) => Some(("New todo", buf)),
            InputMode::SavePreset(buf) => Some(("Preset name", buf)),
        }
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match self {
            InputMode::Normal => None,
            InputMode::EditEnd(buf)
            | InputMode::Rename(buf)
            | InputMode::AddTodo(buf)
            | InputMode::SavePreset(buf) => Some(buf),
        }
    }
}

struct App<S: KeyValueStore> {
    planner: Planner<S>,
    tab: Tab,
    input: InputMode,
    block_index: usize,
    todo_index: usize,
    preset_index: usize,
    notice: Option<String>,
    render_needed: bool,
}

impl<S: KeyValueStore> App<S> {
    fn new(planner: Planner<S>) -> Self {
        Self {
            planner,
            tab: Tab::Schedule,
            input: InputMode::Normal,
            block_index: 0,
            todo_index: 0,
            preset_index: 0,
            notice: None,
            render_needed: true,
        }
    }

    fn cursor_block(&self) -> Option<&TimeBlock> {
        self.planner.state().schedule.blocks().get(self.block_index)
    }

    /// Dispatches `intent` and turns a refusal into the footer notice.
    fn apply(&mut self, intent: Intent) -> Outcome {
        let outcome = self.planner.dispatch(intent);
        self.notice = match outcome {
            Outcome::Refused(notice) => Some(notice.to_string()),
            Outcome::Applied | Outcome::Unchanged => None,
        };
        self.clamp_indices();
        self.render_needed = true;
        outcome
    }

    fn clamp_indices(&mut self) {
        let state = self.planner.state();
        let clamp = |index: usize, len: usize| index.min(len.saturating_sub(1));
        self.block_index = clamp(self.block_index, state.schedule.len());
        self.todo_index = clamp(self.todo_index, state.todos.len());
        self.preset_index = clamp(self.preset_index, state.presets.len());
    }

    /// Moves the cursor block's end to `end`, reporting when the schedule
    /// adjusted it.
    fn set_cursor_end(&mut self, end: f64) {
        let Some(mut block) = self.cursor_block().cloned() else {
            return;
        };
        let id = block.id.clone();
        block.end = end;
        self.apply(Intent::UpdateBlock(block));

        if let Some(updated) = self.planner.state().schedule.find(&id) {
            if updated.end != end {
                self.notice = Some(format!("End adjusted to {}", format_hours(updated.end)));
            }
        }
    }
}

pub fn run_ui(config: &Config) -> Result<(), io::Error> {
    let planner = Planner::open_from_config(config);
    info!("opening planner in {}", planner.data_dir().display());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(planner);

    let poll_rate = Duration::from_millis(TIME_SETTINGS.poll_ms);
    let render_rate = Duration::from_millis(1000 / TIME_SETTINGS.target_fps);
    let mut last_render = Instant::now()
        .checked_sub(render_rate)
        .unwrap_or_else(Instant::now);

    let result = loop {
        if last_render.elapsed() >= render_rate && app.render_needed {
            if let Err(e) = terminal.draw(|f| app.draw_frame(f)) {
                break Err(e);
            }
            app.render_needed = false;
            last_render = Instant::now();
        }

        match event::poll(poll_rate) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if app.handle_key(key) {
                        break Ok(());
                    }
                }
                Ok(Event::Resize(_, _)) => app.render_needed = true,
                Ok(_) => {}
                Err(e) => break Err(e),
            },
            Ok(false) => {}
            Err(e) => break Err(e),
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
