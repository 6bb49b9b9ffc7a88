use std::{io, path::PathBuf};

use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{
    clock::{format_duration, format_hours, parse_hours},
    config::Config,
    domain::{Preset, PresetId, TimeBlock, Todo, TodoId, normalize_hex_color},
    planner::{Intent, Outcome, Planner, PlannerState},
    storage,
};

#[derive(Parser, Debug)]
#[command(name = "daypie")]
#[command(about = "A 24-hour pie planner with todos and presets", long_about = None)]
pub enum Cli {
    #[command(about = "Print the schedule, todo and preset summary")]
    Show,

    #[command(about = "Change a block's end, name or colour")]
    Edit {
        #[arg(help = "Block id or 1-based position")]
        block: String,

        #[arg(long, help = "New end time (HH:MM)")]
        end: Option<String>,

        #[arg(long, help = "New name")]
        name: Option<String>,

        #[arg(long, help = "New colour (#rrggbb)")]
        color: Option<String>,
    },

    #[command(about = "Split a block in half")]
    Split {
        #[arg(help = "Block id or 1-based position")]
        block: String,
    },

    #[command(about = "Delete a block and give its time to a neighbour")]
    Delete {
        #[arg(help = "Block id or 1-based position")]
        block: String,
    },

    #[command(about = "Show details of a block")]
    Select {
        #[arg(help = "Block id or 1-based position", required_unless_present = "clear")]
        block: Option<String>,

        #[arg(long, help = "Clear the selection", conflicts_with = "block")]
        clear: bool,
    },

    #[command(about = "Manage todos")]
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },

    #[command(about = "Manage schedule presets")]
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },

    #[command(about = "Export planner data")]
    Export {
        #[arg(long, value_enum, help = "Export format")]
        format: ExportFormat,

        #[arg(long, short, help = "Output path")]
        out: Option<PathBuf>,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TodoAction {
    #[command(about = "Add a todo")]
    Add {
        #[arg(required = true, num_args = 1.., help = "Todo text")]
        text: Vec<String>,
    },
    #[command(about = "Toggle a todo between open and done")]
    Toggle {
        #[arg(help = "Todo id or 1-based position")]
        todo: String,
    },
    #[command(about = "Delete a todo")]
    Delete {
        #[arg(help = "Todo id or 1-based position")]
        todo: String,
    },
    #[command(about = "List todos")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum PresetAction {
    #[command(about = "Save the current schedule as a preset")]
    Save {
        #[arg(required = true, num_args = 1.., help = "Preset name")]
        name: Vec<String>,
    },
    #[command(about = "Replace the current schedule with a preset")]
    Load {
        #[arg(help = "Preset id, name or 1-based position")]
        preset: String,
    },
    #[command(about = "Delete a preset")]
    Delete {
        #[arg(help = "Preset id, name or 1-based position")]
        preset: String,
    },
    #[command(about = "List presets")]
    List,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataExport {
    pub exported_at: DateTime<Utc>,
    pub schedule: Vec<TimeBlock>,
    pub todos: Vec<Todo>,
    pub presets: Vec<Preset>,
}

/// Finds an item by exact id, then by 1-based position.
fn resolve_ref<'a, T>(items: &'a [T], raw: &str, id_of: impl Fn(&T) -> &str) -> Option<&'a T> {
    let raw = raw.trim();
    items.iter().find(|item| id_of(item) == raw).or_else(|| {
        raw.parse::<usize>()
            .ok()
            .and_then(|pos| pos.checked_sub(1))
            .and_then(|idx| items.get(idx))
    })
}

fn resolve_block(state: &PlannerState, raw: &str) -> Result<TimeBlock, String> {
    resolve_ref(state.schedule.blocks(), raw, |b| b.id.as_str())
        .cloned()
        .ok_or_else(|| format!("Block '{}' not found", raw))
}

fn resolve_todo(state: &PlannerState, raw: &str) -> Result<TodoId, String> {
    resolve_ref(state.todos.items(), raw, |t| t.id.as_str())
        .map(|todo| todo.id.clone())
        .ok_or_else(|| format!("Todo '{}' not found", raw))
}

fn resolve_preset(state: &PlannerState, raw: &str) -> Result<PresetId, String> {
    let presets = state.presets.presets();
    resolve_ref(presets, raw, |p| p.id.as_str())
        .or_else(|| presets.iter().find(|p| p.name == raw.trim()))
        .map(|preset| preset.id.clone())
        .ok_or_else(|| format!("Preset '{}' not found", raw))
}

fn report_outcome(outcome: Outcome, applied: &str) {
    match outcome {
        Outcome::Applied => println!("{}", applied),
        Outcome::Unchanged => println!("Nothing changed"),
        Outcome::Refused(notice) => println!("Refused: {}", notice),
    }
}

fn schedule_row(position: usize, block: &TimeBlock, selected: bool) -> String {
    format!(
        "{}{:>2}  {}  {}  {:>6}  {:20} {}  {}",
        if selected { "*" } else { " " },
        position,
        format_hours(block.start),
        format_hours(block.end),
        format_duration(block.duration()),
        block.name,
        block.color,
        block.id
    )
}

pub fn show(planner: &Planner<impl storage::KeyValueStore>) {
    let state = planner.state();

    println!("Schedule");
    println!("{}", "-".repeat(60));
    for (idx, block) in state.schedule.blocks().iter().enumerate() {
        let selected = state.selected.as_ref() == Some(&block.id);
        println!("{}", schedule_row(idx + 1, block, selected));
    }
    println!("{}", "-".repeat(60));
    println!(
        "Todos: {} open / {} total",
        state.todos.open_count(),
        state.todos.len()
    );
    println!("Presets: {}", state.presets.len());
    println!(
        "Minimum slice {}, minimum split {}",
        format_duration(planner.rules().min_slice_hours),
        format_duration(planner.rules().min_split_hours)
    );
}

pub fn edit_block(
    planner: &mut Planner<impl storage::KeyValueStore>,
    raw_block: &str,
    end: Option<String>,
    name: Option<String>,
    color: Option<String>,
) -> Result<(), String> {
    let mut block = resolve_block(planner.state(), raw_block)?;

    let requested_end = match end {
        Some(raw) => {
            Some(parse_hours(&raw).ok_or_else(|| format!("Invalid time '{}', use HH:MM", raw))?)
        }
        None => None,
    };
    if let Some(end) = requested_end {
        block.end = end;
    }
    if let Some(name) = name {
        block.name = name;
    }
    if let Some(raw) = color {
        block.color =
            normalize_hex_color(&raw).ok_or_else(|| format!("Invalid colour '{}'", raw))?;
    }

    let id = block.id.clone();
    let outcome = planner.dispatch(Intent::UpdateBlock(block));
    report_outcome(outcome, &format!("Updated block {}", id));

    if let (Some(requested), Some(updated)) = (requested_end, planner.state().schedule.find(&id))
    {
        if updated.end != requested {
            println!("End adjusted to {}", format_hours(updated.end));
        }
    }
    Ok(())
}

pub fn split_block(
    planner: &mut Planner<impl storage::KeyValueStore>,
    raw_block: &str,
) -> Result<(), String> {
    let block = resolve_block(planner.state(), raw_block)?;
    let outcome = planner.dispatch(Intent::SplitBlock(block.id.clone()));
    if outcome == Outcome::Unchanged {
        println!(
            "Block {} is shorter than {} and cannot be split",
            block.id,
            format_duration(planner.rules().min_split_hours)
        );
    } else {
        report_outcome(outcome, &format!("Split block {}", block.id));
    }
    Ok(())
}

pub fn delete_block(
    planner: &mut Planner<impl storage::KeyValueStore>,
    raw_block: &str,
) -> Result<(), String> {
    let block = resolve_block(planner.state(), raw_block)?;
    let outcome = planner.dispatch(Intent::DeleteBlock(block.id.clone()));
    report_outcome(outcome, &format!("Deleted block {} ({})", block.id, block.name));
    Ok(())
}

pub fn select_block(
    planner: &mut Planner<impl storage::KeyValueStore>,
    raw_block: Option<String>,
) -> Result<(), String> {
    let Some(raw) = raw_block else {
        planner.dispatch(Intent::SelectItem(None));
        println!("Selection cleared");
        return Ok(());
    };

    let block = resolve_block(planner.state(), &raw)?;
    planner.dispatch(Intent::SelectItem(Some(block.id.clone())));
    if let Some(selected) = planner.state().selected_block() {
        let position = planner.state().schedule.index_of(&selected.id).unwrap_or(0) + 1;
        println!("{}", schedule_row(position, selected, true));
    }
    Ok(())
}

pub fn todo_command(
    planner: &mut Planner<impl storage::KeyValueStore>,
    action: TodoAction,
) -> Result<(), String> {
    match action {
        TodoAction::Add { text } => {
            let text = text.join(" ");
            let outcome = planner.dispatch(Intent::AddTodo(text.clone()));
            report_outcome(outcome, &format!("Added '{}'", text));
        }
        TodoAction::Toggle { todo } => {
            let id = resolve_todo(planner.state(), &todo)?;
            let outcome = planner.dispatch(Intent::ToggleTodo(id.clone()));
            report_outcome(outcome, &format!("Toggled {}", id));
        }
        TodoAction::Delete { todo } => {
            let id = resolve_todo(planner.state(), &todo)?;
            let outcome = planner.dispatch(Intent::DeleteTodo(id.clone()));
            report_outcome(outcome, &format!("Deleted {}", id));
        }
        TodoAction::List => {
            let todos = &planner.state().todos;
            if todos.is_empty() {
                println!("No todos");
            }
            for (idx, todo) in todos.items().iter().enumerate() {
                println!(
                    "{:>2}. [{}] {}  ({})",
                    idx + 1,
                    if todo.completed { "x" } else { " " },
                    todo.text,
                    todo.id
                );
            }
        }
    }
    Ok(())
}

pub fn preset_command(
    planner: &mut Planner<impl storage::KeyValueStore>,
    action: PresetAction,
) -> Result<(), String> {
    match action {
        PresetAction::Save { name } => {
            let name = name.join(" ");
            let outcome = planner.dispatch(Intent::SavePreset(name.clone()));
            report_outcome(outcome, &format!("Saved preset '{}'", name));
        }
        PresetAction::Load { preset } => {
            let id = resolve_preset(planner.state(), &preset)?;
            let outcome = planner.dispatch(Intent::LoadPreset(id.clone()));
            report_outcome(outcome, &format!("Loaded preset {}", id));
        }
        PresetAction::Delete { preset } => {
            let id = resolve_preset(planner.state(), &preset)?;
            let outcome = planner.dispatch(Intent::DeletePreset(id.clone()));
            report_outcome(outcome, &format!("Deleted preset {}", id));
        }
        PresetAction::List => {
            for (idx, preset) in planner.state().presets.presets().iter().enumerate() {
                println!(
                    "{:>2}. {:20} {} blocks  ({}){}",
                    idx + 1,
                    preset.name,
                    preset.schedule.len(),
                    preset.id,
                    if preset.id.is_protected() { " [protected]" } else { "" }
                );
            }
        }
    }
    Ok(())
}

pub fn export_data(
    planner: &Planner<impl storage::KeyValueStore>,
    format: ExportFormat,
    out_path: Option<PathBuf>,
) -> Result<(), String> {
    let state = planner.state();

    let content = match format {
        ExportFormat::Json => {
            let export = DataExport {
                exported_at: Utc::now(),
                schedule: state.schedule.to_blocks(),
                todos: state.todos.items().to_vec(),
                presets: state.presets.presets().to_vec(),
            };
            serde_json::to_string_pretty(&export).map_err(|e| e.to_string())?
        }
        ExportFormat::Csv => {
            storage::schedule_to_csv(state.schedule.blocks()).map_err(|e| e.to_string())?
        }
    };

    if let Some(path) = out_path {
        storage::write_text_file(&path, &content).map_err(|e| e.to_string())?;
        println!("Exported to {}", path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

pub fn print_completions(shell: &str) -> Result<(), String> {
    use clap_complete::Shell;
    let shell = match shell {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        _ => {
            return Err(format!(
                "Unsupported shell: {}. Use bash, zsh, or fish.",
                shell
            ));
        }
    };
    clap_complete::generate(shell, &mut Cli::command(), "daypie", &mut io::stdout());
    Ok(())
}

fn execute(cli: Cli, config: &Config) -> Result<(), String> {
    if let Cli::Completions { shell } = &cli {
        return print_completions(shell);
    }

    let mut planner = Planner::open_from_config(config);
    match cli {
        Cli::Show => {
            show(&planner);
            Ok(())
        }
        Cli::Edit {
            block,
            end,
            name,
            color,
        } => edit_block(&mut planner, &block, end, name, color),
        Cli::Split { block } => split_block(&mut planner, &block),
        Cli::Delete { block } => delete_block(&mut planner, &block),
        Cli::Select { block, clear } => {
            select_block(&mut planner, if clear { None } else { block })
        }
        Cli::Todo { action } => todo_command(&mut planner, action),
        Cli::Preset { action } => preset_command(&mut planner, action),
        Cli::Export { format, out } => export_data(&planner, format, out),
        Cli::Completions { .. } => Ok(()),
    }
}

pub fn run_cli(config: &Config) {
    let cli = Cli::parse();
    if let Err(e) = execute(cli, config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
