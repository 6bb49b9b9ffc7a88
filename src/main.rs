mod app;
mod cli;
mod clock;
mod config;
mod constants;
mod domain;
mod error;
mod logging;
mod planner;
mod presets;
mod schedule;
mod storage;
mod todos;

use config::Config;

fn main() {
    let config = Config::load();

    if let Err(e) = logging::init_logging(&config.log_level, &storage::get_state_dir()) {
        eprintln!("Warning: file logging disabled: {}", e);
    }

    if std::env::args().len() > 1 {
        cli::run_cli(&config);
        return;
    }

    if let Err(e) = app::run_ui(&config) {
        log::error!("terminal UI failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
