mod actions;
mod args;
mod commands;
mod config;
mod editor;
mod history_panel;
mod session;

use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = args::Args::parse();
    let config = config::load_or_default(&args.config);
    let mut editor = editor::Editor::new(&config, !args.no_examples);

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let result = match &args.script {
        Some(path) => match File::open(path) {
            Ok(file) => {
                log::info!("Running script {}", path.display());
                editor.run(BufReader::new(file), &mut stdout)
            }
            Err(e) => {
                log::error!("Failed to open {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => editor.run(io::stdin().lock(), &mut stdout),
    };

    if let Err(e) = result {
        log::error!("I/O error: {e}");
        return ExitCode::FAILURE;
    }
    log::info!("Session has {} shader(s)", editor.session().len());
    if editor.history().has_unsaved_changes() {
        log::info!("Exiting with unsaved changes");
    }
    ExitCode::SUCCESS
}
