/*
 * The stdio host. Runs the backend without a window: every line on stdin is one
 * message from the UI, and every message for the UI is written as one line to
 * stdout. Log output goes to stderr and to `veritnote.log` in the settings folder.
 *
 * Useful for driving the backend from a test harness or a web view shell written in
 * another toolkit.
 */
use clap::Parser;
use serde_json::json;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use veritnote_backend::app_logic::Backend;
use veritnote_backend::core::path_utils::get_base_app_config_local_dir;
use veritnote_backend::core::{APP_NAME, ConfigManagerOperations, CoreConfigManager};
use veritnote_backend::platform_layer::desktop::{DesktopAdapter, HeadlessHost};

const LOG_FILE_NAME: &str = "veritnote.log";

#[derive(Parser)]
#[command(name = "veritnote_host")]
#[command(about = "VeritNote backend over stdin/stdout, one JSON message per line")]
#[command(version)]
struct Cli {
    /// Folder holding the bundled resources, laid out by virtual path
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Workspace to open at startup instead of the dashboard
    #[arg(long)]
    workspace: Option<String>,

    /// Log debug output to the terminal in release builds too
    #[arg(short, long)]
    verbose: bool,
}

fn initialize_logging(verbose: bool) {
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let config = ConfigBuilder::new().set_time_offset(offset).build();
    let terminal_level = if verbose || cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        terminal_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(dir) = get_base_app_config_local_dir(APP_NAME) {
        match File::create(dir.join(LOG_FILE_NAME)) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)),
            Err(e) => eprintln!("Could not create log file in {dir:?}: {e}"),
        }
    }
    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Logger already initialized: {e}");
    }
}

// The last workspace is only offered again if it still exists.
fn remembered_workspace(config_manager: &dyn ConfigManagerOperations) -> Option<String> {
    match config_manager.load_last_workspace_path(APP_NAME) {
        Ok(Some(path)) if Path::new(&path).is_dir() => Some(path),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Host: Could not read last workspace: {e}");
            None
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logging(cli.verbose);
    log::info!("Host: Starting {APP_NAME} stdio host");

    let config_manager = Arc::new(CoreConfigManager::new());
    let host = Arc::new(HeadlessHost::stdout(cli.assets.as_deref()));
    let adapter = Arc::new(DesktopAdapter::new(Box::new(host.clone())));
    let backend = Backend::new(adapter, config_manager.clone());

    match cli.workspace {
        Some(workspace) => {
            let open = json!({ "action": "openWorkspace", "payload": { "path": workspace } });
            backend.handle_message(&open.to_string());
        }
        None => {
            let remembered = remembered_workspace(config_manager.as_ref());
            backend
                .session()
                .set_pending_workspace_path(remembered.as_deref());
            backend.on_ui_ready();
        }
    }

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Host: Failed to read stdin: {e}");
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        backend.handle_message(&line);
        if host.close_requested() {
            log::info!("Host: Close requested by the UI.");
            break;
        }
    }
    ExitCode::SUCCESS
}
