//! `sqlite-orm-demo` entry-point.
//!
//! Runs the demo once and prints the captured log, or the failure notice.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sqlite_orm_demo::{AppConfig, DemoApp, Screen};
use tracing::level_filters::LevelFilter;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "sqlite-orm-demo",
    about = "Exercise the SQLite object-mapping facade and show its log",
    version
)]
struct Cli {
    /// Directory for the database file and the captured log.
    #[arg(long, env = "ORM_DEMO_DATA_DIR", default_value = "orm-demo-data")]
    data_dir: PathBuf,

    /// Mapping file; the built-in mapping is used when omitted.
    #[arg(long, env = "ORM_DEMO_MAPPING")]
    mapping: Option<PathBuf>,

    /// Keep existing tables instead of recreating them.
    #[arg(long)]
    keep_schema: bool,

    /// Level of the captured log (error, warn, info, debug, trace).
    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = AppConfig::new(&cli.data_dir)
        .with_force_create_schema(!cli.keep_schema)
        .with_log_level(cli.log_level);
    if let Some(path) = &cli.mapping {
        config = config.with_mapping_file(path);
    }

    info!(data_dir = %cli.data_dir.display(), "running demo");
    let mut app = DemoApp::new(config);
    let code = match app.on_create() {
        Screen::Log(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Screen::Notice(notice) => {
            eprintln!("{notice}");
            ExitCode::FAILURE
        }
    };
    app.on_destroy();
    code
}
