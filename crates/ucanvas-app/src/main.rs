//! Main application entry point.

use clap::{Parser, Subcommand};
use kurbo::Size;
use std::path::PathBuf;
use ucanvas_app::{App, AppResult};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory canvases are stored in.
    #[arg(long, env = "UCANVAS_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize the stored canvas.
    Info,
    /// Print or write the canvas as flat point lists.
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Apply a recorded JSON event log to the stored canvas.
    Replay {
        events: PathBuf,
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 600.0)]
        height: f64,
    },
    /// Remove everything from the stored canvas.
    Clear,
}

fn run(args: Args) -> AppResult<()> {
    let config = App::load_config(args.config.as_deref())?;
    let app = App::new(args.data_dir, config)?;

    match args.command {
        Command::Info => println!("{}", app.info()?),
        Command::Export { output } => {
            let json = app.export()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    log::info!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Replay { events, width, height } => {
            let steps = App::parse_steps(&std::fs::read_to_string(&events)?)?;
            let summary = app.replay(&steps, Size::new(width, height))?;
            println!(
                "replayed {} step(s): {} primitive(s), {} draw command(s)",
                summary.steps, summary.primitives, summary.draw_commands
            );
        }
        Command::Clear => {
            app.clear()?;
            println!("cleared '{}'", app.config().document_key);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Starting uCanvas");

    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
