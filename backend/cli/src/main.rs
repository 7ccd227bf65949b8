mod action_cmd;
mod compile_cmd;
mod input;
mod visible_cmd;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use tractstack_config::{config_dir, config_file_path, load_and_prepare, EngineConfig};

#[derive(Parser)]
#[command(name = "tractstack")]
#[command(about = "TractStack: compile content panes and evaluate belief-driven visibility")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $TRACTSTACK_CONFIG_DIR/config.yaml or ~/.tractstack/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a markdown pane into its flat node graph
    Compile(compile_cmd::CompileArgs),
    /// Resolve an action expression and simulate a click on it
    Action(action_cmd::ActionArgs),
    /// Decide pane visibility for a belief set
    Visible(visible_cmd::VisibleArgs),
}

async fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_file_path(&config_dir()),
    };
    load_and_prepare(&path).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).await?;

    tractstack_logging::init_logger(
        config.log_dir().map(Path::new),
        config.log_level(),
        config.log_json(),
    );
    debug!(home = config.home_slug(), "Configuration ready");

    let output = match cli.command {
        Commands::Compile(args) => compile_cmd::run(args, &config).await?,
        Commands::Action(args) => action_cmd::run(args, &config)?,
        Commands::Visible(args) => visible_cmd::run(args, &config).await?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
