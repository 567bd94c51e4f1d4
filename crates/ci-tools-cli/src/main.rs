mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{detect_images::DetectImagesArgs, wait::WaitArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ci-tools",
    about = "CI/CD pipeline utilities: wait for conditions, detect images and index docs",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll a shell command or path until it succeeds or the timeout expires
    Wait(WaitArgs),

    /// Collect container images and write them into the security scanner config
    DetectImages(DetectImagesArgs),

    /// Regenerate the markdown index of a repository
    MarkdownIndex {
        /// Repository root (default: nearest ancestor with .git/)
        #[arg(long, env = "CI_TOOLS_ROOT")]
        root: Option<PathBuf>,

        /// Index file, relative to the root
        #[arg(long, default_value = ci_tools_core::markdown_index::INDEX_FILE)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG, when set, fully replaces the default level.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Wait(args) => std::env::current_dir()
            .map_err(anyhow::Error::from)
            .and_then(|cwd| cmd::wait::run(&cwd, args)),
        Commands::DetectImages(args) => cmd::detect_images::run(args, cli.json),
        Commands::MarkdownIndex { root, output } => {
            let root = root::resolve_root(root.as_deref());
            cmd::markdown_index::run(&root, &output, cli.json)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
