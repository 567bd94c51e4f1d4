use anyhow::Context;
use ci_tools_core::probe::{path_probe, shell_probe};
use ci_tools_core::shutdown::shutdown_signal;
use ci_tools_core::PollConfig;
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Shell command that exits 0 once the condition holds
    #[arg(long, conflicts_with = "path", required_unless_present = "path")]
    pub command: Option<String>,

    /// File or directory whose existence is awaited
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Delay between probe attempts
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub interval: Duration,

    /// Total time budget before giving up
    #[arg(long, default_value = "5m", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Upper bound for a single run of --command
    #[arg(long, value_parser = humantime::parse_duration)]
    pub attempt_timeout: Option<Duration>,

    /// Sleep before the first probe (not counted against --timeout)
    #[arg(long, default_value = "0s", value_parser = humantime::parse_duration)]
    pub initial_delay: Duration,
}

pub fn run(cwd: &Path, args: WaitArgs) -> anyhow::Result<()> {
    let config = PollConfig::new(args.interval, args.timeout);
    config.validate()?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    rt.block_on(async move {
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        if !args.initial_delay.is_zero() {
            info!("sleeping for {}", humantime::format_duration(args.initial_delay));
            tokio::select! {
                _ = tokio::time::sleep(args.initial_delay) => {}
                _ = &mut shutdown => anyhow::bail!("interrupted during initial delay"),
            }
        }

        info!(
            "waiting at most {} (interval {})",
            humantime::format_duration(config.deadline),
            humantime::format_duration(config.interval)
        );

        let result = match (args.command, args.path) {
            (Some(command), _) => {
                let probe = shell_probe(command, cwd.to_path_buf(), args.attempt_timeout);
                config.wait_async(probe, shutdown).await
            }
            (None, Some(path)) => {
                let probe = path_probe(cwd.join(path));
                config.wait_async(probe, shutdown).await
            }
            (None, None) => anyhow::bail!("either --command or --path is required"),
        };
        result.context("while waiting for condition")?;

        println!("condition met");
        Ok::<(), anyhow::Error>(())
    })
}
