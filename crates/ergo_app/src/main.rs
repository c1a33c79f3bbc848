use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ergo_app::config::{resolve_config, save_config, Cli, ConsoleConfig};
use ergo_link::{HealthProbe, ReqwestHealthProbe};
use ergo_logging::{ergo_info, ergo_warn};
use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, load_error) = resolve_config(&cli);
    ergo_logging::initialize(&config.log_destination(), LevelFilter::Info);
    if let Some(err) = load_error {
        ergo_warn!("Using default configuration: {}", err);
    }

    if cli.write_config {
        save_config(&cli.config, &config)
            .with_context(|| format!("writing {}", cli.config.display()))?;
        println!("Wrote {}", cli.config.display());
        return Ok(());
    }
    if cli.check {
        return check_health(&config);
    }

    ergo_info!("Starting console against {}", config.server_url);
    ergo_app::console::run(&config)
}

fn check_health(config: &ConsoleConfig) -> anyhow::Result<()> {
    let probe = ReqwestHealthProbe::new(
        &config.server_url,
        Duration::from_millis(config.connect_timeout_ms),
    )?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime
        .block_on(probe.probe())
        .with_context(|| format!("probing {}", config.server_url))?;
    println!(
        "backend {}: status={} sessions={}",
        config.server_url, report.status, report.sessions
    );
    if !report.is_ok() {
        anyhow::bail!("backend reported status `{}`", report.status);
    }
    Ok(())
}
