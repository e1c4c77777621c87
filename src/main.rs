use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use egg_hatcher::config::{CommonConfig, ConfigArgs};
use egg_hatcher::refresh;
use egg_hatcher::server::config::ServerConfig;
use egg_hatcher::server::factory::ServerFactory;

/// Serve the tags and branches of a git checkout, and hatch eggs from them.
#[derive(Parser, Debug)]
#[command(author, version = env!("EGG_HATCHER_VERSION"), about)]
struct ServerArgs {
    /// Print server configuration data (JSON) and exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

async fn run(args: ServerArgs) -> Result<()> {
    let ps = args.config.build_path_set()?;
    let cfg: ServerConfig = ps.load_config("server", ServerConfig::default)?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }

    cfg.logs.init()?;
    info!(
        "Welcome to egg-hatcher, version {} ({})",
        env!("EGG_HATCHER_VERSION"),
        env!("EGG_HATCHER_BUILD_TYPE")
    );

    let factory = ServerFactory::new(cfg);
    let checkout = factory.build_checkout().await?;

    let forks = factory.build_forks()?;
    if let Err(e) = forks.refresh().await {
        warn!("Failed to list forks, only the upstream is served for now: {e:#}");
    }

    let intv_secs = factory.refresh_interval_secs();
    if intv_secs > 0 {
        let checkout = checkout.clone();
        let forks = forks.clone();
        tokio::spawn(async move { refresh::start_refresh(checkout, forks, intv_secs).await });
    }

    let ctx = factory.build_context(checkout, forks);
    let srv = factory.build_server(ctx);
    srv.run().await.context("run restful server")?;

    info!("Server exited by user");
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();
    if let Err(e) = run(args).await {
        error!("Error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
