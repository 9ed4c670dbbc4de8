//! hostblock: drop HTTP requests to blocklisted hosts
//!
//! Loads a site list, binds an NFQUEUE and issues a verdict for every
//! packet the firewall diverts to it.

mod cli;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use hostblock_filter::{HostnameSet, VerdictEngine};
use hostblock_queue::{PacketQueue, driver, open_queue};
use settings::Settings;
use std::convert::Infallible;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Use mimalloc as the global allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    let args = Args::parse();

    let Some(site_list) = args.site_list.clone() else {
        usage();
        return ExitCode::SUCCESS;
    };

    match run(&args, &site_list) {
        Ok(never) => match never {},
        Err(e) => {
            eprintln!("hostblock: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn usage() {
    println!("syntax : hostblock <site list file>");
    println!("sample : hostblock top-1m.txt");
}

fn run(args: &Args, site_list: &Path) -> Result<Infallible> {
    let settings = Settings::resolve(args).context("failed to load settings")?;
    init_tracing(settings.log_level())?;

    info!("hostblock starting...");

    // The site list is read before any netlink socket exists
    let hostnames = HostnameSet::from_path(site_list).context("failed to load site list")?;
    let engine = VerdictEngine::from(hostnames);

    let mut queue = open_queue(&settings.queue).context("failed to set up packet interception")?;
    info!(
        "Waiting for packets on queue {} ({} blocked hostnames)",
        settings.queue.queue_num,
        engine.hostnames().len()
    );

    let result = driver::run(&mut queue, &engine);
    info!("Queue stats: {}", queue.stats().snapshot());
    result.context("packet queue failed")
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?,
    };

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}
