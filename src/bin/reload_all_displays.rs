//! Operator tool: reload every display connected to any gateway instance.
//!
//! Publishes a delayed `reload` command to the `displays` group through the
//! shared Redis bus. Pass `--now` to skip the delay.
//!
//! ```text
//! REDIS_URL=redis://127.0.0.1/ reload_all_displays [--now]
//! ```

use anyhow::{Context, bail};

use signage_gateway::bus::{BusEvent, GroupBus};
use signage_gateway::domain::GroupName;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let delayed = !std::env::args().skip(1).any(|arg| arg == "--now");

    let Some(url) = std::env::var("REDIS_URL").ok().filter(|u| !u.trim().is_empty()) else {
        bail!("REDIS_URL must point at the bus shared with the gateway instances");
    };

    let bus = GroupBus::connect_redis(&url, 1)
        .await
        .with_context(|| format!("connecting to {url}"))?;
    let instances = bus
        .publish(&GroupName::all_displays(), &BusEvent::reload(delayed))
        .await
        .context("publishing reload")?;

    tracing::info!(delayed, instances, "reload sent to all displays");
    Ok(())
}
