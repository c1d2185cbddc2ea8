/*
 * Copyright 2024 Oxide Computer Company
 */

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use devscope::config::{load_config, PollerConfig};
use devscope::poller::{load_registry, poll_all, PollResult};

#[tokio::main]
async fn main() -> Result<()> {
    let opts = getopts::Options::new()
        .optflag("j", "", "print every outcome as JSON")
        .parsing_style(getopts::ParsingStyle::StopAtFirstFree)
        .parse(std::env::args_os().skip(1))?;

    if opts.free.len() != 1 {
        bail!("specify a JSON5 configuration file");
    }

    let config: PollerConfig = load_config(&opts.free[0])?;
    devscope::logging::init_tracing(&config.logging)
        .context("initialising logging")?;

    let registry = load_registry(&config)?.map(Arc::new);
    let outcomes = poll_all(&config, registry).await;

    if opts.opt_present("j") {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    for o in &outcomes {
        match &o.result {
            PollResult::Document(doc) => println!(
                "{:<20} ok     {} interfaces, {} neighbours, uptime {}",
                o.device,
                doc.interfaces.len(),
                doc.neighbors.len(),
                doc.general
                    .uptime
                    .map(|u| format!("{u}s"))
                    .unwrap_or_else(|| "?".into()),
            ),
            PollResult::Error(e) => println!("{:<20} failed {e}", o.device),
        }
    }

    Ok(())
}
