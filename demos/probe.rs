/*
 * Copyright 2024 Oxide Computer Company
 */

use anyhow::{bail, Context, Result};

use devscope::config::LoggingConfig;
use devscope::manufacturer::{ManufacturerLookup, OuiRegistry};
use devscope::vendor::walk_roots;
use devscope::{backend_for, Client, Snapshot, Vendor};

#[tokio::main]
async fn main() -> Result<()> {
    let opts = getopts::Options::new()
        .optopt("c", "", "community string", "COMMUNITY")
        .optopt("V", "", "vendor: openwrt, airos or cisco", "VENDOR")
        .optopt("m", "", "JSON map of OUI to manufacturer", "FILE")
        .optopt("s", "", "replay a JSON snapshot instead of polling", "FILE")
        .optopt("d", "", "save the prefetched values as a snapshot", "FILE")
        .optflag("n", "", "do not prefetch; issue one request per value")
        .optflag("v", "", "debug logging")
        .parsing_style(getopts::ParsingStyle::StopAtFirstFree)
        .parse(std::env::args_os().skip(1))?;

    devscope::logging::init_tracing(&LoggingConfig {
        level: if opts.opt_present("v") { "debug" } else { "warn" }.into(),
        ..Default::default()
    })?;

    let vendor: Vendor = match opts.opt_str("V") {
        Some(v) => serde_json::from_value(serde_json::Value::String(v.clone()))
            .with_context(|| format!("unknown vendor {v:?}"))?,
        None => Vendor::OpenWrt,
    };
    let backend = backend_for(vendor);

    let registry = opts.opt_str("m").map(OuiRegistry::load).transpose()?;
    let lookup = registry.as_ref().map(|r| r as &dyn ManufacturerLookup);

    let doc = if let Some(path) = opts.opt_str("s") {
        let snapshot = Snapshot::load(&path)?;
        backend.to_document(&snapshot, lookup, false).await?
    } else {
        if opts.free.len() != 1 {
            bail!("specify IP address of SNMP target");
        }

        let c = Client::builder()
            .community(opts.opt_str("c").as_deref().unwrap_or("public"))
            .build(opts.free[0].parse()?)
            .await?;

        if let Some(path) = opts.opt_str("d") {
            let snapshot = walk_roots(&c, &backend.profile().walk_roots).await?;
            std::fs::write(&path, snapshot.to_json()?)
                .with_context(|| format!("writing {path}"))?;
            eprintln!("saved {} values to {path}", snapshot.len());
            backend.to_document(&snapshot, lookup, false).await?
        } else {
            backend.to_document(&c, lookup, !opts.opt_present("n")).await?
        }
    };

    println!("{}", doc.to_json(true)?);

    Ok(())
}
