//! Vortex pipeline server
//!
//! Wires the store, clients, and engines together and runs the watcher,
//! autopilot, and publish-sweep loops until interrupted.

use clap::{Arg, Command};
use serde::Deserialize;
use std::sync::Arc;
use tokio::time::Duration;
use vortex_core::secrets::OPENAI_API_KEY;
use vortex_core::{
    Autopilot, EnvSecretProvider, LifecycleEngine, LifecycleWatcher, MemoryStore, OpenAiClient,
    ProductStore, SchedulingEngine, SecretProvider, ShopifyClient, VortexConfig,
};
use vortex_types::Product;

/// One product as it appears in a seed file: source attributes only, the
/// pipeline fills in the rest.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    title: String,
    description: String,
    category: String,
    price: f64,
    currency: String,
    images: Vec<String>,
    source_url: String,
    source_domain: String,
}

impl SeedProduct {
    fn into_draft(self) -> Product {
        Product::new_draft(
            self.title,
            self.description,
            self.category,
            self.price,
            self.currency,
            self.images,
            self.source_url,
            self.source_domain,
        )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("vortex-server")
        .version("1.0.0")
        .about("Vortex product pipeline server")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("FILE")
                .help("JSON file of products to ingest as drafts on startup"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Run a single poll, autopilot cycle, and sweep, then exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Load configuration
    let config = match matches.get_one::<String>("config") {
        Some(path) => {
            let config = VortexConfig::from_file(path)?;
            log::info!("Loaded configuration from {}", path);
            config
        }
        None => {
            log::info!("No config file given, using defaults");
            VortexConfig::default()
        }
    };

    let store = Arc::new(MemoryStore::new());
    let secrets = Arc::new(EnvSecretProvider);

    // The AI client is optional: without a key, enrichment and scheduling
    // stay disabled while the rest of the pipeline runs.
    let ai = match secrets.get(OPENAI_API_KEY).await {
        Ok(api_key) => {
            log::info!("AI content service enabled (model: {})", config.openai.model);
            Some(Arc::new(OpenAiClient::new(config.openai.clone(), api_key)))
        }
        Err(_) => {
            log::warn!(
                "{} not configured, enrichment and scheduling disabled",
                OPENAI_API_KEY
            );
            None
        }
    };

    let shopify = Arc::new(ShopifyClient::new(config.shopify.clone()));

    // Seed products
    if let Some(path) = matches.get_one::<String>("seed") {
        let count = seed_products(store.as_ref(), path).await?;
        log::info!("Seeded {} products from {}", count, path);
    }

    let lifecycle = Arc::new(LifecycleEngine::new(
        ai.clone(),
        shopify,
        secrets,
        store.clone(),
    ));

    let poll_interval = Duration::from_secs(config.engine.poll_interval_secs);
    let sweep_interval = Duration::from_secs(config.engine.sweep_interval_secs);

    let watcher = Arc::new(LifecycleWatcher::new(
        lifecycle.clone(),
        store.clone(),
        poll_interval,
    ));

    // The sweep needs no AI call, so the scheduler always runs; without a
    // key only planning is unavailable. The autopilot is AI-driven end to
    // end and stays off without one.
    let scheduler = Arc::new(SchedulingEngine::new(ai.clone(), store.clone()));
    let autopilot = ai.is_some().then(|| {
        Arc::new(Autopilot::new(
            lifecycle.clone(),
            scheduler.clone(),
            store.clone(),
            poll_interval,
        ))
    });

    if matches.get_flag("once") {
        log::info!("Single-pass mode");
        watcher.poll_once().await;
        // Handlers run on spawned tasks; give them a moment to drain
        tokio::time::sleep(Duration::from_secs(2)).await;
        if let Some(autopilot) = &autopilot {
            autopilot.run_cycle().await;
        }
        match scheduler.publish_due_posts().await {
            Ok(outcome) => log::info!(
                "Sweep done: {} checked, {} published",
                outcome.checked,
                outcome.published
            ),
            Err(e) => log::error!("Sweep failed: {}", e),
        }
        return Ok(());
    }

    log::info!("Starting pipeline loops");

    let watcher_handle = tokio::spawn(async move {
        watcher.start().await;
    });

    if let Some(autopilot) = autopilot {
        tokio::spawn(async move {
            autopilot.start().await;
        });
    }

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(sweep_interval).await;
            match scheduler.publish_due_posts().await {
                Ok(outcome) if outcome.published > 0 => log::info!(
                    "Sweep done: {} checked, {} published",
                    outcome.checked,
                    outcome.published
                ),
                Ok(_) => {}
                Err(e) => log::error!("Sweep failed: {}", e),
            }
        }
    });

    // The watcher loop never returns; exiting here means it panicked
    if let Err(e) = watcher_handle.await {
        log::error!("Lifecycle watcher task panicked: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn seed_products(
    store: &MemoryStore,
    path: &str,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let content = std::fs::read_to_string(path)?;
    let seeds: Vec<SeedProduct> = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse seed file: {}", e))?;

    let count = seeds.len();
    for seed in seeds {
        store.insert(seed.into_draft()).await?;
    }
    Ok(count)
}
