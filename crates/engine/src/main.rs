//! MindSpark Engine - command line entry point.
//!
//! ```text
//! mindspark-engine catalog
//! mindspark-engine open <player-id> [tome]
//! mindspark-engine wallet <player-id>
//! mindspark-engine grant <player-id> <amount>
//! mindspark-engine collection <player-id>
//! ```

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mindspark_domain::PlayerId;
use mindspark_engine::app::{App, Repositories};
use mindspark_engine::infrastructure::{
    card_content::LlmCardContentProvider,
    clock::{SeededRandom, SystemClock, SystemRandom},
    ollama::OllamaClient,
    ports::{ClockPort, RandomPort},
    settings::EngineConfig,
    sqlite::SqliteStore,
};
use mindspark_engine::use_cases::PackError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindspark_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();
    tracing::info!(
        database = %config.database_url,
        ollama = %config.ollama_base_url,
        model = %config.ollama_model,
        starting_balance = config.starting_balance,
        pity_threshold = config.pity.threshold,
        seeded = config.rng_seed.is_some(),
        "Starting MindSpark Engine"
    );

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    let random: Arc<dyn RandomPort> = match config.rng_seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(SystemRandom::new()),
    };

    let store = if config.database_url == ":memory:" {
        SqliteStore::in_memory(clock.clone()).await?
    } else {
        SqliteStore::new(&config.database_url, clock.clone()).await?
    };

    let ollama = match config.ollama_timeout_secs {
        Some(secs) => OllamaClient::with_timeout(&config.ollama_base_url, &config.ollama_model, secs),
        None => OllamaClient::new(&config.ollama_base_url, &config.ollama_model),
    };
    tracing::debug!(model = ollama.model(), "Ollama client ready");
    let content = Arc::new(LlmCardContentProvider::new(Arc::new(ollama)));

    let app = App::new(
        &config,
        Repositories::from_store(Arc::new(store)),
        content,
        random,
        clock,
    )?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    run(&app, &args).await
}

async fn run(app: &App, args: &[String]) -> anyhow::Result<()> {
    let command = args.first().map(String::as_str).unwrap_or("catalog");
    match command {
        "catalog" => {
            print_json(&app.use_cases.packs.ops.catalog())?;
        }
        "open" => {
            let player_id = player_arg(args)?;
            let tome = args.get(2).map(String::as_str).unwrap_or("standard");
            match app.use_cases.packs.open.execute(player_id, tome).await {
                Ok(opening) => {
                    for failure in &opening.failures {
                        eprintln!("{}", failure);
                    }
                    print_json(&opening.cards)?;
                }
                Err(PackError::PityStateConflict { cards, .. }) => {
                    eprintln!("Pity changed concurrently; cards were delivered, retry to continue");
                    print_json(&cards)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        "wallet" => {
            let wallet = app.use_cases.wallet.ops.get_wallet(player_arg(args)?).await?;
            print_json(&wallet)?;
        }
        "grant" => {
            let player_id = player_arg(args)?;
            let amount: u64 = args
                .get(2)
                .context("grant needs an amount")?
                .parse()
                .context("amount must be a non-negative integer")?;
            let wallet = app.use_cases.wallet.ops.grant(player_id, amount).await?;
            print_json(&wallet)?;
        }
        "collection" => {
            let cards = app
                .use_cases
                .collection
                .ops
                .list_cards(player_arg(args)?)
                .await?;
            print_json(&cards)?;
        }
        other => bail!(
            "unknown command '{}' (expected catalog, open, wallet, grant or collection)",
            other
        ),
    }
    Ok(())
}

fn player_arg(args: &[String]) -> anyhow::Result<PlayerId> {
    let raw = args.get(1).context("missing player id")?;
    Ok(raw.parse()?)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
