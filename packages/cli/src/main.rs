//! Process entry point: owns configuration, the database pool, and the
//! provider client, and wires them into the pipeline components.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gemini_client::GeminiClient;
use ingestion::{
    decompose, score_distribution, sources, ArticleStore, EntityKind, GeminiSentimentProvider,
    PostgresStore, SentimentAnalyzer,
};

use config::Config;

#[derive(Parser)]
#[command(name = "presswatch")]
#[command(about = "Media sentiment ingestion and analysis pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and seed the configured media sources
    Seed,

    /// Analyze a media's article backlog and decompose the results
    Analyze {
        #[arg(long)]
        media_id: i32,

        /// Include paywalled articles in the backlog
        #[arg(long)]
        include_paywalled: bool,

        /// Override the provider model
        #[arg(long)]
        model: Option<String>,
    },

    /// Re-run decomposition over already-stored raw results
    Decompose {
        #[arg(long)]
        media_id: i32,

        /// Model whose raw results to decompose
        #[arg(long, default_value = gemini_client::DEFAULT_MODEL)]
        model: String,
    },

    /// Print the sentiment score distribution for a media
    Stats {
        #[arg(long)]
        media_id: i32,

        #[arg(long, value_enum, default_value = "party")]
        kind: EntityKindArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EntityKindArg {
    Party,
    Politician,
}

impl From<EntityKindArg> for EntityKind {
    fn from(kind: EntityKindArg) -> Self {
        match kind {
            EntityKindArg::Party => EntityKind::Party,
            EntityKindArg::Politician => EntityKind::Politician,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    let store = PostgresStore::from_pool(pool)
        .await
        .context("Failed to prepare database schema")?;

    match cli.command {
        Commands::Seed => seed(&store).await,
        Commands::Analyze {
            media_id,
            include_paywalled,
            model,
        } => analyze(&store, &config, media_id, include_paywalled, model).await,
        Commands::Decompose { media_id, model } => {
            decompose_backlog(&store, media_id, &model).await
        }
        Commands::Stats { media_id, kind } => stats(&store, media_id, kind.into()).await,
    }
}

async fn seed(store: &PostgresStore) -> Result<()> {
    for (media, editors) in sources::seed_media() {
        info!(media_id = media.id, title = %media.title, "seeding media");
        store
            .upsert_media(&media, &editors)
            .await
            .with_context(|| format!("Failed to seed media {}", media.id))?;
    }
    println!("Seeded {} media sources", sources::seed_media().len());
    Ok(())
}

async fn analyze(
    store: &PostgresStore,
    config: &Config,
    media_id: i32,
    include_paywalled: bool,
    model: Option<String>,
) -> Result<()> {
    // Fail fast on configuration problems before touching the backlog
    let api_key = config.require_gemini_api_key()?;
    let catalog = sources::seed_prompt_catalog();
    catalog
        .resolve(media_id)
        .context("No prompt template for this media")?;

    let mut client = GeminiClient::new(api_key);
    if let Some(model) = model {
        client = client.with_model(model);
    }
    let provider = GeminiSentimentProvider::new(client);
    let model_name = provider.model_name().to_string();

    let articles = store
        .list_articles_for_analysis(media_id, include_paywalled)
        .await?;
    println!("Articles to analyze: {}", articles.len());

    let analyzer = SentimentAnalyzer::new(store, &provider, model_name, catalog);
    let outcome = analyzer.analyze_backlog(&articles).await?;

    println!(
        "Backlog finished: {} decomposed, {} skipped, {} rewritten, {} failed",
        outcome.decomposed, outcome.skipped, outcome.rewritten, outcome.failed
    );
    Ok(())
}

async fn decompose_backlog(store: &PostgresStore, media_id: i32, model: &str) -> Result<()> {
    let articles = store.list_articles_for_analysis(media_id, true).await?;

    let mut decomposed = 0usize;
    let mut missing = 0usize;
    let mut failed = 0usize;

    for article in &articles {
        match store.get_analysis(article.id, model).await? {
            Some(analysis) => match decompose(store, &analysis).await {
                Ok(_) => decomposed += 1,
                Err(e) => {
                    tracing::warn!(
                        article_id = article.id,
                        error = %e,
                        "decomposition failed"
                    );
                    failed += 1;
                }
            },
            None => missing += 1,
        }
    }

    println!(
        "Decomposed {decomposed} results ({missing} articles not yet analyzed, {failed} failed)"
    );
    Ok(())
}

async fn stats(store: &PostgresStore, media_id: i32, kind: EntityKind) -> Result<()> {
    let rows = store.list_entity_analyses(kind, media_id).await?;
    let distribution = score_distribution(&rows);

    println!("{kind} sentiment distribution for media {media_id}:");
    for (score, count) in &distribution.buckets {
        println!("  {score:>2}: {count}");
    }
    println!(
        "  {} scored rows, {} dropped as invalid",
        distribution.total(),
        distribution.dropped
    );
    Ok(())
}
