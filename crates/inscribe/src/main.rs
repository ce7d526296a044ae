use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inscribe::cache::MemoryCacheStore;
use inscribe::config::Config;
use inscribe::mock_data;
use inscribe::models::{Career, DocumentType, Inscription, InscriptionStatus, Student};
use inscribe::storage::cached::{CachePolicy, CachingUnitOfWork, RepositoryCacheFactory};
use inscribe::storage::inmemory::InMemoryUnitOfWork;
use inscribe_core::cache::CacheStore;
use inscribe_core::query::{FilterMap, PageSpec, SortSpec};
use inscribe_core::storage::{Entity, UnitOfWork};

type DemoUnitOfWork = CachingUnitOfWork<InMemoryUnitOfWork, MemoryCacheStore>;

/// Inscribe - Read-through caching repositories for academic inscriptions
#[derive(Parser, Debug)]
#[command(name = "inscribe")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a query against the seeded demo data.
    Query(QueryArgs),

    /// Print which entity types are cached and for how long.
    Policy,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Entity table to query.
    #[arg(value_enum)]
    entity: EntityKind,

    /// Filter clause, `FIELD[@op]=VALUE`. May be repeated.
    #[arg(long, short, value_name = "KEY=VALUE", value_parser = parse_filter)]
    filter: Vec<(String, String)>,

    /// Field to sort by (defaults to the identifier).
    #[arg(long, short, default_value = "")]
    sort: String,

    /// Sort in descending order.
    #[arg(long)]
    desc: bool,

    /// Page number; enables paginated results.
    #[arg(long)]
    page: Option<i64>,

    /// Page size.
    #[arg(long)]
    size: Option<i64>,

    /// How many times to run the query.
    #[arg(long, default_value = "2", env = "INSCRIBE_REPEAT")]
    repeat: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EntityKind {
    Statuses,
    DocumentTypes,
    Careers,
    Students,
    Inscriptions,
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inscribe=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match cli.command {
        Command::Policy => {
            for (entity, ttl) in CachePolicy::reference_data().entries() {
                println!("{entity:<20} {} min", ttl.as_secs() / 60);
            }
            Ok(())
        }
        Command::Query(args) => {
            let cache = Arc::new(MemoryCacheStore::new(
                config.cache_max_entries,
                Some(config.cache_default_ttl()),
            ));
            let sweeper = cache.spawn_sweeper(config.cache_sweep_interval());

            let inner = InMemoryUnitOfWork::new();
            mock_data::seed(&inner).await;

            let factory = RepositoryCacheFactory::new(cache.clone(), CachePolicy::reference_data())
                .with_cooldown(config.cache_cooldown());
            let uow = CachingUnitOfWork::new(inner, factory);

            let result = match args.entity {
                EntityKind::Statuses => run_query::<InscriptionStatus>(&uow, &args).await,
                EntityKind::DocumentTypes => run_query::<DocumentType>(&uow, &args).await,
                EntityKind::Careers => run_query::<Career>(&uow, &args).await,
                EntityKind::Students => run_query::<Student>(&uow, &args).await,
                EntityKind::Inscriptions => run_query::<Inscription>(&uow, &args).await,
            };

            tracing::info!(entries = cache.len().await?, "Cache size after query");
            if let Some(handle) = sweeper {
                handle.abort();
            }
            result
        }
    }
}

async fn run_query<E: Entity>(uow: &DemoUnitOfWork, args: &QueryArgs) -> Result<()> {
    let repository = uow.repository::<E>();
    let filter: FilterMap = args.filter.iter().cloned().collect();
    let sort = SortSpec::new(args.sort.clone(), args.desc);
    let page = (args.page.is_some() || args.size.is_some())
        .then(|| PageSpec::new(args.page.unwrap_or(1), args.size.unwrap_or(0)));

    let mut output = serde_json::Value::Null;
    for run in 1..=args.repeat.max(1) {
        let started = Instant::now();
        output = match page {
            Some(page) => {
                serde_json::to_value(repository.get_all_with_pagination(&filter, &sort, page).await?)?
            }
            None => serde_json::to_value(repository.get_all_by(&filter, &sort, None).await?)?,
        };
        tracing::info!(
            entity = E::NAME,
            run,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Query finished"
        );
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
