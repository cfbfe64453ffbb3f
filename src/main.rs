//! Query Cache demo
//!
//! Fetches todos from a JSON API through the cache, once as a single query
//! and twice as a batch, to show cache population and hits.

use anyhow::Context;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use query_cache::{
    cache_key, BatchQueryExecutor, Cache, Config, Query, QueryError, QueryExecutor,
};

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
struct Todo {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    completed: bool,
}

/// Builds a query that GETs `{base}/{path}`.
fn todo_query(
    client: &reqwest::Client,
    base: &str,
    key: query_cache::CacheKey,
    path: String,
) -> Query<reqwest::Response> {
    let client = client.clone();
    let url = format!("{}/{}", base.trim_end_matches('/'), path);
    Query::new(key, move || {
        let request = client.get(&url);
        async move {
            let response = request.send().await?;
            Ok::<_, QueryError>(response)
        }
    })
}

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache (starts the background sweep)
/// 4. Run a single query, then the same batch twice
/// 5. Log cache statistics and exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "query_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Query Cache demo");

    let config = Config::from_env();
    info!(
        "Configuration loaded: clean_polling_interval={}ms, dedupe_in_flight={}, lifetime={}s, api={}",
        config.clean_polling_interval_ms,
        config.dedupe_in_flight,
        config.query_lifetime,
        config.api_base_url
    );

    let cache = Cache::new(config.cache_config()).context("failed to create cache")?;
    let client = reqwest::Client::new();

    // Single query
    let todos: QueryExecutor<Vec<Todo>, _> = QueryExecutor::new(
        cache.clone(),
        todo_query(&client, &config.api_base_url, "todos".into(), "todos".to_string()),
        config.query_options().immediate(false),
    )?;
    let state = todos.run().await;
    match (&state.data, &state.error) {
        (Some(data), _) => info!("Fetched {} todos", data.len()),
        (None, Some(error)) => info!("Todos query failed: {}", error),
        _ => {}
    }

    // Batch, twice: the second run is served from the cache
    let queries: Vec<_> = (1..=3)
        .map(|id| {
            todo_query(
                &client,
                &config.api_base_url,
                cache_key!["todos", id],
                format!("todos/{}", id),
            )
        })
        .collect();
    let batch: BatchQueryExecutor<Todo, _> =
        BatchQueryExecutor::new(cache.clone(), queries, config.batch_options().immediate(false))?;

    for round in 1..=2 {
        let state = batch.run().await;
        for todo in state.data.iter().flatten() {
            match todo {
                Some(todo) => info!("Round {}: #{} {}", round, todo.id, todo.title),
                None => info!("Round {}: unavailable", round),
            }
        }
        if let Some(error) = state.error {
            info!("Round {}: batch failed: {}", round, error);
        }
    }

    let stats = cache.stats().await;
    info!(
        "Cache stats: hits={}, misses={}, expired={}, entries={}, hit_rate={:.2}",
        stats.hits,
        stats.misses,
        stats.expired,
        stats.total_entries,
        stats.hit_rate()
    );

    info!("Demo complete");
    Ok(())
}
