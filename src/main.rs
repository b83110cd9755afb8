// Demo driver for the client pool.
// Hammers a shared pool from concurrent workers and reports how many
// clients the factory had to create.

use clientpool::logging::init_logging;
use clientpool::{ClientPool, HttpClientConfig, PoolConfiguration, PoolResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

const WORKERS: usize = 32;
const ITERATIONS: usize = 1_000;

#[tokio::main]
async fn main() -> PoolResult<()> {
    let verbose = std::env::args().any(|arg| arg == "-v" || arg == "--verbose");
    init_logging(verbose);

    let config = PoolConfiguration::new()
        .with_initial_capacity(4)
        .with_max_capacity(16);
    let http_config = HttpClientConfig::new()
        .with_http1_only()
        .with_user_agent("clientpool-demo");
    let pool = Arc::new(ClientPool::for_http(config, http_config)?);

    let checkouts = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<_> = (0..WORKERS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let checkouts = Arc::clone(&checkouts);
            tokio::spawn(async move {
                for _ in 0..ITERATIONS {
                    let client = pool.get();
                    checkouts.fetch_add(1, Ordering::Relaxed);
                    tokio::task::yield_now().await;
                    pool.put(Some(client))?;
                }
                PoolResult::Ok(())
            })
        })
        .collect();

    for task in tasks {
        match task.await {
            Ok(result) => result?,
            Err(err) => tracing::error!("worker panicked: {}", err),
        }
    }

    info!(
        checkouts = checkouts.load(Ordering::Relaxed),
        resident = pool.len(),
        capacity = pool.capacity(),
        "run complete"
    );

    pool.shutdown();
    Ok(())
}
