//! Resilient Client Example
//!
//! A toy memory-service client whose calls go through retry and a shared
//! circuit breaker. Shows:
//! - Classifying transport failures with the error mapper
//! - Retrying transient failures with backoff and observing attempts
//! - Fast-failing on errors that retrying cannot fix
//! - The breaker opening, rejecting, and recovering
//!
//! Run with: cargo run --example resilient_client

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cognee_resilience::prelude::*;
use cognee_resilience::RetryEvent;

/// Pretends to be the HTTP layer: the first `flaky_calls` requests get a 503.
struct MemoryClient {
    breaker: Arc<CircuitBreaker>,
    strategy: RetryStrategy,
    requests: AtomicU32,
    flaky_calls: u32,
}

impl MemoryClient {
    fn new(breaker: Arc<CircuitBreaker>, flaky_calls: u32) -> Self {
        Self {
            breaker,
            strategy: RetryStrategy::default()
                .with_initial_delay(Duration::from_millis(50))
                .with_max_delay(Duration::from_millis(400)),
            requests: AtomicU32::new(0),
            flaky_calls,
        }
    }

    async fn send(&self, dataset: &str, query: &str) -> Result<Vec<String>, TransportError> {
        let n = self.requests.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        if n < self.flaky_calls {
            return Err(TransportError::Status {
                status: 503,
                body: r#"{"detail": "graph store warming up"}"#.to_string(),
            });
        }
        match dataset {
            "private" => Err(TransportError::Status {
                status: 403,
                body: String::new(),
            }),
            _ => Ok(vec![format!("{query}: Alan Turing"), format!("{query}: Enigma")]),
        }
    }

    async fn search(&self, dataset: &str, query: &str) -> Outcome<Vec<String>> {
        let ctx = &RequestContext::for_dataset(dataset).with_permission("read");
        with_retry_through(
            move || async move { into_outcome(self.send(dataset, query).await, ctx) },
            &self.strategy,
            &self.breaker,
        )
        .await
    }
}

async fn example_transient_recovery() {
    println!("\n=== Example 1: Transient Recovery ===");

    let client = MemoryClient::new(Arc::new(CircuitBreaker::default()), 2);
    match client.search("papers", "cryptography").await {
        Outcome::Success(nodes) => println!("  Found {} nodes: {:?}", nodes.len(), nodes),
        Outcome::Failure(err) => println!("  Failed: {err}"),
    }
    println!("  HTTP requests sent: {}", client.requests.load(Ordering::SeqCst));
}

async fn example_fast_fail() {
    println!("\n=== Example 2: Fast Fail ===");

    let client = MemoryClient::new(Arc::new(CircuitBreaker::default()), 0);
    if let Outcome::Failure(err) = client.search("private", "salaries").await {
        println!("  {} ({})", err, err.kind());
    }
    println!("  HTTP requests sent: {}", client.requests.load(Ordering::SeqCst));
}

async fn example_observed_retries() {
    println!("\n=== Example 3: Retry Hooks ===");

    let strategy = RetryStrategy::default().with_initial_delay(Duration::from_millis(20));
    let outcome: Outcome<()> = cognee_resilience::with_retry_hooks(
        || async { Outcome::failure(MemoryError::network(Some(504), "gateway timeout")) },
        &strategy,
        |event: &RetryEvent<'_>| {
            println!(
                "  attempt {} failed after {:?}: {} (next delay: {:?})",
                event.attempt, event.elapsed, event.error, event.next_delay
            );
        },
    )
    .await;
    println!("  Final: {:?}", outcome.is_failure());
}

async fn example_breaker_lifecycle() {
    println!("\n=== Example 4: Circuit Breaker ===");

    let breaker = Arc::new(CircuitBreaker::new(BreakerConfig::new(
        3,
        Duration::from_millis(300),
    )));
    let client = MemoryClient::new(Arc::clone(&breaker), 100);

    let outcome = client.search("papers", "outage").await;
    println!("  During outage: {:?}", outcome.failure_value().map(|e| e.to_string()));
    println!("  Breaker: {:?}", breaker.stats());

    let rejected = client.search("papers", "still down").await;
    if let Outcome::Failure(err) = rejected {
        println!("  Rejected without a request: {}", err.is_circuit_open());
    }

    tokio::time::sleep(Duration::from_millis(300)).await;
    let healthy = MemoryClient::new(Arc::clone(&breaker), 0);
    let outcome = healthy.search("papers", "recovered").await;
    println!("  After cooldown: success = {}", outcome.is_success());
    println!("  Breaker: {}", breaker.state());
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    example_transient_recovery().await;
    example_fast_fail().await;
    example_observed_retries().await;
    example_breaker_lifecycle().await;
}
