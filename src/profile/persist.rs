// src/profile/persist.rs
//! Ordered-strategy persistence
//!
//! A write that matters gets an ordered list of strategies (direct store
//! write first, REST endpoint second). The first success wins; when all
//! fail, every attempt is kept so the failure can be logged whole.

use futures::future::BoxFuture;
use tracing::{info, warn};

/// One failed strategy attempt
#[derive(Debug)]
pub struct Attempt {
    pub strategy: &'static str,
    pub error: String,
}

/// A named persistence strategy
pub type Strategy<'a, T> = (&'static str, BoxFuture<'a, anyhow::Result<T>>);

/// Try strategies in order, short-circuiting on the first success.
/// Returns the value and the name of the strategy that produced it, or
/// every failed attempt when none succeeded.
pub async fn try_in_order<T>(
    label: &str,
    strategies: Vec<Strategy<'_, T>>,
) -> Result<(T, &'static str), Vec<Attempt>> {
    let mut attempts = Vec::new();

    for (name, future) in strategies {
        match future.await {
            Ok(value) => {
                if !attempts.is_empty() {
                    info!(
                        operation = %label,
                        strategy = %name,
                        failed_attempts = attempts.len(),
                        "Fallback strategy succeeded"
                    );
                }
                return Ok((value, name));
            }
            Err(e) => {
                warn!(
                    operation = %label,
                    strategy = %name,
                    error = %e,
                    "Persistence strategy failed"
                );
                attempts.push(Attempt {
                    strategy: name,
                    error: e.to_string(),
                });
            }
        }
    }

    Err(attempts)
}
