//! Concurrent strategy execution under a global deadline.
//!
//! Strategies run at most `max_in_flight` at a time, each bounded by its own
//! timeout. Failures are collected as [`StrategyFailure`] values and never
//! abort the run. When the global deadline fires, whatever is still in flight
//! is dropped and the completed results are returned.

use super::models::{SearchStrategy, StrategyKind};
use crate::catalog_client::{Candidate, CatalogClient, CatalogError};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A strategy that contributed nothing, and why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("strategy '{query}' ({}) failed: {reason}", .kind.as_str())]
pub struct StrategyFailure {
    pub query: String,
    pub kind: StrategyKind,
    pub reason: FailureReason,
}

#[derive(Debug, Clone)]
pub struct StrategyResult {
    pub strategy: SearchStrategy,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub deadline: Duration,
    pub strategy_timeout: Duration,
    pub per_strategy_limit: usize,
    pub max_in_flight: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            deadline: Duration::from_millis(8000),
            strategy_timeout: Duration::from_millis(5000),
            per_strategy_limit: 15,
            max_in_flight: 3,
        }
    }
}

#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub results: Vec<StrategyResult>,
    pub failures: Vec<StrategyFailure>,
    /// Queries of every strategy that was started, in start order.
    pub executed: Vec<String>,
    /// The global deadline fired before the fan-out completed.
    pub timed_out: bool,
}

impl SearchOutcome {
    pub fn candidate_count(&self) -> usize {
        self.results.iter().map(|r| r.candidates.len()).sum()
    }
}

pub struct SearchOrchestrator {
    catalog: Arc<dyn CatalogClient>,
    settings: OrchestratorSettings,
}

impl SearchOrchestrator {
    pub fn new(catalog: Arc<dyn CatalogClient>, settings: OrchestratorSettings) -> Self {
        Self { catalog, settings }
    }

    /// Run `strategies` in order of priority until they are exhausted, the
    /// collected candidates reach `soft_target`, or the deadline fires.
    /// Strategies already started when the target is reached still finish.
    pub async fn execute(
        &self,
        strategies: &[SearchStrategy],
        soft_target: usize,
    ) -> SearchOutcome {
        let deadline = Instant::now() + self.settings.deadline;
        let max_in_flight = self.settings.max_in_flight.max(1);

        let mut pending: VecDeque<SearchStrategy> = strategies.iter().cloned().collect();
        let mut in_flight = FuturesUnordered::new();
        let mut outcome = SearchOutcome::default();
        let mut collected = 0;

        loop {
            while in_flight.len() < max_in_flight && collected < soft_target {
                let Some(strategy) = pending.pop_front() else {
                    break;
                };
                outcome.executed.push(strategy.query.clone());
                in_flight.push(self.run_strategy(strategy));
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    warn!(
                        "Search deadline of {:?} reached: {} in flight, {} not started",
                        self.settings.deadline,
                        in_flight.len(),
                        pending.len()
                    );
                    outcome.timed_out = true;
                    break;
                }
                Some((strategy, result)) = in_flight.next() => {
                    match result {
                        Ok(candidates) => {
                            debug!(
                                "Strategy '{}' returned {} candidates",
                                strategy.query,
                                candidates.len()
                            );
                            collected += candidates.len();
                            outcome.results.push(StrategyResult { strategy, candidates });
                        }
                        Err(reason) => {
                            let failure = StrategyFailure {
                                query: strategy.query,
                                kind: strategy.kind,
                                reason,
                            };
                            warn!("{}", failure);
                            outcome.failures.push(failure);
                        }
                    }
                }
            }
        }

        if !pending.is_empty() && !outcome.timed_out {
            debug!(
                "Collected {} candidates (target {}), skipping {} strategies",
                collected,
                soft_target,
                pending.len()
            );
        }
        outcome
    }

    async fn run_strategy(
        &self,
        strategy: SearchStrategy,
    ) -> (SearchStrategy, Result<Vec<Candidate>, FailureReason>) {
        let limit = self.settings.per_strategy_limit;
        let timeout = self.settings.strategy_timeout;
        let result =
            match tokio::time::timeout(timeout, self.catalog.search_tracks(&strategy.query, limit))
                .await
            {
                Ok(Ok(mut candidates)) => {
                    candidates.truncate(limit);
                    Ok(candidates)
                }
                Ok(Err(err)) => Err(FailureReason::Catalog(err)),
                Err(_) => Err(FailureReason::Timeout(timeout)),
            };
        (strategy, result)
    }
}
