//! Bounded, cancellable connection establishment.
//!
//! [`Bootstrapper`] probes the backing store until it answers, the attempt
//! budget runs out, or the caller's [`CancellationToken`] fires while it is
//! waiting between attempts. The wait is a `tokio::select!` over the retry
//! timer and the token, so a cancellation that arrives mid-wait is never
//! missed.
//!
//! [`connect`] wraps this for a PostgreSQL pool and hands back a
//! [`ConnectedPool`], the only value a
//! [`PgCredentialStore`](crate::store::PgCredentialStore) can be built from.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::DbPool;

/// Default number of probe attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay between failed probes.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Retry budget for [`Bootstrapper`].
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Total probes, including the first. `0` is treated as `1`.
    pub max_attempts: u32,
    /// Fixed wait after each failed probe except the last.
    pub delay: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// A liveness check against the backing store.
#[async_trait]
pub trait Probe: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn probe(&self) -> Result<(), Self::Error>;
}

#[async_trait]
impl Probe for DbPool {
    type Error = sqlx::Error;

    async fn probe(&self) -> Result<(), sqlx::Error> {
        crate::health_check(self).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Disconnected,
    /// Probe number `attempt` (1-based) is in flight or just failed.
    Probing { attempt: u32 },
    Connected,
    Failed,
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError<E: std::error::Error + 'static> {
    /// The cancellation token fired before the store answered.
    #[error("connection bootstrap cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },

    /// Every attempt failed. `last` is the final probe error; `earlier` holds
    /// the preceding ones in order.
    #[error("all {attempts} connection attempts failed: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: E,
        earlier: Vec<E>,
    },
}

pub struct Bootstrapper<P> {
    probe: P,
    config: BootstrapConfig,
    state: BootstrapState,
}

impl<P: Probe> Bootstrapper<P> {
    pub fn new(probe: P, config: BootstrapConfig) -> Self {
        Self {
            probe,
            config,
            state: BootstrapState::Disconnected,
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Drive the state machine to `Connected`, `Failed` or `Cancelled`.
    pub async fn run(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<(), BootstrapError<P::Error>> {
        let max_attempts = self.config.max_attempts.max(1);

        if cancel.is_cancelled() {
            self.state = BootstrapState::Cancelled;
            return Err(BootstrapError::Cancelled { attempts: 0 });
        }

        let mut earlier = Vec::new();
        let mut attempt = 1;
        loop {
            self.state = BootstrapState::Probing { attempt };

            let err = match self.probe.probe().await {
                Ok(()) => {
                    self.state = BootstrapState::Connected;
                    tracing::info!(attempt, "Connection to backing store established");
                    return Ok(());
                }
                Err(e) => e,
            };

            if attempt >= max_attempts {
                tracing::error!(
                    attempt,
                    max_attempts,
                    error = %err,
                    "All attempts expired, failed to connect to backing store",
                );
                self.state = BootstrapState::Failed;
                return Err(BootstrapError::Exhausted {
                    attempts: attempt,
                    last: err,
                    earlier,
                });
            }

            tracing::warn!(
                attempt,
                max_attempts,
                delay_ms = self.config.delay.as_millis() as u64,
                error = %err,
                "Backing store probe failed, retrying",
            );
            earlier.push(err);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!(attempt, "Bootstrap cancelled, stopping retries");
                    self.state = BootstrapState::Cancelled;
                    return Err(BootstrapError::Cancelled { attempts: attempt });
                }
                _ = tokio::time::sleep(self.config.delay) => {}
            }

            attempt += 1;
        }
    }

    pub fn into_probe(self) -> P {
        self.probe
    }
}

/// A pool that has answered at least one liveness probe.
#[derive(Clone)]
pub struct ConnectedPool(DbPool);

impl ConnectedPool {
    pub fn pool(&self) -> &DbPool {
        &self.0
    }

    pub fn into_inner(self) -> DbPool {
        self.0
    }
}

/// Probe `pool` with bounded retries and return it once it is live.
pub async fn connect(
    pool: DbPool,
    config: BootstrapConfig,
    cancel: &CancellationToken,
) -> Result<ConnectedPool, BootstrapError<sqlx::Error>> {
    let mut bootstrapper = Bootstrapper::new(pool, config);
    bootstrapper.run(cancel).await?;
    Ok(ConnectedPool(bootstrapper.into_probe()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("probe {0} refused")]
    struct Refused(u32);

    /// Fails the first `failures` probes, then succeeds.
    #[derive(Clone)]
    struct FlakyProbe {
        failures: u32,
        calls: Arc<AtomicU32>,
    }

    impl FlakyProbe {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Probe for FlakyProbe {
        type Error = Refused;

        async fn probe(&self) -> Result<(), Refused> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(Refused(call))
            } else {
                Ok(())
            }
        }
    }

    fn fast(max_attempts: u32) -> BootstrapConfig {
        BootstrapConfig {
            max_attempts,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn connects_on_first_probe() {
        let probe = FlakyProbe::new(0);
        let mut b = Bootstrapper::new(probe.clone(), fast(3));
        assert_eq!(b.state(), BootstrapState::Disconnected);

        b.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(b.state(), BootstrapState::Connected);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn connects_when_budget_exceeds_failures() {
        let probe = FlakyProbe::new(3);
        let mut b = Bootstrapper::new(probe.clone(), fast(4));

        b.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(b.state(), BootstrapState::Connected);
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test]
    async fn fails_when_budget_equals_failures() {
        let probe = FlakyProbe::new(3);
        let mut b = Bootstrapper::new(probe.clone(), fast(3));

        let err = b.run(&CancellationToken::new()).await.unwrap_err();

        assert_eq!(b.state(), BootstrapState::Failed);
        assert_eq!(probe.calls(), 3);
        assert_matches!(
            err,
            BootstrapError::Exhausted { attempts: 3, last: Refused(3), ref earlier } => {
                let numbers: Vec<u32> = earlier.iter().map(|e| e.0).collect();
                assert_eq!(numbers, vec![1, 2]);
            }
        );
    }

    #[tokio::test]
    async fn exhausted_error_reports_last_cause() {
        let mut b = Bootstrapper::new(FlakyProbe::new(10), fast(2));
        let err = b.run(&CancellationToken::new()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "all 2 connection attempts failed: probe 2 refused"
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("probe 2 refused"));
    }

    #[tokio::test]
    async fn zero_attempts_still_probes_once() {
        let probe = FlakyProbe::new(0);
        let mut b = Bootstrapper::new(probe.clone(), fast(0));

        b.run(&CancellationToken::new()).await.unwrap();
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn cancellation_during_wait_stops_retries() {
        let probe = FlakyProbe::new(u32::MAX);
        let config = BootstrapConfig {
            max_attempts: 5,
            delay: Duration::from_secs(60),
        };
        let mut b = Bootstrapper::new(probe.clone(), config);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = tokio::time::timeout(Duration::from_secs(5), b.run(&cancel))
            .await
            .expect("cancellation must interrupt the retry wait")
            .unwrap_err();

        assert_matches!(err, BootstrapError::Cancelled { attempts: 1 });
        assert_eq!(b.state(), BootstrapState::Cancelled);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn already_cancelled_token_skips_probing() {
        let probe = FlakyProbe::new(0);
        let mut b = Bootstrapper::new(probe.clone(), fast(3));

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = b.run(&cancel).await.unwrap_err();
        assert_matches!(err, BootstrapError::Cancelled { attempts: 0 });
        assert_eq!(probe.calls(), 0);
    }
}
