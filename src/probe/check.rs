// src/probe/check.rs
use super::result::ProbeResult;
use super::timer::timeout;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::fmt::{self, Display};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type CheckFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// Anything the runner can invoke to obtain a named health result.
///
/// Implementations must always produce a `ProbeResult`; failures belong in
/// the result, not in a panic. A panicking check is reported by the runner
/// as a programming error.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> ProbeResult;
}

/// A named check with an optional deadline.
#[derive(Clone)]
pub struct Probe {
    name: String,
    check: CheckFn,
    timeout: Option<Duration>,
}

impl Probe {
    /// Wraps `check`, whose error is rendered with `Display` as the reason.
    pub fn new<F, Fut, T, E>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: 'static,
        E: Display + 'static,
    {
        let check: CheckFn = Arc::new(move || {
            check()
                .map(|outcome| outcome.map(|_| ()).map_err(|e| e.to_string()))
                .boxed()
        });

        Self {
            name: name.into(),
            check,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets `timeout` only when the probe has none yet.
    pub fn or_timeout(mut self, timeout: Option<Duration>) -> Self {
        if self.timeout.is_none() {
            self.timeout = timeout;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Runs the check once. Never returns an error: failures and timeouts
    /// are reported as unhealthy results.
    ///
    /// Must be called from within a tokio runtime when a timeout is set.
    pub async fn run(&self) -> ProbeResult {
        let outcome = match self.timeout {
            None => (self.check)().await,
            Some(limit) => match self.race(limit).await {
                Some(outcome) => outcome,
                None => {
                    debug!(probe = %self.name, ?limit, "probe timed out");
                    return ProbeResult::timed_out(&self.name, limit);
                }
            },
        };

        match outcome {
            Ok(()) => ProbeResult::healthy(&self.name),
            Err(reason) => ProbeResult::unhealthy(&self.name, reason),
        }
    }

    /// Races the check against `limit`. `None` means the timer won.
    ///
    /// The check runs on its own task so that losing the race detaches it
    /// instead of dropping it; it finishes in the background and its output
    /// is discarded. The timer is dropped as soon as the race settles.
    async fn race(&self, limit: Duration) -> Option<Result<(), String>> {
        let handle = tokio::spawn((self.check)());

        // A zero deadline is always missed.
        if limit.is_zero() {
            return None;
        }

        tokio::select! {
            biased;
            joined = handle => Some(match joined {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => Err(e.to_string()),
            }),
            _ = timeout(limit) => None,
        }
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HealthCheck for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> ProbeResult {
        self.run().await
    }
}

/// Builds a probe named `name` around `check`, optionally bounded by
/// `timeout`.
pub fn healthcheck<F, Fut, T, E>(
    name: impl Into<String>,
    check: F,
    timeout: Option<Duration>,
) -> Probe
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: 'static,
    E: Display + 'static,
{
    Probe::new(name, check).or_timeout(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::time::sleep;

    async fn succeed() -> Result<(), String> {
        Ok(())
    }

    async fn fail() -> Result<(), String> {
        Err("reason".to_string())
    }

    #[tokio::test]
    async fn test_success_without_timeout() {
        let result = healthcheck("foo", succeed, None).run().await;

        assert_eq!(result, ProbeResult::healthy("foo"));
        assert_eq!(result.reason, "OK");
    }

    #[tokio::test]
    async fn test_failure_without_timeout() {
        let result = healthcheck("foo", fail, None).run().await;

        assert_eq!(
            result,
            ProbeResult {
                healthy: false,
                name: "foo".to_string(),
                reason: "reason".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_success_with_timeout() {
        let result = healthcheck("foo", succeed, Some(Duration::from_millis(10)))
            .run()
            .await;

        assert_eq!(result, ProbeResult::healthy("foo"));
    }

    #[tokio::test]
    async fn test_failure_with_timeout() {
        let result = healthcheck("foo", fail, Some(Duration::from_millis(10)))
            .run()
            .await;

        assert_eq!(result, ProbeResult::unhealthy("foo", "reason"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_check_times_out() {
        let probe = healthcheck(
            "foo",
            || async {
                sleep(Duration::from_millis(100)).await;
                Ok::<_, String>(())
            },
            Some(Duration::from_millis(10)),
        );

        let result = probe.run().await;

        assert_eq!(result, ProbeResult::unhealthy("foo", "timed out after 10ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_check_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let probe = Probe::new("slow", move || {
            let flag = flag.clone();
            async move {
                sleep(Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, String>(())
            }
        })
        .with_timeout(Duration::from_millis(5));

        assert!(!probe.run().await.healthy);
        assert!(!finished.load(Ordering::SeqCst));

        sleep(Duration::from_millis(100)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_zero_timeout_is_always_late() {
        let result = healthcheck("foo", succeed, Some(Duration::ZERO)).run().await;

        assert_eq!(result, ProbeResult::unhealthy("foo", "timed out after 0ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_millisecond_timeout_is_not_reported_as_zero() {
        let probe = Probe::new("foo", || async {
            sleep(Duration::from_millis(100)).await;
            Ok::<_, String>(())
        })
        .with_timeout(Duration::from_micros(500));

        let result = probe.run().await;

        assert_eq!(result, ProbeResult::unhealthy("foo", "timed out after 1ms"));
    }

    #[tokio::test]
    async fn test_error_is_rendered_with_display() {
        #[derive(Debug)]
        struct Refused(u16);

        impl Display for Refused {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "connection refused on port {}", self.0)
            }
        }

        let result = Probe::new("db", || async { Err::<(), _>(Refused(5432)) })
            .run()
            .await;

        assert_eq!(result.reason, "connection refused on port 5432");
    }

    #[test]
    fn test_or_timeout_keeps_explicit_timeout() {
        let probe = Probe::new("foo", succeed)
            .with_timeout(Duration::from_millis(10))
            .or_timeout(Some(Duration::from_secs(1)));

        assert_eq!(probe.timeout(), Some(Duration::from_millis(10)));
        assert_eq!(
            Probe::new("bar", succeed)
                .or_timeout(Some(Duration::from_secs(1)))
                .timeout(),
            Some(Duration::from_secs(1))
        );
    }
}
