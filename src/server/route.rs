// src/server/route.rs
use crate::health::{make_runner, HealthError, Runner};
use crate::probe::Probe;
use hyper::StatusCode;
use serde::Serialize;

/// The minimal response surface the health route writes to. Implemented by
/// whatever response type the hosting HTTP layer uses.
pub trait ResponseSink {
    fn set_status(&mut self, status: StatusCode) -> &mut Self;

    fn send_json<T: Serialize + ?Sized>(&mut self, body: &T);
}

/// Translates a run into a status code and JSON body.
#[derive(Clone)]
pub struct HealthRoute {
    runner: Runner,
}

impl HealthRoute {
    pub fn new(runner: Runner) -> Self {
        Self { runner }
    }

    /// Responds 200 with the report when healthy, 500 with the report
    /// otherwise. Errors from the run go to `next` and leave `res` untouched.
    pub async fn handle<R, S, N>(&self, _req: R, res: &mut S, next: N)
    where
        S: ResponseSink,
        N: FnOnce(HealthError),
    {
        match self.runner.run().await {
            Ok(report) => {
                let status = if report.healthy {
                    StatusCode::OK
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                res.set_status(status).send_json(&report);
            }
            Err(e) => next(e),
        }
    }
}

pub fn make_route<I>(probes: I) -> HealthRoute
where
    I: IntoIterator<Item = Probe>,
{
    HealthRoute::new(make_runner(probes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Report;
    use crate::probe::{healthcheck, HealthCheck, ProbeResult};
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingSink {
        status: Option<StatusCode>,
        body: Option<serde_json::Value>,
    }

    impl ResponseSink for RecordingSink {
        fn set_status(&mut self, status: StatusCode) -> &mut Self {
            self.status = Some(status);
            self
        }

        fn send_json<T: Serialize + ?Sized>(&mut self, body: &T) {
            self.body = Some(serde_json::to_value(body).unwrap());
        }
    }

    fn should_not_get_here(e: HealthError) {
        panic!("should not get here: {}", e);
    }

    #[tokio::test]
    async fn test_healthy_responds_200() {
        let route = make_route(vec![healthcheck("foo", || async { Ok::<_, String>(()) }, None)]);
        let mut res = RecordingSink::default();

        route.handle((), &mut res, should_not_get_here).await;

        assert_eq!(res.status, Some(StatusCode::OK));
        assert_eq!(
            res.body,
            Some(serde_json::json!({
                "healthy": true,
                "results": { "foo": { "healthy": true, "reason": "OK" } }
            }))
        );
    }

    #[tokio::test]
    async fn test_unhealthy_responds_500() {
        let route = make_route(vec![healthcheck("foo", || async { Err::<(), _>("reason") }, None)]);
        let mut res = RecordingSink::default();

        route.handle((), &mut res, should_not_get_here).await;

        assert_eq!(res.status, Some(StatusCode::INTERNAL_SERVER_ERROR));
        let report: Report = serde_json::from_value(res.body.unwrap()).unwrap();
        assert!(!report.healthy);
        assert_eq!(report.results["foo"].reason, "reason");
    }

    struct Panicking;

    #[async_trait]
    impl HealthCheck for Panicking {
        fn name(&self) -> &str {
            "broken"
        }

        async fn check(&self) -> ProbeResult {
            panic!("probe bug")
        }
    }

    #[tokio::test]
    async fn test_run_error_goes_to_next() {
        let runner = Runner::builder().add_check(Panicking).build().unwrap();
        let route = HealthRoute::new(runner);
        let mut res = RecordingSink::default();
        let mut forwarded = Vec::new();

        route.handle((), &mut res, |e| forwarded.push(e)).await;

        assert_eq!(forwarded.len(), 1);
        assert!(matches!(forwarded[0], HealthError::ProbePanicked { .. }));
        assert!(res.status.is_none());
        assert!(res.body.is_none());
    }
}
