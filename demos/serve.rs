//! demos/serve.rs
//! Run: cargo run --example serve -- [config.yaml]
//!
//! Serves `/health` and `/metrics` for a few in-process probes.

use anyhow::Result;
use asclepius::config::{self, HealthConfig};
use asclepius::metrics::MetricsRegistry;
use asclepius::{healthcheck, HealthRoute, HealthService, Runner};
use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;
use tower::ServiceExt;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("asclepius=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => HealthConfig {
            default_timeout_ms: Some(500),
            ..Default::default()
        },
    };

    let metrics_registry = Arc::new(MetricsRegistry::new()?);
    let counter = Arc::new(AtomicU64::new(0));

    let runner = Runner::builder()
        .config(&config)
        .add_probe(healthcheck("clock", || async { Ok::<_, String>(()) }, None))
        .add_probe(healthcheck(
            "flaky",
            move || {
                let n = counter.fetch_add(1, Ordering::Relaxed);
                async move {
                    if n % 3 == 2 {
                        Err(format!("failed on call {}", n))
                    } else {
                        Ok(())
                    }
                }
            },
            None,
        ))
        .add_probe(healthcheck(
            "sluggish",
            || async {
                sleep(Duration::from_secs(2)).await;
                Ok::<_, String>(())
            },
            None,
        ))
        .metrics(metrics_registry.collector())
        .build()?;

    let health = HealthService::new(HealthRoute::new(runner));

    let make_service = make_service_fn(move |_| {
        let health = health.clone();
        let registry = metrics_registry.clone();

        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let health = health.clone();
                let registry = registry.clone();

                async move { Ok::<_, Infallible>(route(req, health, &registry).await) }
            }))
        }
    });

    let addr: SocketAddr = ([0, 0, 0, 0], 8080).into();
    info!("Health endpoint listening on http://{}/health", addr);

    Server::bind(&addr).serve(make_service).await?;
    Ok(())
}

async fn route(
    req: Request<Body>,
    health: HealthService,
    registry: &MetricsRegistry,
) -> Response<Body> {
    match req.uri().path() {
        "/health" => match health.oneshot(req).await {
            Ok(response) => response,
            Err(e) => {
                error!("Health route failed: {}", e);
                status_only(StatusCode::INTERNAL_SERVER_ERROR)
            }
        },
        "/metrics" => match registry.gather() {
            Ok(metrics) => Response::new(Body::from(metrics)),
            Err(e) => {
                error!("Failed to encode metrics: {}", e);
                status_only(StatusCode::INTERNAL_SERVER_ERROR)
            }
        },
        _ => status_only(StatusCode::NOT_FOUND),
    }
}

fn status_only(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}
