// src/server/handler.rs
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Request, Response, StatusCode};
use serde::Serialize;
use tower::Service;

use super::route::{HealthRoute, ResponseSink};

/// Buffers what the route writes so it can become a `hyper::Response`.
#[derive(Debug)]
pub struct JsonResponse {
    status: StatusCode,
    body: Option<Vec<u8>>,
}

impl JsonResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
        }
    }

    pub fn into_response(self) -> Result<Response<Body>, hyper::http::Error> {
        let builder = Response::builder().status(self.status);
        match self.body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
    }
}

impl Default for JsonResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSink for JsonResponse {
    fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    fn send_json<T: Serialize + ?Sized>(&mut self, body: &T) {
        match serde_json::to_vec(body) {
            Ok(bytes) => self.body = Some(bytes),
            Err(e) => {
                tracing::error!(%e, "failed to serialize response body");
                self.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.body = None;
            }
        }
    }
}

/// Serves a [`HealthRoute`] to hyper.
#[derive(Clone)]
pub struct HealthService {
    route: HealthRoute,
}

impl HealthService {
    pub fn new(route: HealthRoute) -> Self {
        Self { route }
    }
}

impl Service<Request<Body>> for HealthService {
    type Response = Response<Body>;
    type Error = Box<dyn std::error::Error + Send + Sync>;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let route = self.route.clone();
        Box::pin(async move {
            let mut res = JsonResponse::new();
            let mut failure = None;

            route.handle(req, &mut res, |e| failure = Some(e)).await;

            if let Some(e) = failure {
                tracing::error!(%e, "health route error");
                return Err(Box::new(e) as Box<dyn std::error::Error + Send + Sync>);
            }

            Ok(res.into_response()?)
        })
    }
}
