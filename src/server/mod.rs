pub mod handler;
pub mod route;

pub use handler::{HealthService, JsonResponse};
pub use route::{make_route, HealthRoute, ResponseSink};
