pub mod auth;
pub mod maintenance;
pub mod metrics;

pub use auth::{
    route_guard_middleware, session_middleware, session_token, AuthUser, SESSION_COOKIE,
};
pub use maintenance::maintenance_gate_middleware;
pub use metrics::metrics_middleware;
