pub mod audit;
pub mod error;
pub mod export;
pub mod identity;
pub mod metrics;
pub mod registry;
pub mod users;

pub use audit::AuditLog;
pub use error::ServiceError;
pub use identity::{IdentityProvider, JwtIdentityProvider, Session, SessionClaims};
pub use registry::{Registry, RegistrySnapshot, SummaryReport};
pub use users::UserDirectory;
