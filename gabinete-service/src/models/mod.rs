pub mod audit_log;
pub mod capability;
pub mod interaction;
pub mod person;
pub mod role;
pub mod user;

pub use audit_log::AuditEntry;
pub use capability::Capability;
pub use interaction::{Interaction, InteractionKind, InteractionStatus, ScheduleWindow};
pub use person::Person;
pub use role::Role;
pub use user::{CurrentUser, User};
