//! Role-based access control: the policy table, the per-caller permission
//! resolver and the route guard.

pub mod guard;
pub mod permissions;
pub mod policy;

pub use guard::{AuthStatus, GuardDecision, RouteGuard, DASHBOARD_PATH, LOGIN_PATH};
pub use permissions::{PermissionSummary, Permissions};
pub use policy::PolicyTable;
