pub mod admin;
pub mod health;
pub mod interactions;
pub mod maintenance;
pub mod metrics;
pub mod people;
pub mod reports;
pub mod session;
pub mod users;

pub use health::health_check;
