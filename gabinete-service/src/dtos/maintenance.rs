use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SetMaintenanceRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceStatusResponse {
    pub enabled: bool,
    /// Whether the caller is currently locked out.
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
}
