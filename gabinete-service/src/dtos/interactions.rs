use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Interaction, InteractionKind, InteractionStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInteractionRequest {
    pub person_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,
    pub kind: InteractionKind,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub status: Option<InteractionStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInteractionRequest {
    #[validate(length(min = 1, max = 200, message = "Subject cannot be empty"))]
    pub subject: Option<String>,
    pub kind: Option<InteractionKind>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub status: Option<InteractionStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InteractionQuery {
    pub person_id: Option<Uuid>,
    pub status: Option<InteractionStatus>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InteractionListResponse {
    pub interactions: Vec<Interaction>,
    pub total: usize,
}
