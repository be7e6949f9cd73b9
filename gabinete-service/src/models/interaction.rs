//! Interaction model - contacts logged with constituents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Atendimento,
    Reuniao,
    Visita,
    Telefonema,
    Email,
    Evento,
    Outro,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Atendimento => "atendimento",
            InteractionKind::Reuniao => "reuniao",
            InteractionKind::Visita => "visita",
            InteractionKind::Telefonema => "telefonema",
            InteractionKind::Email => "email",
            InteractionKind::Evento => "evento",
            InteractionKind::Outro => "outro",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Pendente,
    EmProgresso,
    Concluido,
    Cancelado,
}

impl InteractionStatus {
    pub const ALL: [InteractionStatus; 4] = [
        InteractionStatus::Pendente,
        InteractionStatus::EmProgresso,
        InteractionStatus::Concluido,
        InteractionStatus::Cancelado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionStatus::Pendente => "pendente",
            InteractionStatus::EmProgresso => "em_progresso",
            InteractionStatus::Concluido => "concluido",
            InteractionStatus::Cancelado => "cancelado",
        }
    }

    /// Terminal statuses are never changed by the scheduler.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InteractionStatus::Concluido | InteractionStatus::Cancelado
        )
    }

    /// Position along `pendente -> em_progresso -> concluido`.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            InteractionStatus::Pendente => 0,
            InteractionStatus::EmProgresso => 1,
            InteractionStatus::Concluido | InteractionStatus::Cancelado => 2,
        }
    }
}

/// Scheduled start/end of an interaction. Either bound may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub person_id: Uuid,
    pub subject: String,
    pub kind: InteractionKind,
    pub description: Option<String>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub status: InteractionStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(person_id: Uuid, subject: String, kind: InteractionKind, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            person_id,
            subject,
            kind,
            description: None,
            scheduled_start: None,
            scheduled_end: None,
            status: InteractionStatus::Pendente,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn window(&self) -> ScheduleWindow {
        ScheduleWindow {
            start: self.scheduled_start,
            end: self.scheduled_end,
        }
    }
}
