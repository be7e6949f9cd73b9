//! Role model - the closed set of office roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role assigned to a user. Changed only by an administrator editing the
/// user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ChefeGabinete,
    Assessor,
    Visualizador,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::ChefeGabinete,
        Role::Assessor,
        Role::Visualizador,
    ];

    /// Wire name, as carried in tokens and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ChefeGabinete => "chefe_gabinete",
            Role::Assessor => "assessor",
            Role::Visualizador => "visualizador",
        }
    }

    /// Human-readable label shown in the interface.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::ChefeGabinete => "Chefe de Gabinete",
            Role::Assessor => "Assessor",
            Role::Visualizador => "Visualizador",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "chefe_gabinete" => Ok(Role::ChefeGabinete),
            "assessor" => Ok(Role::Assessor),
            "visualizador" => Ok(Role::Visualizador),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}
