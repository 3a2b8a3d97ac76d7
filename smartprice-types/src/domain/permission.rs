//! Browser geolocation permission model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::location::Coordinates;

/// Where the geolocation permission flow currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Prompt,
    Granted,
    Denied,
    Unsupported,
}

/// Uniform result of asking the host platform for the user's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PermissionOutcome {
    Granted(Coordinates),
    Denied,
    Unsupported,
}

impl PermissionOutcome {
    pub fn state(&self) -> PermissionState {
        match self {
            PermissionOutcome::Granted(_) => PermissionState::Granted,
            PermissionOutcome::Denied => PermissionState::Denied,
            PermissionOutcome::Unsupported => PermissionState::Unsupported,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            PermissionOutcome::Granted(coordinates) => Some(*coordinates),
            _ => None,
        }
    }
}
