//! Error types for the simulation and its export surface.
//!
//! The core only fails when a spawn direction cannot be normalized; the rest
//! comes from configuration loading and marker export.

use std::fmt;

use glam::Vec3;

/// Errors produced by the simulation, configuration and export layers.
#[derive(Debug)]
pub enum SimError {
    /// Spawn position coincides with the aim target, so the launch direction
    /// is undefined.
    InvalidSpawnGeometry { position: Vec3 },
    /// Configuration values are out of range or inconsistent.
    InvalidConfig(String),
    /// Failed to read or write a file.
    Io(std::io::Error),
    /// Failed to write CSV rows.
    Csv(csv::Error),
    /// Failed to parse or render JSON.
    Json(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidSpawnGeometry { position } => write!(
                f,
                "Spawn position ({:.3}, {:.3}, {:.3}) coincides with the dome center; launch direction is undefined",
                position.x, position.y, position.z
            ),
            SimError::InvalidConfig(msg) => write!(f, "Invalid simulation config: {}", msg),
            SimError::Io(e) => write!(f, "I/O error: {}", e),
            SimError::Csv(e) => write!(f, "CSV export failed: {}", e),
            SimError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Io(e) => Some(e),
            SimError::Csv(e) => Some(e),
            SimError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}

impl From<csv::Error> for SimError {
    fn from(e: csv::Error) -> Self {
        SimError::Csv(e)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Json(e)
    }
}
