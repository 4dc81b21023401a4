//! Renovation project progress model

use crate::label::{self, fold, label_enum_serde};
use serde::{Deserialize, Serialize};

/// Phase of a renovation project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ProjectStatus {
    #[default]
    Planning,
    InExecution,
    Finished,
    Suspended,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planning,
        ProjectStatus::InExecution,
        ProjectStatus::Finished,
        ProjectStatus::Suspended,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning/Start",
            ProjectStatus::InExecution => "InExecution",
            ProjectStatus::Finished => "Finished",
            ProjectStatus::Suspended => "Suspended",
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "planning" | "start" | "planningstart" | "planeacion" | "inicio"
            | "inicioplaneacion" | "planeacioninicio" => Ok(ProjectStatus::Planning),
            "inexecution" | "execution" | "enejecucion" => Ok(ProjectStatus::InExecution),
            "finished" | "finalizado" | "terminado" => Ok(ProjectStatus::Finished),
            "suspended" | "suspendido" => Ok(ProjectStatus::Suspended),
            _ => Err(label::unknown(
                "project status",
                s,
                ProjectStatus::ALL.iter().map(ProjectStatus::label),
            )),
        }
    }
}

label_enum_serde!(ProjectStatus);

/// A renovation project, keyed by its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,

    /// Percent complete, 0-100
    pub progress: u8,

    pub status: ProjectStatus,

    /// Summary of the latest update
    pub note: String,
}

impl Project {
    pub fn new(name: String, progress: u8, status: ProjectStatus, note: String) -> Self {
        Self {
            name,
            progress,
            status,
            note,
        }
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}%] [{}] {}",
            self.name, self.progress, self.status, self.note
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_labels() {
        assert_eq!(
            "Planning/Start".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::Planning
        );
        assert_eq!(
            "En Ejecución".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::InExecution
        );
        assert_eq!(
            "finalizado".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::Finished
        );
        assert!(matches!(
            "Cancelled".parse::<ProjectStatus>(),
            Err(crate::Error::Validation(_))
        ));
    }

    #[test]
    fn test_label_round_trips_through_parse() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.label().parse::<ProjectStatus>().unwrap(), status);
        }
    }
}
