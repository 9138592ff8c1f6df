use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};


/// A report row as returned by the remote store.
/// `status` keeps the raw label; visuals go through `ReportStatus::from_label`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Report {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// The single-row insert payload. `id` and `created_at` are assigned
/// by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ReportStatus,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Reportado,
    Pendiente,
    Resuelto,
}

impl ReportStatus {
    /// Unknown labels fall back to `Reportado`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Resuelto" => ReportStatus::Resuelto,
            "Pendiente" => ReportStatus::Pendiente,
            _ => ReportStatus::Reportado,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Reportado => "Reportado",
            ReportStatus::Pendiente => "Pendiente",
            ReportStatus::Resuelto => "Resuelto",
        }
    }

    pub fn marker_color(&self) -> &'static str {
        match self {
            ReportStatus::Resuelto => "#28a745",
            ReportStatus::Pendiente => "#ffc107",
            ReportStatus::Reportado => "#dc3545",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ReportStatus::Resuelto => "check-circle",
            ReportStatus::Pendiente => "hourglass-half",
            ReportStatus::Reportado => "exclamation-circle",
        }
    }
}

impl Default for ReportStatus {
    fn default() -> Self {
        ReportStatus::Reportado
    }
}
