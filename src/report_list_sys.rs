use chrono::Local;
use rocket::response::content::Json;
use serde_json::{json, Value as JsonValue};

use crate::store::{self, ReportStore};
use crate::store::models::{Report, ReportStatus};
use crate::view_state::FetchState;


pub const MSG_LIST_ERROR: &'static str = "Error al cargar los reportes.";
pub const MSG_LIST_EMPTY: &'static str = "No hay reportes registrados aún.";


/// One card per stored report, newest first. Mounted fresh per request;
/// nothing re-fetches it afterwards.
pub struct ReportList {
    state: FetchState<Vec<Report>>,
}

impl ReportList {
    pub fn new() -> Self {
        ReportList {
            state: FetchState::Idle,
        }
    }

    pub fn mount(&mut self, store: &dyn ReportStore) {
        self.state = FetchState::Loading;

        self.state = match store.fetch_reports(true) {
            Ok(reports) => FetchState::Ready(reports),
            Err(err) => {
                // Detail stays in the log; the view gets the generic message.
                warn!("Fail to fetch reports for list: {}", err);
                FetchState::Failed(MSG_LIST_ERROR.to_owned())
            },
        };
    }

    pub fn render_json(&self) -> String {
        match &self.state {
            FetchState::Idle | FetchState::Loading => json!({
                "state": "loading",
            }).to_string(),
            FetchState::Failed(message) => json!({
                "state": "error",
                "message": message,
            }).to_string(),
            FetchState::Ready(reports) if reports.is_empty() => json!({
                "state": "ready",
                "placeholder": MSG_LIST_EMPTY,
                "reports": [],
                "size": 0,
            }).to_string(),
            FetchState::Ready(reports) => {
                let cards = reports.iter()
                    .map(card_json)
                    .collect::<Vec<_>>();

                json!({
                    "state": "ready",
                    "reports": cards,
                    "size": cards.len(),
                }).to_string()
            },
        }
    }
}

fn card_json(report: &Report) -> JsonValue {
    let status = ReportStatus::from_label(&report.status);

    json!({
        "id": report.id,
        "icon": status.icon(),
        "title": report.title,
        "description": report.description.as_ref().map(|d| d.as_str()).unwrap_or(""),
        "coordinates": format!("Lat: {:.4}, Lon: {:.4}", report.latitude, report.longitude),
        "created_at": report.created_at.with_timezone(&Local)
            .format("%d/%m/%Y %H:%M:%S")
            .to_string(),
        "status": report.status,
    })
}


#[get("/report-list")]
pub fn get_report_list() -> Json<String> {
    let mut list = ReportList::new();
    list.mount(&*store::STORE);

    Json(list.render_json())
}
