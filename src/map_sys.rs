use std::sync::RwLock;

use rocket::response::content::Json;
use serde_json::{json, Value as JsonValue};

use crate::geolocation::{Geolocation, Position};
use crate::store::{self, ReportStore};
use crate::store::models::{Report, ReportStatus};
use crate::view_state::FetchState;


lazy_static! {
    static ref MAP_STATE: RwLock<MapState> = {
        RwLock::new(MapState::new())
    };
    static ref CLICK_HANDLER: RwLock<Option<Box<dyn Fn(f64, f64) + Send + Sync>>> = {
        RwLock::new(None)
    };
}

pub const DEFAULT_CENTER: (f64, f64) = (-4.007, -79.202);
pub const DEFAULT_ZOOM: u32 = 14;
pub const LIVE_MARKER_LABEL: &'static str = "¡Estás aquí!";


struct MapState {
    center: (f64, f64),
    zoom: u32,
    reports: FetchState<Vec<Report>>,
    live_position: Option<Position>,
}

impl MapState {
    fn new() -> Self {
        MapState {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            reports: FetchState::Idle,
            live_position: None,
        }
    }

    fn apply_live_position(&mut self, pos: Position) {
        self.center = (pos.latitude, pos.longitude);
        self.live_position = Some(pos);
    }
}


pub fn init_map_sys(store: &dyn ReportStore, geo: &dyn Geolocation) {
    fetch_into_map(store);

    // Recenter on every location-found event. A device that never reports
    // a position leaves the default center in place.
    geo.watch_position(Box::new(|pos| {
        MAP_STATE.write().unwrap().apply_live_position(pos);
    }));
}

pub fn refresh_reports(store: &dyn ReportStore) {
    fetch_into_map(store);
}

/// Re-fetch capability handed to whoever must trigger a map reload,
/// currently the report form wiring after a successful submission.
pub struct RefreshHandle;

impl RefreshHandle {
    pub fn refresh(&self) {
        refresh_reports(&*store::STORE);
    }
}

pub fn refresh_handle() -> RefreshHandle {
    RefreshHandle
}

pub fn set_click_handler<F>(handler: F)
    where F: Fn(f64, f64) + Send + Sync + 'static {

    *CLICK_HANDLER.write().unwrap() = Some(Box::new(handler));
}


fn fetch_into_map(store: &dyn ReportStore) {
    MAP_STATE.write().unwrap().reports = FetchState::Loading;

    let next = next_reports_state(store);
    MAP_STATE.write().unwrap().reports = next;
}

fn next_reports_state(store: &dyn ReportStore) -> FetchState<Vec<Report>> {
    match store.fetch_reports(false) {
        Ok(reports) => FetchState::Ready(reports),
        Err(err) => {
            warn!("Fail to fetch reports for map: {}", err);
            FetchState::Failed(err.to_string())
        },
    }
}


#[get("/report-map")]
pub fn get_report_map() -> Json<String> {
    Json(build_map_json(&MAP_STATE.read().unwrap()))
}

#[post("/map-click?<lat>&<lon>")]
pub fn post_map_click(lat: f64, lon: f64) -> &'static str {
    // Raw coordinates, forwarded without validation.
    if let Some(handler) = CLICK_HANDLER.read().unwrap().as_ref() {
        handler(lat, lon);
    }

    "ok"
}


fn build_map_json(state: &MapState) -> String {
    let markers = state.reports.ready()
        .map(|reports| {
            reports.iter()
                .map(marker_json)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    json!({
        "center": {
            "latitude": state.center.0,
            "longitude": state.center.1,
        },
        "zoom": state.zoom,
        "loading": state.reports.is_loading(),
        "live": state.live_position.map(|pos| json!({
            "latitude": pos.latitude,
            "longitude": pos.longitude,
            "label": LIVE_MARKER_LABEL,
        })),
        "markers": markers,
        "size": markers.len(),
    }).to_string()
}

fn marker_json(report: &Report) -> JsonValue {
    let status = ReportStatus::from_label(&report.status);

    json!({
        "id": report.id,
        "latitude": report.latitude,
        "longitude": report.longitude,
        "color": status.marker_color(),
        "icon": status.icon(),
        "title": report.title,
        "description": report.description,
        "status": report.status,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{report, MemoryStore};

    fn state_with_reports(reports: Vec<Report>) -> MapState {
        let mut state = MapState::new();
        state.reports = FetchState::Ready(reports);
        state
    }

    #[test]
    fn test_one_marker_per_report_with_status_visuals() {
        let mut resolved = report(1, "Semáforo", "2024-01-01T00:00:00Z");
        resolved.status = "Resuelto".to_owned();
        let mut unknown = report(2, "Bache", "2024-02-01T00:00:00Z");
        unknown.status = "Desconocido".to_owned();

        let json = build_map_json(&state_with_reports(vec![resolved, unknown]));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["size"], 2);
        assert_eq!(value["markers"][0]["color"], "#28a745");
        assert_eq!(value["markers"][0]["icon"], "check-circle");
        assert_eq!(value["markers"][1]["color"], "#dc3545");
        assert_eq!(value["markers"][1]["icon"], "exclamation-circle");
        assert_eq!(value["markers"][1]["latitude"], -4.007);
    }

    #[test]
    fn test_failed_fetch_renders_empty_marker_set() {
        let mut state = MapState::new();
        state.reports = FetchState::Failed("boom".to_owned());

        let value: serde_json::Value =
            serde_json::from_str(&build_map_json(&state)).unwrap();

        assert_eq!(value["size"], 0);
        assert_eq!(value["markers"].as_array().unwrap().len(), 0);
        assert_eq!(value["center"]["latitude"], -4.007);
    }

    #[test]
    fn test_live_position_recenters_and_marks() {
        let mut state = MapState::new();
        state.apply_live_position(Position {
            latitude: -3.99,
            longitude: -79.20,
        });

        assert_eq!(state.center, (-3.99, -79.20));

        let value: serde_json::Value =
            serde_json::from_str(&build_map_json(&state)).unwrap();
        assert_eq!(value["live"]["label"], LIVE_MARKER_LABEL);
        assert_eq!(value["live"]["latitude"], -3.99);
    }

    #[test]
    fn test_fetch_state_reflects_store_outcome() {
        let store = MemoryStore::with_rows(vec![
            report(1, "Bache", "2024-01-01T00:00:00Z"),
        ]);
        match next_reports_state(&store) {
            FetchState::Ready(reports) => assert_eq!(reports.len(), 1),
            other => panic!("unexpected state: {:?}", other),
        }

        let failing = MemoryStore::failing("connection refused");
        match next_reports_state(&failing) {
            FetchState::Failed(message) => {
                assert_eq!(message, "connection refused")
            },
            other => panic!("unexpected state: {:?}", other),
        }
    }
}
