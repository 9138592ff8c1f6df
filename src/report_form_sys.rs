use std::sync::RwLock;

use rocket::{
    request::Form,
    response::{
        status::BadRequest,
        content::Json,
    },
};
use serde_json::json;

use crate::geolocation::{Geolocation, NoDevice};
use crate::map_sys;
use crate::store::{self, ReportStore};
use crate::store::models::{NewReport, ReportStatus};


type StringResult = Result<String, BadRequest<String>>;


lazy_static! {
    static ref REPORT_FORM: RwLock<ReportForm> = {
        RwLock::new(ReportForm::new())
    };
}

pub const MSG_SUBMIT_OK: &'static str = "Reporte enviado con éxito!";
pub const MSG_SUBMIT_ERROR: &'static str = "Error al enviar el reporte: ";
pub const MSG_LOCATION_ERROR: &'static str =
    "Error al obtener la ubicación. Por favor, ingrese la latitud y longitud manualmente.";
pub const MSG_TITLE_REQUIRED: &'static str = "El título es obligatorio";


/// Draft state of the submission form. Coordinates are kept as the raw
/// input strings; blank means absent and triggers the device lookup.
struct ReportForm {
    title: String,
    description: String,
    latitude: String,
    longitude: String,
    status: ReportStatus,
    loading: bool,
    message: Option<String>,
}

impl ReportForm {
    fn new() -> Self {
        ReportForm {
            title: String::new(),
            description: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            status: ReportStatus::Reportado,
            loading: false,
            message: None,
        }
    }

    // One-way sync from the map: overwrites the coordinate draft,
    // later user edits stand until the next selection.
    fn set_selected_location(&mut self, lat: f64, lon: f64) {
        self.latitude = lat.to_string();
        self.longitude = lon.to_string();
    }

    fn verify_error(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            Some(MSG_TITLE_REQUIRED)
        }
        else {
            None
        }
    }

    fn submit(
        &mut self,
        store: &dyn ReportStore,
        geo: &dyn Geolocation,
        on_new_report: &mut dyn FnMut(),
    ) -> bool {
        self.loading = true;
        self.message = None;

        if let Some(err) = self.verify_error() {
            self.message = Some(err.to_owned());
            self.loading = false;
            return false;
        }

        // Resolve missing coordinates through the device before inserting.
        if self.latitude.trim().is_empty() || self.longitude.trim().is_empty() {
            match geo.current_position() {
                Ok(pos) => {
                    self.latitude = pos.latitude.to_string();
                    self.longitude = pos.longitude.to_string();
                },
                Err(err) => {
                    warn!("Fail to get device position: {}", err);
                    self.message = Some(MSG_LOCATION_ERROR.to_owned());
                    self.loading = false;
                    return false;
                },
            }
        }

        let coords = self.latitude.trim().parse::<f64>()
            .and_then(|lat| {
                self.longitude.trim().parse::<f64>().map(|lon| (lat, lon))
            });
        let (latitude, longitude) = match coords {
            Ok(pair) => pair,
            Err(err) => {
                self.message = Some(format!("{}{}", MSG_SUBMIT_ERROR, err));
                self.loading = false;
                return false;
            },
        };

        let new_report = NewReport {
            title: self.title.clone(),
            description: self.description.clone(),
            latitude,
            longitude,
            status: self.status,
        };

        let submitted = match store.insert_report(&new_report) {
            Ok(()) => {
                self.message = Some(MSG_SUBMIT_OK.to_owned());
                self.reset_draft();
                on_new_report();
                true
            },
            Err(err) => {
                self.message = Some(format!("{}{}", MSG_SUBMIT_ERROR, err));
                false
            },
        };

        self.loading = false;
        submitted
    }

    fn reset_draft(&mut self) {
        self.title.clear();
        self.description.clear();
        self.latitude.clear();
        self.longitude.clear();
        self.status = ReportStatus::Reportado;
    }
}


/// Entry point for the map's click forwarding, registered in `main`.
pub fn set_selected_location(lat: f64, lon: f64) {
    REPORT_FORM.write().unwrap().set_selected_location(lat, lon);
}


#[derive(FromForm)]
pub struct ReportSubmitForm {
    title: String,
    description: String,
    latitude: String,
    longitude: String,
    status: String,
}


#[get("/report-form")]
pub fn get_report_form() -> Json<String> {
    let form = REPORT_FORM.read().unwrap();

    Json(json!({
        "title": form.title,
        "description": form.description,
        "latitude": form.latitude,
        "longitude": form.longitude,
        "status": form.status.label(),
        "loading": form.loading,
        "message": form.message,
    }).to_string())
}

#[post("/report", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_report(form: Option<Form<ReportSubmitForm>>) -> StringResult {
    if form.is_none() {
        return Err(BadRequest(Some("Invalid form".into())));
    }

    let form = form.unwrap();

    let mut state = REPORT_FORM.write().unwrap();
    state.title = form.title.clone();
    state.description = form.description.clone();
    state.latitude = form.latitude.clone();
    state.longitude = form.longitude.clone();
    state.status = ReportStatus::from_label(&form.status);

    let refresh = map_sys::refresh_handle();
    let mut notify = || refresh.refresh();

    let submitted = state.submit(&*store::STORE, &NoDevice, &mut notify);
    let message = state.message.clone().unwrap_or_default();

    if submitted {
        Ok(message)
    }
    else {
        Err(BadRequest(Some(message)))
    }
}
