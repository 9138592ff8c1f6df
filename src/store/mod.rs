pub mod models;


use std::env;
use std::fmt;

use serde_json::Value as JsonValue;

use self::models::{NewReport, Report};


pub type StoreResult<T> = Result<T, StoreError>;


#[derive(Debug)]
pub enum StoreError {
    Http(reqwest::Error),
    Service { status: u16, message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Http(err) => write!(f, "{}", err),
            StoreError::Service { message, .. } => f.write_str(message),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Http(err)
    }
}


/// The two operations this client consumes from the remote store.
pub trait ReportStore {
    fn fetch_reports(&self, newest_first: bool) -> StoreResult<Vec<Report>>;
    fn insert_report(&self, report: &NewReport) -> StoreResult<()>;
}


lazy_static! {
    pub static ref STORE: RemoteStore = RemoteStore::from_env();
}


/// REST client for the managed backend's `reports` table.
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemoteStore {
    pub fn from_env() -> Self {
        let base_url = env::var("STORE_URL")
            .expect("STORE_URL must be set");
        let api_key = env::var("STORE_API_KEY")
            .expect("STORE_API_KEY must be set");

        RemoteStore {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/reports", self.base_url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = format!("Bearer {}", self.api_key);

        builder
            .header("apikey", self.api_key.as_str())
            .header("Authorization", bearer.as_str())
    }
}

impl ReportStore for RemoteStore {
    fn fetch_reports(&self, newest_first: bool) -> StoreResult<Vec<Report>> {
        let mut url = format!("{}?select=*", self.table_url());
        if newest_first {
            url.push_str("&order=created_at.desc");
        }

        let mut res = self.authorized(self.client.get(&url)).send()?;

        if !res.status().is_success() {
            return Err(service_error(res));
        }

        res.json::<Vec<Report>>().map_err(StoreError::Http)
    }

    fn insert_report(&self, report: &NewReport) -> StoreResult<()> {
        let res = self.authorized(self.client.post(&self.table_url()))
            .header("Prefer", "return=minimal")
            .json(&[report])
            .send()?;

        if !res.status().is_success() {
            return Err(service_error(res));
        }

        Ok(())
    }
}

fn service_error(mut res: reqwest::Response) -> StoreError {
    let status = res.status();

    // PostgREST errors carry a "message" property; fall back to the raw body.
    let message = res.text().ok()
        .map(|body| {
            serde_json::from_str::<JsonValue>(&body).ok()
                .and_then(|v| v["message"].as_str().map(|m| m.to_owned()))
                .unwrap_or(body)
        })
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| status.to_string());

    StoreError::Service {
        status: status.as_u16(),
        message,
    }
}
