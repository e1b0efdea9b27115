//! Lookup Client for the Distance Matrix HTTP API.
//!
//! Every failure is folded into [`LookupResult::Failed`]:
//!
//! | Condition                                   | `status`                          |
//! |---------------------------------------------|-----------------------------------|
//! | transport error / timeout                   | `ERROR: <cause chain>`            |
//! | non-2xx response                            | `ERROR: HTTP status <code>`       |
//! | body is not the documented shape           | `ERROR: invalid response body: …` |
//! | `rows`, `elements` or element `status` absent | `UNKNOWN`                       |
//! | `rows` / `elements` empty                   | `ERROR: …` (with provider status) |
//! | element status other than `OK`              | that status, verbatim             |
//! | `OK` without `distance` or `duration`       | `ERROR: …`                        |

use crate::config::ProviderSettings;
use crate::domain::model::{LookupResult, Measure, Units, STATUS_OK, STATUS_UNKNOWN};
use crate::domain::ports::DistanceLookup;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: Option<String>,
    error_message: Option<String>,
    rows: Option<Vec<MatrixRow>>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Option<Vec<MatrixElement>>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: Option<String>,
    distance: Option<Measure>,
    duration: Option<Measure>,
}

pub struct DistanceMatrixClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl DistanceMatrixClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    async fn fetch(&self, origin: &str, destination: &str, units: Units) -> std::result::Result<Vec<u8>, String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("key", self.api_key.as_str()),
                ("units", units.as_str()),
            ])
            .send()
            .await
            // URL 內含 API key，不可寫入輸出檔
            .map_err(|e| describe(&e.without_url()))?;

        let status = response.status();
        tracing::debug!("Distance Matrix response status: {}", status);
        if !status.is_success() {
            return Err(format!("HTTP status {}", status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| describe(&e.without_url()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DistanceLookup for DistanceMatrixClient {
    async fn lookup(&self, origin: &str, destination: &str, units: Units) -> LookupResult {
        tracing::debug!("Looking up {} -> {} ({})", origin, destination, units);

        let body = match self.fetch(origin, destination, units).await {
            Ok(body) => body,
            Err(message) => return LookupResult::error(message),
        };

        match serde_json::from_slice::<MatrixResponse>(&body) {
            Ok(parsed) => interpret(parsed),
            Err(e) => LookupResult::error(format!("invalid response body: {}", e)),
        }
    }
}

fn interpret(response: MatrixResponse) -> LookupResult {
    let Some(rows) = response.rows else {
        return LookupResult::failed(STATUS_UNKNOWN);
    };
    let Some(row) = rows.into_iter().next() else {
        return LookupResult::error(empty_reason("rows", &response.status, &response.error_message));
    };
    let Some(elements) = row.elements else {
        return LookupResult::failed(STATUS_UNKNOWN);
    };
    let Some(element) = elements.into_iter().next() else {
        return LookupResult::error(empty_reason(
            "elements",
            &response.status,
            &response.error_message,
        ));
    };

    let status = element.status.unwrap_or_else(|| STATUS_UNKNOWN.to_string());
    if status != STATUS_OK {
        return LookupResult::Failed { status };
    }

    match (element.distance, element.duration) {
        (Some(distance), Some(duration)) => LookupResult::Found { distance, duration },
        (None, _) => LookupResult::error("element status OK but `distance` is missing"),
        (_, None) => LookupResult::error("element status OK but `duration` is missing"),
    }
}

fn empty_reason(what: &str, status: &Option<String>, error_message: &Option<String>) -> String {
    match (status, error_message) {
        (Some(status), Some(message)) => {
            format!("response has no {} (provider status {}: {})", what, status, message)
        }
        (Some(status), None) => format!("response has no {} (provider status {})", what, status),
        _ => format!("response has no {}", what),
    }
}

fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
