//! BLS public API integration for the labor series catalog.
//!
//! One POST per series against the v2 timeseries endpoint. The client is
//! deliberately sequential: the ingestion pipeline fetches a handful of
//! series once per run, so there is nothing to gain from parallel requests.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::domain::Observation;
use crate::error::AppError;

const BASE_URL: &str = "https://api.bls.gov/publicAPI/v2/timeseries/data/";

/// Body-level status sentinel; anything else aborts the run even on HTTP 200.
const STATUS_SUCCESS: &str = "REQUEST_SUCCEEDED";

pub struct BlsClient {
    client: Client,
    registration_key: Option<String>,
}

impl BlsClient {
    /// Build a client with a bounded per-request timeout.
    ///
    /// The registration key is optional: without one the API still answers,
    /// just under its unauthenticated rate limits.
    pub fn from_env(timeout_secs: u64) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let registration_key = std::env::var("BLS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::api(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            registration_key,
        })
    }

    /// Fetch one series for the inclusive year range and normalize it into
    /// monthly observations.
    pub fn fetch_series(
        &self,
        series_id: &str,
        series_name: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<Observation>, AppError> {
        let payload = SeriesRequest {
            seriesid: vec![series_id.to_string()],
            startyear: start_year.to_string(),
            endyear: end_year.to_string(),
            registrationkey: self.registration_key.clone(),
        };

        let resp = self
            .client
            .post(BASE_URL)
            .json(&payload)
            .send()
            .map_err(|e| AppError::api(format!("BLS request for {series_id} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::api(format!(
                "BLS request for {series_id} failed with status {}.",
                resp.status()
            )));
        }

        let body: SeriesResponse = resp
            .json()
            .map_err(|e| AppError::api(format!("Failed to parse BLS response for {series_id}: {e}")))?;

        if body.status != STATUS_SUCCESS {
            let detail = if body.message.is_empty() {
                String::new()
            } else {
                format!(" ({})", body.message.join("; "))
            };
            return Err(AppError::api(format!(
                "BLS reported '{}' for {series_id}{detail}.",
                body.status
            )));
        }

        let series = body
            .results
            .series
            .into_iter()
            .next()
            .ok_or_else(|| AppError::api(format!("BLS returned no series block for {series_id}.")))?;

        let mut out = Vec::with_capacity(series.data.len());
        for record in series.data {
            // Non-monthly period codes (the annual-average marker "M13",
            // quarterly codes, malformed values) are not observations.
            let Some(date) = monthly_date(&record.year, &record.period) else {
                continue;
            };
            let Some(value) = parse_value(&record.value) else {
                continue;
            };
            out.push(Observation {
                series_id: series_id.to_string(),
                series_name: series_name.to_string(),
                date,
                value,
            });
        }

        Ok(out)
    }
}

#[derive(Debug, Serialize)]
struct SeriesRequest {
    seriesid: Vec<String>,
    startyear: String,
    endyear: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    registrationkey: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    status: String,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results", default)]
    results: SeriesResults,
}

#[derive(Debug, Default, Deserialize)]
struct SeriesResults {
    #[serde(default)]
    series: Vec<SeriesBlock>,
}

#[derive(Debug, Deserialize)]
struct SeriesBlock {
    #[serde(default)]
    data: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    year: String,
    period: String,
    value: String,
}

/// Map a `(year, period-code)` pair to the first day of that month.
///
/// Period codes `M01..M12` are calendar months. `M13` is the annual-average
/// marker and is discarded along with anything that is not a monthly code.
fn monthly_date(year: &str, period: &str) -> Option<NaiveDate> {
    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = period.strip_prefix('M')?.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_codes_map_to_month_starts() {
        assert_eq!(
            monthly_date("2024", "M01"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            monthly_date("2024", "M12"),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
    }

    #[test]
    fn annual_average_marker_is_discarded() {
        assert_eq!(monthly_date("2024", "M13"), None);
    }

    #[test]
    fn non_monthly_codes_are_discarded() {
        assert_eq!(monthly_date("2024", "Q01"), None);
        assert_eq!(monthly_date("2024", "A01"), None);
        assert_eq!(monthly_date("2024", "M"), None);
        assert_eq!(monthly_date("2024", "M00"), None);
        assert_eq!(monthly_date("not-a-year", "M01"), None);
    }

    #[test]
    fn placeholder_values_are_skipped() {
        assert_eq!(parse_value("3.7"), Some(3.7));
        assert_eq!(parse_value(" 157232 "), Some(157232.0));
        assert_eq!(parse_value("-"), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("n/a"), None);
    }
}
