//! FRED API integration for the current policy rate.
//!
//! Only the latest non-missing observation of one series is needed, e.g.
//! `DFEDTARU` (upper bound of the Fed funds target range).

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 30;

/// One dated observation, in the series' own units (percent for rates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FredObservation {
    pub date: NaiveDate,
    pub value: f64,
}

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Latest non-missing observation of `series_id` on or before `asof`.
    pub fn fetch_latest(&self, series_id: &str, asof: Option<NaiveDate>) -> Result<FredObservation, AppError> {
        let mut req = self.client.get(BASE_URL).query(&[
            ("series_id", series_id),
            ("api_key", &self.api_key),
            ("file_type", "json"),
            ("sort_order", "desc"),
            ("limit", &OBS_LIMIT.to_string()),
        ]);

        if let Some(date) = asof {
            req = req.query(&[("observation_end", &date.to_string())]);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("FRED request failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse FRED response: {e}")))?;

        let latest = latest_observation(&body)?
            .ok_or_else(|| AppError::new(4, format!("No observations returned for series {series_id}.")))?;

        tracing::info!(series = series_id, date = %latest.date, value = latest.value, "fetched FRED observation");
        Ok(latest)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn latest_observation(body: &ObservationsResponse) -> Result<Option<FredObservation>, AppError> {
    let mut best: Option<FredObservation> = None;
    for obs in &body.observations {
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| AppError::new(4, format!("Invalid FRED date '{}': {e}", obs.date)))?;
        if best.is_none_or(|b| date > b.date) {
            best = Some(FredObservation { date, value });
        }
    }
    Ok(best)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
