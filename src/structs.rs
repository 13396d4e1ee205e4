use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IzError {
    /// The token endpoint rejected the supplied credentials.
    #[error("authentication failed with status {status}")]
    Authentication { status: StatusCode, body: Value },
    /// Non-success response from the API. `body` holds the decoded JSON error
    /// body when the response carried one, an empty object otherwise.
    #[error("API request failed with status {status}")]
    Api { status: StatusCode, body: Value },
    /// The storage backend refused the image upload.
    #[error("storage upload failed with status {status}")]
    Storage { status: StatusCode },
    /// The poll loop gave up before the analysis completed.
    #[error("analysis still pending after {attempts} attempts")]
    PollTimeout { attempts: u32 },
    #[error("image path has no file name: {}", .0.display())]
    NoFileName(PathBuf),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

/// One form field to forward verbatim with a presigned upload.
#[derive(Deserialize, Debug, Clone)]
pub struct PresignedField {
    pub key: String,
    pub value: String,
}

/// Response of `GET /presigned-urls/{filename}`: where to put the image bytes
/// and the id under which the analysis will be filed.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub url: String,
    pub fields: Vec<PresignedField>,
    pub upload_id: String,
}

/// Subscription tier and remaining analysis balance for the account.
///
/// `tier_name` may be absent; platinum tier accounts have no upload
/// restrictions beyond API rate limits.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub tier_name: Option<String>,
    pub analysis_balance: i64,
}

/// Supported color target types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    GoldenThreadObjectLevel,
    GoldenThreadDeviceLevel,
    ColorCheckerClassic,
    ColorCheckerSg,
    #[serde(rename = "dt_next_gen_2")]
    DtNextGen2,
    #[serde(rename = "fadgi_19264")]
    Fadgi19264,
    RezChecker,
}

impl TargetType {
    /// The name the API uses for this target type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::GoldenThreadObjectLevel => "golden_thread_object_level",
            TargetType::GoldenThreadDeviceLevel => "golden_thread_device_level",
            TargetType::ColorCheckerClassic => "color_checker_classic",
            TargetType::ColorCheckerSg => "color_checker_sg",
            TargetType::DtNextGen2 => "dt_next_gen_2",
            TargetType::Fadgi19264 => "fadgi_19264",
            TargetType::RezChecker => "rez_checker",
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named reference calibration profile from the target library.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    pub name: String,
    pub target_type: TargetType,
    pub reference_data_source: String,
}

/// Results summary for one analyzed upload.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub file_path: String,
    pub passing: bool,
    pub reference_values_used: String,
    pub spec: String,
    pub target_type: String,
    pub metric_groups: Vec<MetricGroup>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MetricGroup {
    pub name: String,
    pub metrics: Vec<Metric>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub name: String,
    pub stars: u8,
    pub is_passing: bool,
}

/// Pacing for [wait_for_summary_with](crate::wait_for_summary_with).
///
/// The default matches the API examples: one request every 5 seconds, no
/// attempt limit. Set `max_attempts` to bound the loop; the poll then fails
/// with [IzError::PollTimeout] once the limit is reached.
#[derive(Debug, Clone)]
pub struct PollParams {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for PollParams {
    fn default() -> Self {
        PollParams {
            interval: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}
