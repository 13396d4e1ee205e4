//! # imagezebra_rs
//! ## Before you begin
//! This library is intended to be used with the ImageZebra API. To use this library, you must have
//! an application key and a user account for the ImageZebra service.
//!
//! Both can be obtained by registering at [ImageZebra](https://imagezebra.com/).
//!
//! ## Description
//! **imagezebra_rs** is a client library in Rust for interacting with the ImageZebra API, an image
//! quality analysis service. This library provides functionality for uploading images for
//! analysis, polling for the resulting quality summaries, and managing the library of named
//! reference targets that parameterize an analysis.
//!
//! The primary interaction with the API involves two steps:
//!
//! 1. Uploading an image for analysis using the [upload_and_analyze()] function, which obtains a
//!    presigned storage location, transfers the image bytes there, and registers the upload.
//! 2. Fetching the resulting summary using the [get_summary()], [wait_for_summary()], or
//!    [wait_for_summary_with()] functions.
//!
//! The library provides a variety of structs and enums to support these interactions, including:
//!
//! * [IzClient] and [Credentials] for authenticated access to the API.
//! * [PollParams] for pacing the result poll loop.
//! * [TargetType] for the closed set of supported color target types.
//! * [AnalysisSummary], [MetricGroup], and [Metric] for the analysis results.
//!
//! Additionally, the [list_targets()], [find_by_name()], [create_target()], and [delete_target()]
//! functions manage the account's target library.
//!
//! This library aims to make it easy to integrate the ImageZebra image analysis service into Rust
//! applications.
//!
//! ## Example
//! The following example demonstrates how to upload an image to the ImageZebra API and fetch the
//! resulting analysis summary.
//! ```rust no_run
//! use std::env;
//! use std::path::Path;
//!
//! use imagezebra_rs::{Credentials, IzClient};
//!
//! #[tokio::main]
//! pub async fn main() {
//!     let credentials = Credentials {
//!         application_key: env::var("IMAGEZEBRA_APPLICATION_KEY").unwrap(),
//!         username: env::var("IMAGEZEBRA_USERNAME").unwrap(),
//!         password: env::var("IMAGEZEBRA_PASSWORD").unwrap(),
//!     };
//!
//!     let client = match IzClient::connect(&credentials).await {
//!         Ok(client) => client,
//!         Err(e) => panic!("Error: {}", e),
//!     };
//!
//!     let upload_id = match imagezebra_rs::upload_and_analyze(&client, Path::new("scan.jpg"), None).await {
//!         Ok(upload_id) => upload_id,
//!         Err(e) => panic!("Error: {}", e),
//!     };
//!
//!     let summary = match imagezebra_rs::wait_for_summary(&client, &upload_id).await {
//!         Ok(summary) => summary,
//!         Err(e) => panic!("Error: {}", e),
//!     };
//!     println!("Passing quality thresholds: {}", summary.passing);
//! }
//! ```

mod client;
mod results;
mod structs;
mod targets;
mod upload;

pub use client::{Credentials, IzClient, BASE_URL};
pub use results::{get_summary, wait_for_summary, wait_for_summary_with};
pub use structs::{
    AnalysisSummary, IzError, Metric, MetricGroup, PollParams, PresignedField, PresignedUpload,
    Target, TargetType, UserData,
};
pub use targets::{create_target, delete_target, find_by_name, list_targets};
pub use upload::upload_and_analyze;
