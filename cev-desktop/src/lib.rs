//! cev-desktop - command-line client for the cev-api server
//!
//! Uploads CSV datasets, browses upload history, downloads PDF reports and
//! renders upload summaries as terminal charts.

pub mod charts;
pub mod client;
pub mod sample;
pub mod worker;

pub use client::{ApiClient, ClientConfig, ClientError, ReportDownload, DEFAULT_API_URL};
pub use worker::{UploadOutcome, UploadWorker};
