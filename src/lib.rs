//! MOTAC Integrated Resource Management server
//!
//! REST JSON API for ministry resource workflows: email / user-account
//! provisioning applications, ICT equipment loans with physical issuance
//! tracking, and fingerprint attendance import/export.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod importer;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;
pub mod workflow;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
