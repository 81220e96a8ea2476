//! Core DELIA library (config, logging, API client, response sanitizing).

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod sanitize;
