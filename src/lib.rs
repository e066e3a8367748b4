pub mod app;
pub mod app_state;
pub mod config;
pub mod error;
pub mod health;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod presenter;
pub mod service;
pub mod telemetry;
pub mod topology;
pub mod upstream;
