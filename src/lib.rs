pub mod cli;
pub mod configuration;
pub mod connectors;
pub mod forms;
pub mod models;
pub mod services;
pub mod session;
pub mod telemetry;
