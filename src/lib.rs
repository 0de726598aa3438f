pub mod app_state;
pub mod configuration;
pub mod domain;
pub mod mail_exchange;
pub mod prompt;
pub mod routes;
pub mod startup;
pub mod store;
pub mod subscription_service;
pub mod telemetry;
