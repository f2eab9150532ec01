//! Edge Service - organization-scoped action permissions and exit node peer configuration.

pub mod config;
pub mod models;
pub mod services;
pub mod startup;
