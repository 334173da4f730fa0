pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod provisioner;
pub mod schema;
pub mod tables;
pub mod views;

pub use client::{BigQueryClient, WarehouseApi};
pub use config::SetupConfig;
pub use error::SetupError;
pub use provisioner::Provisioner;
