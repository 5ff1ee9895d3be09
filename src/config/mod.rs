pub mod config_loader;
pub mod config_model;
pub mod error;

pub use config_model::Settings;
pub use error::ConfigurationError;
