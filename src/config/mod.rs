//! Client configuration module

use clap::Args;

pub mod api;
pub mod observability;
pub mod session;

pub use api::ApiConfig;
pub use observability::{LogFormat, LoggingConfig};
pub use session::SessionConfig;

/// Storefront client configuration, flattened into the CLI arguments.
///
/// Every field can also be set from the environment; `main` loads `.env`
/// before parsing.
#[derive(Debug, Args)]
pub struct ClientConfig {
    /// Backend API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Session persistence settings.
    #[command(flatten)]
    pub session: SessionConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
