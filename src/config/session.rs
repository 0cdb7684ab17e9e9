//! Session Config

use std::path::PathBuf;

use clap::Args;

/// Session persistence settings.
#[derive(Debug, Clone, Args)]
pub struct SessionConfig {
    /// Directory holding the persisted session
    #[arg(long, env = "STOREFRONT_SESSION_DIR", default_value = ".storefront")]
    pub session_dir: PathBuf,
}
