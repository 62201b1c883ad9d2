pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::CloudflareClient;
pub use config::DeployConfig;
pub use self::core::{
    deploy::{DeployEngine, DeployOutcome, DeployPlan, DeployStage},
    retry::RetryPolicy,
};
pub use utils::error::{DeployError, Result};
