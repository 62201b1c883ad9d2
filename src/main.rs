use clap::Parser;
use pages_deploy::config::process_env;
use pages_deploy::core::report;
use pages_deploy::utils::{logger, validation::Validate};
use pages_deploy::{Cli, CloudflareClient, DeployConfig, DeployEngine, DeployError, RetryPolicy};
use std::process::ExitCode;

fn report_failure(e: &DeployError) {
    tracing::error!(
        "❌ Deployment failed: {} (Category: {:?})",
        e,
        e.category()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
}

/// A missing .env file is normal; one that cannot be parsed is a configuration error.
fn check_env_file(loaded: dotenvy::Result<std::path::PathBuf>) -> pages_deploy::Result<()> {
    match loaded {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(DeployError::Config {
            message: format!("could not read .env file: {}", e),
        }),
    }
}

async fn execute(cli: &Cli) -> pages_deploy::Result<()> {
    let config_path = cli.config_path();
    if let Some(path) = &config_path {
        tracing::info!("📁 Loading configuration from: {}", path.display());
    }

    let config = DeployConfig::load(config_path.as_deref(), &process_env)?;
    config.validate()?;
    if cli.verbose {
        tracing::debug!("Deploy config: {:?}", config);
    }

    let client = CloudflareClient::new(&config.api, RetryPolicy::from(&config.retry))?;
    let mut engine = DeployEngine::new(client, config.descriptor());

    if cli.dry_run {
        let plan = engine.plan().await?;
        println!("\n{}", report::format_plan(&plan)?);
        return Ok(());
    }

    let outcome = engine.run().await?;
    report::print_summary(&outcome);
    tracing::info!(
        project = %outcome.project.name,
        account = %outcome.account.id,
        stage = %engine.stage(),
        "Provisioning finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_file = dotenvy::dotenv();

    let cli = Cli::parse();
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    report::print_banner();

    let outcome = match check_env_file(env_file) {
        Ok(()) => execute(&cli).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}
