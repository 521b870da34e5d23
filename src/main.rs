use clap::Parser;
use geoeval::core::evaluator;
use geoeval::utils::{logger, validation::Validate};
use geoeval::{CliConfig, EvalConfig, Evaluation, Expression, HttpComputeService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose);

    tracing::info!("Starting geoeval CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let (service, max_attempts) = match &cli.config {
        Some(path) => {
            let config = EvalConfig::from_file(path)?;
            config.validate()?;
            (
                HttpComputeService::from_config(&config.service),
                config.max_attempts(),
            )
        }
        None => (
            HttpComputeService::new(cli.endpoint.clone()),
            cli.max_attempts,
        ),
    };

    let source = std::fs::read_to_string(&cli.expression)?;
    let expression = Expression::new(serde_json::from_str(&source)?);

    match evaluator::get_info(&service, &expression, max_attempts).await? {
        Evaluation::Completed(value) => {
            tracing::info!("Evaluation completed");
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Evaluation::Exhausted(value) => {
            tracing::warn!("Retries exhausted; printing the last result");
            println!("{}", serde_json::to_string_pretty(&value)?);
            std::process::exit(2);
        }
    }

    Ok(())
}
