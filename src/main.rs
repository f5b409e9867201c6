use clap::Parser;
use tabcast::utils::{logger, validation::Validate};
use tabcast::{CliConfig, Converter, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting tabcast");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let key = config.conversion_key();
    let storage = LocalStorage::new(config.output_path.clone());
    let converter = Converter::new(storage.clone(), storage);

    match converter.convert_keyed(&key, &config.input).await {
        Ok(receipt) => {
            tracing::info!(
                "converted {} records, saved as {}",
                receipt.rows,
                receipt.filename
            );
            println!("✅ File converted successfully!");
            println!("📁 Saved as: {}", receipt.filename);
        }
        Err(e) => {
            tracing::error!("conversion failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
