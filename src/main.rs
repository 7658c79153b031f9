use clap::Parser;
use email_intel::core::table;
use email_intel::utils::{logger, validation::Validate};
use email_intel::{
    create_generator, Batch, CliConfig, ClassifyEngine, EmailIntelError, EmailPipeline,
    LocalStorage,
};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🤖 Starting email-intel");

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(config: CliConfig) -> Result<(), EmailIntelError> {
    config.validate()?;
    let settings = config.provider.provider_settings()?;
    if config.verbose {
        tracing::debug!("Provider settings: {:?}", settings);
    }

    let preview = config.preview;
    let generator = create_generator(settings)?;
    let pipeline = EmailPipeline::new(LocalStorage::new("."), config, generator);
    let engine = ClassifyEngine::new(pipeline);

    let report = engine.run().await?;

    println!("{}", "=".repeat(60));
    println!("✨ Analysis completed!");
    println!("📊 Results saved to: {}", report.output_path);
    println!("{}", "=".repeat(60));
    print_preview(&report.batch, preview)?;

    Ok(())
}

fn print_preview(batch: &Batch, count: usize) -> Result<(), EmailIntelError> {
    if count == 0 || batch.is_empty() {
        return Ok(());
    }

    println!("\n📋 Results preview:\n");
    for item in batch.items.iter().take(count) {
        println!("From: {}", item.record.sender);
        println!("Subject: {}", item.record.subject);
        println!("Analysis:\n{}\n", table::analysis_text(&item.result)?);
        println!("{}\n", "-".repeat(60));
    }
    Ok(())
}
