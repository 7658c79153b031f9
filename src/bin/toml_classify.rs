use clap::Parser;
use email_intel::config::toml_config::TomlConfig;
use email_intel::config::ConfigProvider;
use email_intel::core::table;
use email_intel::domain::ports::Storage;
use email_intel::utils::{logger, validation::Validate};
use email_intel::{create_generator, ClassifyEngine, EmailIntelError, EmailPipeline, LocalStorage};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "toml-classify")]
#[command(about = "Classify a CSV of emails using a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "email-intel.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Validate the configuration and read the input without calling the provider
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = run(config, args.dry_run).await {
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

async fn run(config: TomlConfig, dry_run: bool) -> Result<(), EmailIntelError> {
    config.validate()?;
    let settings = config.provider_settings()?;
    tracing::info!("✅ Configuration validated");

    display_config_summary(&config, dry_run);

    if dry_run {
        return perform_dry_run(&config).await;
    }

    let preview = config.preview();
    let generator = create_generator(settings)?;
    let pipeline = EmailPipeline::new(LocalStorage::new("."), config, generator);
    let report = ClassifyEngine::new(pipeline).run().await?;

    println!("✨ Analysis completed!");
    println!("📊 Results saved to: {}", report.output_path);
    for item in report.batch.items.iter().take(preview) {
        println!("\nFrom: {}", item.record.sender);
        println!("{}", table::analysis_text(&item.result)?);
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, dry_run: bool) {
    let options = config.batch_options();

    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_file());
    println!("  Output: {}/{}", config.output_path(), config.output_file());
    println!("  Layout: {:?}", config.layout());
    println!("  Provider: {}", config.provider.kind);
    println!(
        "  Model: {}",
        config
            .provider
            .model
            .as_deref()
            .unwrap_or_else(|| config.provider.kind.default_model())
    );
    println!("  Delay between calls: {:?}", options.delay);
    println!(
        "  Retries: {} (delay {:?})",
        options.retry_attempts, options.retry_delay
    );

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig) -> Result<(), EmailIntelError> {
    let storage = LocalStorage::new(".");
    let data = storage
        .read_file(config.input_file())
        .await
        .map_err(|e| e.reading_input(config.input_file()))?;
    let records = table::read_records(&data)?;

    let options = config.batch_options();
    let pauses = records.len().saturating_sub(1);

    println!("🔍 Dry Run Analysis:");
    println!("  📧 Emails to classify: {}", records.len());
    println!("  📡 Provider calls (without retries): {}", records.len());
    match pacing_time(options.delay, pauses) {
        Some(total) => println!("  ⏱️ Minimum pacing time: {:?}", total),
        None => println!(
            "  ⏱️ Minimum pacing time: {} pauses of {:?}",
            pauses, options.delay
        ),
    }
    println!();
    println!("✅ Dry run complete. No provider calls were made.");

    Ok(())
}

/// Total delay for `pauses` inter-call waits, or `None` if it does not fit a `Duration`.
fn pacing_time(delay: Duration, pauses: usize) -> Option<Duration> {
    u32::try_from(pauses)
        .ok()
        .and_then(|pauses| delay.checked_mul(pauses))
}
