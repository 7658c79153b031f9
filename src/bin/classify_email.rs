use clap::Parser;
use email_intel::utils::logger;
use email_intel::{
    create_generator, BatchClassifier, BatchOptions, EmailIntelError, InputRecord, ProviderArgs,
};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "classify-email")]
#[command(about = "Classify a single email and print the result as JSON")]
struct Args {
    /// Sender address
    #[arg(long)]
    from: String,

    #[arg(long, default_value = "")]
    subject: String,

    /// Email content
    #[arg(long)]
    body: String,

    #[command(flatten)]
    provider: ProviderArgs,

    #[arg(long, default_value_t = 0)]
    retry_attempts: u32,

    #[arg(long, default_value_t = email_intel::config::DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(args).await {
        tracing::error!("❌ {} ({:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(args: Args) -> Result<(), EmailIntelError> {
    let settings = args.provider.provider_settings()?;
    let options = BatchOptions {
        retry_attempts: args.retry_attempts,
        retry_delay: Duration::from_millis(args.retry_delay_ms),
        ..BatchOptions::immediate()
    };
    email_intel::utils::validation::Validate::validate(&options)?;

    let classifier = BatchClassifier::new(create_generator(settings)?, options);
    let record = InputRecord::new(args.from, args.subject, args.body);

    tracing::info!("🔍 Analyzing email from {}...", record.sender);
    let result = classifier.classify_one(&record).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
