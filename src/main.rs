use clap::Parser;
use real_estate_gems::app::Shell;
use real_estate_gems::domain::ports::SessionStore;
use real_estate_gems::utils::error::ErrorSeverity;
use real_estate_gems::utils::{logger, validation::Validate};
use real_estate_gems::{
    AppConfig, CliArgs, FileSessionStore, GeminiClient, GemsError, ListingFetcher, LocalStorage,
    MemoryStore, ReportExporter, SearchSession,
};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🏠 Starting real-estate-gems");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = run(&args).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(args: &CliArgs) -> Result<(), GemsError> {
    let config = args.load_config()?;
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    match config.session.file.clone() {
        Some(path) => {
            tracing::info!("📁 Using session file: {}", path);
            run_with_store(args, &config, FileSessionStore::open(&path)?).await
        }
        None => run_with_store(args, &config, MemoryStore::new()).await,
    }
}

async fn run_with_store<S>(args: &CliArgs, config: &AppConfig, store: S) -> Result<(), GemsError>
where
    S: SessionStore + Clone,
{
    let api_key = config.resolve_api_key();
    if api_key.is_none() {
        tracing::warn!("No Gemini API key configured; only cached searches will work");
    }

    let backend = GeminiClient::new(&config.gemini, api_key)?;
    let fetcher = ListingFetcher::new(backend, store.clone());
    let session = SearchSession::restore(store, &config.session.prefix);
    if let Some(level) = config.default_discount()? {
        session.apply_default_discount(level);
    }
    let exporter = ReportExporter::new(LocalStorage::new(config.export.output_path.clone()));
    let shell = Shell::new(session, fetcher, exporter);

    let mut stdout = std::io::stdout();

    if let Some(zip) = &args.zip {
        shell.search(zip, &mut stdout).await?;
        if shell.session().error().is_some() {
            std::process::exit(2);
        }
        if args.export {
            shell.export(&mut stdout).await?;
        }
        return Ok(());
    }

    shell.resume(&mut stdout).await?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell.run(stdin, &mut stdout).await
}
