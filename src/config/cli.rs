use crate::config::toml_config::AppConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "real-estate-gems")]
#[command(about = "Find undervalued real-estate listings by ZIP code")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Search this ZIP code once, print the results and exit
    #[arg(long)]
    pub zip: Option<String>,

    /// Minimum discount to market value, in percent (10, 20, 30, 40 or 50)
    #[arg(long)]
    pub discount: Option<u8>,

    /// Keep the session (cache, last search, threshold) in this file
    #[arg(long)]
    pub session_file: Option<String>,

    /// Directory for exported reports
    #[arg(long)]
    pub output_path: Option<String>,

    /// Write the report bundle after a one-shot search
    #[arg(long, requires = "zip")]
    pub export: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    /// Loads the config file (or defaults) and applies command-line overrides.
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                AppConfig::from_file(path)?
            }
            None => AppConfig::default(),
        };

        if let Some(discount) = self.discount {
            config.view.default_discount = Some(discount);
        }
        if let Some(file) = &self.session_file {
            config.session.file = Some(file.clone());
        }
        if let Some(output_path) = &self.output_path {
            config.export.output_path = output_path.clone();
        }

        Ok(config)
    }
}
