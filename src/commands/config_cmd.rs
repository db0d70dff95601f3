use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::{mask_secret, Config};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!(
                            "supabase_url: {}",
                            config.supabase_url.value.as_deref().unwrap_or("(not set)")
                        );
                        println!("  source: {}", config.supabase_url.source);
                        println!();

                        let key = config
                            .supabase_anon_key
                            .value
                            .as_deref()
                            .map(mask_secret)
                            .unwrap_or_else(|| "(not set)".to_string());
                        println!("supabase_anon_key: {}", key);
                        println!("  source: {}", config.supabase_anon_key.source);
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        match config.request_timeout_secs.value {
                            Some(secs) => println!("request_timeout_secs: {}", secs),
                            None => println!("request_timeout_secs: (none)"),
                        }
                        println!("  source: {}", config.request_timeout_secs.source);

                        let missing = config.missing_backend_settings();
                        if !missing.is_empty() {
                            println!("\nMissing: {}", missing.join(", "));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
