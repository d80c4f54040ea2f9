//! Config CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::adapters::substrates::ProviderRegistry;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration with API keys redacted
    Show,

    /// List the available completion backends
    Providers,
}

#[derive(Debug, Serialize)]
pub struct ConfigShowOutput {
    #[serde(flatten)]
    pub config: Config,
}

impl CommandOutput for ConfigShowOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ProvidersOutput {
    pub providers: Vec<&'static str>,
}

impl CommandOutput for ProvidersOutput {
    fn to_human(&self) -> String {
        self.providers.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let out = ConfigShowOutput {
                config: ConfigLoader::redacted(config),
            };
            output(&out, json_mode);
        }
        ConfigCommands::Providers => {
            let out = ProvidersOutput {
                providers: ProviderRegistry::available_types(),
            };
            output(&out, json_mode);
        }
    }
    Ok(())
}
