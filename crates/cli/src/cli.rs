// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_tracing;
use crate::{address, count, decrypt, grants, update};
use anyhow::Result;
use clap::{command, ArgAction, Parser, Subcommand};
use fhc_config::validation::ValidUrl;
use fhc_config::{load_config, AppConfig};
use fhc_data::SledDb;
use tracing::{info, instrument, Level};

#[derive(Parser, Debug)]
#[command(name = "fhc")]
#[command(about = "A CLI for a confidential counter kept under fully homomorphic encryption", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `fhc -vvv` will give you
    /// trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,

    /// The node name (used for paths, logs and open telemetry)
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Set the Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    #[arg(long = "otel", global = true)]
    pub otel: Option<ValidUrl>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        let config = self.load_config()?;
        setup_tracing(&config, self.log_level())?;
        info!("Config loaded from: {:?}", config.config_file());

        let result = match self.command {
            Commands::Increment { value, private_key } => {
                update::execute(&config, update::Direction::Up, value, private_key).await
            }
            Commands::Decrement { value, private_key } => {
                update::execute(&config, update::Direction::Down, value, private_key).await
            }
            Commands::Count => count::execute(&config).await,
            Commands::Decrypt {
                private_key,
                handle,
            } => decrypt::execute(&config, private_key, handle).await,
            Commands::Grants { handle } => grants::execute(&config, handle).await,
            Commands::Address { private_key } => address::execute(private_key),
        };

        SledDb::close_all_connections();

        result
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        load_config(
            self.name.clone(),
            self.config.clone(),
            self.otel.clone().map(Into::into),
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add an encrypted amount to the counter
    Increment {
        /// Amount to add
        #[arg(long)]
        value: u32,

        /// Hex private key of the sender
        #[arg(long = "private-key", env = "FHC_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },

    /// Subtract an encrypted amount from the counter
    Decrement {
        /// Amount to subtract
        #[arg(long)]
        value: u32,

        /// Hex private key of the sender
        #[arg(long = "private-key", env = "FHC_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },

    /// Print the current encrypted count handle
    Count,

    /// Decrypt a handle the key holder has been granted
    Decrypt {
        /// Hex private key of the requester
        #[arg(long = "private-key", env = "FHC_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,

        /// Handle to decrypt. Defaults to the current count.
        #[arg(long)]
        handle: Option<String>,
    },

    /// List access grants
    Grants {
        /// Handle to inspect, defaults to the current count
        #[arg(long)]
        handle: Option<String>,
    },

    /// Print the address of a private key
    Address {
        #[arg(long = "private-key", env = "FHC_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
}
