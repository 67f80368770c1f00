// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{find_in_parent, resolve_config_path};
use crate::yaml::load_yaml_with_env;
use alloy_primitives::{address, Address};
use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_CONFIG_NAME: &str = "fhc.config.yaml";
pub const DEFAULT_NODE_NAME: &str = "_default";
const ENV_PREFIX: &str = "FHC_";

/// BFV parameter set shared by every encrypted width
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FheConfig {
    pub degree: usize,
    pub plaintext_modulus: u64,
    pub moduli: Vec<u64>,
}

impl Default for FheConfig {
    fn default() -> Self {
        Self {
            degree: 2048,
            plaintext_modulus: 1 << 32,
            moduli: vec![0x3FFFFFFF000001, 0x7fffffffe0001],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InputVerifierConfig {
    /// Distinct trusted attestations an input proof must carry
    pub threshold: usize,
    /// Trusted attestor addresses. Empty means only the node's own attestor is trusted.
    pub signers: Vec<Address>,
}

impl Default for InputVerifierConfig {
    fn default() -> Self {
        Self {
            threshold: 1,
            signers: vec![],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DecryptionConfig {
    pub timeout_ms: u64,
}

impl Default for DecryptionConfig {
    fn default() -> Self {
        Self { timeout_ms: 5_000 }
    }
}

/// The config used throughout the app
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// The name of the node, used for paths and logs
    name: String,
    /// Root for node data. Defaults to the OS data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    data_dir: Option<PathBuf>,
    /// Database location relative to the node data dir
    db_file: PathBuf,
    /// Keep everything in memory
    in_mem_store: bool,
    /// Chain id bound into handles and input proofs
    chain_id: u64,
    /// Address of the counter contract managed by this node
    counter_address: Address,
    fhe: FheConfig,
    input_verifier: InputVerifierConfig,
    decryption: DecryptionConfig,
    /// Open Telemetry collector grpc endpoint. Eg. http://127.0.0.1:4317
    #[serde(skip_serializing_if = "Option::is_none")]
    otel: Option<String>,
    /// Where the config was loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NODE_NAME.to_string(),
            data_dir: None,
            db_file: PathBuf::from("db"),
            in_mem_store: false,
            chain_id: 31337,
            counter_address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
            fhe: FheConfig::default(),
            input_verifier: InputVerifierConfig::default(),
            decryption: DecryptionConfig::default(),
            otel: None,
            config_file: None,
        }
    }
}

impl AppConfig {
    pub fn name(&self) -> String {
        self.name.clone()
    }

    /// Data directory of this node
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(OsDirs::data_dir)
            .join(&self.name)
    }

    pub fn db_file(&self) -> PathBuf {
        if self.db_file.is_absolute() {
            return self.db_file.clone();
        }
        self.data_dir().join(&self.db_file)
    }

    pub fn use_in_mem_store(&self) -> bool {
        self.in_mem_store
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn counter_address(&self) -> Address {
        self.counter_address
    }

    pub fn fhe(&self) -> &FheConfig {
        &self.fhe
    }

    pub fn input_verifier(&self) -> &InputVerifierConfig {
        &self.input_verifier
    }

    pub fn decryption_timeout(&self) -> Duration {
        Duration::from_millis(self.decryption.timeout_ms)
    }

    pub fn otel(&self) -> Option<String> {
        self.otel.clone()
    }

    pub fn config_file(&self) -> Option<PathBuf> {
        self.config_file.clone()
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Could not serialize configuration")
    }

    fn validate(self) -> Result<Self> {
        if self.input_verifier.threshold == 0 {
            bail!("input_verifier.threshold must be at least 1");
        }
        if !self.input_verifier.signers.is_empty()
            && self.input_verifier.threshold > self.input_verifier.signers.len()
        {
            bail!(
                "input_verifier.threshold ({}) exceeds the number of trusted signers ({})",
                self.input_verifier.threshold,
                self.input_verifier.signers.len()
            );
        }
        if self.decryption.timeout_ms == 0 {
            bail!("decryption.timeout_ms must be greater than zero");
        }
        Ok(self)
    }
}

/// Values passed from the cli that override every other source
#[derive(Debug, Deserialize, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    otel: Option<String>,
    config_file: PathBuf,
}

/// Load configuration layering defaults, the yaml file, `FHC_` environment variables and cli
/// overrides. Nested keys use a double underscore, eg. `FHC_DECRYPTION__TIMEOUT_MS`.
pub fn load_config(
    name: Option<String>,
    cli_config_file: Option<String>,
    otel: Option<String>,
) -> Result<AppConfig> {
    let cli_config_file = cli_config_file.map(PathBuf::from);

    let resolved_config_path = resolve_config_path(
        find_in_parent,
        env::current_dir()?,
        OsDirs::config_dir(),
        DEFAULT_CONFIG_NAME,
        cli_config_file,
    );

    let loaded_yaml = load_yaml_with_env(&resolved_config_path)?;

    let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Yaml::string(&loaded_yaml))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(CliOverrides {
            name,
            otel,
            config_file: resolved_config_path,
        }))
        .extract()
        .context("Could not parse configuration")?;

    config.validate()
}

pub struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fhc")
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fhc")
    }
}
