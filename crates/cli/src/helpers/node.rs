// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use fhc_config::AppConfig;
use fhc_node::{CounterNode, CounterNodeBuilder};
use std::str::FromStr;
use zeroize::Zeroizing;

/// Build the local node described by the config
pub async fn open_node(config: &AppConfig) -> Result<CounterNode> {
    CounterNodeBuilder::from_config(config)
        .with_logging(&config.name())
        .build()
        .await
}

/// Parse a hex private key. The raw string is wiped once parsed.
pub fn parse_signer(key: String) -> Result<PrivateKeySigner> {
    let key = Zeroizing::new(key);
    PrivateKeySigner::from_str(key.trim_start_matches("0x")).context("Invalid private key")
}
