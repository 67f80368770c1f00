// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::node::{open_node, parse_signer};
use anyhow::Result;
use fhc_config::AppConfig;
use fhc_events::{CiphertextHandle, DecryptionRequest, SignedDecryptionRequest};

pub async fn execute(config: &AppConfig, private_key: String, handle: Option<String>) -> Result<()> {
    let signer = parse_signer(private_key)?;
    let node = open_node(config).await?;
    let counter = node.deploy_counter(config.counter_address()).await?;

    let handle = match handle {
        Some(raw) => raw.parse::<CiphertextHandle>()?,
        None => counter.get_encrypted_handle().await?,
    };

    let request =
        DecryptionRequest::new(handle, signer.address()).for_contract(counter.address());
    let signed = SignedDecryptionRequest::sign(request, &signer)?;
    let clear = node.oracle().request_signed(signed).await?;
    println!("{}", clear.value);

    node.shutdown().await?;
    Ok(())
}
