// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::node::open_node;
use anyhow::Result;
use fhc_acl::GetGrants;
use fhc_config::AppConfig;
use fhc_events::CiphertextHandle;

pub async fn execute(config: &AppConfig, handle: Option<String>) -> Result<()> {
    let node = open_node(config).await?;
    let handle = match handle {
        Some(raw) => raw.parse::<CiphertextHandle>()?,
        None => {
            let counter = node.deploy_counter(config.counter_address()).await?;
            counter.get_encrypted_handle().await?
        }
    };

    let entries = node.acl().send(GetGrants { handle }).await??;
    if entries.is_empty() {
        println!("No grants");
    }
    for entry in entries {
        println!("{}", entry);
    }

    node.shutdown().await?;
    Ok(())
}
