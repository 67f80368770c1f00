// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::node::open_node;
use anyhow::Result;
use fhc_config::AppConfig;

pub async fn execute(config: &AppConfig) -> Result<()> {
    let node = open_node(config).await?;
    let counter = node.deploy_counter(config.counter_address()).await?;
    println!("{}", counter.get_encrypted_handle().await?);

    node.shutdown().await?;
    Ok(())
}
