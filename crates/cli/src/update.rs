// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::node::{open_node, parse_signer};
use anyhow::Result;
use fhc_config::AppConfig;

#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Up,
    Down,
}

pub async fn execute(
    config: &AppConfig,
    direction: Direction,
    value: u32,
    private_key: String,
) -> Result<()> {
    let sender = parse_signer(private_key)?.address();
    let node = open_node(config).await?;
    let counter = node.deploy_counter(config.counter_address()).await?;

    let input = node
        .client()
        .create_encrypted_input(counter.address(), sender)
        .add32(value)
        .encrypt()?;

    let handle = match direction {
        Direction::Up => counter.increment(sender, input).await?,
        Direction::Down => counter.decrement(sender, input).await?,
    };
    println!("{}", handle);

    node.shutdown().await?;
    Ok(())
}
