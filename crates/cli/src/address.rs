// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::node::parse_signer;
use anyhow::Result;

pub fn execute(private_key: String) -> Result<()> {
    println!("{}", parse_signer(private_key)?.address());
    Ok(())
}
