// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod counter_node;
mod counter_node_builder;
mod keys;

pub use counter_node::*;
pub use counter_node_builder::*;
pub use keys::*;
