// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod contract;
mod directory;
mod engine;
mod repo;
mod slot;
mod store;
mod verifier;

pub use contract::*;
pub use directory::*;
pub use engine::*;
pub use repo::*;
pub use slot::*;
pub use store::*;
pub use verifier::*;
