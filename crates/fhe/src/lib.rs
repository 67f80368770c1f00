// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod client;
mod fhe;
mod proof;
mod provider;
mod registry;
mod repo;

pub use client::*;
pub use fhe::*;
pub use proof::*;
pub use provider::*;
pub use registry::*;
pub use repo::*;
