// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod acl;
mod counter_event;
mod decryption;
mod error;
mod event_id;
mod eventbus;
mod handle;
mod input;

pub use acl::*;
pub use counter_event::*;
pub use decryption::*;
pub use error::*;
pub use event_id::*;
pub use eventbus::*;
pub use handle::*;
pub use input::*;

pub mod prelude {
    pub use crate::eventbus::{BusError, ErrorEvent, Event};
}
