// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Report the serializable state of an object
pub trait Snapshot
where
    Self: Sized,
{
    /// All the dynamic data managed within the object
    type Snapshot: Serialize + DeserializeOwned;

    fn snapshot(&self) -> Result<Self::Snapshot>;
}

/// Rebuild an object from its snapshot plus runtime parameters that are not persisted
#[async_trait]
pub trait FromSnapshotWithParams: Snapshot {
    type Params: Send + 'static;

    async fn from_snapshot(params: Self::Params, snapshot: Self::Snapshot) -> Result<Self>;
}
