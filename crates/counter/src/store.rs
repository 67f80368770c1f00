// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    ArithOp, ArithmeticEngine, DeclareSlot, ReadSlot, SlotActor, SlotDirectory, UpdateSlot,
    WriteSlot,
};
use actix::{Actor, Addr};
use alloy::primitives::Address;
use anyhow::{bail, Result};
use fhc_acl::Acl;
use fhc_data::Repositories;
use fhc_events::{
    AclGrant, CiphertextHandle, CounterError, CounterEvent, CounterResult, EncryptedSlot,
    EventBus, IntegerWidth,
};
use std::collections::BTreeMap;

/// Shared by every contract store of a node. Clones point at the same slot actors.
#[derive(Clone)]
pub struct StoreContext {
    directory: Addr<SlotDirectory>,
    pub(crate) bus: Addr<EventBus<CounterEvent>>,
}

impl StoreContext {
    pub fn new(
        repositories: Repositories,
        engine: ArithmeticEngine,
        acl: Addr<Acl>,
        bus: Addr<EventBus<CounterEvent>>,
    ) -> Self {
        let directory = SlotDirectory::new(repositories, engine, acl, bus.clone()).start();
        Self { directory, bus }
    }
}

/// The encrypted slots of one contract
#[derive(Clone)]
pub struct EncryptedStateStore {
    contract: Address,
    ctx: StoreContext,
    slots: BTreeMap<String, Addr<SlotActor>>,
}

impl EncryptedStateStore {
    pub fn new(contract: Address, ctx: StoreContext) -> Self {
        Self {
            contract,
            ctx,
            slots: BTreeMap::new(),
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Bind `name` to its slot actor. The first declaration on a node restores the committed
    /// handle from storage, later ones share the running actor.
    pub async fn declare(&mut self, name: &str, width: IntegerWidth) -> Result<()> {
        if self.slots.contains_key(name) {
            bail!("Slot {} is already declared on {}", name, self.contract);
        }
        let addr = self
            .ctx
            .directory
            .send(DeclareSlot {
                contract: self.contract,
                name: name.to_string(),
                width,
            })
            .await??;
        self.slots.insert(name.to_string(), addr);
        Ok(())
    }

    fn slot(&self, name: &str) -> CounterResult<&Addr<SlotActor>> {
        self.slots.get(name).ok_or_else(|| {
            CounterError::Internal(format!("Slot {} is not declared on {}", name, self.contract))
        })
    }

    pub async fn read(&self, name: &str) -> CounterResult<EncryptedSlot> {
        Ok(self.slot(name)?.send(ReadSlot).await?)
    }

    /// Point `name` at `handle` once `grants` are durable
    pub async fn write(
        &self,
        name: &str,
        handle: CiphertextHandle,
        grants: Vec<AclGrant>,
    ) -> CounterResult<()> {
        self.slot(name)?
            .send(WriteSlot { handle, grants })
            .await?
    }

    /// Read, combine with `operand` and write as one step with respect to other mutations of
    /// the same slot
    pub async fn update(
        &self,
        name: &str,
        op: ArithOp,
        operand: CiphertextHandle,
        grants: Vec<AclGrant>,
    ) -> CounterResult<CiphertextHandle> {
        self.slot(name)?
            .send(UpdateSlot {
                op,
                operand,
                grants,
            })
            .await?
    }
}
