// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::slot::{SlotActor, SlotParams};
use crate::{ArithmeticEngine, SlotRepositoryFactory};
use actix::prelude::*;
use alloy::primitives::Address;
use anyhow::{anyhow, Result};
use fhc_acl::Acl;
use fhc_data::Repositories;
use fhc_events::{CounterEvent, EventBus, IntegerWidth};
use std::collections::HashMap;
use tracing::debug;

/// Start the actor for a slot, or hand back the one already running
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Addr<SlotActor>>")]
pub struct DeclareSlot {
    pub contract: Address,
    pub name: String,
    pub width: IntegerWidth,
}

/// Owns the slot actors of a store. Every persisted `(contract, slot)` has exactly one actor no
/// matter how many times its contract is deployed.
pub struct SlotDirectory {
    slots: HashMap<(Address, String), (IntegerWidth, Addr<SlotActor>)>,
    repositories: Repositories,
    engine: ArithmeticEngine,
    acl: Addr<Acl>,
    bus: Addr<EventBus<CounterEvent>>,
}

impl Actor for SlotDirectory {
    type Context = Context<Self>;
}

impl SlotDirectory {
    pub fn new(
        repositories: Repositories,
        engine: ArithmeticEngine,
        acl: Addr<Acl>,
        bus: Addr<EventBus<CounterEvent>>,
    ) -> Self {
        Self {
            slots: HashMap::new(),
            repositories,
            engine,
            acl,
            bus,
        }
    }
}

impl Handler<DeclareSlot> for SlotDirectory {
    type Result = AtomicResponse<Self, Result<Addr<SlotActor>>>;

    fn handle(&mut self, msg: DeclareSlot, _: &mut Self::Context) -> Self::Result {
        let width = msg.width;
        let key = (msg.contract, msg.name);

        if let Some((declared, addr)) = self.slots.get(&key) {
            let res = if *declared == width {
                debug!("Reusing slot {}:{}", key.0, key.1);
                Ok(addr.clone())
            } else {
                Err(anyhow!(
                    "Slot {}:{} is already running as {} and cannot be declared as {}",
                    key.0,
                    key.1,
                    declared,
                    width
                ))
            };
            return AtomicResponse::new(Box::pin(fut::ready(res)));
        }

        let params = SlotParams {
            contract: key.0,
            name: key.1.clone(),
            width,
            repository: self.repositories.slot(&key.0, &key.1),
            engine: self.engine.clone(),
            acl: self.acl.clone(),
            bus: self.bus.clone(),
        };
        AtomicResponse::new(Box::pin(SlotActor::attach(params).into_actor(self).map(
            move |res, act: &mut SlotDirectory, _| {
                let addr = res?;
                act.slots.insert(key, (width, addr.clone()));
                Ok(addr)
            },
        )))
    }
}
