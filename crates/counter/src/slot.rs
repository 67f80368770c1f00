// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{ArithOp, ArithmeticEngine, EvalContext};
use actix::prelude::*;
use alloy::primitives::Address;
use anyhow::{bail, Result};
use fhc_acl::{Acl, Grant};
use fhc_data::Repository;
use fhc_events::{
    AclGrant, CiphertextHandle, CounterError, CounterEvent, CounterResult, EncryptedSlot,
    EventBus, HandleCommitted, IntegerWidth,
};
use tracing::info;

#[derive(Message, Clone, Debug)]
#[rtype(result = "EncryptedSlot")]
pub struct ReadSlot;

/// Replace the slot handle with an already registered handle of the slot width
#[derive(Message, Clone, Debug)]
#[rtype(result = "CounterResult<()>")]
pub struct WriteSlot {
    pub handle: CiphertextHandle,
    pub grants: Vec<AclGrant>,
}

/// Combine the current handle with `operand` and commit the result
#[derive(Message, Clone, Debug)]
#[rtype(result = "CounterResult<CiphertextHandle>")]
pub struct UpdateSlot {
    pub op: ArithOp,
    pub operand: CiphertextHandle,
    pub grants: Vec<AclGrant>,
}

/// One named encrypted slot of a contract.
///
/// Mutations are atomic handlers so the mailbox applies them one at a time: each one sees the
/// handle committed by the previous one. Slots are separate actors and never wait on each other.
pub struct SlotActor {
    contract: Address,
    name: String,
    slot: EncryptedSlot,
    repository: Repository<EncryptedSlot>,
    engine: ArithmeticEngine,
    acl: Addr<Acl>,
    bus: Addr<EventBus<CounterEvent>>,
}

impl Actor for SlotActor {
    type Context = Context<Self>;
}

pub(crate) struct SlotParams {
    pub contract: Address,
    pub name: String,
    pub width: IntegerWidth,
    pub repository: Repository<EncryptedSlot>,
    pub engine: ArithmeticEngine,
    pub acl: Addr<Acl>,
    pub bus: Addr<EventBus<CounterEvent>>,
}

impl SlotActor {
    /// Load the slot from its repository, or start it uninitialized
    pub(crate) async fn attach(params: SlotParams) -> Result<Addr<Self>> {
        let slot = params
            .repository
            .read_or(EncryptedSlot::uninitialized(params.width))
            .await?;
        if slot.width != params.width {
            bail!(
                "Slot {}:{} is stored as {} but declared as {}",
                params.contract,
                params.name,
                slot.width,
                params.width
            );
        }
        info!(
            "Slot {}:{} ready ({}, {:?})",
            params.contract, params.name, slot.width, slot.handle
        );
        Ok(SlotActor {
            contract: params.contract,
            name: params.name,
            slot,
            repository: params.repository,
            engine: params.engine,
            acl: params.acl,
            bus: params.bus,
        }
        .start())
    }

    fn commit(
        &self,
        next: impl std::future::Future<Output = CounterResult<CiphertextHandle>> + 'static,
        grants: Vec<AclGrant>,
    ) -> ResponseActFuture<Self, CounterResult<CiphertextHandle>> {
        let acl = self.acl.clone();
        let repository = self.repository.clone();
        let width = self.slot.width;

        Box::pin(
            async move {
                let handle = next.await?;
                // grants must be durable before the slot points at the handle
                acl.send(Grant::new(handle, grants)).await??;
                let slot = EncryptedSlot { handle, width };
                repository.write_sync(&slot).await?;
                Ok::<_, CounterError>(slot)
            }
            .into_actor(self)
            .map(|res, act: &mut SlotActor, _| {
                let slot = res?;
                act.slot = slot;
                info!("Committed {}:{} = {:?}", act.contract, act.name, slot.handle);
                act.bus.do_send(CounterEvent::from(HandleCommitted {
                    contract: act.contract,
                    slot: act.name.clone(),
                    handle: slot.handle,
                }));
                Ok(slot.handle)
            }),
        )
    }
}

impl Handler<ReadSlot> for SlotActor {
    type Result = EncryptedSlot;

    fn handle(&mut self, _: ReadSlot, _: &mut Self::Context) -> Self::Result {
        self.slot
    }
}

impl Handler<WriteSlot> for SlotActor {
    type Result = AtomicResponse<Self, CounterResult<()>>;

    fn handle(&mut self, msg: WriteSlot, _: &mut Self::Context) -> Self::Result {
        let width = self.slot.width;
        let handle = msg.handle;
        let checked = async move {
            if handle.is_uninitialized() {
                return Err(CounterError::malformed(
                    "A slot cannot go back to uninitialized",
                ));
            }
            match handle.width() {
                Some(found) if found == width => Ok(handle),
                Some(found) => Err(CounterError::WidthMismatch {
                    expected: width,
                    found,
                }),
                None => Err(CounterError::malformed(format!(
                    "{handle} does not carry a known width"
                ))),
            }
        };
        AtomicResponse::new(Box::pin(
            self.commit(checked, msg.grants)
                .map(|res, _, _| res.map(|_| ())),
        ))
    }
}

impl Handler<UpdateSlot> for SlotActor {
    type Result = AtomicResponse<Self, CounterResult<CiphertextHandle>>;

    fn handle(&mut self, msg: UpdateSlot, _: &mut Self::Context) -> Self::Result {
        let engine = self.engine.clone();
        let ctx = EvalContext::new(self.contract, self.slot.width);
        let current = self.slot.handle;
        let next = async move { engine.eval(msg.op, &ctx, current, msg.operand).await };
        AtomicResponse::new(self.commit(next, msg.grants))
    }
}
