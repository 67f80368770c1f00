// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{ArithOp, EncryptedStateStore, ProofVerifier, StoreContext};
use actix::Addr;
use alloy::primitives::Address;
use anyhow::Result;
use fhc_events::{
    AclGrant, CiphertextHandle, CounterEvent, CounterResult, EncryptedInput, EventBus,
    ExternalInput, InputRejected, IntegerWidth,
};
use tracing::{error, info, warn};

pub const COUNT_SLOT: &str = "count";
pub const COUNT_WIDTH: IntegerWidth = IntegerWidth::Uint32;

/// A confidential `euint32` counter.
///
/// Every successful call commits a new handle to the `count` slot that the contract itself and
/// the caller may decrypt.
#[derive(Clone)]
pub struct FheCounter {
    address: Address,
    verifier: ProofVerifier,
    store: EncryptedStateStore,
    bus: Addr<EventBus<CounterEvent>>,
}

impl FheCounter {
    /// Declare the counter state at `address`. Deploying again through the same `ctx` shares the
    /// running slot, a fresh node picks up whatever was committed before.
    pub async fn deploy(address: Address, verifier: ProofVerifier, ctx: StoreContext) -> Result<Self> {
        let bus = ctx.bus.clone();
        let mut store = EncryptedStateStore::new(address, ctx);
        store.declare(COUNT_SLOT, COUNT_WIDTH).await?;
        info!("FheCounter deployed at {}", address);
        Ok(Self {
            address,
            verifier,
            store,
            bus,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn increment(
        &self,
        sender: Address,
        input: ExternalInput,
    ) -> CounterResult<CiphertextHandle> {
        self.apply(ArithOp::Add, sender, input).await
    }

    pub async fn decrement(
        &self,
        sender: Address,
        input: ExternalInput,
    ) -> CounterResult<CiphertextHandle> {
        self.apply(ArithOp::Sub, sender, input).await
    }

    /// Current handle or the uninitialized sentinel
    pub async fn get_encrypted_handle(&self) -> CounterResult<CiphertextHandle> {
        Ok(self.store.read(COUNT_SLOT).await?.handle)
    }

    async fn apply(
        &self,
        op: ArithOp,
        sender: Address,
        input: ExternalInput,
    ) -> CounterResult<CiphertextHandle> {
        let input = EncryptedInput::bind(input, sender, self.address);
        let operand = match self.verifier.verify(input).await {
            Ok(handle) => handle,
            Err(err) => {
                warn!("Rejected {} input from {}: {}", op, sender, err);
                self.bus.do_send(CounterEvent::from(InputRejected {
                    contract: self.address,
                    submitter: sender,
                    error: err.clone(),
                }));
                return Err(err);
            }
        };

        let grants = vec![AclGrant::contract(self.address), AclGrant::external(sender)];
        self.store
            .update(COUNT_SLOT, op, operand, grants)
            .await
            .inspect_err(|err| error!("Could not {} on {}: {}", op, self.address, err))
    }
}
