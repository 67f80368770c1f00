// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Addr;
use alloy::primitives::Address;
use fhc_acl::{Acl, IsAuthorized};
use fhc_events::{
    CiphertextHandle, ClearValue, CounterError, CounterEvent, CounterResult, DecryptionDenied,
    DecryptionRequest, DecryptionServed, EventBus, SignedDecryptionRequest,
};
use fhc_fhe::{CiphertextRegistry, FheProvider};
use fhc_utils::run_blocking;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

/// Exports plaintext to identities the ACL allows. Never writes state.
#[derive(Clone)]
pub struct DecryptionOracle {
    acl: Addr<Acl>,
    registry: CiphertextRegistry,
    provider: Arc<dyn FheProvider>,
    timeout: Duration,
    bus: Addr<EventBus<CounterEvent>>,
}

impl DecryptionOracle {
    pub fn new(
        acl: Addr<Acl>,
        registry: CiphertextRegistry,
        provider: Arc<dyn FheProvider>,
        timeout: Duration,
        bus: Addr<EventBus<CounterEvent>>,
    ) -> Self {
        Self {
            acl,
            registry,
            provider,
            timeout,
            bus,
        }
    }

    pub async fn request(&self, request: DecryptionRequest) -> CounterResult<ClearValue> {
        let outcome = self.serve(&request).await;
        self.publish(&request, &outcome);
        outcome
    }

    /// Like [`Self::request`] but the requester proves who they are with a signature over
    /// the request digest
    pub async fn request_signed(&self, signed: SignedDecryptionRequest) -> CounterResult<ClearValue> {
        let request = &signed.request;
        let signer = signed.recover_signer().ok();
        if signer != Some(request.requester) {
            warn!(
                "Signature on decryption request for {:?} does not come from {}",
                request.handle, request.requester
            );
            let outcome = Err(unauthorized(request.handle, request.requester));
            self.publish(request, &outcome);
            return outcome;
        }
        self.request(signed.request).await
    }

    async fn serve(&self, request: &DecryptionRequest) -> CounterResult<ClearValue> {
        let handle = request.handle;
        if !self.is_authorized(handle, request.requester).await? {
            return Err(unauthorized(handle, request.requester));
        }
        if let Some(contract) = request.contract {
            if !self.is_authorized(handle, contract).await? {
                return Err(unauthorized(handle, contract));
            }
        }

        let stored = self
            .registry
            .resolve(&handle)
            .await
            .map_err(|e| CounterError::decryption_failed(format!("{e:#}")))?
            .ok_or_else(|| {
                CounterError::decryption_failed(format!("No ciphertext registered for {handle}"))
            })?;

        let provider = self.provider.clone();
        let width = stored.width;
        // the blocking task cannot be cancelled, a timeout only stops waiting for it
        let value = tokio::time::timeout(
            self.timeout,
            run_blocking(move || provider.decrypt(&stored.ciphertext, width)),
        )
        .await
        .map_err(|_| {
            CounterError::decryption_failed(format!("Provider timed out after {:?}", self.timeout))
        })?
        .map_err(|e| CounterError::decryption_failed(format!("{e:#}")))?;

        Ok(ClearValue { value, width })
    }

    async fn is_authorized(&self, handle: CiphertextHandle, grantee: Address) -> CounterResult<bool> {
        Ok(self.acl.send(IsAuthorized::new(handle, grantee)).await??)
    }

    fn publish(&self, request: &DecryptionRequest, outcome: &CounterResult<ClearValue>) {
        match outcome {
            Ok(_) => {
                info!("Decrypted {:?} for {}", request.handle, request.requester);
                self.bus.do_send(CounterEvent::from(DecryptionServed {
                    handle: request.handle,
                    requester: request.requester,
                }));
            }
            Err(err) => {
                warn!(
                    "Decryption of {:?} for {} denied: {}",
                    request.handle, request.requester, err
                );
                self.bus.do_send(CounterEvent::from(DecryptionDenied {
                    handle: request.handle,
                    requester: request.requester,
                    error: err.clone(),
                }));
            }
        }
    }
}

fn unauthorized(handle: CiphertextHandle, requester: Address) -> CounterError {
    CounterError::Unauthorized { handle, requester }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::local::PrivateKeySigner;
    use anyhow::Result;
    use fhc_acl::Grant;
    use fhc_events::{AclGrant, ErrorKind, IntegerWidth};
    use fhc_test_helpers::{
        alice, bob, events_named, CryptoFixture, SlowProvider, UnavailableProvider,
    };

    fn contract() -> Address {
        Address::repeat_byte(0xc)
    }

    fn oracle(fx: &CryptoFixture, provider: Arc<dyn FheProvider>, timeout: Duration) -> DecryptionOracle {
        DecryptionOracle::new(
            fx.acl.clone(),
            fx.registry.clone(),
            provider,
            timeout,
            fx.bus.clone(),
        )
    }

    /// A handle holding `value` granted to the contract and `user`
    async fn granted(fx: &CryptoFixture, value: u64, user: Address) -> Result<CiphertextHandle> {
        let handle = fx
            .registry
            .register(fx.fhe.encrypt(value)?.into(), IntegerWidth::Uint32, contract())
            .await?;
        fx.acl
            .send(Grant::new(
                handle,
                vec![AclGrant::contract(contract()), AclGrant::external(user)],
            ))
            .await??;
        Ok(handle)
    }

    #[actix::test]
    async fn serves_granted_requesters_only() -> Result<()> {
        let fx = CryptoFixture::new().await?;
        let oracle = oracle(&fx, fx.provider.clone(), Duration::from_secs(5));
        let alice = alice()?.address();
        let bob = bob()?.address();
        let handle = granted(&fx, 42, alice).await?;

        let clear = oracle.request(DecryptionRequest::new(handle, alice)).await?;
        assert_eq!(clear.value, 42);
        assert_eq!(clear.width, IntegerWidth::Uint32);

        let err = oracle
            .request(DecryptionRequest::new(handle, bob))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CounterError::Unauthorized {
                handle,
                requester: bob
            }
        );
        assert_eq!(events_named(&fx.bus, "DecryptionServed").await?.len(), 1);
        assert_eq!(events_named(&fx.bus, "DecryptionDenied").await?.len(), 1);
        Ok(())
    }

    #[actix::test]
    async fn ungranted_and_sentinel_handles_are_unreachable() -> Result<()> {
        let fx = CryptoFixture::new().await?;
        let oracle = oracle(&fx, fx.provider.clone(), Duration::from_secs(5));
        let alice = alice()?.address();
        let orphan = fx
            .registry
            .register(fx.fhe.encrypt(1)?.into(), IntegerWidth::Uint32, contract())
            .await?;

        for handle in [orphan, CiphertextHandle::UNINITIALIZED] {
            let err = oracle
                .request(DecryptionRequest::new(handle, alice))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthorized);
        }
        Ok(())
    }

    #[actix::test]
    async fn contract_scoped_requests_need_both_grants() -> Result<()> {
        let fx = CryptoFixture::new().await?;
        let oracle = oracle(&fx, fx.provider.clone(), Duration::from_secs(5));
        let alice = alice()?.address();
        let handle = granted(&fx, 7, alice).await?;

        let ok = oracle
            .request(DecryptionRequest::new(handle, alice).for_contract(contract()))
            .await?;
        assert_eq!(ok.value, 7);

        let err = oracle
            .request(DecryptionRequest::new(handle, alice).for_contract(Address::repeat_byte(0xd)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        Ok(())
    }

    #[actix::test]
    async fn slow_provider_times_out() -> Result<()> {
        let fx = CryptoFixture::new().await?;
        let slow = Arc::new(SlowProvider::new(fx.provider.clone(), Duration::from_millis(500)));
        let oracle = oracle(&fx, slow, Duration::from_millis(50));
        let alice = alice()?.address();
        let handle = granted(&fx, 1, alice).await?;

        let err = oracle
            .request(DecryptionRequest::new(handle, alice))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
        assert!(err.to_string().contains("timed out"));
        Ok(())
    }

    #[actix::test]
    async fn provider_failure_is_decryption_failed() -> Result<()> {
        let fx = CryptoFixture::new().await?;
        let oracle = oracle(&fx, Arc::new(UnavailableProvider), Duration::from_secs(5));
        let alice = alice()?.address();
        let handle = granted(&fx, 1, alice).await?;

        let err = oracle
            .request(DecryptionRequest::new(handle, alice))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
        assert!(err.is_recoverable());
        Ok(())
    }

    #[actix::test]
    async fn signed_requests_must_come_from_the_requester() -> Result<()> {
        let fx = CryptoFixture::new().await?;
        let oracle = oracle(&fx, fx.provider.clone(), Duration::from_secs(5));
        let alice = alice()?;
        let handle = granted(&fx, 11, alice.address()).await?;

        let request = DecryptionRequest::new(handle, alice.address());
        let signed = SignedDecryptionRequest::sign(request.clone(), &alice)?;
        assert_eq!(oracle.request_signed(signed).await?.value, 11);

        let forged = SignedDecryptionRequest::sign(request, &PrivateKeySigner::random())?;
        let err = oracle.request_signed(forged).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        Ok(())
    }
}
