// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{address, Address};
use anyhow::Result;
use fhc_acl::{GetGrants, IsAuthorized};
use fhc_counter::{ArithmeticEngine, FheCounter, ProofVerifier, StoreContext};
use fhc_data::SledDb;
use fhc_events::{
    CiphertextHandle, CounterError, DecryptionRequest, ExternalInput, IntegerWidth,
    SignedDecryptionRequest,
};
use fhc_node::{CounterNode, CounterNodeBuilder};
use fhc_oracle::DecryptionOracle;
use fhc_test_helpers::{
    alice, bob, events_named, init_test_tracing, seeded_rng, CryptoFixture, SlowProvider,
};
use std::{sync::Arc, time::Duration};
use tempfile::tempdir;

const COUNTER: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
const OTHER_COUNTER: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");

async fn test_node() -> Result<CounterNode> {
    CounterNodeBuilder::new(seeded_rng(42))
        .testmode_with_history()
        .build()
        .await
}

fn input32(node: &CounterNode, contract: Address, user: Address, value: u32) -> Result<ExternalInput> {
    node.client()
        .create_encrypted_input(contract, user)
        .add32(value)
        .encrypt()
}

async fn decrypt_as(node: &CounterNode, handle: CiphertextHandle, user: Address) -> Result<u64> {
    Ok(node
        .oracle()
        .request(DecryptionRequest::new(handle, user))
        .await?
        .value)
}

#[actix::test]
async fn test_counter_lifecycle() -> Result<()> {
    init_test_tracing();
    let node = test_node().await?;
    let alice = alice()?.address();
    let counter = node.deploy_counter(COUNTER).await?;

    // A fresh counter has no ciphertext behind it
    assert!(counter.get_encrypted_handle().await?.is_uninitialized());

    let h1 = counter
        .increment(alice, input32(&node, COUNTER, alice, 1)?)
        .await?;
    assert_eq!(counter.get_encrypted_handle().await?, h1);
    assert_eq!(decrypt_as(&node, h1, alice).await?, 1);

    let h2 = counter
        .decrement(alice, input32(&node, COUNTER, alice, 1)?)
        .await?;
    assert_ne!(h1, h2);
    assert_eq!(decrypt_as(&node, h2, alice).await?, 0);

    // Both the contract and the sender hold a grant on each committed handle
    for handle in [h1, h2] {
        assert!(node.acl().send(IsAuthorized::new(handle, COUNTER)).await??);
        assert!(node.acl().send(IsAuthorized::new(handle, alice)).await??);
    }
    let grants = node.acl().send(GetGrants { handle: h2 }).await??;
    assert_eq!(grants.len(), 2);

    assert_eq!(events_named(node.bus(), "HandleCommitted").await?.len(), 2);
    assert_eq!(events_named(node.bus(), "DecryptionServed").await?.len(), 2);
    Ok(())
}

#[actix::test]
async fn test_signed_decryption_round_trip() -> Result<()> {
    let node = test_node().await?;
    let alice = alice()?;
    let counter = node.deploy_counter(COUNTER).await?;

    let handle = counter
        .increment(alice.address(), input32(&node, COUNTER, alice.address(), 42)?)
        .await?;

    let request = DecryptionRequest::new(handle, alice.address()).for_contract(COUNTER);
    let signed = SignedDecryptionRequest::sign(request, &alice)?;
    assert_eq!(node.oracle().request_signed(signed).await?.value, 42);

    // Bob signing on behalf of alice is refused
    let forged = SignedDecryptionRequest::sign(
        DecryptionRequest::new(handle, alice.address()),
        &bob()?,
    )?;
    let err = node.oracle().request_signed(forged).await.unwrap_err();
    assert!(matches!(err, CounterError::Unauthorized { .. }));
    Ok(())
}

#[actix::test]
async fn test_concurrent_increments_are_serialized() -> Result<()> {
    let node = test_node().await?;
    let alice = alice()?.address();
    let bob = bob()?.address();
    let counter = node.deploy_counter(COUNTER).await?;

    let a = input32(&node, COUNTER, alice, 1)?;
    let b = input32(&node, COUNTER, bob, 2)?;
    let (ra, rb) = futures::join!(counter.increment(alice, a), counter.increment(bob, b));
    let (ha, hb) = (ra?, rb?);
    assert_ne!(ha, hb);

    // Whichever applied last sees the other's update
    let last = counter.get_encrypted_handle().await?;
    assert!(last == ha || last == hb);
    let owner = if last == ha { alice } else { bob };
    assert_eq!(decrypt_as(&node, last, owner).await?, 3);
    assert_eq!(events_named(node.bus(), "HandleCommitted").await?.len(), 2);
    Ok(())
}

#[actix::test]
async fn test_unauthorized_requester_is_denied() -> Result<()> {
    let node = test_node().await?;
    let alice = alice()?.address();
    let bob = bob()?.address();
    let counter = node.deploy_counter(COUNTER).await?;

    let handle = counter
        .increment(alice, input32(&node, COUNTER, alice, 7)?)
        .await?;

    let err = node
        .oracle()
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
    // A contract that never touched the handle cannot be used to scope the request
    let err = node
        .oracle()
        .request(DecryptionRequest::new(handle, alice).for_contract(OTHER_COUNTER))
        .await
        .unwrap_err();
    assert!(matches!(err, CounterError::Unauthorized { .. }));

    assert_eq!(events_named(node.bus(), "DecryptionDenied").await?.len(), 2);
    Ok(())
}

#[actix::test]
async fn test_replayed_input_is_rejected() -> Result<()> {
    let node = test_node().await?;
    let alice = alice()?.address();
    let bob = bob()?.address();
    let counter = node.deploy_counter(COUNTER).await?;
    let other = node.deploy_counter(OTHER_COUNTER).await?;

    let input = input32(&node, COUNTER, alice, 5)?;
    counter.increment(alice, input.clone()).await?;
    let committed = counter.get_encrypted_handle().await?;

    // Same input submitted to a different contract
    let err = other.increment(alice, input.clone()).await.unwrap_err();
    assert!(matches!(err, CounterError::InvalidProof(_)));
    assert!(other.get_encrypted_handle().await?.is_uninitialized());

    // Same input submitted by a different sender
    let err = counter.increment(bob, input).await.unwrap_err();
    assert!(matches!(err, CounterError::InvalidProof(_)));
    assert_eq!(counter.get_encrypted_handle().await?, committed);

    assert_eq!(events_named(node.bus(), "InputRejected").await?.len(), 2);
    Ok(())
}

#[actix::test]
async fn test_width_mismatch_leaves_state_untouched() -> Result<()> {
    let node = test_node().await?;
    let alice = alice()?.address();
    let counter = node.deploy_counter(COUNTER).await?;

    let narrow = node
        .client()
        .create_encrypted_input(COUNTER, alice)
        .add8(1)
        .encrypt()?;
    let err = counter.increment(alice, narrow).await.unwrap_err();
    assert!(matches!(err, CounterError::WidthMismatch { .. }));
    assert!(counter.get_encrypted_handle().await?.is_uninitialized());
    Ok(())
}

#[actix::test]
async fn test_slow_provider_times_out() -> Result<()> {
    let fixture = CryptoFixture::new().await?;
    let alice = alice()?.address();
    let ctx = StoreContext::new(
        fixture.repositories.clone(),
        ArithmeticEngine::new(fixture.provider.clone(), fixture.registry.clone()),
        fixture.acl.clone(),
        fixture.bus.clone(),
    );
    let verifier = ProofVerifier::new(fixture.provider.clone(), fixture.registry.clone());
    let counter = FheCounter::deploy(COUNTER, verifier, ctx).await?;

    let input = fixture
        .client
        .create_encrypted_input(COUNTER, alice)
        .add32(9)
        .encrypt()?;
    let handle = counter.increment(alice, input).await?;

    let slow = Arc::new(SlowProvider::new(
        fixture.provider.clone(),
        Duration::from_millis(500),
    ));
    let oracle = DecryptionOracle::new(
        fixture.acl.clone(),
        fixture.registry.clone(),
        slow,
        Duration::from_millis(50),
        fixture.bus.clone(),
    );
    let err = oracle
        .request(DecryptionRequest::new(handle, alice))
        .await
        .unwrap_err();
    assert!(matches!(err, CounterError::DecryptionFailed(_)));
    assert!(err.is_recoverable());

    // The value is still there for a provider that answers in time
    let oracle = DecryptionOracle::new(
        fixture.acl.clone(),
        fixture.registry.clone(),
        fixture.provider.clone(),
        Duration::from_secs(5),
        fixture.bus.clone(),
    );
    assert_eq!(
        oracle
            .request(DecryptionRequest::new(handle, alice))
            .await?
            .value,
        9
    );
    Ok(())
}

#[actix::test]
#[serial_test::serial]
async fn test_state_survives_node_restart() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("db");
    let alice = alice()?.address();

    let node = CounterNodeBuilder::new(seeded_rng(1))
        .with_sled(path.clone())
        .build()
        .await?;
    let counter = node.deploy_counter(COUNTER).await?;
    let handle = counter
        .increment(alice, input32(&node, COUNTER, alice, 4)?)
        .await?;
    node.shutdown().await?;

    let node = CounterNodeBuilder::new(seeded_rng(2))
        .with_sled(path)
        .build()
        .await?;
    let counter = node.deploy_counter(COUNTER).await?;
    assert_eq!(counter.get_encrypted_handle().await?, handle);
    assert!(node
        .acl()
        .send(IsAuthorized::new(handle, alice))
        .await??);
    assert_eq!(decrypt_as(&node, handle, alice).await?, 4);

    let next = counter
        .increment(alice, input32(&node, COUNTER, alice, 1)?)
        .await?;
    assert_eq!(decrypt_as(&node, next, alice).await?, 5);

    node.shutdown().await?;
    SledDb::close_all_connections();
    Ok(())
}

#[actix::test]
async fn test_grants_lists_every_entry() -> Result<()> {
    let node = test_node().await?;
    let alice = alice()?.address();
    let counter = node.deploy_counter(COUNTER).await?;
    let handle = counter
        .increment(alice, input32(&node, COUNTER, alice, 1)?)
        .await?;

    let entries = node.acl().send(GetGrants { handle }).await??;
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.handle == handle));
    assert!(entries.iter().any(|e| e.grantee == alice));
    assert!(entries.iter().any(|e| e.grantee == COUNTER));

    // A handle nobody was granted lists nothing
    assert!(node
        .acl()
        .send(GetGrants {
            handle: CiphertextHandle::derive(b"never", IntegerWidth::Uint32, &COUNTER, 1)
        })
        .await??
        .is_empty());
    Ok(())
}

#[actix::test]
async fn test_deploying_twice_shares_the_count() -> Result<()> {
    let node = test_node().await?;
    let alice = alice()?.address();
    let first = node.deploy_counter(COUNTER).await?;
    let second = node.deploy_counter(COUNTER).await?;

    first
        .increment(alice, input32(&node, COUNTER, alice, 1)?)
        .await?;
    second
        .increment(alice, input32(&node, COUNTER, alice, 1)?)
        .await?;

    let handle = first.get_encrypted_handle().await?;
    assert_eq!(second.get_encrypted_handle().await?, handle);
    assert_eq!(decrypt_as(&node, handle, alice).await?, 2);

    // Interleaved concurrent updates through both deployments are all applied
    let up = input32(&node, COUNTER, alice, 3)?;
    let down = input32(&node, COUNTER, alice, 1)?;
    let (ra, rb) = futures::join!(first.increment(alice, up), second.decrement(alice, down));
    ra?;
    rb?;
    let handle = second.get_encrypted_handle().await?;
    assert_eq!(first.get_encrypted_handle().await?, handle);
    assert_eq!(decrypt_as(&node, handle, alice).await?, 4);
    Ok(())
}

#[actix::test]
async fn test_same_input_added_then_subtracted_restores_the_count() -> Result<()> {
    let node = test_node().await?;
    let alice = alice()?.address();
    let counter = node.deploy_counter(COUNTER).await?;

    let seeded = counter
        .increment(alice, input32(&node, COUNTER, alice, 10)?)
        .await?;
    assert_eq!(decrypt_as(&node, seeded, alice).await?, 10);

    let three = input32(&node, COUNTER, alice, 3)?;
    let raised = counter.increment(alice, three.clone()).await?;
    assert_eq!(decrypt_as(&node, raised, alice).await?, 13);
    let restored = counter.decrement(alice, three).await?;

    assert_eq!(decrypt_as(&node, restored, alice).await?, 10);
    assert_ne!(restored, raised);
    assert_eq!(counter.get_encrypted_handle().await?, restored);
    Ok(())
}
