// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{load_or_generate_attestor, load_or_generate_fhe, CounterNode};
use actix::Actor;
use alloy::primitives::Address;
use anyhow::{bail, Result};
use derivative::Derivative;
use fhc_acl::Acl;
use fhc_config::{AppConfig, FheConfig};
use fhc_counter::{ArithmeticEngine, ProofVerifier, StoreContext};
use fhc_data::{DataStore, InMemStore, RepositoriesFactory, SledStore};
use fhc_events::{CounterEvent, EventBus, EventBusConfig};
use fhc_fhe::{BfvProvider, CiphertextRegistry, FheClient, FheProvider, InputAttestor, SharedRng};
use fhc_logger::SimpleLogger;
use fhc_oracle::DecryptionOracle;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::info;

/// Build a counter node
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CounterNodeBuilder {
    chain_id: u64,
    datastore: Option<DataStore>,
    decryption_timeout: Duration,
    fhe: FheConfig,
    logging: Option<String>,
    #[derivative(Debug = "ignore")]
    rng: SharedRng,
    sled_path: Option<PathBuf>,
    testmode_history: bool,
    threshold: usize,
    trusted_signers: Vec<Address>,
}

impl CounterNodeBuilder {
    pub fn new(rng: SharedRng) -> Self {
        Self {
            chain_id: 31337,
            datastore: None,
            decryption_timeout: Duration::from_secs(5),
            fhe: FheConfig::default(),
            logging: None,
            rng,
            sled_path: None,
            testmode_history: false,
            threshold: 1,
            trusted_signers: vec![],
        }
    }

    /// Builder seeded from the application config. Storage follows `in_mem_store` and `db_file`.
    pub fn from_config(config: &AppConfig) -> Self {
        let rng = Arc::new(Mutex::new(ChaCha20Rng::from_entropy()));
        let builder = Self::new(rng)
            .with_chain_id(config.chain_id())
            .with_fhe_config(config.fhe().clone())
            .with_trusted_signers(
                &config.input_verifier().signers,
                config.input_verifier().threshold,
            )
            .with_decryption_timeout(config.decryption_timeout());
        if config.use_in_mem_store() {
            builder
        } else {
            builder.with_sled(config.db_file())
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_fhe_config(mut self, fhe: FheConfig) -> Self {
        self.fhe = fhe;
        self
    }

    /// Attach an existing store to the node
    pub fn with_datastore(mut self, store: DataStore) -> Self {
        self.datastore = Some(store);
        self
    }

    /// Persist to a sled database at `path`
    pub fn with_sled(mut self, path: PathBuf) -> Self {
        self.sled_path = Some(path);
        self
    }

    /// Log bus events under `name`
    pub fn with_logging(mut self, name: &str) -> Self {
        self.logging = Some(name.to_owned());
        self
    }

    /// Attestors whose signatures count towards input proofs. When empty only the node's own
    /// attestor is trusted.
    pub fn with_trusted_signers(mut self, signers: &[Address], threshold: usize) -> Self {
        self.trusted_signers = signers.to_vec();
        self.threshold = threshold;
        self
    }

    pub fn with_decryption_timeout(mut self, timeout: Duration) -> Self {
        self.decryption_timeout = timeout;
        self
    }

    /// Keep every bus event so tests can inspect them
    pub fn testmode_with_history(mut self) -> Self {
        self.testmode_history = true;
        self
    }

    pub async fn build(self) -> Result<CounterNode> {
        let bus = EventBus::<CounterEvent>::new(EventBusConfig {
            capture_history: self.testmode_history,
            deduplicate: false,
        })
        .start();

        if let Some(name) = &self.logging {
            SimpleLogger::<CounterEvent>::attach(name, bus.clone());
        }

        let store = match (self.datastore.clone(), &self.sled_path) {
            (Some(store), _) => store,
            (None, Some(path)) => (&SledStore::new(&bus, path)?).into(),
            (None, None) => (&InMemStore::new(false).start()).into(),
        };
        let repositories = store.repositories();

        let fhe = load_or_generate_fhe(&repositories, &self.fhe, self.rng.clone()).await?;
        let attestor = InputAttestor::new(
            load_or_generate_attestor(&repositories).await?,
            fhe.params.clone(),
        );

        let trusted = if self.trusted_signers.is_empty() {
            vec![attestor.address()]
        } else {
            self.trusted_signers.clone()
        };
        if self.threshold == 0 || self.threshold > trusted.len() {
            bail!(
                "Proof threshold {} cannot be met by {} trusted signers",
                self.threshold,
                trusted.len()
            );
        }
        info!(
            "Trusting {} attestors with threshold {}",
            trusted.len(),
            self.threshold
        );

        let provider: Arc<dyn FheProvider> =
            Arc::new(BfvProvider::new(fhe.clone(), trusted, self.threshold));
        let registry = CiphertextRegistry::new(repositories.clone(), self.chain_id);
        let acl = Acl::attach(&bus, &repositories);
        let oracle = DecryptionOracle::new(
            acl.clone(),
            registry.clone(),
            provider.clone(),
            self.decryption_timeout,
            bus.clone(),
        );
        let client = FheClient::new(
            fhe.params.clone(),
            &fhe.public_key_bytes(),
            vec![attestor.clone()],
            self.chain_id,
            self.rng.clone(),
        )?;

        let verifier = ProofVerifier::new(provider.clone(), registry.clone());
        let store_context = StoreContext::new(
            repositories,
            ArithmeticEngine::new(provider.clone(), registry.clone()),
            acl.clone(),
            bus.clone(),
        );

        Ok(CounterNode {
            attestor,
            bus,
            client,
            oracle,
            provider,
            registry,
            store,
            store_context,
            verifier,
            acl,
        })
    }
}
