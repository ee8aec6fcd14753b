//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use donorvault::adapters::database::DonorStore;
use donorvault::adapters::memory::InMemoryDonorStore;
use donorvault::adapters::storage::{FileStorage, InMemoryFileStorage};
use donorvault::anonymization::AnonymizationEngine;
use donorvault::codec::{DonorCodecs, FieldCipher};
use donorvault::core::summary::DrainSummary;
use donorvault::core::tasks::{Job, JobRunner, TaskDispatcher};
use donorvault::domain::{Address, CauseId, Donor, DonorId, Result};
use fake::faker::address::en::{BuildingNumber, CityName, StateName, StreetName};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const KEY: &str = "0123456789abcdef0123456789abcdef";
pub const OLD_KEY: &str = "fedcba9876543210fedcba9876543210";

pub fn donor_id(id: i64) -> DonorId {
    DonorId::new(id).unwrap()
}

pub fn codecs() -> DonorCodecs {
    DonorCodecs::new(Arc::new(FieldCipher::from_secret(KEY).unwrap()))
}

pub fn fake_address() -> Address {
    Address::new(StreetName().fake::<String>(), BuildingNumber().fake::<String>())
        .with_building(format!("B{}", (1..40).fake::<u8>()))
        .with_entrance((1..5).fake::<u8>().to_string())
        .with_floor((0..12).fake::<u8>().to_string())
        .with_apartment((1..120).fake::<u8>().to_string())
}

pub fn fake_national_id() -> String {
    (1_000_000_000_000u64..9_000_000_000_000u64)
        .fake::<u64>()
        .to_string()
}

/// A fully populated donor with encrypted fields and a signed form
pub fn fake_donor(id: i64, codecs: &DonorCodecs, created_at: DateTime<Utc>) -> Donor {
    let initial: String = LastName().fake::<String>().chars().take(1).collect();
    let mut geoip = serde_json::Map::new();
    geoip.insert("country".to_string(), serde_json::json!("RO"));
    geoip.insert("city".to_string(), serde_json::json!(CityName().fake::<String>()));

    Donor::builder()
        .id(donor_id(id))
        .cause_id(CauseId::new(3).unwrap())
        .name(
            FirstName().fake::<String>(),
            LastName().fake::<String>(),
            initial,
        )
        .location(CityName().fake::<String>(), StateName().fake::<String>())
        .contact(PhoneNumber().fake::<String>(), SafeEmail().fake::<String>())
        .national_id(&codecs.national_id, &fake_national_id())
        .unwrap()
        .address(&codecs.address, &fake_address())
        .unwrap()
        .geoip(geoip)
        .document_file(format!("donation-forms/2024/{id}_form.pdf"))
        .created_at(created_at)
        .build()
        .unwrap()
}

/// A donor whose address token holds `plaintext` verbatim
pub fn donor_with_raw_address(id: i64, codecs: &DonorCodecs, plaintext: &str) -> Donor {
    Donor::builder()
        .id(donor_id(id))
        .name("Ana", "Popescu", "M")
        .location("Cluj-Napoca", "Cluj")
        .encrypted_address(codecs.cipher().encrypt(plaintext.as_bytes()).unwrap())
        .build()
        .unwrap()
}

pub struct Harness {
    pub codecs: DonorCodecs,
    pub store: InMemoryDonorStore,
    pub storage: InMemoryFileStorage,
    pub engine: Arc<AnonymizationEngine>,
    pub runner: Arc<JobRunner>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_codecs(codecs())
    }

    pub fn with_codecs(codecs: DonorCodecs) -> Self {
        let store = InMemoryDonorStore::new();
        let storage = InMemoryFileStorage::new();
        let engine = Arc::new(AnonymizationEngine::new(
            Arc::new(store.clone()),
            Arc::new(storage.clone()),
        ));
        let runner = Arc::new(JobRunner::new(
            Arc::new(store.clone()),
            codecs.clone(),
            Arc::clone(&engine),
        ));
        Self {
            codecs,
            store,
            storage,
            engine,
            runner,
        }
    }

    pub fn store(&self) -> Arc<dyn DonorStore> {
        Arc::new(self.store.clone())
    }

    pub async fn insert(&self, donor: &Donor) {
        self.store.insert_donor(donor).await.unwrap();
        if !donor.document_file.is_empty() {
            self.storage
                .save(&donor.document_file, b"%PDF-1.4")
                .await
                .unwrap();
        }
    }
}

/// Records dispatched jobs without running them
#[derive(Default)]
pub struct RecordingDispatcher {
    jobs: Mutex<Vec<Job>>,
}

impl RecordingDispatcher {
    pub async fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().await.clone()
    }
}

#[async_trait]
impl TaskDispatcher for RecordingDispatcher {
    async fn dispatch(&self, job: Job) -> Result<()> {
        self.jobs.lock().await.push(job);
        Ok(())
    }

    async fn drain(&self) -> Result<DrainSummary> {
        Ok(DrainSummary::default())
    }
}
