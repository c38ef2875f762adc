//! In-memory cache of the patient list.
//!
//! Filled lazily by `GET /patients` and dropped whenever the intake pipeline saves a
//! patient. A generation counter stops a listing that started before a save from
//! repopulating the cache with stale data.

use async_trait::async_trait;
use registry_core::{PatientRecord, SaveNotifier};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    patients: Option<Arc<Vec<PatientRecord>>>,
}

#[derive(Debug, Default)]
pub struct PatientListCache {
    inner: RwLock<Inner>,
}

impl PatientListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Arc<Vec<PatientRecord>>> {
        self.inner.read().await.patients.clone()
    }

    /// Current generation; pass it back to [`store`](Self::store) after loading.
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// Caches `patients` unless the cache was invalidated since `generation` was read.
    pub async fn store(&self, generation: u64, patients: Vec<PatientRecord>) -> Arc<Vec<PatientRecord>> {
        let patients = Arc::new(patients);
        let mut inner = self.inner.write().await;
        if inner.generation == generation {
            inner.patients = Some(Arc::clone(&patients));
        }
        patients
    }

    pub async fn invalidate(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.patients = None;
    }
}

#[async_trait]
impl SaveNotifier for PatientListCache {
    async fn patient_saved(&self, _record: &PatientRecord) {
        self.invalidate().await;
        tracing::debug!("patient list cache invalidated");
    }
}
