//! In-memory catalog type service for tests/dev.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use golden_catalog::{CatalogType, CatalogTypeId, CatalogTypeInput};
use golden_core::Entity;

use crate::{CatalogTypeService, ServiceError};

pub const NOT_FOUND: &str = "Tipo de catálogo no encontrado";

/// In-memory stand-in for the remote catalog type API.
///
/// - No IO; ids are assigned sequentially like the real API
/// - Call counters for assertions
/// - [`fail_next`](Self::fail_next) scripts one failure, [`pause`](Self::pause)
///   holds calls until [`resume`](Self::resume)
#[derive(Debug)]
pub struct InMemoryCatalogTypeService {
    items: Mutex<BTreeMap<CatalogTypeId, CatalogType>>,
    next_id: AtomicI64,
    echo_payload: AtomicBool,
    next_failure: Mutex<Option<ServiceError>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    deactivate_calls: AtomicUsize,
}

impl Default for InMemoryCatalogTypeService {
    fn default() -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            echo_payload: AtomicBool::new(true),
            next_failure: Mutex::new(None),
            gate: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            deactivate_calls: AtomicUsize::new(0),
        }
    }
}

impl InMemoryCatalogTypeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store; new ids continue after the highest seeded id.
    pub fn with_items(items: impl IntoIterator<Item = CatalogType>) -> Self {
        let service = Self::default();
        {
            let mut store = service.store();
            for item in items {
                store.insert(item.id(), item);
            }
            let next = store.keys().next_back().map_or(1, |id| id.get() + 1);
            service.next_id.store(next, Ordering::SeqCst);
        }
        service
    }

    /// Whether create/update return the stored entity (`true`, default) or nothing.
    pub fn set_echo_payload(&self, echo: bool) {
        self.echo_payload.store(echo, Ordering::SeqCst);
    }

    /// Simulate product usage changing on the server.
    pub fn set_usage(&self, id: CatalogTypeId, number_of_products: u64) {
        if let Some(item) = self.store().get_mut(&id) {
            item.number_of_products = number_of_products;
        }
    }

    pub fn fail_next(&self, message: impl Into<String>) {
        *self.failure_slot() = Some(ServiceError::new(message));
    }

    /// Hold every subsequent call until [`resume`](Self::resume).
    pub fn pause(&self) {
        *self.gate_slot() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn resume(&self) {
        if let Some(gate) = self.gate_slot().take() {
            gate.close();
        }
    }

    pub fn get(&self, id: CatalogTypeId) -> Option<CatalogType> {
        self.store().get(&id).cloned()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn deactivate_calls(&self) -> usize {
        self.deactivate_calls.load(Ordering::SeqCst)
    }

    /// Total mutating calls (create + update + deactivate).
    pub fn mutation_calls(&self) -> usize {
        self.create_calls() + self.update_calls() + self.deactivate_calls()
    }

    async fn enter(&self) -> Result<(), ServiceError> {
        let gate = self.gate_slot().clone();
        if let Some(gate) = gate {
            // Closed on resume; the error just means "go ahead".
            let _ = gate.acquire().await;
        }
        match self.failure_slot().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn echo(&self, item: CatalogType) -> Option<CatalogType> {
        self.echo_payload.load(Ordering::SeqCst).then_some(item)
    }

    fn store(&self) -> MutexGuard<'_, BTreeMap<CatalogTypeId, CatalogType>> {
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn failure_slot(&self) -> MutexGuard<'_, Option<ServiceError>> {
        self.next_failure.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn gate_slot(&self) -> MutexGuard<'_, Option<Arc<Semaphore>>> {
        self.gate.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl CatalogTypeService for InMemoryCatalogTypeService {
    async fn list(&self) -> Result<Vec<CatalogType>, ServiceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        Ok(self.store().values().cloned().collect())
    }

    async fn create(&self, input: &CatalogTypeInput) -> Result<Option<CatalogType>, ServiceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let id = CatalogTypeId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let item = CatalogType {
            id,
            description: input.description.clone(),
            active: input.active,
            number_of_products: 0,
        };
        self.store().insert(id, item.clone());
        Ok(self.echo(item))
    }

    async fn update(
        &self,
        id: CatalogTypeId,
        input: &CatalogTypeInput,
    ) -> Result<Option<CatalogType>, ServiceError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let updated = {
            let mut store = self.store();
            let item = store.get_mut(&id).ok_or_else(|| ServiceError::new(NOT_FOUND))?;
            item.description = input.description.clone();
            item.active = input.active;
            item.clone()
        };
        Ok(self.echo(updated))
    }

    async fn deactivate(&self, id: CatalogTypeId) -> Result<(), ServiceError> {
        self.deactivate_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let mut store = self.store();
        let item = store.get_mut(&id).ok_or_else(|| ServiceError::new(NOT_FOUND))?;
        item.active = false;
        Ok(())
    }
}
