//! Client and work order registries - CRUD over the entity store
//!
//! Each registry loads its collection once when opened and keeps it as the
//! session copy. Every mutation builds the new list, persists it whole and
//! only then replaces the session copy, so a failed write leaves both the
//! store and the copy unchanged.

use chrono::Utc;
use miette::Diagnostic;
use thiserror::Error;

use crate::core::entity::Record;
use crate::core::identity::OrderNumber;
use crate::core::store::{EntityStore, KeyValueBackend, StoreError};
use crate::core::validation::{validate_order_change, FormError};
use crate::entities::{Client, ClientDraft, NewWorkOrder, OrderChange, WorkOrder};

/// Store key of the last issued order number
pub const ORDER_SEQUENCE_KEY: &str = "order_sequence";

#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A loaded record collection bound to its store
struct Collection<'s, R: Record, B: KeyValueBackend> {
    store: &'s mut EntityStore<B>,
    records: Vec<R>,
}

impl<'s, R: Record, B: KeyValueBackend> Collection<'s, R, B> {
    fn open(store: &'s mut EntityStore<B>) -> Self {
        let records = store.load::<R>();
        Self { store, records }
    }

    fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    fn insert(&mut self, record: R) -> Result<R, StoreError> {
        let mut candidate = self.records.clone();
        candidate.push(record.clone());
        self.commit(candidate)?;
        Ok(record)
    }

    /// Edit the record with `id`, refresh `updatedAt` and persist
    fn update_with(
        &mut self,
        id: &str,
        edit: impl FnOnce(&mut R),
    ) -> Result<Option<R>, StoreError> {
        let Some(pos) = self.records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        let mut candidate = self.records.clone();
        let record = &mut candidate[pos];
        edit(record);
        record.touch(Utc::now());
        let updated = record.clone();
        self.commit(candidate)?;
        Ok(Some(updated))
    }

    fn remove(&mut self, id: &str) -> Result<Option<R>, StoreError> {
        let Some(pos) = self.records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        let mut candidate = self.records.clone();
        let removed = candidate.remove(pos);
        self.commit(candidate)?;
        Ok(Some(removed))
    }

    /// Persist `candidate`, adopting it as the session copy only once stored
    fn commit(&mut self, candidate: Vec<R>) -> Result<(), StoreError> {
        self.store.save(&candidate)?;
        self.records = candidate;
        Ok(())
    }
}

/// CRUD over [`Client`] records
pub struct ClientRegistry<'s, B: KeyValueBackend> {
    clients: Collection<'s, Client, B>,
}

impl<'s, B: KeyValueBackend> ClientRegistry<'s, B> {
    pub fn open(store: &'s mut EntityStore<B>) -> Self {
        Self {
            clients: Collection::open(store),
        }
    }

    pub fn all(&self) -> &[Client] {
        &self.clients.records
    }

    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// First client whose name contains `name` (case-insensitive) OR whose
    /// identification contains `identification`
    ///
    /// Either criterion alone is enough. A blank criterion is ignored rather
    /// than treated as a substring of every value: a blank name with an
    /// unmatched id finds nothing instead of the first client, and two blank
    /// criteria match nothing.
    pub fn search(&self, name: &str, identification: &str) -> Option<&Client> {
        self.search_all(name, identification).into_iter().next()
    }

    /// Every client matching [`ClientRegistry::search`]'s rule, in stored order
    pub fn search_all(&self, name: &str, identification: &str) -> Vec<&Client> {
        let name = name.trim().to_lowercase();
        let identification = identification.trim();
        if name.is_empty() && identification.is_empty() {
            return Vec::new();
        }

        self.all()
            .iter()
            .filter(|c| {
                (!name.is_empty() && c.name.to_lowercase().contains(&name))
                    || (!identification.is_empty() && c.identification.contains(identification))
            })
            .collect()
    }

    pub fn create(&mut self, draft: ClientDraft) -> Result<Client, StoreError> {
        let client = self.clients.insert(Client::new(draft))?;
        tracing::debug!(id = %client.id, "client created");
        Ok(client)
    }

    /// Replace every editable field of client `id`
    pub fn update(&mut self, id: &str, draft: ClientDraft) -> Result<Option<Client>, StoreError> {
        self.clients.update_with(id, |c| c.apply(draft))
    }
}

/// CRUD over [`WorkOrder`] records plus order-number allocation
pub struct WorkOrderRegistry<'s, B: KeyValueBackend> {
    orders: Collection<'s, WorkOrder, B>,
}

impl<'s, B: KeyValueBackend> WorkOrderRegistry<'s, B> {
    pub fn open(store: &'s mut EntityStore<B>) -> Self {
        Self {
            orders: Collection::open(store),
        }
    }

    pub fn all(&self) -> &[WorkOrder] {
        &self.orders.records
    }

    pub fn get(&self, id: &str) -> Option<&WorkOrder> {
        self.orders.get(id)
    }

    /// Look up by record id, falling back to the order number (`7`, `007`, `#007`)
    pub fn find(&self, reference: &str) -> Option<&WorkOrder> {
        if let Some(order) = self.get(reference) {
            return Some(order);
        }
        let number: OrderNumber = reference.parse().ok()?;
        self.all().iter().find(|o| o.number() == Some(number))
    }

    /// The number the next created order will receive
    ///
    /// Continues from the persisted sequence, never from the list length, so a
    /// deleted order's number is not handed out again. The highest number in
    /// the list also counts, which seeds the sequence for lists written
    /// before it existed.
    pub fn next_order_number(&self) -> OrderNumber {
        let sequence = self
            .orders
            .store
            .read_opt::<u64>(ORDER_SEQUENCE_KEY)
            .unwrap_or(0);
        let highest = self
            .all()
            .iter()
            .filter_map(|o| o.number())
            .map(|n| n.value())
            .max()
            .unwrap_or(0);
        OrderNumber::new(sequence.max(highest)).next()
    }

    /// Open a new order with status `Abierta`
    pub fn create(
        &mut self,
        fields: NewWorkOrder,
        responsible_user_id: impl Into<String>,
    ) -> Result<WorkOrder, StoreError> {
        let number = self.next_order_number();
        let order = self
            .orders
            .insert(WorkOrder::new(number, fields, responsible_user_id.into()))?;
        self.orders.store.write(ORDER_SEQUENCE_KEY, &number.value())?;
        tracing::debug!(id = %order.id, number = %order.order_number, "work order created");
        Ok(order)
    }

    /// Change activity/priority/status of order `id`
    ///
    /// `reason` must be non-blank. It is logged, not stored.
    pub fn update(
        &mut self,
        id: &str,
        change: &OrderChange,
        reason: &str,
    ) -> Result<Option<WorkOrder>, RegistryError> {
        validate_order_change(reason).into_result("order change")?;

        let updated = self.orders.update_with(id, |o| {
            o.apply(change);
        })?;
        if let Some(ref order) = updated {
            tracing::info!(
                number = %order.order_number,
                status = %order.status,
                reason = reason.trim(),
                "work order updated"
            );
        }
        Ok(updated)
    }

    /// Remove order `id` from the collection
    pub fn delete(&mut self, id: &str) -> Result<Option<WorkOrder>, StoreError> {
        let removed = self.orders.remove(id)?;
        if let Some(ref order) = removed {
            tracing::info!(number = %order.order_number, "work order deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryBackend;
    use crate::entities::{Activity, OrderStatus, Priority};
    use std::cell::Cell;
    use std::rc::Rc;

    fn draft(name: &str, identification: &str) -> ClientDraft {
        ClientDraft {
            name: name.to_string(),
            identification: identification.to_string(),
            phone: "+57 300 111 2222".to_string(),
            address: "Calle 123".to_string(),
        }
    }

    fn new_order(client_id: &str) -> NewWorkOrder {
        NewWorkOrder {
            client_id: client_id.to_string(),
            activity: Activity::Repair,
            priority: Priority::Medium,
            description: "Intermitencia en el servicio".to_string(),
        }
    }

    fn seeded_store() -> EntityStore<MemoryBackend> {
        let mut store = EntityStore::in_memory();
        {
            let mut clients = ClientRegistry::open(&mut store);
            clients.create(draft("María García López", "12345678")).unwrap();
            clients.create(draft("Ana Sofía Martínez", "45678912")).unwrap();
            clients.create(draft("Luis Fernando Herrera", "78912345")).unwrap();
        }
        store
    }

    #[test]
    fn test_client_create_persists() {
        let mut store = seeded_store();
        let stored: Vec<Client> = store.load();
        assert_eq!(stored.len(), 3);

        let registry = ClientRegistry::open(&mut store);
        assert_eq!(registry.all().len(), 3);
    }

    #[test]
    fn test_client_search_blank_name_does_not_match_all() {
        let mut store = seeded_store();
        let registry = ClientRegistry::open(&mut store);

        assert!(registry.search("", "999").is_none());
        assert!(registry.search("  ", "").is_none());
        assert_eq!(registry.search("", "912345").unwrap().name, "Luis Fernando Herrera");
    }

    #[test]
    fn test_client_search_or_semantics() {
        let mut store = seeded_store();
        let registry = ClientRegistry::open(&mut store);

        // No identification contains "999" but the name matches
        let found = registry.search("Ana", "999").unwrap();
        assert_eq!(found.name, "Ana Sofía Martínez");

        // Identification alone is enough
        let found = registry.search("", "789123").unwrap();
        assert_eq!(found.name, "Luis Fernando Herrera");

        // Case-insensitive name match
        assert!(registry.search("maría", "").is_some());
    }

    #[test]
    fn test_client_search_either_criterion_matches_different_clients() {
        let mut store = seeded_store();
        let registry = ClientRegistry::open(&mut store);
        let matches = registry.search_all("Ana", "12345678");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_client_search_blank_matches_nothing() {
        let mut store = seeded_store();
        let registry = ClientRegistry::open(&mut store);
        assert!(registry.search("", "").is_none());
        assert!(registry.search("  ", " ").is_none());
        assert!(registry.search("Zoe", "000").is_none());
    }

    #[test]
    fn test_client_update_replaces_fields() {
        let mut store = seeded_store();
        let mut registry = ClientRegistry::open(&mut store);
        let original = registry.search("Ana", "").unwrap().clone();

        let updated = registry
            .update(&original.id, draft("Ana Sofía Martínez Ruiz", "45678912"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Ana Sofía Martínez Ruiz");
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at >= original.updated_at);

        drop(registry);
        let stored: Vec<Client> = store.load();
        assert!(stored.iter().any(|c| c.name == "Ana Sofía Martínez Ruiz"));
        assert_eq!(stored.len(), 3);
    }

    #[test]
    fn test_client_update_missing_returns_none() {
        let mut store = seeded_store();
        let mut registry = ClientRegistry::open(&mut store);
        assert!(registry.update("missing", draft("X", "123456")).unwrap().is_none());
    }

    #[test]
    fn test_order_numbers_are_sequential() {
        let mut store = EntityStore::in_memory();
        let mut orders = WorkOrderRegistry::open(&mut store);
        assert_eq!(orders.next_order_number().to_string(), "001");

        let first = orders.create(new_order("1"), "u1").unwrap();
        let second = orders.create(new_order("1"), "u1").unwrap();
        assert_eq!(first.order_number, "001");
        assert_eq!(second.order_number, "002");
        assert_eq!(second.status, OrderStatus::Open);
    }

    #[test]
    fn test_order_number_not_reused_after_delete() {
        let mut store = EntityStore::in_memory();
        let mut orders = WorkOrderRegistry::open(&mut store);
        orders.create(new_order("1"), "u1").unwrap();
        let second = orders.create(new_order("1"), "u1").unwrap();

        orders.delete(&second.id).unwrap().unwrap();
        let third = orders.create(new_order("1"), "u1").unwrap();
        assert_eq!(third.order_number, "003");
        assert_eq!(orders.all().len(), 2);
    }

    #[test]
    fn test_order_sequence_seeded_from_existing_numbers() {
        let mut store = EntityStore::in_memory();
        let existing = WorkOrder::new(OrderNumber::new(8), new_order("4"), "2".to_string());
        store.save(&[existing]).unwrap();

        let orders = WorkOrderRegistry::open(&mut store);
        assert_eq!(orders.next_order_number().to_string(), "009");
    }

    #[test]
    fn test_order_sequence_persists_across_sessions() {
        let mut store = EntityStore::in_memory();
        {
            let mut orders = WorkOrderRegistry::open(&mut store);
            let order = orders.create(new_order("1"), "u1").unwrap();
            orders.delete(&order.id).unwrap();
        }
        assert_eq!(store.read::<u64>(ORDER_SEQUENCE_KEY, 0), 1);

        let orders = WorkOrderRegistry::open(&mut store);
        assert_eq!(orders.next_order_number().to_string(), "002");
    }

    #[test]
    fn test_order_update_requires_reason() {
        let mut store = EntityStore::in_memory();
        let mut orders = WorkOrderRegistry::open(&mut store);
        let order = orders.create(new_order("1"), "u1").unwrap();

        let change = OrderChange {
            status: Some(OrderStatus::InProgress),
            ..Default::default()
        };
        let err = orders.update(&order.id, &change, "  ").unwrap_err();
        assert!(matches!(err, RegistryError::Invalid(_)));
        assert_eq!(orders.get(&order.id).unwrap().status, OrderStatus::Open);

        let updated = orders
            .update(&order.id, &change, "Técnico en sitio")
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::InProgress);
        assert_eq!(updated.description, order.description);
    }

    #[test]
    fn test_order_update_missing_returns_none() {
        let mut store = EntityStore::in_memory();
        let mut orders = WorkOrderRegistry::open(&mut store);
        let change = OrderChange::default();
        assert!(orders.update("nope", &change, "motivo").unwrap().is_none());
    }

    #[test]
    fn test_order_find_by_id_or_number() {
        let mut store = EntityStore::in_memory();
        let mut orders = WorkOrderRegistry::open(&mut store);
        let order = orders.create(new_order("1"), "u1").unwrap();

        assert_eq!(orders.find(&order.id).unwrap().id, order.id);
        assert_eq!(orders.find("001").unwrap().id, order.id);
        assert_eq!(orders.find("#1").unwrap().id, order.id);
        assert!(orders.find("002").is_none());
        assert!(orders.find("unknown").is_none());
    }

    #[test]
    fn test_order_delete_persists() {
        let mut store = EntityStore::in_memory();
        let id = {
            let mut orders = WorkOrderRegistry::open(&mut store);
            orders.create(new_order("1"), "u1").unwrap();
            orders.create(new_order("2"), "u1").unwrap().id
        };
        {
            let mut orders = WorkOrderRegistry::open(&mut store);
            assert!(orders.delete(&id).unwrap().is_some());
            assert!(orders.delete(&id).unwrap().is_none());
        }
        let stored: Vec<WorkOrder> = store.load();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].client_id, "1");
    }

    /// Memory backend whose writes can be switched to fail
    struct FlakyBackend {
        inner: MemoryBackend,
        fail_writes: Rc<Cell<bool>>,
    }

    impl KeyValueBackend for FlakyBackend {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_writes.get() {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    /// A store holding one client and one order, plus the switch that breaks writes
    fn flaky_store() -> (EntityStore<FlakyBackend>, Rc<Cell<bool>>) {
        let fail_writes = Rc::new(Cell::new(false));
        let mut store = EntityStore::new(FlakyBackend {
            inner: MemoryBackend::new(),
            fail_writes: Rc::clone(&fail_writes),
        });
        ClientRegistry::open(&mut store)
            .create(draft("María García López", "12345678"))
            .unwrap();
        WorkOrderRegistry::open(&mut store)
            .create(new_order("1"), "u1")
            .unwrap();
        fail_writes.set(true);
        (store, fail_writes)
    }

    #[test]
    fn test_failed_create_leaves_collection_unchanged() {
        let (mut store, _fail) = flaky_store();
        {
            let mut orders = WorkOrderRegistry::open(&mut store);
            assert!(orders.create(new_order("1"), "u1").is_err());
            assert_eq!(orders.all().len(), 1);
            assert_eq!(orders.next_order_number().value(), 2);
        }
        {
            let mut clients = ClientRegistry::open(&mut store);
            assert!(clients.create(draft("Ana Sofía Martínez", "45678912")).is_err());
            assert_eq!(clients.all().len(), 1);
        }
        let stored: Vec<WorkOrder> = store.load();
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn test_failed_update_leaves_collection_unchanged() {
        let (mut store, _fail) = flaky_store();
        let mut orders = WorkOrderRegistry::open(&mut store);
        let before = orders.all()[0].clone();
        let change = OrderChange {
            status: Some(OrderStatus::Closed),
            ..Default::default()
        };

        assert!(orders.update(&before.id, &change, "Servicio restablecido").is_err());
        assert_eq!(orders.all()[0], before);

        let mut clients = ClientRegistry::open(&mut store);
        let client = clients.all()[0].clone();
        assert!(clients.update(&client.id, draft("Otro nombre", "12345678")).is_err());
        assert_eq!(clients.all()[0], client);
    }

    #[test]
    fn test_failed_delete_leaves_collection_unchanged() {
        let (mut store, fail) = flaky_store();
        let id = {
            let mut orders = WorkOrderRegistry::open(&mut store);
            let id = orders.all()[0].id.clone();
            assert!(orders.delete(&id).is_err());
            assert!(orders.get(&id).is_some());
            id
        };

        fail.set(false);
        let mut orders = WorkOrderRegistry::open(&mut store);
        assert!(orders.delete(&id).unwrap().is_some());
        assert!(orders.all().is_empty());
    }
}
