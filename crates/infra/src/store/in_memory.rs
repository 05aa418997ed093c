use async_trait::async_trait;

use innkeep_core::{ExpectedVersion, RoomId, SaleId};
use innkeep_rooms::Room;
use innkeep_sales::{Sale, SaleStatus};

use super::{EntityMap, RoomStore, SaleStore, StoreError, StoreResult};

/// In-memory room store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryRoomStore {
    rooms: EntityMap<Room>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn insert(&self, room: Room) -> StoreResult<Room> {
        self.rooms.insert(room)
    }

    async fn get(&self, id: RoomId) -> StoreResult<Option<Room>> {
        self.rooms.get(&id)
    }

    async fn list(&self) -> StoreResult<Vec<Room>> {
        self.rooms.list()
    }

    async fn replace(&self, room: Room, expected: ExpectedVersion) -> StoreResult<Room> {
        let id = room.id;
        self.rooms
            .update(&id, |current| {
                if !expected.matches(current.version) {
                    return Err(StoreError::Concurrency(format!(
                        "room {id}: expected {expected:?}, found {}",
                        current.version
                    )));
                }
                Ok(Room {
                    version: current.version + 1,
                    ..room
                })
            })?
            .ok_or(StoreError::NotFound)
    }
}

/// In-memory sale store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemorySaleStore {
    sales: EntityMap<Sale>,
}

impl InMemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaleStore for InMemorySaleStore {
    async fn insert(&self, sale: Sale) -> StoreResult<Sale> {
        self.sales.insert(sale)
    }

    async fn get(&self, id: SaleId) -> StoreResult<Option<Sale>> {
        self.sales.get(&id)
    }

    async fn list(&self) -> StoreResult<Vec<Sale>> {
        self.sales.list()
    }

    async fn set_status(&self, id: SaleId, status: SaleStatus) -> StoreResult<Option<Sale>> {
        self.sales.update(&id, |current| {
            Ok(Sale {
                status,
                ..current.clone()
            })
        })
    }

    async fn delete(&self, id: SaleId) -> StoreResult<bool> {
        self.sales.remove(&id)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        self.sales.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use innkeep_rooms::{NewRoom, RoomStatus, Transition};
    use innkeep_sales::NewSale;

    fn room() -> Room {
        Room::create(
            RoomId::new(),
            NewRoom::new(Some("101".into()), Some(100.0), None).unwrap(),
        )
    }

    fn sale(value: f64) -> Sale {
        Sale::reserved(
            SaleId::new(),
            NewSale::new(Some(Utc::now()), Some(value), Some(RoomId::new())).unwrap(),
        )
    }

    #[tokio::test]
    async fn replace_bumps_version_when_expectation_holds() {
        let store = InMemoryRoomStore::new();
        let room = store.insert(room()).await.unwrap();

        let updated = store
            .replace(room.transitioned(Transition::Reserve), ExpectedVersion::Exact(0))
            .await
            .unwrap();

        assert_eq!(updated.version, 1);
        assert_eq!(updated.status, RoomStatus::Reserved);
        assert_eq!(store.get(room.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn replace_rejects_stale_version() {
        let store = InMemoryRoomStore::new();
        let room = store.insert(room()).await.unwrap();
        store
            .replace(room.transitioned(Transition::Reserve), ExpectedVersion::Exact(0))
            .await
            .unwrap();

        let err = store
            .replace(room.transitioned(Transition::Pay), ExpectedVersion::Exact(0))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Concurrency(_)));
        let stored = store.get(room.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RoomStatus::Reserved);
    }

    #[tokio::test]
    async fn replace_unknown_room_is_not_found() {
        let store = InMemoryRoomStore::new();
        let err = store.replace(room(), ExpectedVersion::Any).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryRoomStore::new();
        let room = room();
        store.insert(room.clone()).await.unwrap();
        assert!(matches!(
            store.insert(room).await,
            Err(StoreError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn sales_list_in_insertion_order() {
        let store = InMemorySaleStore::new();
        let first = store.insert(sale(1.0)).await.unwrap();
        let second = store.insert(sale(2.0)).await.unwrap();
        let third = store.insert(sale(3.0)).await.unwrap();

        let ids: Vec<SaleId> = store.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = InMemorySaleStore::new();
        let s = store.insert(sale(1.0)).await.unwrap();
        store.insert(sale(2.0)).await.unwrap();

        assert!(store.delete(s.id).await.unwrap());
        assert!(!store.delete(s.id).await.unwrap());
        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_status_on_missing_sale_returns_none() {
        let store = InMemorySaleStore::new();
        assert_eq!(
            store.set_status(SaleId::new(), SaleStatus::Paid).await.unwrap(),
            None
        );
    }
}
