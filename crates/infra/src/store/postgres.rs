//! Postgres-backed room and sale stores.
//!
//! Rooms carry a `version` column; `replace` is a single
//! `UPDATE ... WHERE id = $1 AND version = $n`, so a status guard evaluated against a
//! read is only committed if nobody wrote the row in between.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Backend` |
//! | Anything else | N/A | `Backend` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use innkeep_core::{ExpectedVersion, RoomId, SaleId};
use innkeep_rooms::{Room, RoomStatus};
use innkeep_sales::{Sale, SaleStatus};

use super::{RoomStore, SaleStore, StoreError, StoreResult};

const CREATE_ROOMS: &str = r#"
CREATE TABLE IF NOT EXISTS rooms (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    price       DOUBLE PRECISION NOT NULL,
    description TEXT NULL,
    status      TEXT NOT NULL,
    version     BIGINT NOT NULL DEFAULT 0
)
"#;

const CREATE_SALES: &str = r#"
CREATE TABLE IF NOT EXISTS sales (
    seq     BIGSERIAL,
    id      UUID PRIMARY KEY,
    date    TIMESTAMPTZ NOT NULL,
    value   DOUBLE PRECISION NOT NULL,
    room_id UUID NOT NULL,
    status  TEXT NOT NULL
)
"#;

const ROOM_COLUMNS: &str = "id, name, price, description, status, version";
const SALE_COLUMNS: &str = "id, date, value, room_id, status";

/// Create the `rooms` and `sales` tables if they do not exist yet.
pub async fn migrate(pool: &PgPool) -> StoreResult<()> {
    sqlx::query(CREATE_ROOMS)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("migrate_rooms", e))?;
    sqlx::query(CREATE_SALES)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("migrate_sales", e))?;
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn decode(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to decode row in {}: {}", operation, err))
}

fn room_from_row(row: &PgRow) -> StoreResult<Room> {
    let status: String = row.try_get("status").map_err(|e| decode("room", e))?;
    let version: i64 = row.try_get("version").map_err(|e| decode("room", e))?;
    Ok(Room {
        id: RoomId::from_uuid(row.try_get::<Uuid, _>("id").map_err(|e| decode("room", e))?),
        name: row.try_get("name").map_err(|e| decode("room", e))?,
        price: row.try_get("price").map_err(|e| decode("room", e))?,
        description: row.try_get("description").map_err(|e| decode("room", e))?,
        status: RoomStatus::parse(&status).map_err(|e| StoreError::Backend(e.to_string()))?,
        version: u64::try_from(version).map_err(|e| StoreError::Backend(e.to_string()))?,
    })
}

fn sale_from_row(row: &PgRow) -> StoreResult<Sale> {
    let status: String = row.try_get("status").map_err(|e| decode("sale", e))?;
    Ok(Sale {
        id: SaleId::from_uuid(row.try_get::<Uuid, _>("id").map_err(|e| decode("sale", e))?),
        date: row
            .try_get::<DateTime<Utc>, _>("date")
            .map_err(|e| decode("sale", e))?,
        value: row.try_get("value").map_err(|e| decode("sale", e))?,
        room_id: RoomId::from_uuid(
            row.try_get::<Uuid, _>("room_id").map_err(|e| decode("sale", e))?,
        ),
        status: SaleStatus::parse(&status).map_err(|e| StoreError::Backend(e.to_string()))?,
    })
}

/// Postgres-backed room store.
#[derive(Debug, Clone)]
pub struct PostgresRoomStore {
    pool: PgPool,
}

impl PostgresRoomStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomStore for PostgresRoomStore {
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn insert(&self, room: Room) -> StoreResult<Room> {
        let row = sqlx::query(&format!(
            "INSERT INTO rooms ({ROOM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ROOM_COLUMNS}"
        ))
        .bind(room.id.as_uuid())
        .bind(&room.name)
        .bind(room.price)
        .bind(&room.description)
        .bind(room.status.as_str())
        .bind(room.version as i64)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_room", e))?;

        room_from_row(&row)
    }

    async fn get(&self, id: RoomId) -> StoreResult<Option<Room>> {
        let row = sqlx::query(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_room", e))?;

        row.as_ref().map(room_from_row).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Room>> {
        let rows = sqlx::query(&format!("SELECT {ROOM_COLUMNS} FROM rooms ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_rooms", e))?;

        rows.iter().map(room_from_row).collect()
    }

    #[instrument(skip(self, room), fields(room_id = %room.id, status = %room.status))]
    async fn replace(&self, room: Room, expected: ExpectedVersion) -> StoreResult<Room> {
        let expected_version: Option<i64> = match expected {
            ExpectedVersion::Any => None,
            ExpectedVersion::Exact(v) => Some(v as i64),
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE rooms
               SET name = $2, price = $3, description = $4, status = $5, version = version + 1
             WHERE id = $1
               AND ($6::bigint IS NULL OR version = $6)
            RETURNING {ROOM_COLUMNS}
            "#
        ))
        .bind(room.id.as_uuid())
        .bind(&room.name)
        .bind(room.price)
        .bind(&room.description)
        .bind(room.status.as_str())
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace_room", e))?;

        if let Some(row) = row {
            return room_from_row(&row);
        }

        // Nothing updated: either the room is gone or the version moved on.
        match self.get(room.id).await? {
            None => Err(StoreError::NotFound),
            Some(current) => Err(StoreError::Concurrency(format!(
                "room {}: expected {expected:?}, found {}",
                room.id, current.version
            ))),
        }
    }
}

/// Postgres-backed sale store.
#[derive(Debug, Clone)]
pub struct PostgresSaleStore {
    pool: PgPool,
}

impl PostgresSaleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SaleStore for PostgresSaleStore {
    #[instrument(skip(self, sale), fields(sale_id = %sale.id, room_id = %sale.room_id))]
    async fn insert(&self, sale: Sale) -> StoreResult<Sale> {
        let row = sqlx::query(&format!(
            "INSERT INTO sales ({SALE_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {SALE_COLUMNS}"
        ))
        .bind(sale.id.as_uuid())
        .bind(sale.date)
        .bind(sale.value)
        .bind(sale.room_id.as_uuid())
        .bind(sale.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_sale", e))?;

        sale_from_row(&row)
    }

    async fn get(&self, id: SaleId) -> StoreResult<Option<Sale>> {
        let row = sqlx::query(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_sale", e))?;

        row.as_ref().map(sale_from_row).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Sale>> {
        let rows = sqlx::query(&format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY seq"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_sales", e))?;

        rows.iter().map(sale_from_row).collect()
    }

    async fn set_status(&self, id: SaleId, status: SaleStatus) -> StoreResult<Option<Sale>> {
        let row = sqlx::query(&format!(
            "UPDATE sales SET status = $2 WHERE id = $1 RETURNING {SALE_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_sale_status", e))?;

        row.as_ref().map(sale_from_row).transpose()
    }

    async fn delete(&self, id: SaleId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_sale", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sales")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_all_sales", e))?;

        Ok(result.rows_affected())
    }
}
