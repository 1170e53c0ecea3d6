use std::path::PathBuf;

use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{mappers, rows};
use crate::domain::entities::{
    Movement, MovementStats, ReferenceKind, SyncQueueItem, UserData,
};
use crate::shared::config::DatabaseConfig;
use crate::shared::error::{AppError, Result};

/// Bump to force a wipe-and-rebuild of every local table on next open.
const SCHEMA_VERSION: i64 = 3;

const DATA_TABLES: &[&str] = &[
    "movement_medias",
    "movement_details",
    "movements",
    "user_data",
    "sync_queue",
    "reference_data",
];

const CREATE_TABLE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS movements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        local_id TEXT NOT NULL UNIQUE,
        movement_id INTEGER,
        date TEXT NOT NULL,
        farm_id INTEGER NOT NULL,
        farm_name TEXT NOT NULL,
        pasture_id INTEGER NOT NULL,
        pasture_description TEXT NOT NULL,
        event_id INTEGER NOT NULL,
        event_description TEXT NOT NULL,
        event_operation TEXT NOT NULL,
        event_detail_id INTEGER,
        event_detail_description TEXT,
        comment TEXT,
        status TEXT NOT NULL,
        synced INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_movements_synced ON movements(synced)",
    "CREATE INDEX IF NOT EXISTS idx_movements_farm_id ON movements(farm_id)",
    "CREATE INDEX IF NOT EXISTS idx_movements_date ON movements(date)",
    r#"
    CREATE TABLE IF NOT EXISTS movement_details (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        movement_local_id TEXT NOT NULL,
        animal_type_id INTEGER NOT NULL,
        animal_type_name TEXT NOT NULL,
        breed_id INTEGER NOT NULL,
        breed_name TEXT NOT NULL,
        age_group_id INTEGER NOT NULL,
        age_group_name TEXT NOT NULL,
        gender TEXT NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        comment TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_movement_details_movement ON movement_details(movement_local_id)",
    r#"
    CREATE TABLE IF NOT EXISTS movement_medias (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        movement_local_id TEXT NOT NULL,
        detail_row_id INTEGER,
        file_type TEXT NOT NULL,
        url TEXT NOT NULL,
        caption TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_movement_medias_movement ON movement_medias(movement_local_id)",
    "CREATE INDEX IF NOT EXISTS idx_movement_medias_detail ON movement_medias(detail_row_id)",
    r#"
    CREATE TABLE IF NOT EXISTS user_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        userx_id INTEGER NOT NULL UNIQUE,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        username TEXT NOT NULL,
        data TEXT NOT NULL,
        last_sync INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sync_queue (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        payload TEXT NOT NULL,
        attempts INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sync_queue_kind ON sync_queue(kind)",
    r#"
    CREATE TABLE IF NOT EXISTS reference_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL UNIQUE,
        data TEXT NOT NULL,
        last_sync INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
];

/// Durable local store for movements, reference blobs, the user snapshot and
/// the outbound work queue. Owns the only handle to the SQLite database;
/// consumers get materialized copies, never live rows.
pub struct LocalStore {
    url: String,
    max_connections: u32,
    pool: OnceCell<SqlitePool>,
}

impl LocalStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            pool: OnceCell::new(),
        }
    }

    /// Open the database, run the version check and create the schema.
    /// Idempotent: concurrent callers all await the same in-flight open, and
    /// later calls return immediately.
    pub async fn initialize(&self) -> Result<()> {
        self.pool().await.map(|_| ())
    }

    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
        }
    }

    async fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .get_or_try_init(|| Self::open(&self.url, self.max_connections))
            .await
    }

    async fn open(url: &str, max_connections: u32) -> Result<SqlitePool> {
        if let Some(path) = database_path(url) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| AppError::StorageInit(err.to_string()))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|err| AppError::StorageInit(err.to_string()))?;

        Self::migrate(&pool).await?;
        Self::create_tables(&pool).await?;

        info!(url, "local store ready");
        Ok(pool)
    }

    /// Compare the recorded schema version against [`SCHEMA_VERSION`]. Any
    /// mismatch (including a missing record) drops and recreates every data
    /// table; unsynced movements are destroyed with it. There is no
    /// incremental migration path.
    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS db_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        let recorded: Option<(i64,)> =
            sqlx::query_as("SELECT version FROM db_version WHERE id = 1")
                .fetch_optional(pool)
                .await?;

        if recorded == Some((SCHEMA_VERSION,)) {
            return Ok(());
        }

        warn!(
            recorded = recorded.map(|(v,)| v),
            current = SCHEMA_VERSION,
            "schema version mismatch, rebuilding local tables"
        );

        for table in DATA_TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(pool)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO db_version (id, version, updated_at) VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                version = excluded.version,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(SCHEMA_VERSION)
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn create_tables(pool: &SqlitePool) -> Result<()> {
        for statement in CREATE_TABLE_STATEMENTS {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    // ==================== movements ====================

    /// Insert a movement with all of its detail and media rows in a single
    /// transaction; nothing is visible until commit, and any failure rolls
    /// the whole aggregate back. Always stored with `synced = 0`.
    /// Returns the store-assigned rowid.
    pub async fn save_movement(&self, movement: &Movement) -> Result<i64> {
        let pool = self.pool().await?;
        let now = Utc::now().timestamp();

        let mut tx = pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO movements (
                local_id, movement_id, date, farm_id, farm_name,
                pasture_id, pasture_description, event_id, event_description,
                event_operation, event_detail_id, event_detail_description,
                comment, status, synced, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0, ?15, ?15)
            "#,
        )
        .bind(&movement.local_id)
        .bind(movement.movement_id)
        .bind(movement.date.to_rfc3339())
        .bind(movement.farm_id)
        .bind(&movement.farm_name)
        .bind(movement.pasture_id)
        .bind(&movement.pasture_description)
        .bind(movement.event_id)
        .bind(&movement.event_description)
        .bind(&movement.event_operation)
        .bind(movement.event_detail_id)
        .bind(&movement.event_detail_description)
        .bind(&movement.comment)
        .bind(&movement.status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for detail in &movement.details {
            let detail_inserted = sqlx::query(
                r#"
                INSERT INTO movement_details (
                    movement_local_id, animal_type_id, animal_type_name,
                    breed_id, breed_name, age_group_id, age_group_name,
                    gender, quantity, comment, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
                "#,
            )
            .bind(&movement.local_id)
            .bind(detail.animal_type_id)
            .bind(&detail.animal_type_name)
            .bind(detail.breed_id)
            .bind(&detail.breed_name)
            .bind(detail.age_group_id)
            .bind(&detail.age_group_name)
            .bind(detail.gender.as_str())
            .bind(detail.quantity)
            .bind(&detail.comment)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let detail_row_id = detail_inserted.last_insert_rowid();
            for media in &detail.medias {
                sqlx::query(
                    r#"
                    INSERT INTO movement_medias (
                        movement_local_id, detail_row_id, file_type, url,
                        caption, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                    "#,
                )
                .bind(&movement.local_id)
                .bind(detail_row_id)
                .bind(&media.file_type)
                .bind(&media.url)
                .bind(&media.caption)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        for media in &movement.medias {
            sqlx::query(
                r#"
                INSERT INTO movement_medias (
                    movement_local_id, detail_row_id, file_type, url,
                    caption, created_at, updated_at
                ) VALUES (?1, NULL, ?2, ?3, ?4, ?5, ?5)
                "#,
            )
            .bind(&movement.local_id)
            .bind(&media.file_type)
            .bind(&media.url)
            .bind(&media.caption)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(inserted.last_insert_rowid())
    }

    /// Most recent first. Each movement is fully reconstructed with its
    /// children via follow-up reads; fine at local scale.
    pub async fn get_movements(&self) -> Result<Vec<Movement>> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, rows::MovementRow>(
            "SELECT * FROM movements ORDER BY date DESC, created_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await?;

        self.hydrate_movements(rows).await
    }

    pub async fn get_movements_by_farm(&self, farm_id: i64) -> Result<Vec<Movement>> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, rows::MovementRow>(
            r#"
            SELECT * FROM movements
            WHERE farm_id = ?1
            ORDER BY date DESC, created_at DESC, id DESC
            "#,
        )
        .bind(farm_id)
        .fetch_all(pool)
        .await?;

        self.hydrate_movements(rows).await
    }

    /// Oldest-created first: the order the sync engine drains them in.
    pub async fn get_pending_movements(&self) -> Result<Vec<Movement>> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, rows::MovementRow>(
            "SELECT * FROM movements WHERE synced = 0 ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(pool)
        .await?;

        self.hydrate_movements(rows).await
    }

    pub async fn get_movement_by_id(&self, movement_id: i64) -> Result<Option<Movement>> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, rows::MovementRow>(
            "SELECT * FROM movements WHERE movement_id = ?1",
        )
        .bind(movement_id)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_movement(row).await?)),
            None => Ok(None),
        }
    }

    /// Record the server-assigned id for a movement and flip it to synced.
    /// A missing row is not an error: the user may have wiped local data
    /// while the upload was in flight.
    pub async fn mark_movement_synced(&self, local_id: &str, movement_id: i64) -> Result<()> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            r#"
            UPDATE movements
            SET synced = 1, movement_id = ?1, updated_at = ?2
            WHERE local_id = ?3
            "#,
        )
        .bind(movement_id)
        .bind(Utc::now().timestamp())
        .bind(local_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(local_id, "mark_movement_synced matched no row");
        }

        Ok(())
    }

    /// Delete a movement and its children. The storage engine gives no
    /// cascade guarantee, so the cascade runs here, inside one transaction.
    pub async fn delete_movement(&self, local_id: &str) -> Result<()> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM movement_medias WHERE movement_local_id = ?1")
            .bind(local_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM movement_details WHERE movement_local_id = ?1")
            .bind(local_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM movements WHERE local_id = ?1")
            .bind(local_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn clear_movements(&self) -> Result<()> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM movement_medias").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM movement_details").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM movements").execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_stats(&self) -> Result<MovementStats> {
        let pool = self.pool().await?;
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movements")
            .fetch_one(pool)
            .await?;
        let (pending,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM movements WHERE synced = 0")
                .fetch_one(pool)
                .await?;

        Ok(MovementStats {
            total_movements: total,
            pending_sync: pending,
        })
    }

    pub async fn get_stats_by_farm(&self, farm_id: i64) -> Result<MovementStats> {
        let pool = self.pool().await?;
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM movements WHERE farm_id = ?1")
                .bind(farm_id)
                .fetch_one(pool)
                .await?;
        let (pending,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM movements WHERE farm_id = ?1 AND synced = 0")
                .bind(farm_id)
                .fetch_one(pool)
                .await?;

        Ok(MovementStats {
            total_movements: total,
            pending_sync: pending,
        })
    }

    async fn hydrate_movements(&self, rows: Vec<rows::MovementRow>) -> Result<Vec<Movement>> {
        let mut movements = Vec::with_capacity(rows.len());
        for row in rows {
            movements.push(self.hydrate_movement(row).await?);
        }
        Ok(movements)
    }

    async fn hydrate_movement(&self, row: rows::MovementRow) -> Result<Movement> {
        let pool = self.pool().await?;

        let detail_rows = sqlx::query_as::<_, rows::MovementDetailRow>(
            "SELECT * FROM movement_details WHERE movement_local_id = ?1 ORDER BY id ASC",
        )
        .bind(&row.local_id)
        .fetch_all(pool)
        .await?;

        let mut details = Vec::with_capacity(detail_rows.len());
        for detail_row in detail_rows {
            let media_rows = sqlx::query_as::<_, rows::MovementMediaRow>(
                "SELECT * FROM movement_medias WHERE detail_row_id = ?1 ORDER BY id ASC",
            )
            .bind(detail_row.id)
            .fetch_all(pool)
            .await?;
            let medias = media_rows.into_iter().map(mappers::media_from_row).collect();
            details.push(mappers::detail_from_row(detail_row, medias)?);
        }

        let media_rows = sqlx::query_as::<_, rows::MovementMediaRow>(
            r#"
            SELECT * FROM movement_medias
            WHERE movement_local_id = ?1 AND detail_row_id IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(&row.local_id)
        .fetch_all(pool)
        .await?;
        let medias = media_rows.into_iter().map(mappers::media_from_row).collect();

        mappers::movement_from_row(row, details, medias)
    }

    // ==================== user data ====================

    pub async fn save_user_data(&self, user: &UserData) -> Result<()> {
        let pool = self.pool().await?;
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO user_data (
                userx_id, name, email, username, data, last_sync, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT(userx_id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                username = excluded.username,
                data = excluded.data,
                last_sync = excluded.last_sync,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user.userx_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.data)
        .bind(user.last_sync.timestamp())
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn get_user_data(&self, userx_id: i64) -> Result<Option<UserData>> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, rows::UserDataRow>(
            "SELECT * FROM user_data WHERE userx_id = ?1",
        )
        .bind(userx_id)
        .fetch_optional(pool)
        .await?;

        row.map(mappers::user_data_from_row).transpose()
    }

    pub async fn clear_user_data(&self, userx_id: i64) -> Result<()> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM user_data WHERE userx_id = ?1")
            .bind(userx_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    // ==================== sync queue ====================

    pub async fn add_to_sync_queue(
        &self,
        kind: &str,
        payload: &serde_json::Value,
    ) -> Result<i64> {
        let pool = self.pool().await?;
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO sync_queue (kind, payload, attempts, created_at, updated_at)
            VALUES (?1, ?2, 0, ?3, ?3)
            "#,
        )
        .bind(kind)
        .bind(serde_json::to_string(payload)?)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_sync_queue(&self) -> Result<Vec<SyncQueueItem>> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, rows::SyncQueueRow>(
            "SELECT * FROM sync_queue ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(mappers::queue_item_from_row).collect()
    }

    pub async fn remove_sync_queue_item(&self, id: i64) -> Result<()> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM sync_queue WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn increment_sync_attempts(&self, id: i64) -> Result<()> {
        let pool = self.pool().await?;
        sqlx::query(
            "UPDATE sync_queue SET attempts = attempts + 1, updated_at = ?1 WHERE id = ?2",
        )
        .bind(Utc::now().timestamp())
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    // ==================== reference data ====================

    /// Whole-blob replace keyed by kind; never merged.
    pub async fn save_reference_data(&self, kind: ReferenceKind, data: &str) -> Result<()> {
        let pool = self.pool().await?;
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO reference_data (kind, data, last_sync, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3, ?3)
            ON CONFLICT(kind) DO UPDATE SET
                data = excluded.data,
                last_sync = excluded.last_sync,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(kind.as_str())
        .bind(data)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn get_reference_data(&self, kind: ReferenceKind) -> Result<Option<String>> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, rows::ReferenceDataRow>(
            "SELECT * FROM reference_data WHERE kind = ?1",
        )
        .bind(kind.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|row| row.data))
    }

    pub async fn clear_reference_data(&self) -> Result<()> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM reference_data").execute(pool).await?;
        Ok(())
    }

    // ==================== utility ====================

    pub async fn clear_all_data(&self) -> Result<()> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;

        for table in DATA_TABLES {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!("all local data cleared");
        Ok(())
    }
}

fn database_path(url: &str) -> Option<PathBuf> {
    let raw = url.strip_prefix("sqlite:")?;
    let raw = raw.strip_prefix("//").unwrap_or(raw);
    let raw = raw.split('?').next().unwrap_or(raw);
    if raw.is_empty() || raw == ":memory:" {
        return None;
    }
    Some(PathBuf::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Gender, MovementDetail, MovementMedia};
    use chrono::DateTime;

    fn memory_store() -> LocalStore {
        LocalStore::new(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
    }

    fn media(file_type: &str, url: &str) -> MovementMedia {
        MovementMedia {
            file_type: file_type.to_string(),
            url: url.to_string(),
            caption: None,
        }
    }

    fn detail(gender: Gender, quantity: i64, medias: Vec<MovementMedia>) -> MovementDetail {
        MovementDetail {
            animal_type_id: 1,
            animal_type_name: "Cattle".to_string(),
            breed_id: 2,
            breed_name: "Angus".to_string(),
            age_group_id: 4,
            age_group_name: "Yearling".to_string(),
            gender,
            quantity,
            comment: None,
            medias,
        }
    }

    fn sample_movement(local_id: &str, farm_id: i64, date: &str) -> Movement {
        Movement {
            local_id: local_id.to_string(),
            movement_id: None,
            date: date.parse::<DateTime<Utc>>().unwrap(),
            farm_id,
            farm_name: "Alta Vista".to_string(),
            pasture_id: 11,
            pasture_description: "North paddock".to_string(),
            event_id: 3,
            event_description: "Transfer".to_string(),
            event_operation: "IN".to_string(),
            event_detail_id: Some(7),
            event_detail_description: Some("Weaning".to_string()),
            comment: Some("moved before the rain".to_string()),
            status: "registered".to_string(),
            synced: false,
            details: vec![
                detail(Gender::Female, 12, vec![media("photo", "file:///d1.jpg")]),
                detail(Gender::Male, 5, vec![]),
            ],
            medias: vec![media("photo", "file:///m1.jpg")],
        }
    }

    #[tokio::test]
    async fn initialize_is_idempotent_and_single_flight() {
        let store = memory_store();

        let (first, second) = tokio::join!(store.initialize(), store.initialize());
        assert!(first.is_ok());
        assert!(second.is_ok());

        store.initialize().await.unwrap();
        assert_eq!(store.get_stats().await.unwrap().total_movements, 0);
    }

    #[tokio::test]
    async fn save_reload_and_mark_synced_roundtrip() {
        let store = memory_store();

        store
            .save_movement(&sample_movement("m1", 1, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();

        let movements = store.get_movements().await.unwrap();
        assert_eq!(movements.len(), 1);
        let loaded = &movements[0];
        assert_eq!(loaded.local_id, "m1");
        assert!(!loaded.synced);
        assert_eq!(loaded.movement_id, None);
        assert_eq!(loaded.details.len(), 2);
        assert_eq!(loaded.details[0].medias.len(), 1);
        assert_eq!(loaded.details[1].medias.len(), 0);
        assert_eq!(loaded.medias.len(), 1);
        assert_eq!(loaded.medias[0].url, "file:///m1.jpg");

        store.mark_movement_synced("m1", 501).await.unwrap();

        let movements = store.get_movements().await.unwrap();
        assert!(movements[0].synced);
        assert_eq!(movements[0].movement_id, Some(501));
    }

    #[tokio::test]
    async fn new_movements_are_stored_unsynced_regardless_of_flag() {
        let store = memory_store();

        let mut movement = sample_movement("m1", 1, "2026-03-01T10:00:00Z");
        movement.synced = true;
        movement.movement_id = Some(999);
        store.save_movement(&movement).await.unwrap();

        let pending = store.get_pending_movements().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].local_id, "m1");
    }

    #[tokio::test]
    async fn failed_save_leaves_no_partial_aggregate() {
        let store = memory_store();

        // The second detail violates the quantity check after the parent row
        // and the first detail were already written inside the transaction.
        let mut movement = sample_movement("m1", 1, "2026-03-01T10:00:00Z");
        movement.details.push(detail(Gender::Male, -4, vec![]));

        let result = store.save_movement(&movement).await;
        assert!(result.is_err());

        assert!(store.get_movements().await.unwrap().is_empty());
        assert_eq!(store.get_stats().await.unwrap().total_movements, 0);
    }

    #[tokio::test]
    async fn mark_synced_is_idempotent_and_tolerates_missing_rows() {
        let store = memory_store();

        store
            .save_movement(&sample_movement("m1", 1, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();

        store.mark_movement_synced("m1", 42).await.unwrap();
        store.mark_movement_synced("m1", 42).await.unwrap();

        let movements = store.get_movements().await.unwrap();
        assert!(movements[0].synced);
        assert_eq!(movements[0].movement_id, Some(42));

        // A since-deleted row is silently skipped.
        store.mark_movement_synced("gone", 43).await.unwrap();
    }

    #[tokio::test]
    async fn pending_movements_are_oldest_first() {
        let store = memory_store();

        store
            .save_movement(&sample_movement("a", 1, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();
        store
            .save_movement(&sample_movement("b", 1, "2026-03-02T10:00:00Z"))
            .await
            .unwrap();

        let pending = store.get_pending_movements().await.unwrap();
        let ids: Vec<&str> = pending.iter().map(|m| m.local_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);

        // Listing is most-recent-date-first instead.
        let listed = store.get_movements().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|m| m.local_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test]
    async fn movements_can_be_scoped_to_a_farm() {
        let store = memory_store();

        store
            .save_movement(&sample_movement("m7", 7, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();
        store
            .save_movement(&sample_movement("m9", 9, "2026-03-02T10:00:00Z"))
            .await
            .unwrap();

        let scoped = store.get_movements_by_farm(7).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].local_id, "m7");

        let stats = store.get_stats_by_farm(9).await.unwrap();
        assert_eq!(stats.total_movements, 1);
        assert_eq!(stats.pending_sync, 1);
    }

    #[tokio::test]
    async fn delete_movement_cascades_to_children() {
        let store = memory_store();

        store
            .save_movement(&sample_movement("m1", 1, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();
        store
            .save_movement(&sample_movement("m2", 1, "2026-03-02T10:00:00Z"))
            .await
            .unwrap();

        store.delete_movement("m1").await.unwrap();

        let movements = store.get_movements().await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].local_id, "m2");
        assert_eq!(movements[0].details.len(), 2);
        assert_eq!(movements[0].medias.len(), 1);
    }

    #[tokio::test]
    async fn user_data_is_upserted_by_userx_id() {
        let store = memory_store();

        let mut user = UserData {
            userx_id: 10,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            username: "ana".to_string(),
            data: "{}".to_string(),
            last_sync: Utc::now(),
        };
        store.save_user_data(&user).await.unwrap();

        user.email = "ana@ranch.example".to_string();
        store.save_user_data(&user).await.unwrap();

        let loaded = store.get_user_data(10).await.unwrap().unwrap();
        assert_eq!(loaded.email, "ana@ranch.example");

        store.clear_user_data(10).await.unwrap();
        assert!(store.get_user_data(10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sync_queue_lifecycle() {
        let store = memory_store();

        let payload = serde_json::json!({"localId": "m1"});
        let id = store.add_to_sync_queue("movement", &payload).await.unwrap();

        let queue = store.get_sync_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].kind, "movement");
        assert_eq!(queue[0].payload, payload);
        assert_eq!(queue[0].attempts, 0);

        store.increment_sync_attempts(id).await.unwrap();
        let queue = store.get_sync_queue().await.unwrap();
        assert_eq!(queue[0].attempts, 1);

        store.remove_sync_queue_item(id).await.unwrap();
        assert!(store.get_sync_queue().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reference_data_is_replaced_whole() {
        let store = memory_store();

        store
            .save_reference_data(ReferenceKind::Farms, r#"[{"farmId":1}]"#)
            .await
            .unwrap();
        store
            .save_reference_data(ReferenceKind::Farms, r#"[{"farmId":2}]"#)
            .await
            .unwrap();

        let data = store.get_reference_data(ReferenceKind::Farms).await.unwrap();
        assert_eq!(data.as_deref(), Some(r#"[{"farmId":2}]"#));
        assert!(store
            .get_reference_data(ReferenceKind::Events)
            .await
            .unwrap()
            .is_none());

        store.clear_reference_data().await.unwrap();
        assert!(store
            .get_reference_data(ReferenceKind::Farms)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn clear_all_data_empties_every_table() {
        let store = memory_store();

        store
            .save_movement(&sample_movement("m1", 1, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();
        store
            .save_reference_data(ReferenceKind::Farms, "[]")
            .await
            .unwrap();
        store
            .add_to_sync_queue("movement", &serde_json::json!({}))
            .await
            .unwrap();

        store.clear_all_data().await.unwrap();

        assert!(store.get_movements().await.unwrap().is_empty());
        assert!(store.get_sync_queue().await.unwrap().is_empty());
        assert!(store
            .get_reference_data(ReferenceKind::Farms)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn version_mismatch_wipes_and_rebuilds() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("drover_test.db").display()
        );
        let config = DatabaseConfig {
            url: url.clone(),
            max_connections: 1,
        };

        let store = LocalStore::new(&config);
        store
            .save_movement(&sample_movement("m1", 1, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();
        store.close().await;

        // Tamper with the recorded version, as an older install would have
        // left it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        sqlx::query("UPDATE db_version SET version = 1 WHERE id = 1")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let reopened = LocalStore::new(&config);
        assert!(reopened.get_movements().await.unwrap().is_empty());

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        let (version,): (i64,) = sqlx::query_as("SELECT version FROM db_version WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        pool.close().await;
        reopened.close().await;
    }

    #[test]
    fn database_path_extracts_file_urls_only() {
        assert_eq!(
            database_path("sqlite:data/drover.db?mode=rwc"),
            Some(PathBuf::from("data/drover.db"))
        );
        assert_eq!(
            database_path("sqlite:///tmp/x/drover.db?mode=rwc"),
            Some(PathBuf::from("/tmp/x/drover.db"))
        );
        assert_eq!(database_path("sqlite::memory:"), None);
    }
}
