use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::models::cash_card::CashCard;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS cash_card (
        id     BIGSERIAL PRIMARY KEY,
        amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
        owner  VARCHAR(256) NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS cash_card_owner_idx ON cash_card (owner)",
];

/// Connection pool setup and schema management for the Postgres store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool on `DATABASE_URL` with the configured size and timeout
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Create the `cash_card` table and its owner index if missing
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Schema is up to date");
        Ok(())
    }

    /// Insert cards with fixed ids, skipping ids that already exist, then move the id
    /// sequence past them so later inserts do not collide.
    pub async fn seed(pool: &PgPool, cards: &[CashCard]) -> Result<u64, DatabaseError> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;
        for card in cards {
            let result = sqlx::query(
                "INSERT INTO cash_card (id, amount, owner) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
            )
            .bind(card.id)
            .bind(card.amount)
            .bind(&card.owner)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        sqlx::query(
            "SELECT setval(pg_get_serial_sequence('cash_card', 'id'), (SELECT COALESCE(MAX(id), 1) FROM cash_card))",
        )
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Seeded {} cash cards", inserted);
        Ok(inserted)
    }
}
