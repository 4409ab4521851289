use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

use crate::database::models::cash_card::{CashCard, NewCashCard};
use crate::database::store::{RecordStore, StoreError};
use crate::paging::{PageQuery, PageRequest};

/// `RecordStore` backed by the `cash_card` table
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn list_sql(page: &PageRequest) -> String {
        format!(
            "SELECT id, amount, owner FROM cash_card WHERE owner = $1 {} LIMIT $2 OFFSET $3",
            PageQuery::order_by_sql(page)
        )
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> Result<Option<CashCard>, StoreError> {
        let card = sqlx::query_as::<_, CashCard>(
            "SELECT id, amount, owner FROM cash_card WHERE id = $1 AND owner = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(card)
    }

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> Result<bool, StoreError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM cash_card WHERE id = $1 AND owner = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_by_owner(&self, owner: &str, page: &PageRequest) -> Result<Vec<CashCard>, StoreError> {
        let sql = Self::list_sql(page);
        debug!("Listing cash cards for '{}': {}", owner, sql);

        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let cards = sqlx::query_as::<_, CashCard>(&sql)
            .bind(owner)
            .bind(i64::from(page.size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(cards)
    }

    async fn create(&self, card: NewCashCard) -> Result<CashCard, StoreError> {
        let saved = sqlx::query_as::<_, CashCard>(
            r#"
            INSERT INTO cash_card (amount, owner)
            VALUES ($1, $2)
            RETURNING id, amount, owner
            "#,
        )
        .bind(card.amount)
        .bind(&card.owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn update_by_id_and_owner(
        &self,
        id: i64,
        owner: &str,
        amount: Decimal,
    ) -> Result<Option<CashCard>, StoreError> {
        let updated = sqlx::query_as::<_, CashCard>(
            r#"
            UPDATE cash_card SET amount = $1
            WHERE id = $2 AND owner = $3
            RETURNING id, amount, owner
            "#,
        )
        .bind(amount)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_by_id_and_owner(&self, id: i64, owner: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cash_card WHERE id = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
