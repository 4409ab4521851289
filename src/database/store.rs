use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::database::models::cash_card::{CashCard, NewCashCard};
use crate::paging::PageRequest;

/// Errors surfaced by a record store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owner-scoped persistence for cash cards.
///
/// Every lookup and mutation takes the caller's identity alongside the id, so a
/// record owned by someone else behaves exactly like a record that does not exist.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> Result<Option<CashCard>, StoreError>;

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_id_and_owner(id, owner).await?.is_some())
    }

    /// One page of the owner's cards, ordered by `page.effective_sort()`
    async fn find_by_owner(&self, owner: &str, page: &PageRequest) -> Result<Vec<CashCard>, StoreError>;

    async fn create(&self, card: NewCashCard) -> Result<CashCard, StoreError>;

    /// Replaces the amount of an owned card. Returns `None` without inserting when there is no match.
    async fn update_by_id_and_owner(
        &self,
        id: i64,
        owner: &str,
        amount: Decimal,
    ) -> Result<Option<CashCard>, StoreError>;

    /// Returns whether an owned card was removed
    async fn delete_by_id_and_owner(&self, id: i64, owner: &str) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
