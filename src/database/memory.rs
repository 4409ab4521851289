use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::database::models::cash_card::{CashCard, NewCashCard};
use crate::database::store::{RecordStore, StoreError};
use crate::paging::{PageRequest, SortDirection, SortField, SortOrder};

struct Inner {
    cards: BTreeMap<i64, CashCard>,
    next_id: i64,
}

/// In-process record store. Ids are assigned under the write lock.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                cards: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Store preloaded with cards that already carry ids. New ids continue after the largest one.
    pub fn with_cards(cards: impl IntoIterator<Item = CashCard>) -> Self {
        let cards: BTreeMap<i64, CashCard> = cards.into_iter().map(|c| (c.id, c)).collect();
        let next_id = cards.keys().next_back().map_or(1, |max| max + 1);
        Self {
            inner: RwLock::new(Inner { cards, next_id }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.cards.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn compare(a: &CashCard, b: &CashCard, orders: &[SortOrder]) -> Ordering {
    for order in orders {
        let ord = match order.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Amount => a.amount.cmp(&b.amount),
        };
        let ord = match order.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> Result<Option<CashCard>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.cards.get(&id).filter(|c| c.owner == owner).cloned())
    }

    async fn find_by_owner(&self, owner: &str, page: &PageRequest) -> Result<Vec<CashCard>, StoreError> {
        let inner = self.inner.read().await;
        let mut owned: Vec<&CashCard> = inner.cards.values().filter(|c| c.owner == owner).collect();

        let orders = page.effective_sort();
        owned.sort_by(|a, b| compare(a, b, &orders));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(owned
            .into_iter()
            .skip(offset)
            .take(page.size as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, card: NewCashCard) -> Result<CashCard, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let saved = CashCard {
            id,
            amount: card.amount,
            owner: card.owner,
        };
        inner.cards.insert(id, saved.clone());
        Ok(saved)
    }

    async fn update_by_id_and_owner(
        &self,
        id: i64,
        owner: &str,
        amount: Decimal,
    ) -> Result<Option<CashCard>, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.cards.get_mut(&id) {
            Some(card) if card.owner == owner => {
                card.amount = amount;
                Ok(Some(card.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_by_id_and_owner(&self, id: i64, owner: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.cards.get(&id).is_some_and(|c| c.owner == owner) {
            inner.cards.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
