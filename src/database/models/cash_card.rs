use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// Bounds of the `NUMERIC(19, 2)` amount column
pub const AMOUNT_MAX_SCALE: u32 = 2;
pub const AMOUNT_MAX_INTEGER_DIGITS: u32 = 17;

#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("amount may have at most 2 decimal places, got {0}")]
    TooPrecise(Decimal),

    #[error("amount may have at most 17 integer digits, got {0}")]
    OutOfRange(Decimal),
}

/// A persisted cash card. `owner` scopes every query and never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CashCard {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip)]
    pub owner: String,
}

/// A cash card about to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCashCard {
    pub amount: Decimal,
    pub owner: String,
}

/// Body accepted by create and update. Any `id` or `owner` the client sends is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CashCardRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl CashCardRequest {
    pub fn validate(&self) -> Result<(), AmountError> {
        if self.amount.normalize().scale() > AMOUNT_MAX_SCALE {
            return Err(AmountError::TooPrecise(self.amount));
        }
        if self.amount.abs().trunc() >= Decimal::from(10_u64.pow(AMOUNT_MAX_INTEGER_DIGITS)) {
            return Err(AmountError::OutOfRange(self.amount));
        }
        Ok(())
    }

    pub fn into_new(self, owner: &str) -> NewCashCard {
        NewCashCard {
            amount: self.amount,
            owner: owner.to_string(),
        }
    }
}
