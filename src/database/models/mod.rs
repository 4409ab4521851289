pub mod cash_card;

pub use cash_card::{AmountError, CashCard, CashCardRequest, NewCashCard};
