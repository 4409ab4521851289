pub mod fixtures;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use models::{AmountError, CashCard, CashCardRequest, NewCashCard};
pub use postgres::PgStore;
pub use store::{RecordStore, StoreError};
