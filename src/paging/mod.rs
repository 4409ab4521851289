pub mod error;
pub mod page_query;
pub mod types;

pub use error::PageRequestError;
pub use page_query::PageQuery;
pub use types::*;
