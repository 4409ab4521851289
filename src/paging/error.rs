use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PageRequestError {
    #[error("Invalid page index: {0}")]
    InvalidPage(String),

    #[error("Invalid page size: {0}")]
    InvalidSize(String),

    #[error("Invalid sort property: {0}")]
    InvalidSortProperty(String),
}
