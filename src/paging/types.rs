use serde::{Deserialize, Serialize};

use super::error::PageRequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Recognizes `asc` / `desc` in any case
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if token.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

/// Properties a cash card listing may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Id,
    Amount,
}

impl SortField {
    pub fn parse(name: &str) -> Result<Self, PageRequestError> {
        match name {
            "id" => Ok(SortField::Id),
            "amount" => Ok(SortField::Amount),
            other => Err(PageRequestError::InvalidSortProperty(other.to_string())),
        }
    }

    /// Column name; only ever one of the whitelisted identifiers
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Amount => "amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(field: SortField) -> Self {
        Self { field, direction: SortDirection::Asc }
    }

    pub fn desc(field: SortField) -> Self {
        Self { field, direction: SortDirection::Desc }
    }
}

/// Zero-based page selection over one owner's records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: Vec<SortOrder>) -> Self {
        Self { page, size: size.max(1), sort }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Requested orders plus `id ASC` as the final tie-breaker, so pages never overlap
    pub fn effective_sort(&self) -> Vec<SortOrder> {
        let mut orders = self.sort.clone();
        if !orders.iter().any(|o| o.field == SortField::Id) {
            orders.push(SortOrder::asc(SortField::Id));
        }
        orders
    }
}
