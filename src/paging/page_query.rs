use crate::config::PagingConfig;

use super::error::PageRequestError;
use super::types::{PageRequest, SortDirection, SortField, SortOrder};

/// Builds a `PageRequest` from raw `page`, `size` and `sort` query pairs.
///
/// `sort` may repeat and follows the `property[,property...][,asc|desc]` form.
pub struct PageQuery;

impl PageQuery {
    pub fn parse(pairs: &[(String, String)], paging: PagingConfig) -> Result<PageRequest, PageRequestError> {
        let mut page = 0u32;
        let mut size = paging.default_size;
        let mut sort = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "page" => page = Self::parse_page(value)?,
                "size" => size = Self::parse_size(value, paging)?,
                "sort" => sort.extend(Self::parse_sort(value)?),
                _ => {}
            }
        }

        Ok(PageRequest::new(page, size, sort))
    }

    fn parse_page(value: &str) -> Result<u32, PageRequestError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        let n: i64 = trimmed
            .parse()
            .map_err(|_| PageRequestError::InvalidPage(value.to_string()))?;
        Ok(n.clamp(0, i64::from(u32::MAX)) as u32)
    }

    fn parse_size(value: &str, paging: PagingConfig) -> Result<u32, PageRequestError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(paging.default_size);
        }
        let n: i64 = trimmed
            .parse()
            .map_err(|_| PageRequestError::InvalidSize(value.to_string()))?;
        if n < 1 {
            return Ok(paging.default_size);
        }
        Ok(n.min(i64::from(paging.max_size)) as u32)
    }

    fn parse_sort(value: &str) -> Result<Vec<SortOrder>, PageRequestError> {
        let mut tokens: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        let direction = match tokens.last().and_then(|t| SortDirection::parse(t)) {
            Some(direction) => {
                tokens.pop();
                direction
            }
            None => SortDirection::Asc,
        };

        tokens
            .into_iter()
            .map(|name| SortField::parse(name).map(|field| SortOrder { field, direction }))
            .collect()
    }

    /// `ORDER BY` clause over whitelisted columns, including the id tie-breaker
    pub fn order_by_sql(request: &PageRequest) -> String {
        let parts: Vec<String> = request
            .effective_sort()
            .iter()
            .map(|o| format!("\"{}\" {}", o.field.column(), o.direction.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
