// src/models/page.rs
// DOCUMENTATION: Pagination request and page response
// PURPOSE: Slice and order result sets consistently across endpoints

use crate::db::SortField;
use crate::errors::RegistryError;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// Page index, page size and sort specification
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// 0-based page index
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortField>,
}

impl PageRequest {
    pub fn new(page: u64, size: u64, sort: Vec<SortField>) -> Self {
        Self { page, size, sort }
    }

    /// Number of documents before this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Build from raw query parameters.
    /// `fields` maps accepted sort keys to document field names.
    pub fn from_params(
        page: Option<u64>,
        size: Option<u64>,
        sort: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Result<Self, RegistryError> {
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size == 0 {
            return Err(RegistryError::ValidationError(
                "size must be greater than zero".to_string(),
            ));
        }

        let sort = match sort {
            Some(spec) => parse_sort(spec, fields)?,
            None => Vec::new(),
        };

        Ok(Self::new(page.unwrap_or(0), size, sort))
    }
}

/// Parse "age:desc,firstName" into sort keys
fn parse_sort(spec: &str, fields: &[(&str, &str)]) -> Result<Vec<SortField>, RegistryError> {
    let mut keys = Vec::new();

    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, direction) = match part.split_once(':') {
            Some((name, dir)) => (name.trim(), dir.trim()),
            None => (part, "asc"),
        };

        let field = fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, field)| *field)
            .ok_or_else(|| {
                RegistryError::ValidationError(format!("cannot sort by '{}'", name))
            })?;

        let key = match direction.to_ascii_lowercase().as_str() {
            "asc" => SortField::asc(field),
            "desc" => SortField::desc(field),
            other => {
                return Err(RegistryError::ValidationError(format!(
                    "unknown sort direction '{}'",
                    other
                )))
            }
        };
        keys.push(key);
    }

    Ok(keys)
}

/// One page of results plus totals
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// 0-based page index
    pub number: u64,
    pub size: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Page {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(request.size.max(1)),
            number: request.page,
            size: request.size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
        }
    }
}
