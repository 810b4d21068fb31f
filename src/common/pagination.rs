// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Página pedida pelo cliente (1-based). Valores fora da faixa são ajustados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Envelope de resposta paginada
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        let limit = i64::from(request.limit);
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages: (total + limit - 1) / limit,
            data,
        }
    }
}

/// Parâmetros de paginação como chegam no corpo ou na query string
#[derive(Debug, Default, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl From<PaginationParams> for PageRequest {
    fn from(params: PaginationParams) -> Self {
        PageRequest::new(params.page, params.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_values() {
        let req = PageRequest::new(Some(0), Some(1_000));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, MAX_LIMIT);

        let req = PageRequest::new(None, Some(0));
        assert_eq!(req.limit, 1);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(Some(1), Some(10)).offset(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 21, PageRequest::new(Some(1), Some(10)));
        assert_eq!(page.total_pages, 3);

        let empty: Page<u8> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(empty.total_pages, 0);
    }
}
