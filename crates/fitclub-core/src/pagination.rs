// ABOUTME: Offset pagination parameters and page envelope for list endpoints
// ABOUTME: Clamps client-supplied limits to a sane maximum
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// Pagination parameters accepted in list query strings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
    /// Maximum number of items to return
    pub limit: Option<u32>,
    /// Number of items to skip
    pub offset: Option<u32>,
}

impl PageParams {
    /// Effective limit, defaulted and clamped to `1..=MAX_PAGE_SIZE`
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Effective offset
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

/// One page of a list result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of matching items
    pub count: u64,
    /// The items in this page
    pub results: Vec<T>,
    /// Effective limit used
    pub limit: u32,
    /// Effective offset used
    pub offset: u32,
}

impl<T> Page<T> {
    /// Build a page from the items fetched with `params`
    #[must_use]
    pub fn new(results: Vec<T>, count: u64, params: &PageParams) -> Self {
        Self {
            count,
            results,
            limit: params.limit(),
            offset: params.offset(),
        }
    }

    /// Convert every item, keeping the page metadata
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            results: self.results.into_iter().map(f).collect(),
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// Whether more items exist past this page
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.offset) + (self.results.len() as u64) < self.count
    }
}
