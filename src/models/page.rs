//! Paged response envelope used by every Bitbucket list endpoint.

use serde::Deserialize;

/// One page of a Bitbucket list response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,

    /// Missing means the server returned everything in one page.
    #[serde(default = "default_is_last_page")]
    pub is_last_page: bool,

    /// Start offset of the following page, present when `is_last_page` is false.
    pub next_page_start: Option<u32>,

    #[serde(default)]
    pub start: u32,

    #[serde(default)]
    pub size: u32,

    pub limit: Option<u32>,
}

fn default_is_last_page() -> bool {
    true
}

impl<T> Page<T> {
    /// Offset to request next, or `None` when this was the final page.
    pub fn next_start(&self) -> Option<u32> {
        if self.is_last_page {
            None
        } else {
            self.next_page_start
        }
    }
}
