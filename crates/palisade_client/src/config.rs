//! Session tuning knobs.

use palisade_model::DetailLevel;

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    default_detail: DetailLevel,
    page_limit: u32,
}

impl SessionConfig {
    /// The defaults: standard detail, fifty objects per page.
    pub fn new() -> Self {
        SessionConfig {
            default_detail: DetailLevel::Standard,
            page_limit: 50,
        }
    }

    /// Sets the detail level used when an operation does not name one.
    pub fn with_default_detail(mut self, level: DetailLevel) -> Self {
        self.default_detail = level;
        self
    }

    /// Sets how many objects listings request per page.
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.max(1);
        self
    }

    /// The detail level used when an operation does not name one.
    pub fn default_detail(&self) -> DetailLevel {
        self.default_detail
    }

    /// Objects requested per listing page.
    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::new()
    }
}
