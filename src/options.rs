use crate::constants::DEFAULT_SHORT_PATH_LIMIT;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArenaOptions {
    /// Zero live slots on `reset`. Off trades stale bytes for a faster reset.
    pub clear_on_reset: bool,
    /// Paths up to this many bytes are split in a single pass without a copy.
    pub short_path_limit: usize,
    pub prealloc: usize,
}

impl ArenaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clear_on_reset(mut self, clear_on_reset: bool) -> Self {
        self.clear_on_reset = clear_on_reset;
        self
    }

    pub fn with_short_path_limit(mut self, short_path_limit: usize) -> Self {
        self.short_path_limit = short_path_limit;
        self
    }

    pub fn with_prealloc(mut self, prealloc: usize) -> Self {
        self.prealloc = prealloc;
        self
    }
}

impl Default for ArenaOptions {
    fn default() -> Self {
        Self {
            clear_on_reset: true,
            short_path_limit: DEFAULT_SHORT_PATH_LIMIT,
            prealloc: 0,
        }
    }
}
