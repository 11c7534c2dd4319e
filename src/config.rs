/// Default limit on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Limits shared by [`Writer`](crate::Writer) and [`Reader`](crate::Reader).
///
/// # Example
/// ```rust
/// use tlv_codec::{Config, Reader};
///
/// let config = Config::default().max_depth(4);
/// let reader = Reader::with_config(vec![0x00, 0x7C], config);
/// assert_eq!(reader.config().max_depth, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of simultaneously open containers.
    pub max_depth: usize,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
