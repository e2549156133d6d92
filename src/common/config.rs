//! Configuration for the sensor index.

/// Default B+ tree order.
///
/// With order 20 a node holds at most 19 entries before it splits, and an
/// internal node routes to at most 20 children.
pub const DEFAULT_ORDER: usize = 20;

/// Smallest order a tree accepts.
///
/// Below 3 a full node holds a single entry and a split cannot leave
/// anything on both sides.
pub const MIN_ORDER: usize = 3;

/// Size of a page in the on-disk record store (4KB).
pub const PAGE_SIZE: usize = 4096;

/// Layout of every timestamp key (`YYYY-MM-DD HH:MM:SS`).
///
/// Fixed-width, zero-padded fields make lexicographic order equal to
/// chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tunables for a [`SensorDb`](crate::SensorDb).
///
/// # Example
/// ```
/// use sensor_index::IndexConfig;
///
/// let config = IndexConfig::new().with_order(4);
/// assert_eq!(config.order, 4);
/// assert_eq!(IndexConfig::default().order, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Order of the primary tree and of every per-sensor tree.
    pub order: usize,
}

impl IndexConfig {
    /// Create a config with [`DEFAULT_ORDER`].
    pub fn new() -> Self {
        Self {
            order: DEFAULT_ORDER,
        }
    }

    /// Set the tree order.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_default_config() {
        let config = IndexConfig::default();
        assert_eq!(config.order, DEFAULT_ORDER);
        assert!(config.order >= MIN_ORDER);
    }

    #[test]
    fn test_with_order() {
        assert_eq!(IndexConfig::new().with_order(7).order, 7);
    }
}
