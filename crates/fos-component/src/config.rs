//! Registry Configuration

/// Registry configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Start a mutation watcher for every newly attached selector
    pub observe_dom: bool,

    /// Watch the whole document subtree instead of only the document
    /// node's direct children
    pub subtree: bool,

    /// Separator between the component name and the ULID in instance ids
    pub id_prefix_separator: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            observe_dom: true,
            subtree: true,
            id_prefix_separator: '-',
        }
    }
}
