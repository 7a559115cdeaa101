//! Localization backends.
//!
//! The resolver only needs raw strings by table and key; how they are
//! stored or localized is up to the [`ResourceProvider`].

use std::collections::HashMap;

/// Looks up unformatted message strings.
///
/// Returning `None` means "not found" and makes the resolver fall through
/// to the next source.
pub trait ResourceProvider: Send + Sync {
    fn lookup(&self, table: &str, key: &str) -> Option<String>;
}

/// Provider with no entries.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResources;

impl ResourceProvider for NoResources {
    fn lookup(&self, _table: &str, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory string tables.
///
/// # Example
///
/// ```
/// use precept::message::{ResourceProvider, ResourceTables};
///
/// let tables = ResourceTables::new()
///     .with("Errors", "Password_Required", "Choose a password");
///
/// assert_eq!(
///     tables.lookup("Errors", "Password_Required").as_deref(),
///     Some("Choose a password")
/// );
/// assert!(tables.lookup("Errors", "Missing").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ResourceTables {
    entries: HashMap<(String, String), String>,
}

impl ResourceTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        table: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(table, key, text);
        self
    }

    pub fn insert(
        &mut self,
        table: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.entries
            .insert((table.into(), key.into()), text.into());
    }
}

impl ResourceProvider for ResourceTables {
    fn lookup(&self, table: &str, key: &str) -> Option<String> {
        self.entries
            .get(&(table.to_string(), key.to_string()))
            .cloned()
    }
}
