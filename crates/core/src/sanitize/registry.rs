use std::collections::HashMap;

use super::Transform;

/// Maps table names to the transform applied to their items.
#[derive(Debug, Clone, Default)]
pub struct SanitizerRegistry {
    transforms: HashMap<String, Transform>,
}

impl SanitizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `transform` for `table`, replacing any previous entry.
    pub fn register(&mut self, table: impl Into<String>, transform: Transform) -> &mut Self {
        self.transforms.insert(table.into(), transform);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, table: impl Into<String>, transform: Transform) -> Self {
        self.register(table, transform);
        self
    }

    /// The transform for `table`, or the identity transform when none is registered.
    pub fn transform_for(&self, table: &str) -> Transform {
        self.transforms
            .get(table)
            .cloned()
            .unwrap_or_else(Transform::identity)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.transforms.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, Value};

    #[test]
    fn test_unregistered_table_gets_identity() {
        let registry = SanitizerRegistry::new();
        let item: Item = [("id".to_string(), Value::s("x"))].into_iter().collect();

        let transform = registry.transform_for("prod-receipts");

        assert_eq!(transform.description(), "identity");
        assert_eq!(transform.apply(&item), Ok(Some(item)));
    }

    #[test]
    fn test_registered_table_gets_its_transform() {
        let registry = SanitizerRegistry::new()
            .with("prod-users", Transform::blank_fields(&["email"]));

        assert!(registry.contains("prod-users"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.transform_for("prod-users").description(),
            "blank [email]"
        );
    }

    #[test]
    fn test_register_replaces_previous_entry() {
        let mut registry = SanitizerRegistry::new();
        registry
            .register("t", Transform::blank_fields(&["a"]))
            .register("t", Transform::blank_fields(&["b"]));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.transform_for("t").description(), "blank [b]");
    }
}
