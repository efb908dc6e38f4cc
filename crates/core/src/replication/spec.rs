use std::collections::HashSet;

use crate::item::KeySchema;
use crate::sanitize::Transform;

use super::PlanError;

/// One source/target table pair and its replication policy.
#[derive(Debug, Clone)]
pub struct TableSpec {
    source_name: String,
    target_name: String,
    key: KeySchema,
    sanitizer: Option<Transform>,
}

impl TableSpec {
    /// Creates a spec keyed by `key`, with no dedicated sanitizer.
    pub fn new(
        source_name: impl Into<String>,
        target_name: impl Into<String>,
        key: KeySchema,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            target_name: target_name.into(),
            key,
            sanitizer: None,
        }
    }

    /// Attaches a dedicated sanitizer, taking precedence over the registry.
    pub fn with_sanitizer(mut self, sanitizer: Transform) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Key schema of the target table.
    pub fn key(&self) -> &KeySchema {
        &self.key
    }

    pub fn sanitizer(&self) -> Option<&Transform> {
        self.sanitizer.as_ref()
    }
}

/// A validated, ordered list of table specs.
#[derive(Debug, Clone)]
pub struct ReplicationPlan {
    specs: Vec<TableSpec>,
}

impl ReplicationPlan {
    /// Validates `specs`.
    ///
    /// Rejects empty plans, empty names or key attributes, and target tables
    /// named by more than one spec.
    pub fn new(specs: Vec<TableSpec>) -> Result<Self, PlanError> {
        if specs.is_empty() {
            return Err(PlanError::Empty);
        }

        let mut targets = HashSet::new();
        for (index, spec) in specs.iter().enumerate() {
            let empty = |field: &'static str| PlanError::EmptyField { index, field };
            if spec.source_name.trim().is_empty() {
                return Err(empty("source name"));
            }
            if spec.target_name.trim().is_empty() {
                return Err(empty("target name"));
            }
            if spec.key.attributes().any(|a| a.trim().is_empty()) {
                return Err(empty("key attribute"));
            }
            if !targets.insert(spec.target_name.as_str()) {
                return Err(PlanError::DuplicateTarget(spec.target_name.clone()));
            }
        }

        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[TableSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(source: &str, target: &str, key: &str) -> TableSpec {
        TableSpec::new(source, target, KeySchema::partition(key))
    }

    #[test]
    fn test_valid_plan_keeps_order() {
        let plan = ReplicationPlan::new(vec![
            spec("prod-users", "dev-users", "userId"),
            spec("prod-receipts", "dev-receipts", "receiptId"),
        ])
        .unwrap();

        let targets: Vec<&str> = plan.specs().iter().map(|s| s.target_name()).collect();
        assert_eq!(targets, vec!["dev-users", "dev-receipts"]);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_same_source_different_targets_is_valid() {
        let plan = ReplicationPlan::new(vec![
            spec("prod-users", "dev-users", "userId"),
            spec("prod-users", "dev-user-roles", "userId"),
        ]);
        assert!(plan.is_ok());
    }

    #[test]
    fn test_empty_plan_rejected() {
        assert_eq!(ReplicationPlan::new(vec![]).unwrap_err(), PlanError::Empty);
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let err = ReplicationPlan::new(vec![
            spec("prod-users", "dev-users", "userId"),
            spec("prod-people", "dev-users", "userId"),
        ])
        .unwrap_err();

        assert_eq!(err, PlanError::DuplicateTarget("dev-users".to_string()));
    }

    #[test]
    fn test_empty_fields_rejected() {
        assert_eq!(
            ReplicationPlan::new(vec![spec(" ", "dev-users", "userId")]).unwrap_err(),
            PlanError::EmptyField {
                index: 0,
                field: "source name"
            }
        );
        assert_eq!(
            ReplicationPlan::new(vec![
                spec("a", "b", "id"),
                spec("prod-users", "dev-users", "")
            ])
            .unwrap_err(),
            PlanError::EmptyField {
                index: 1,
                field: "key attribute"
            }
        );
    }

    #[test]
    fn test_with_sanitizer() {
        let spec = spec("prod-users", "dev-user-roles", "userId")
            .with_sanitizer(Transform::reduce_to(&["userId", "role"]));

        assert_eq!(
            spec.sanitizer().map(|t| t.description()),
            Some("reduce to [userId, role]")
        );
    }
}
