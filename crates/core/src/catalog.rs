//! The expense application's replicated tables (Functional Core - pure data).
//!
//! Physical table names are `<stage>-<base>`, e.g. `prod-users`.

use crate::item::KeySchema;
use crate::replication::TableSpec;
use crate::sanitize::{Exclusion, SanitizerRegistry, Transform};

/// Every replicated target table and its partition key, in run order.
///
/// The generic tables come first, followed by the restricted user-role table
/// and the expenses table, which carry their own sanitizers.
pub const TABLE_KEYS: &[(&str, &str)] = &[
    (USERS_TABLE, USERS_KEY),
    ("organisations", "organisationId"),
    ("cost-centres", "costCentreId"),
    ("approval-policies", "policyId"),
    ("expense-categories", "categoryId"),
    ("mileage-rates", "rateId"),
    ("exchange-rates", "currencyPair"),
    ("receipts", "receiptId"),
    (USER_ROLES_TABLE, USERS_KEY),
    (EXPENSES_TABLE, EXPENSES_KEY),
];

/// Target tables filled from a differently named source table.
const SOURCE_TABLES: &[(&str, &str)] = &[(USER_ROLES_TABLE, USERS_TABLE)];

pub const USERS_TABLE: &str = "users";
pub const USERS_KEY: &str = "userId";

/// Restricted counterpart of `users`: identifier and role only.
pub const USER_ROLES_TABLE: &str = "user-roles";
pub const USER_ROLE_FIELDS: &[&str] = &[USERS_KEY, "role"];

/// Primary transactional records.
pub const EXPENSES_TABLE: &str = "expenses";
pub const EXPENSES_KEY: &str = "expenseId";
pub const EXPENSE_CATEGORY_ATTRIBUTE: &str = "category";
/// Categories containing this (case-insensitively) are internal conversion records.
pub const EXCLUDED_CATEGORY_PATTERN: &str = "conversion";
pub const EXPENSE_CONTACT_FIELDS: &[&str] = &["submitterEmail", "approverEmail", "submitterPhone"];

/// Contact fields redacted from copied user records.
pub const USER_CONTACT_FIELDS: &[&str] = &["email", "phone"];

/// Physical name of `base` in `stage`. An empty stage leaves the name unprefixed.
pub fn table_name(stage: &str, base: &str) -> String {
    if stage.is_empty() {
        base.to_string()
    } else {
        format!("{stage}-{base}")
    }
}

/// Key schema of a catalog table, looked up by base name.
pub fn key_for(base: &str) -> Option<KeySchema> {
    lookup(TABLE_KEYS, base).map(KeySchema::partition)
}

/// Base name of the source table feeding `base`.
pub fn source_for(base: &str) -> &str {
    lookup(SOURCE_TABLES, base).unwrap_or(base)
}

fn lookup<'a>(map: &[(&str, &'a str)], base: &str) -> Option<&'a str> {
    map.iter()
        .find(|(name, _)| *name == base)
        .map(|(_, value)| *value)
}

/// Sanitizer carried by the spec itself, for tables the registry cannot cover.
fn spec_sanitizer(base: &str) -> Option<Transform> {
    if base == USER_ROLES_TABLE {
        Some(Transform::reduce_to(USER_ROLE_FIELDS))
    } else if base == EXPENSES_TABLE {
        Some(
            Exclusion::new(EXPENSE_CATEGORY_ATTRIBUTE, EXCLUDED_CATEGORY_PATTERN)
                .blanking(EXPENSE_CONTACT_FIELDS)
                .into_transform(),
        )
    } else {
        None
    }
}

/// The full ordered replication list from `source_stage` into `target_stage`.
pub fn table_specs(source_stage: &str, target_stage: &str) -> Vec<TableSpec> {
    TABLE_KEYS
        .iter()
        .filter_map(|(base, _)| {
            let spec = TableSpec::new(
                table_name(source_stage, source_for(base)),
                table_name(target_stage, base),
                key_for(base)?,
            );
            Some(match spec_sanitizer(base) {
                Some(transform) => spec.with_sanitizer(transform),
                None => spec,
            })
        })
        .collect()
}

/// Registry sanitizers for the generic tables, keyed by source table name.
pub fn sanitizers(source_stage: &str) -> SanitizerRegistry {
    SanitizerRegistry::new().with(
        table_name(source_stage, USERS_TABLE),
        Transform::blank_fields(USER_CONTACT_FIELDS),
    )
}
