//! Per-item transforms applied between the source read and the target write.
//!
//! Every transform is a pure function of the source item. It returns a new
//! item to write, `None` to exclude the item, or a [`TransformError`].

use std::fmt;
use std::sync::Arc;

use crate::item::{Item, Value};

use super::TransformError;

/// Outcome of transforming one item.
pub type TransformResult = Result<Option<Item>, TransformError>;

type TransformFn = dyn Fn(&Item) -> TransformResult + Send + Sync;

/// A named, shareable item transform.
#[derive(Clone)]
pub struct Transform {
    description: String,
    apply: Arc<TransformFn>,
}

impl Transform {
    /// Wraps an arbitrary transform function.
    pub fn new<F>(description: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&Item) -> TransformResult + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            apply: Arc::new(apply),
        }
    }

    /// Passes every item through unchanged.
    pub fn identity() -> Self {
        Self::new("identity", |item| Ok(Some(item.clone())))
    }

    /// Keeps only `fields`, all of which must be present.
    pub fn reduce_to(fields: &[&str]) -> Self {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        Self::new(format!("reduce to [{}]", fields.join(", ")), move |item| {
            fields
                .iter()
                .map(|field| {
                    item.get(field)
                        .map(|value| (field.clone(), value.clone()))
                        .ok_or_else(|| TransformError::MissingAttribute(field.clone()))
                })
                .collect::<Result<Item, _>>()
                .map(Some)
        })
    }

    /// Replaces the value of each present field in `fields` with an empty string.
    pub fn blank_fields(fields: &[&str]) -> Self {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        Self::new(format!("blank [{}]", fields.join(", ")), move |item| {
            Ok(Some(blank(item, &fields)))
        })
    }

    /// Applies the transform to one item.
    pub fn apply(&self, item: &Item) -> TransformResult {
        (self.apply)(item)
    }

    /// Short human-readable description, used in logs.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Excludes records whose categorical attribute matches a forbidden pattern.
///
/// Matching is a case-insensitive substring test. String sets match when any
/// member matches. Items without the attribute pass through. Items that pass
/// can additionally have fields blanked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    attribute: String,
    pattern: String,
    blanked: Vec<String>,
}

impl Exclusion {
    pub fn new(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            pattern: pattern.into().to_lowercase(),
            blanked: Vec::new(),
        }
    }

    /// Blanks `fields` on every item that is not excluded.
    pub fn blanking(mut self, fields: &[&str]) -> Self {
        self.blanked = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Whether `item` must be excluded.
    pub fn excludes(&self, item: &Item) -> Result<bool, TransformError> {
        let matches = |s: &str| s.to_lowercase().contains(&self.pattern);
        match item.get(&self.attribute) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::S(s)) => Ok(matches(s)),
            Some(Value::Ss(values)) => Ok(values.iter().any(|s| matches(s))),
            Some(other) => Err(TransformError::UnexpectedType {
                attribute: self.attribute.clone(),
                expected: "string",
                found: other.type_name(),
            }),
        }
    }

    pub fn into_transform(self) -> Transform {
        let description = if self.blanked.is_empty() {
            format!("exclude {} ~ '{}'", self.attribute, self.pattern)
        } else {
            format!(
                "exclude {} ~ '{}', blank [{}]",
                self.attribute,
                self.pattern,
                self.blanked.join(", ")
            )
        };
        Transform::new(description, move |item| {
            if self.excludes(item)? {
                Ok(None)
            } else {
                Ok(Some(blank(item, &self.blanked)))
            }
        })
    }
}

fn blank(item: &Item, fields: &[String]) -> Item {
    let mut out = item.clone();
    for field in fields {
        if let Some(value) = out.get_mut(field) {
            *value = Value::S(String::new());
        }
    }
    out
}
