// SPDX-License-Identifier: MIT

//! State schema definitions
//!
//! The schema is the per-field merge strategy table for `IssueState`. Fields
//! without an entry are overwritten by each write.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::WorkflowError;

/// State fields a step may write
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    Label,
    Confidence,
}

impl StateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateField::Label => "label",
            StateField::Confidence => "confidence",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, StateField::Confidence)
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reducer types for merging values into state
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReducerType {
    /// Replace the value (default)
    #[default]
    Overwrite,
    /// Keep maximum value, an absent current value counts as 0.0
    Max,
}

impl ReducerType {
    /// Merge a new numeric value into the current one
    pub fn reduce(self, current: Option<f64>, new: f64) -> f64 {
        match self {
            ReducerType::Overwrite => new,
            ReducerType::Max => current.unwrap_or(0.0).max(new),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ReducerType::Overwrite => "overwrite",
            ReducerType::Max => "max",
        }
    }
}

/// Merge strategy table attached to the workflow state
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(try_from = "HashMap<StateField, ReducerType>")]
pub struct StateSchema {
    reducers: HashMap<StateField, ReducerType>,
}

impl StateSchema {
    /// A schema where every field is overwritten
    pub fn overwrite_all() -> Self {
        Self {
            reducers: HashMap::new(),
        }
    }

    /// Declare the reducer for a field
    pub fn with_reducer(
        mut self,
        field: StateField,
        reducer: ReducerType,
    ) -> Result<Self, WorkflowError> {
        if reducer == ReducerType::Max && !field.is_numeric() {
            return Err(WorkflowError::InvalidReducer {
                field: field.to_string(),
                reducer: reducer.as_str().to_string(),
            });
        }
        self.reducers.insert(field, reducer);
        Ok(self)
    }

    /// Reducer for a field, falling back to overwrite
    pub fn reducer(&self, field: StateField) -> ReducerType {
        self.reducers.get(&field).copied().unwrap_or_default()
    }
}

impl Default for StateSchema {
    /// Confidence keeps the maximum of all writes; everything else is overwritten
    fn default() -> Self {
        let mut reducers = HashMap::new();
        reducers.insert(StateField::Confidence, ReducerType::Max);
        Self { reducers }
    }
}

/// Entries from configuration override the defaults field by field
impl TryFrom<HashMap<StateField, ReducerType>> for StateSchema {
    type Error = WorkflowError;

    fn try_from(entries: HashMap<StateField, ReducerType>) -> Result<Self, Self::Error> {
        entries
            .into_iter()
            .try_fold(StateSchema::default(), |schema, (field, reducer)| {
                schema.with_reducer(field, reducer)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_uses_max_for_confidence() {
        let schema = StateSchema::default();
        assert_eq!(schema.reducer(StateField::Confidence), ReducerType::Max);
        assert_eq!(schema.reducer(StateField::Label), ReducerType::Overwrite);
    }

    #[test]
    fn test_overwrite_all() {
        let schema = StateSchema::overwrite_all();
        assert_eq!(schema.reducer(StateField::Confidence), ReducerType::Overwrite);
    }

    #[test]
    fn test_max_reduce_treats_absent_as_zero() {
        assert_eq!(ReducerType::Max.reduce(None, 0.4), 0.4);
        assert_eq!(ReducerType::Max.reduce(Some(0.6), 0.6), 0.6);
        assert_eq!(ReducerType::Max.reduce(Some(0.9), 0.5), 0.9);
        assert_eq!(ReducerType::Overwrite.reduce(Some(0.9), 0.5), 0.5);
    }

    #[test]
    fn test_max_on_label_is_rejected() {
        let result = StateSchema::default().with_reducer(StateField::Label, ReducerType::Max);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidReducer { ref field, .. }) if field == "label"
        ));
    }

    #[test]
    fn test_state_schema_deserialize() {
        let yaml = r#"
            confidence: overwrite
            label: overwrite
        "#;
        let schema: StateSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.reducer(StateField::Confidence), ReducerType::Overwrite);
        assert_eq!(schema.reducer(StateField::Label), ReducerType::Overwrite);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let schema: StateSchema = serde_yaml::from_str("label: overwrite").unwrap();
        assert_eq!(schema.reducer(StateField::Confidence), ReducerType::Max);
    }

    #[test]
    fn test_invalid_yaml_reducer_is_rejected() {
        let result: Result<StateSchema, _> = serde_yaml::from_str("label: max");
        assert!(result.is_err());
    }
}
