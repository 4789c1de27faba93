//! Filter predicates
//!
//! A [`Filter`] is a disjunction of [`PredicateSet`]s; each set is a
//! conjunction of equality [`Predicate`]s. An empty filter, or a filter whose
//! only set is empty, matches every record.

use crate::document::{Document, Value, ID_FIELD};
use crate::store::{StoreError, StoreResult};

/// Comparison applied by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Deep equality over [`Value`]
    Equal,
}

impl Comparison {
    /// Returns the operator name
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Equal => "eq",
        }
    }

    fn holds(&self, actual: &Value, expected: &Value) -> bool {
        match self {
            Comparison::Equal => actual == expected,
        }
    }
}

/// A single field constraint
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub comparison: Comparison,
    pub value: Value,
}

impl Predicate {
    /// Create an equality predicate
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            comparison: Comparison::Equal,
            value: value.into(),
        }
    }

    /// A predicate naming a field absent from the record never matches.
    pub fn matches(&self, document: &Document) -> bool {
        match document.get(&self.field) {
            Some(actual) => self.comparison.holds(actual, &self.value),
            None => false,
        }
    }

    /// Rejects predicates that can never be evaluated, such as a
    /// non-integer identifier.
    pub fn validate(&self) -> StoreResult<()> {
        if self.field.is_empty() {
            return Err(StoreError::invalid_query("predicate field must not be empty"));
        }
        if self.field == ID_FIELD && self.value.as_id().is_none() {
            return Err(StoreError::invalid_query(format!(
                "field '{}' must be compared with a non-negative integer, got {}",
                ID_FIELD,
                self.value.type_name()
            ))
            .with_details(format!("value: {}", self.value)));
        }
        Ok(())
    }
}

/// Predicates that must all match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.predicates.iter().all(|p| p.matches(document))
    }
}

/// Alternative predicate sets; a record matches if any set matches
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    sets: Vec<PredicateSet>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds equality predicates to the current set, narrowing it
    pub fn and_equal<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        if self.sets.is_empty() {
            self.sets.push(PredicateSet::new());
        }
        if let Some(current) = self.sets.last_mut() {
            for (field, value) in fields {
                current.push(Predicate::equal(field, value));
            }
        }
    }

    /// Starts a new alternative set holding the given equality predicates
    pub fn or_equal<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut set = PredicateSet::new();
        for (field, value) in fields {
            set.push(Predicate::equal(field, value));
        }
        self.sets.push(set);
    }

    pub fn sets(&self) -> &[PredicateSet] {
        &self.sets
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(PredicateSet::is_empty)
    }

    pub fn matches(&self, document: &Document) -> bool {
        if self.sets.is_empty() {
            return true;
        }
        self.sets.iter().any(|set| set.matches(document))
    }

    pub fn validate(&self) -> StoreResult<()> {
        self.sets
            .iter()
            .flat_map(PredicateSet::predicates)
            .try_for_each(Predicate::validate)
    }
}
