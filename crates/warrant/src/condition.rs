//! Structured conditions and the matcher that evaluates them.
//!
//! A condition is a predicate tree over the fields of a resource's data:
//!
//! - `Field { path, predicate }` tests one (possibly dotted) field path
//! - `And` / `Or` combine sub-conditions
//!
//! Negation is pushed down to field predicates, so a negated clause still
//! requires its field to be present.
//!
//! Conditions can be built with the constructors on [`Condition`] or parsed
//! from a Mongo-style query document with [`Condition::from_query`]:
//!
//! ```
//! use serde_json::json;
//! use warrant::Condition;
//!
//! let banned = Condition::from_query(json!({
//!     "createdBy": { "$in": ["steve", "mallory"] }
//! }))
//! .unwrap();
//!
//! assert_eq!(banned, Condition::is_in("createdBy", ["steve", "mallory"]));
//! assert!(banned.evaluate(&json!({ "createdBy": "steve" })).unwrap());
//! ```
//!
//! Fields missing from the data never match, negated or not. Evaluation errors (an ordering
//! comparison between a string field and a numeric operand, for instance)
//! make [`matches`] report a non-match.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::warn;

// ============================================================================
// Errors
// ============================================================================

/// A malformed condition, detected while parsing or while matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
    /// The query used an operator the matcher does not implement.
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    /// An operator was given an operand of the wrong shape.
    #[error("invalid operand for '{operator}': {message}")]
    InvalidOperand { operator: String, message: String },

    /// A query document (or `$and`/`$or` member) was not a JSON object.
    #[error("condition must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// An ordering comparison between values that have no common order.
    #[error("cannot compare field '{path}' ({found}) with {operand} using '{operator}'")]
    Incomparable {
        path: String,
        operator: &'static str,
        found: &'static str,
        operand: &'static str,
    },
}

// ============================================================================
// Condition Tree
// ============================================================================

/// A test applied to the value found at one field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Field deep-equals the value.
    Eq(Value),
    /// Field is present and does not equal the value.
    Ne(Value),
    /// Field equals one of the values.
    In(Vec<Value>),
    /// Field is present and equals none of the values.
    NotIn(Vec<Value>),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    /// Field presence must equal the flag.
    Exists(bool),
    /// Field is an array of exactly this length.
    Size(usize),
    /// Field is an array containing every value.
    All(Vec<Value>),
    /// Field is present and fails the inner predicate.
    Not(Box<Predicate>),
}

impl Predicate {
    fn operator(&self) -> &'static str {
        match self {
            Self::Eq(_) => "$eq",
            Self::Ne(_) => "$ne",
            Self::In(_) => "$in",
            Self::NotIn(_) => "$nin",
            Self::Gt(_) => "$gt",
            Self::Gte(_) => "$gte",
            Self::Lt(_) => "$lt",
            Self::Lte(_) => "$lte",
            Self::Exists(_) => "$exists",
            Self::Size(_) => "$size",
            Self::All(_) => "$all",
            Self::Not(_) => "$not",
        }
    }

    /// The complement of this predicate over present fields.
    fn negated(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    fn test(&self, path: &str, field: Option<&Value>) -> Result<bool, MatcherError> {
        let Some(field) = field else {
            return Ok(matches!(self, Self::Exists(false)));
        };

        let matched = match self {
            Self::Eq(value) => values_equal(field, value),
            Self::Ne(value) => !values_equal(field, value),
            Self::In(values) => values.iter().any(|v| values_equal(field, v)),
            Self::NotIn(values) => !values.iter().any(|v| values_equal(field, v)),
            Self::Gt(value) => self.ordering(path, field, value)? == Ordering::Greater,
            Self::Gte(value) => self.ordering(path, field, value)? != Ordering::Less,
            Self::Lt(value) => self.ordering(path, field, value)? == Ordering::Less,
            Self::Lte(value) => self.ordering(path, field, value)? != Ordering::Greater,
            Self::Size(len) => field.as_array().is_some_and(|items| items.len() == *len),
            Self::All(values) => field.as_array().is_some_and(|items| {
                values
                    .iter()
                    .all(|v| items.iter().any(|item| values_equal(item, v)))
            }),
            Self::Exists(expected) => *expected,
            Self::Not(inner) => !inner.test(path, Some(field))?,
        };
        Ok(matched)
    }

    fn ordering(
        &self,
        path: &str,
        field: &Value,
        operand: &Value,
    ) -> Result<Ordering, MatcherError> {
        compare(field, operand).ok_or_else(|| MatcherError::Incomparable {
            path: path.to_string(),
            operator: self.operator(),
            found: kind(field),
            operand: kind(operand),
        })
    }
}

/// A predicate tree over resource data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Applies a predicate to the value at a dotted field path.
    Field { path: String, predicate: Predicate },
    /// All sub-conditions must match. Empty matches everything.
    And(Vec<Condition>),
    /// At least one sub-condition must match.
    Or(Vec<Condition>),
}

impl Condition {
    pub fn field(path: impl Into<String>, predicate: Predicate) -> Self {
        Self::Field {
            path: path.into(),
            predicate,
        }
    }

    /// `{path: value}`
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, Predicate::Eq(value.into()))
    }

    pub fn ne(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, Predicate::Ne(value.into()))
    }

    /// `{path: {"$in": values}}`
    pub fn is_in<V: Into<Value>>(
        path: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::field(path, Predicate::In(values.into_iter().map(Into::into).collect()))
    }

    pub fn not_in<V: Into<Value>>(
        path: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::field(path, Predicate::NotIn(values.into_iter().map(Into::into).collect()))
    }

    pub fn gt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, Predicate::Gt(value.into()))
    }

    pub fn gte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, Predicate::Gte(value.into()))
    }

    pub fn lt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, Predicate::Lt(value.into()))
    }

    pub fn lte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, Predicate::Lte(value.into()))
    }

    pub fn exists(path: impl Into<String>, present: bool) -> Self {
        Self::field(path, Predicate::Exists(present))
    }

    /// Conjunction. A single condition is returned as-is.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut conditions: Vec<Condition> = conditions.into_iter().collect();
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Self::And(conditions)
        }
    }

    /// Disjunction.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Or(conditions.into_iter().collect())
    }

    /// Conjunction of `self` and `other`, flattening nested `And`s.
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::And(mut conditions) => {
                conditions.push(other);
                Self::And(conditions)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Logical complement, pushed down to the field predicates.
    ///
    /// Missing fields stay non-matching: the negation of `{a: 1}` matches
    /// only data where `a` is present and not `1`.
    pub fn negate(self) -> Self {
        match self {
            Self::Field { path, predicate } => Self::Field {
                path,
                predicate: predicate.negated(),
            },
            Self::And(conditions) => Self::Or(conditions.into_iter().map(Self::negate).collect()),
            Self::Or(conditions) => Self::And(conditions.into_iter().map(Self::negate).collect()),
        }
    }

    /// Evaluates the condition against `data`.
    ///
    /// Errors short-circuit: a condition containing a malformed clause never
    /// evaluates to `Ok`.
    pub fn evaluate(&self, data: &Value) -> Result<bool, MatcherError> {
        match self {
            Self::Field { path, predicate } => predicate.test(path, lookup(data, path)),
            Self::And(conditions) => {
                for condition in conditions {
                    if !condition.evaluate(data)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(conditions) => {
                for condition in conditions {
                    if condition.evaluate(data)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Parses a Mongo-style query document.
    ///
    /// Supported: plain `{field: value}` equality, field operators `$eq $ne
    /// $in $nin $gt $gte $lt $lte $exists $size $all $not`, and top-level
    /// `$and $or $nor`. Sibling clauses are ANDed.
    pub fn from_query(query: Value) -> Result<Self, MatcherError> {
        match query {
            Value::Object(document) => parse_document(document),
            other => Err(MatcherError::NotAnObject(kind(&other))),
        }
    }
}

impl TryFrom<Value> for Condition {
    type Error = MatcherError;

    fn try_from(query: Value) -> Result<Self, Self::Error> {
        Self::from_query(query)
    }
}

// ============================================================================
// Matching
// ============================================================================

/// Returns whether `data` satisfies `condition`.
///
/// No condition matches unconditionally. A condition that fails to evaluate
/// is reported and treated as a non-match.
pub fn matches(condition: Option<&Condition>, data: &Value) -> bool {
    let Some(condition) = condition else {
        return true;
    };

    match condition.evaluate(data) {
        Ok(matched) => matched,
        Err(err) => {
            warn!(error = %err, "condition failed to evaluate, treating as non-match");
            false
        }
    }
}

/// Resolves a dotted path (`author.id`, `tags.0`) inside `data`.
fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, segment| match current {
        Value::Object(fields) => fields.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Deep equality where numbers compare by value (`1 == 1.0`).
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return x == y;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Orders two values of the same kind. Only numbers and strings are ordered.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Some(x.cmp(&y));
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return Some(x.cmp(&y));
            }
            x.as_f64()?.partial_cmp(&y.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Query Parsing
// ============================================================================

fn parse_document(document: Map<String, Value>) -> Result<Condition, MatcherError> {
    let mut clauses = Vec::with_capacity(document.len());
    for (key, value) in document {
        let clause = match key.strip_prefix('$') {
            Some(operator) => parse_logical(operator, value)?,
            None => parse_field(key, value)?,
        };
        clauses.push(clause);
    }
    Ok(Condition::all(clauses))
}

fn parse_logical(operator: &str, operand: Value) -> Result<Condition, MatcherError> {
    match operator {
        "and" => Ok(Condition::And(parse_documents("$and", operand)?)),
        "or" => Ok(Condition::Or(parse_documents("$or", operand)?)),
        "nor" => Ok(Condition::Or(parse_documents("$nor", operand)?).negate()),
        other => Err(MatcherError::UnsupportedOperator(format!("${other}"))),
    }
}

fn parse_documents(operator: &str, operand: Value) -> Result<Vec<Condition>, MatcherError> {
    let Value::Array(members) = operand else {
        return Err(invalid(operator, "expected an array of query documents"));
    };
    members.into_iter().map(Condition::from_query).collect()
}

fn parse_field(path: String, value: Value) -> Result<Condition, MatcherError> {
    let operators = match value {
        Value::Object(document) if document.keys().any(|k| k.starts_with('$')) => document,
        plain => return Ok(Condition::eq(path, plain)),
    };

    if operators.keys().any(|k| !k.starts_with('$')) {
        return Err(invalid(
            &path,
            "cannot mix operators and plain fields in one document",
        ));
    }

    let mut predicates = Vec::with_capacity(operators.len());
    for (operator, operand) in operators {
        predicates.push(parse_operator(&path, &operator, operand)?);
    }
    Ok(Condition::all(predicates))
}

fn parse_operator(path: &str, operator: &str, operand: Value) -> Result<Condition, MatcherError> {
    let predicate = match operator {
        "$eq" => Predicate::Eq(operand),
        "$ne" => Predicate::Ne(operand),
        "$in" => Predicate::In(array_operand(operator, operand)?),
        "$nin" => Predicate::NotIn(array_operand(operator, operand)?),
        "$gt" => Predicate::Gt(ordered_operand(operator, operand)?),
        "$gte" => Predicate::Gte(ordered_operand(operator, operand)?),
        "$lt" => Predicate::Lt(ordered_operand(operator, operand)?),
        "$lte" => Predicate::Lte(ordered_operand(operator, operand)?),
        "$exists" => match operand {
            Value::Bool(present) => Predicate::Exists(present),
            other => {
                return Err(invalid(
                    operator,
                    format!("expected boolean, got {}", kind(&other)),
                ));
            }
        },
        "$size" => match operand.as_u64().and_then(|n| usize::try_from(n).ok()) {
            Some(len) => Predicate::Size(len),
            None => return Err(invalid(operator, "expected a non-negative integer")),
        },
        "$all" => Predicate::All(array_operand(operator, operand)?),
        "$not" => return Ok(parse_field(path.to_string(), operand)?.negate()),
        other => return Err(MatcherError::UnsupportedOperator(other.to_string())),
    };
    Ok(Condition::field(path, predicate))
}

fn array_operand(operator: &str, operand: Value) -> Result<Vec<Value>, MatcherError> {
    match operand {
        Value::Array(values) => Ok(values),
        other => Err(invalid(operator, format!("expected array, got {}", kind(&other)))),
    }
}

fn ordered_operand(operator: &str, operand: Value) -> Result<Value, MatcherError> {
    match operand {
        Value::Number(_) | Value::String(_) => Ok(operand),
        other => Err(invalid(
            operator,
            format!("expected number or string, got {}", kind(&other)),
        )),
    }
}

fn invalid(operator: &str, message: impl Into<String>) -> MatcherError {
    MatcherError::InvalidOperand {
        operator: operator.to_string(),
        message: message.into(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn workspace() -> Value {
        json!({
            "id": "jeoobeo3",
            "name": "test",
            "createdBy": "james",
            "members": ["james", "david"],
            "seats": 5,
            "owner": { "id": "james", "plan": "pro" },
            "archivedAt": null
        })
    }

    fn query(document: Value) -> Condition {
        Condition::from_query(document).unwrap()
    }

    #[test]
    fn test_no_condition_always_matches() {
        assert!(matches(None, &workspace()));
        assert!(matches(None, &Value::Null));
    }

    #[test_case(json!({"createdBy": "james"}), true; "equality hit")]
    #[test_case(json!({"createdBy": "david"}), false; "equality miss")]
    #[test_case(json!({"createdBy": {"$in": ["steve", "james"]}}), true; "membership hit")]
    #[test_case(json!({"createdBy": {"$in": ["steve"]}}), false; "membership miss")]
    #[test_case(json!({"createdBy": {"$in": []}}), false; "empty membership")]
    #[test_case(json!({"createdBy": {"$nin": ["steve"]}}), true; "not in")]
    #[test_case(json!({"createdBy": {"$ne": "james"}}), false; "not equal")]
    #[test_case(json!({"seats": {"$gt": 4}}), true; "greater than")]
    #[test_case(json!({"seats": {"$gte": 5, "$lt": 6}}), true; "range")]
    #[test_case(json!({"seats": {"$lte": 4}}), false; "less or equal miss")]
    #[test_case(json!({"name": {"$gt": "a"}}), true; "string ordering")]
    #[test_case(json!({"members": {"$size": 2}}), true; "size")]
    #[test_case(json!({"members": {"$all": ["david", "james"]}}), true; "all hit")]
    #[test_case(json!({"members": {"$all": ["david", "steve"]}}), false; "all miss")]
    #[test_case(json!({"members": ["james", "david"]}), true; "array deep equality")]
    #[test_case(json!({"members": ["david", "james"]}), false; "array order matters")]
    #[test_case(json!({"owner": {"plan": "pro", "id": "james"}}), true; "object deep equality")]
    #[test_case(json!({"owner": {"id": "james"}}), false; "object partial is not equal")]
    #[test_case(json!({"owner.plan": "pro"}), true; "dotted path")]
    #[test_case(json!({"members.1": "david"}), true; "array index path")]
    #[test_case(json!({"archivedAt": {"$exists": true}}), true; "explicit null exists")]
    #[test_case(json!({"deletedAt": {"$exists": false}}), true; "absent field")]
    #[test_case(json!({"createdBy": {"$not": {"$in": ["steve"]}}}), true; "field not")]
    #[test_case(json!({"$or": [{"createdBy": "steve"}, {"seats": 5}]}), true; "or")]
    #[test_case(json!({"$and": [{"createdBy": "james"}, {"seats": 6}]}), false; "and")]
    #[test_case(json!({"$nor": [{"createdBy": "steve"}]}), true; "nor")]
    #[test_case(json!({}), true; "empty document")]
    fn test_query_against_workspace(query: Value, expected: bool) {
        let condition = Condition::from_query(query).unwrap();
        assert_eq!(matches(Some(&condition), &workspace()), expected);
    }

    #[test]
    fn test_clauses_are_anded() {
        let condition = Condition::from_query(json!({
            "createdBy": "james",
            "name": "other"
        }))
        .unwrap();
        assert!(!matches(Some(&condition), &workspace()));

        let condition = Condition::eq("createdBy", "james")
            .and(Condition::eq("name", "test"));
        assert!(matches(Some(&condition), &workspace()));
    }

    #[test]
    fn test_missing_fields_never_match() {
        let data = workspace();
        for condition in [
            Condition::eq("missing", "x"),
            Condition::ne("missing", "x"),
            Condition::is_in("missing", ["x"]),
            Condition::not_in("missing", ["x"]),
            Condition::gt("missing", 1),
            Condition::eq("owner.missing.deeper", "x"),
            Condition::eq("members.7", "x"),
            Condition::eq("missing", "x").negate(),
            Condition::is_in("missing", ["x"]).negate(),
            Condition::all([Condition::gt("missing", 1), Condition::lt("missing", 9)])
                .negate(),
            query(json!({"missing": {"$not": {"$eq": "x"}}})),
            query(json!({"missing": {"$not": {"$in": ["x"]}}})),
            query(json!({"$nor": [{"missing": "x"}]})),
            query(json!({"$nor": [{"missing": "x"}, {"other": 1}]})),
        ] {
            assert_eq!(condition.evaluate(&data), Ok(false), "{condition:?}");
        }
    }

    #[test_case(json!({"name": "x"}), false; "field absent")]
    #[test_case(json!({"createdBy": "steve"}), false; "field equal")]
    #[test_case(json!({"createdBy": "james"}), true; "field different")]
    fn test_negation_forms_agree(data: Value, expected: bool) {
        for document in [
            json!({"createdBy": {"$ne": "steve"}}),
            json!({"createdBy": {"$not": {"$eq": "steve"}}}),
            json!({"createdBy": {"$nin": ["steve"]}}),
            json!({"$nor": [{"createdBy": "steve"}]}),
        ] {
            let condition = query(document.clone());
            assert_eq!(condition.evaluate(&data), Ok(expected), "{document}");
        }
        let negated = Condition::eq("createdBy", "steve").negate();
        assert_eq!(negated.evaluate(&data), Ok(expected));
    }

    #[test]
    fn test_negate_pushes_through_and_or() {
        let data = workspace();
        let both = Condition::eq("createdBy", "james").and(Condition::eq("seats", 5));
        assert_eq!(both.clone().negate().evaluate(&data), Ok(false));
        assert_eq!(both.negate().negate().evaluate(&data), Ok(true));

        let either = Condition::any([
            Condition::eq("createdBy", "steve"),
            Condition::eq("seats", 6),
        ]);
        assert_eq!(either.negate().evaluate(&data), Ok(true));

        let negated = Condition::eq("seats", 5).negate();
        let expected = Predicate::Not(Box::new(Predicate::Eq(json!(5))));
        assert_eq!(negated, Condition::field("seats", expected));
        assert_eq!(negated.negate(), Condition::eq("seats", 5));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let condition = Condition::eq("seats", 5.0);
        assert!(matches(Some(&condition), &json!({"seats": 5})));

        let condition = Condition::is_in("seats", [json!(4), json!(5.0)]);
        assert!(matches(Some(&condition), &json!({"seats": 5})));
    }

    #[test]
    fn test_non_object_data_does_not_match_field_clauses() {
        let condition = Condition::eq("createdBy", "james");
        assert!(!matches(Some(&condition), &Value::Null));
        assert!(!matches(Some(&condition), &json!("james")));
    }

    #[test]
    fn test_incomparable_ordering_fails_closed() {
        let condition = Condition::gt("name", 3);
        let err = condition.evaluate(&workspace()).unwrap_err();
        assert!(matches!(err, MatcherError::Incomparable { operator: "$gt", .. }));

        // Negation does not turn an error into a match.
        let negated = condition.negate();
        assert!(negated.evaluate(&workspace()).is_err());
        assert!(!matches(Some(&negated), &workspace()));
    }

    #[test_case(json!({"createdBy": {"$regex": "^j"}}), "$regex"; "field operator")]
    #[test_case(json!({"$where": "this.a"}), "$where"; "top-level operator")]
    fn test_unsupported_operators_are_rejected(query: Value, operator: &str) {
        let err = Condition::from_query(query).unwrap_err();
        assert_eq!(err, MatcherError::UnsupportedOperator(operator.to_string()));
    }

    #[test_case(json!({"createdBy": {"$in": "steve"}}); "in needs array")]
    #[test_case(json!({"seats": {"$gt": [1]}}); "gt needs scalar")]
    #[test_case(json!({"seats": {"$exists": 1}}); "exists needs bool")]
    #[test_case(json!({"members": {"$size": -1}}); "size needs non-negative")]
    #[test_case(json!({"$or": {"a": 1}}); "or needs array")]
    #[test_case(json!({"owner": {"$eq": 1, "id": "x"}}); "mixed document")]
    fn test_invalid_operands_are_rejected(query: Value) {
        assert!(matches!(
            Condition::from_query(query),
            Err(MatcherError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_query_must_be_an_object() {
        assert_eq!(
            Condition::from_query(json!(["a"])),
            Err(MatcherError::NotAnObject("array"))
        );
        assert_eq!(
            Condition::try_from(json!({"$or": [1]})),
            Err(MatcherError::NotAnObject("number"))
        );
    }

    #[test]
    fn test_condition_serialization_roundtrip() {
        let condition = Condition::any([
            Condition::eq("createdBy", "james"),
            Condition::is_in("createdBy", ["steve"]).negate(),
        ]);

        let json = serde_json::to_string(&condition).expect("serialize condition");
        let deserialized: Condition =
            serde_json::from_str(&json).expect("deserialize condition");
        assert_eq!(condition, deserialized);
    }
}
