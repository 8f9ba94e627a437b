//! Equality filters and single-field ordering over listed documents.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::Document;

/// Sort direction for [`Query::order_by`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A filter-and-order query applied to the documents of one collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order: Option<(String, Direction)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    /// Order results by `field`.
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order = Some((field.to_string(), direction));
        self
    }

    /// Apply the query to a set of documents.
    ///
    /// Documents missing the order field sort last in either direction; equal
    /// keys fall back to document id so results are deterministic.
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut docs: Vec<Document> = docs
            .into_iter()
            .filter(|doc| {
                self.filters
                    .iter()
                    .all(|(field, value)| doc.field(field) == Some(value))
            })
            .collect();

        if let Some((field, direction)) = &self.order {
            docs.sort_by(|a, b| {
                let ord = match (a.field(field), b.field(field)) {
                    (Some(x), Some(y)) => {
                        let ord = compare_values(x, y);
                        match direction {
                            Direction::Ascending => ord,
                            Direction::Descending => ord.reverse(),
                        }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                ord.then_with(|| a.id.cmp(&b.id))
            });
        }

        docs
    }
}

/// Compare two JSON values of the same kind. Mixed kinds order by kind rank.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs() -> Vec<Document> {
        vec![
            Document::new("a", json!({ "role": "lawyer", "timestamp": 30 })),
            Document::new("b", json!({ "role": "citizen", "timestamp": 10 })),
            Document::new("c", json!({ "role": "lawyer", "timestamp": 20 })),
            Document::new("d", json!({ "role": "lawyer" })),
        ]
    }

    #[test]
    fn test_filter_by_equality() {
        let result = Query::new().where_eq("role", "lawyer").apply(docs());
        let ids: Vec<&str> = result.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_order_ascending_missing_last() {
        let result = Query::new()
            .order_by("timestamp", Direction::Ascending)
            .apply(docs());
        let ids: Vec<&str> = result.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_order_descending_missing_last() {
        let result = Query::new()
            .where_eq("role", "lawyer")
            .order_by("timestamp", Direction::Descending)
            .apply(docs());
        let ids: Vec<&str> = result.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_string_ordering() {
        let docs = vec![
            Document::new("x", json!({ "date": "2025-03-01" })),
            Document::new("y", json!({ "date": "2024-12-31" })),
        ];
        let result = Query::new()
            .order_by("date", Direction::Ascending)
            .apply(docs);
        assert_eq!(result[0].id, "y");
    }
}
