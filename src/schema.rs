//! Store model handle consumed by both builders.
//!
//! Values arriving from a query string are untyped text. The model knows the
//! storage type of each path and turns marker-stripped operands into the bson
//! value the store will compare against.

use bson::Bson;
use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Date,
    ObjectId,
}

pub trait Model: Send + Sync {
    /// Collection the unfiltered query starts from.
    fn collection_name(&self) -> &str;

    fn field_kind(&self, path: &str) -> Option<FieldKind>;

    fn cast(&self, path: &str, raw: &str) -> Bson {
        cast_value(self.field_kind(path), raw)
    }
}

impl<M: Model + ?Sized> Model for Arc<M> {
    fn collection_name(&self) -> &str {
        (**self).collection_name()
    }

    fn field_kind(&self, path: &str) -> Option<FieldKind> {
        (**self).field_kind(path)
    }

    fn cast(&self, path: &str, raw: &str) -> Bson {
        (**self).cast(path, raw)
    }
}

/// Interprets a string operand as `kind`. Operands that do not parse stay
/// strings; rejecting them is the store's job.
#[must_use]
pub fn cast_value(kind: Option<FieldKind>, raw: &str) -> Bson {
    let text = raw.trim();
    let cast = match kind {
        Some(FieldKind::Number) => cast_number(text),
        Some(FieldKind::Boolean) => match text.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(Bson::Boolean(true)),
            "false" | "0" => Some(Bson::Boolean(false)),
            _ => None,
        },
        Some(FieldKind::Date) => cast_date(text),
        Some(FieldKind::ObjectId) => ObjectId::parse_str(text).ok().map(Bson::ObjectId),
        Some(FieldKind::String) | None => None,
    };
    cast.unwrap_or_else(|| Bson::String(raw.to_owned()))
}

fn cast_number(text: &str) -> Option<Bson> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Bson::Int64(i));
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite()).map(Bson::Double)
}

fn cast_date(text: &str) -> Option<Bson> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())));
    }
    let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    let millis = day.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis();
    Some(Bson::DateTime(bson::DateTime::from_millis(millis)))
}

/// Declarative model: a collection name and the kind of each storage path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub collection: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldKind>,
}

impl Schema {
    pub fn new(collection: impl Into<String>) -> Self {
        Self { collection: collection.into(), fields: BTreeMap::new() }
    }

    #[must_use]
    pub fn field(mut self, path: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(path.into(), kind);
        self
    }
}

impl Model for Schema {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn field_kind(&self, path: &str) -> Option<FieldKind> {
        self.fields.get(path).copied()
    }
}
