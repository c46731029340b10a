use bson::Bson;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::order::sort_by_reference;
use crate::schema::Model;

// Deeper dotted paths never match
pub(crate) const MAX_PATH_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// Direction as the store spells it in a sort document.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

/// Cursor options accumulated by a chained query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    pub projection: Option<Vec<String>>,
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    In { path: String, values: Vec<Bson> },
    Nin { path: String, values: Vec<Bson> },
    Cmp { path: String, op: CmpOp, value: Bson },
}

/// The filters a chained query can apply, in their default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryFilter {
    Match,
    Sort,
    Skip,
    Limit,
    Select,
}

impl QueryFilter {
    pub const DEFAULT_ORDER: [Self; 5] =
        [Self::Match, Self::Sort, Self::Skip, Self::Limit, Self::Select];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryScalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl QueryScalar {
    /// Numbers pass through; text is cast by the model for `path`.
    pub(crate) fn cast<M: Model + ?Sized>(&self, model: &M, path: &str) -> Bson {
        match self {
            Self::Int(i) => Bson::Int64(*i),
            Self::Float(f) => Bson::Double(*f),
            Self::Text(s) => model.cast(path, s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    List(Vec<QueryScalar>),
    Scalar(QueryScalar),
}

impl From<&str> for QueryScalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for QueryScalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for QueryScalar {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for QueryScalar {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<QueryScalar> for QueryValue {
    fn from(v: QueryScalar) -> Self {
        Self::Scalar(v)
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.into())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        Self::Scalar(s.into())
    }
}

impl From<i64> for QueryValue {
    fn from(i: i64) -> Self {
        Self::Scalar(i.into())
    }
}

impl From<f64> for QueryValue {
    fn from(f: f64) -> Self {
        Self::Scalar(f.into())
    }
}

impl<T: Into<QueryScalar>> FromIterator<T> for QueryValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}

/// Declarative parameter bag for one `QueryBuilder::build` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    #[serde(rename = "match")]
    pub matches: Option<BTreeMap<String, QueryValue>>,
    pub sort: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub select: Option<Vec<String>>,
    pub order: Option<Vec<QueryFilter>>,
}

impl QueryParams {
    /// Filters in application order: those named in `order` first, the rest
    /// after in default order.
    #[must_use]
    pub fn filter_order(&self) -> Vec<QueryFilter> {
        match &self.order {
            Some(order) => sort_by_reference(&QueryFilter::DEFAULT_ORDER, order),
            None => QueryFilter::DEFAULT_ORDER.to_vec(),
        }
    }

    /// Absent and empty-string parameters are never applied.
    #[must_use]
    pub fn is_present(&self, filter: QueryFilter) -> bool {
        match filter {
            QueryFilter::Match => self.matches.is_some(),
            QueryFilter::Sort => self.sort.as_deref().is_some_and(|s| !s.is_empty()),
            QueryFilter::Skip => self.skip.is_some(),
            QueryFilter::Limit => self.limit.is_some(),
            QueryFilter::Select => self.select.is_some(),
        }
    }
}
