//! In-memory evaluation of built queries over bson documents.
//!
//! Follows the store's matching rules closely enough to check what a
//! [`ChainQuery`] selects without a live server: dotted paths descend into
//! sub-documents and arrays of sub-documents, equality and `$in` match array
//! elements, and range operators only compare values of the same type class.

use bson::{Bson, Document};
use std::cmp::Ordering;

use super::chain::ChainQuery;
use super::types::{CmpOp, Filter, MAX_PATH_DEPTH, Order, SortSpec};

pub fn eval_filter(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::In { path, values } => values_at(doc, path).iter().any(|v| is_in_set(v, values)),
        Filter::Nin { path, values } => !values_at(doc, path).iter().any(|v| is_in_set(v, values)),
        Filter::Cmp { path, op, value } => {
            let found = values_at(doc, path);
            match op {
                CmpOp::Eq => found.iter().any(|v| bson_equal(v, value)),
                CmpOp::Ne => !found.iter().any(|v| bson_equal(v, value)),
                _ => found.iter().any(|v| range_cmp(v, value).is_some_and(|o| range_holds(*op, o))),
            }
        }
    }
}

/// Runs `query` over `docs`: filter, then sort, skip, limit and projection.
///
/// The filter is [`ChainQuery::filter`], the same per-path merged view the
/// store receives from [`ChainQuery::filter_document`].
#[must_use]
pub fn execute(query: &ChainQuery, docs: &[Document]) -> Vec<Document> {
    let filter = query.filter();
    let opts = query.options();
    let mut out: Vec<Document> = docs.iter().filter(|d| eval_filter(d, &filter)).cloned().collect();
    if let Some(sort) = &opts.sort {
        out.sort_by(|a, b| compare_docs(a, b, sort));
    }
    let skip = usize::try_from(opts.skip.unwrap_or(0)).unwrap_or(usize::MAX);
    let limit = opts.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
    let out = out.into_iter().skip(skip).take(limit);
    match &opts.projection {
        Some(fields) => out.map(|d| project_fields(&d, fields)).collect(),
        None => out.collect(),
    }
}

pub fn compare_docs(a: &Document, b: &Document, sort: &[SortSpec]) -> Ordering {
    for s in sort {
        let va = sort_key(a, &s.field);
        let vb = sort_key(b, &s.field);
        let ord = match (va, vb) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

fn sort_key<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    values_at(doc, path).into_iter().find(|v| !matches!(v, Bson::Array(_)))
}

/// Keeps `_id` and the listed (possibly dotted) fields.
#[must_use]
pub fn project_fields(doc: &Document, fields: &[String]) -> Document {
    let mut out = Document::new();
    if let Some(id) = doc.get("_id") {
        out.insert("_id", id.clone());
    }
    for f in fields {
        let head = first_segment(f);
        if let Some(v) = project_path(doc, f) {
            let mut single = Document::new();
            single.insert(head, v);
            deep_merge(&mut out, single);
        }
    }
    out
}

/// Value to store under the first segment of `path`, trimmed to `path`.
fn project_path(doc: &Document, path: &str) -> Option<Bson> {
    let Some((head, rest)) = path.split_once('.') else {
        return doc.get(path).cloned();
    };
    let wrap = |d: &Document| {
        project_path(d, rest).map(|inner| {
            let mut nested = Document::new();
            nested.insert(first_segment(rest), inner);
            Bson::Document(nested)
        })
    };
    match doc.get(head)? {
        Bson::Document(d) => wrap(d),
        Bson::Array(items) => Some(Bson::Array(
            items
                .iter()
                .filter_map(|i| match i {
                    Bson::Document(d) => wrap(d),
                    _ => None,
                })
                .collect(),
        )),
        _ => None,
    }
}

fn first_segment(path: &str) -> &str {
    path.split_once('.').map_or(path, |(h, _)| h)
}

fn deep_merge(into: &mut Document, from: Document) {
    for (k, v) in from {
        match v {
            Bson::Document(new) if matches!(into.get(&k), Some(Bson::Document(_))) => {
                if let Some(Bson::Document(existing)) = into.get_mut(&k) {
                    deep_merge(existing, new);
                }
            }
            v => {
                into.insert(k, v);
            }
        }
    }
}

const fn range_holds(op: CmpOp, ord: Ordering) -> bool {
    match op {
        CmpOp::Eq => matches!(ord, Ordering::Equal),
        CmpOp::Ne => !matches!(ord, Ordering::Equal),
        CmpOp::Gt => matches!(ord, Ordering::Greater),
        CmpOp::Gte => !matches!(ord, Ordering::Less),
        CmpOp::Lt => matches!(ord, Ordering::Less),
        CmpOp::Lte => !matches!(ord, Ordering::Greater),
    }
}

fn is_in_set(v: &Bson, set: &[Bson]) -> bool {
    set.iter().any(|x| bson_equal(v, x))
}

fn bson_equal(a: &Bson, b: &Bson) -> bool {
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b)) == Ordering::Equal;
    }
    a == b
}

/// Ordering for range operators; `None` when the types are not comparable.
fn range_cmp(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        _ if is_num(a) && is_num(b) => Some(as_f64_num(a).total_cmp(&as_f64_num(b))),
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Every value reachable through `path`. Arrays contribute themselves and
/// their elements; arrays of sub-documents are descended into.
fn values_at<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    let mut out = Vec::new();
    if path.is_empty() || path.len() > 1024 {
        return out;
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() > MAX_PATH_DEPTH {
        return out;
    }
    collect_path(doc, &parts, &mut out);
    out
}

fn collect_path<'a>(doc: &'a Document, parts: &[&str], out: &mut Vec<&'a Bson>) {
    let Some((head, rest)) = parts.split_first() else {
        return;
    };
    let Some(value) = doc.get(*head) else {
        return;
    };
    if rest.is_empty() {
        out.push(value);
        if let Bson::Array(items) = value {
            out.extend(items.iter());
        }
        return;
    }
    match value {
        Bson::Document(d) => collect_path(d, rest, out),
        Bson::Array(items) => {
            for item in items {
                if let Bson::Document(d) = item {
                    collect_path(d, rest, out);
                }
            }
        }
        _ => {}
    }
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

#[allow(clippy::cast_precision_loss)]
fn as_f64_num(x: &Bson) -> f64 {
    match x {
        Bson::Int32(i) => f64::from(*i),
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        Bson::Decimal128(d) => d.to_string().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Total order over bson values: comparable pairs by value, everything else
/// by type rank.
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    range_cmp(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 255,
        _ => 12,
    }
}
