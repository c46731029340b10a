use super::chain::ChainQuery;
use super::operators::{parse_operator, partition_negated};
use super::types::{CmpOp, Order, QueryFilter, QueryParams, QueryScalar, QueryValue, SortSpec};
use crate::dictionary::Dictionary;
use crate::schema::Model;

/// Builds chained `find` queries from a [`QueryParams`] bag.
///
/// Construct one per collection and reuse it; `build` only reads the
/// dictionary and the model.
#[derive(Debug, Clone)]
pub struct QueryBuilder<M: Model> {
    model: M,
    dictionary: Dictionary,
}

impl<M: Model> QueryBuilder<M> {
    pub fn new(model: M) -> Self {
        Self::with_dictionary(model, Dictionary::default())
    }

    pub const fn with_dictionary(model: M, dictionary: Dictionary) -> Self {
        Self { model, dictionary }
    }

    pub const fn model(&self) -> &M {
        &self.model
    }

    pub const fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    #[must_use]
    pub fn build(&self, params: &QueryParams) -> ChainQuery {
        let mut query = ChainQuery::find_all(self.model.collection_name());
        for filter in params.filter_order() {
            if !params.is_present(filter) {
                continue;
            }
            query = self.apply_filter(query, params, filter).mark(filter);
        }
        log::trace!(
            target: "autoquery::query",
            "built query on {}: steps={:?} filter={}",
            query.collection(),
            query.steps(),
            query.filter_document()
        );
        query
    }

    fn apply_filter(
        &self,
        query: ChainQuery,
        params: &QueryParams,
        filter: QueryFilter,
    ) -> ChainQuery {
        match filter {
            QueryFilter::Match => match &params.matches {
                Some(m) => self.match_filter(query, m),
                None => query,
            },
            QueryFilter::Sort => match params.sort.as_deref() {
                Some(s) => self.sort(query, s),
                None => query,
            },
            QueryFilter::Skip => match params.skip {
                Some(n) => query.skip(n),
                None => query,
            },
            QueryFilter::Limit => match params.limit {
                Some(n) => query.limit(n),
                None => query,
            },
            QueryFilter::Select => match &params.select {
                Some(fields) => self.select(query, fields),
                None => query,
            },
        }
    }

    fn match_filter<'v>(
        &self,
        mut query: ChainQuery,
        matches: impl IntoIterator<Item = (&'v String, &'v QueryValue)>,
    ) -> ChainQuery {
        for (path, value) in self.dictionary.transform_keys(matches) {
            query = self.where_value(query, &path, value);
        }
        query
    }

    fn where_value(&self, query: ChainQuery, path: &str, value: &QueryValue) -> ChainQuery {
        match value {
            QueryValue::Scalar(QueryScalar::Text(s)) => {
                let tagged = parse_operator(s);
                let op = tagged.op.map_or(CmpOp::Eq, |o| o.cmp_op());
                query.where_cmp(path, op, self.model.cast(path, &tagged.operand))
            }
            QueryValue::Scalar(scalar) => {
                query.where_cmp(path, CmpOp::Eq, scalar.cast(&self.model, path))
            }
            QueryValue::List(values) => {
                let partition = partition_negated(values);
                let mut query = query;
                if !partition.excluded.is_empty() {
                    let nin = partition.excluded.iter().map(|s| self.model.cast(path, s)).collect();
                    query = query.where_nin(path, nin);
                }
                if !partition.included.is_empty() {
                    let vals =
                        partition.included.iter().map(|v| v.cast(&self.model, path)).collect();
                    query = query.where_in(path, vals);
                }
                query
            }
        }
    }

    fn sort(&self, query: ChainQuery, sort: &str) -> ChainQuery {
        let (order, key) = match sort.strip_prefix('-') {
            Some(rest) => (Order::Desc, rest),
            None => (Order::Asc, sort.strip_prefix('+').unwrap_or(sort)),
        };
        match self.dictionary.resolve(key) {
            Some(field) => query.sort(SortSpec { field: field.to_owned(), order }),
            None => {
                log::debug!(target: "autoquery::dropped", "unmapped sort key `{key}`");
                query
            }
        }
    }

    fn select(&self, query: ChainQuery, fields: &[String]) -> ChainQuery {
        let mapped: Vec<String> = fields
            .iter()
            .filter_map(|f| {
                let field = self.dictionary.resolve(f);
                if field.is_none() {
                    log::debug!(target: "autoquery::dropped", "unmapped select field `{f}`");
                }
                field.map(str::to_owned)
            })
            .collect();
        if mapped.is_empty() { query } else { query.select(mapped) }
    }
}
