use bson::{Bson, Document};

use super::types::{CmpOp, Filter, FindOptions, QueryFilter, SortSpec};

/// An unexecuted query over one collection.
///
/// Every chain method consumes the query and returns the next state, so a
/// value handed to a filter step is never changed behind the caller's back.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainQuery {
    collection: String,
    conditions: Vec<Filter>,
    options: FindOptions,
    steps: Vec<QueryFilter>,
}

impl ChainQuery {
    /// Unfiltered query over the whole collection.
    pub fn find_all(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            conditions: Vec::new(),
            options: FindOptions::default(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn where_cmp(mut self, path: impl Into<String>, op: CmpOp, value: Bson) -> Self {
        self.conditions.push(Filter::Cmp { path: path.into(), op, value });
        self
    }

    #[must_use]
    pub fn where_in(mut self, path: impl Into<String>, values: Vec<Bson>) -> Self {
        self.conditions.push(Filter::In { path: path.into(), values });
        self
    }

    #[must_use]
    pub fn where_nin(mut self, path: impl Into<String>, values: Vec<Bson>) -> Self {
        self.conditions.push(Filter::Nin { path: path.into(), values });
        self
    }

    #[must_use]
    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.options.sort.get_or_insert_with(Vec::new).push(spec);
        self
    }

    #[must_use]
    pub fn skip(mut self, n: u64) -> Self {
        self.options.skip = Some(n);
        self
    }

    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.options.limit = Some(n);
        self
    }

    #[must_use]
    pub fn select(mut self, fields: Vec<String>) -> Self {
        self.options.projection.get_or_insert_with(Vec::new).extend(fields);
        self
    }

    #[must_use]
    pub(crate) fn mark(mut self, step: QueryFilter) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn conditions(&self) -> &[Filter] {
        &self.conditions
    }

    #[must_use]
    pub const fn options(&self) -> &FindOptions {
        &self.options
    }

    /// Filters dispatched while building, in application order.
    #[must_use]
    pub fn steps(&self) -> &[QueryFilter] {
        &self.steps
    }

    /// The filter the store evaluates, i.e. `filter_document` as a tree.
    #[must_use]
    pub fn filter(&self) -> Filter {
        let mut merged = self.merged_conditions();
        match merged.len() {
            0 => Filter::True,
            1 => merged.remove(0),
            _ => Filter::And(merged),
        }
    }

    /// Conditions after per-path merging: an equality replaces whatever the
    /// path held, an operator joins earlier operators on the path (replacing
    /// the same operator) or replaces an equality.
    #[must_use]
    pub fn merged_conditions(&self) -> Vec<Filter> {
        let mut slots: Vec<(&str, Vec<&Filter>)> = Vec::new();
        for c in &self.conditions {
            let Some(path) = c.path() else {
                continue;
            };
            let Some((_, slot)) = slots.iter_mut().find(|(p, _)| *p == path) else {
                slots.push((path, vec![c]));
                continue;
            };
            match c.operator() {
                Some(op) if slot.iter().all(|f| f.operator().is_some()) => {
                    slot.retain(|f| f.operator() != Some(op));
                    slot.push(c);
                }
                _ => *slot = vec![c],
            }
        }
        slots.into_iter().flat_map(|(_, fs)| fs).cloned().collect()
    }

    /// Filter in the store's query syntax, e.g. `{"car.year": {"$gte": 2007}}`.
    #[must_use]
    pub fn filter_document(&self) -> Document {
        let mut doc = Document::new();
        for c in &self.conditions {
            c.merge_into(&mut doc);
        }
        doc
    }

    #[must_use]
    pub fn sort_document(&self) -> Option<Document> {
        let sort = self.options.sort.as_ref()?;
        let mut doc = Document::new();
        for s in sort {
            doc.insert(s.field.clone(), s.order.as_i32());
        }
        Some(doc)
    }

    #[must_use]
    pub fn projection_document(&self) -> Option<Document> {
        let fields = self.options.projection.as_ref()?;
        let mut doc = Document::new();
        for f in fields {
            doc.insert(f.clone(), 1);
        }
        Some(doc)
    }
}

impl Filter {
    fn path(&self) -> Option<&str> {
        match self {
            Self::True | Self::And(_) => None,
            Self::In { path, .. } | Self::Nin { path, .. } | Self::Cmp { path, .. } => Some(path),
        }
    }

    /// Operator key this condition occupies under its path; `None` for
    /// plain equality.
    fn operator(&self) -> Option<&'static str> {
        match self {
            Self::True | Self::And(_) | Self::Cmp { op: CmpOp::Eq, .. } => None,
            Self::Cmp { op, .. } => Some(op.operator()),
            Self::In { .. } => Some("$in"),
            Self::Nin { .. } => Some("$nin"),
        }
    }

    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        self.merge_into(&mut doc);
        doc
    }

    pub(crate) fn merge_into(&self, doc: &mut Document) {
        match self {
            Self::True => {}
            Self::And(fs) => fs.iter().for_each(|f| f.merge_into(doc)),
            Self::Cmp { path, op: CmpOp::Eq, value } => {
                doc.insert(path.clone(), value.clone());
            }
            Self::Cmp { path, op, value } => {
                merge_operator(doc, path, op.operator(), value.clone());
            }
            Self::In { path, values } => {
                merge_operator(doc, path, "$in", Bson::Array(values.clone()));
            }
            Self::Nin { path, values } => {
                merge_operator(doc, path, "$nin", Bson::Array(values.clone()));
            }
        }
    }
}

/// Adds `{op: value}` under `path`, joining an existing operator document for
/// the same path. A plain equality value already at `path` is replaced.
pub(crate) fn merge_operator(doc: &mut Document, path: &str, op: &str, value: Bson) {
    if let Some(Bson::Document(ops)) = doc.get_mut(path)
        && ops.keys().all(|k| k.starts_with('$'))
    {
        ops.insert(op, value);
        return;
    }
    let mut ops = Document::new();
    ops.insert(op, value);
    doc.insert(path, ops);
}
