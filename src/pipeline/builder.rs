use bson::{Bson, Document, doc};
use serde_json::{Map, Value};

use super::stage::Stage;
use crate::config::PipelineDefaults;
use crate::dictionary::Dictionary;
use crate::errors::QueryError;
use crate::query::{
    CmpOp, QueryScalar, merge_operator, parse_operator, partition_negated,
};
use crate::schema::Model;

const CLAUSE_SEP: char = ';';
const PAIR_SEP: char = ':';
const LIST_SEP: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageKey {
    Search,
    Match,
    Sort,
    Skip,
    Limit,
    Include,
    Exclude,
}

impl StageKey {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "search" => Self::Search,
            "match" => Self::Match,
            "sort" => Self::Sort,
            "skip" => Self::Skip,
            "limit" => Self::Limit,
            "select" | "include" => Self::Include,
            "exclude" => Self::Exclude,
            _ => return None,
        })
    }
}

/// Builds aggregation pipelines from string-encoded stage parameters such as
/// `sort=year:desc;name:asc` or `select=name,car.model`.
#[derive(Debug, Clone)]
pub struct AutoQuery<M: Model> {
    model: M,
    dictionary: Dictionary,
    defaults: PipelineDefaults,
}

impl<M: Model> AutoQuery<M> {
    pub fn new(model: M) -> Self {
        Self::create(model, Dictionary::default())
    }

    pub fn create(model: M, dictionary: Dictionary) -> Self {
        Self { model, dictionary, defaults: PipelineDefaults::default() }
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: PipelineDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub const fn model(&self) -> &M {
        &self.model
    }

    pub const fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub const fn defaults(&self) -> &PipelineDefaults {
        &self.defaults
    }

    /// Stages for `query`, in key order with any search stage first. Never
    /// empty: with nothing to do the pipeline is a single match-all stage.
    ///
    /// # Errors
    /// Returns `QueryError::InvalidStageValue` if a recognized key holds
    /// anything but a string.
    pub fn build(&self, query: &Map<String, Value>) -> Result<Vec<Stage>, QueryError> {
        let mut pairs = Vec::with_capacity(query.len());
        for (key, value) in query {
            if StageKey::from_key(key).is_none() {
                log::debug!(target: "autoquery::dropped", "unrecognized stage `{key}`");
                continue;
            }
            let raw = value.as_str().ok_or_else(|| QueryError::InvalidStageValue {
                stage: key.clone(),
                found: json_type(value),
            })?;
            pairs.push((key.as_str(), raw));
        }
        Ok(self.build_pairs(pairs))
    }

    /// # Errors
    /// Returns an error if `json` is not an object or holds a non-string
    /// value under a recognized key.
    pub fn build_json(&self, json: &str) -> Result<Vec<Stage>, QueryError> {
        let query: Map<String, Value> = serde_json::from_str(json)?;
        self.build(&query)
    }

    /// # Errors
    /// Same as [`AutoQuery::build`].
    pub fn build_documents(&self, query: &Map<String, Value>) -> Result<Vec<Document>, QueryError> {
        Ok(self.build(query)?.iter().map(Stage::to_document).collect())
    }

    /// Stages for already-split `key=value` pairs, e.g. a parsed query string.
    pub fn build_pairs<I, K, V>(&self, pairs: I) -> Vec<Stage>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut stages = Vec::new();
        let mut search = None;
        for (key, raw) in pairs {
            let (key, raw) = (key.as_ref(), raw.as_ref());
            let Some(stage_key) = StageKey::from_key(key) else {
                log::debug!(target: "autoquery::dropped", "unrecognized stage `{key}`");
                continue;
            };
            match self.stage(stage_key, raw) {
                Some(stage @ Stage::Search(_)) => search = Some(stage),
                Some(stage) => stages.push(stage),
                None => log::debug!(target: "autoquery::dropped", "no-op stage `{key}={raw}`"),
            }
        }
        if let Some(stage) = search {
            stages.insert(0, stage);
        }
        if stages.is_empty() {
            stages.push(Stage::match_all());
        }
        log::trace!(
            target: "autoquery::pipeline",
            "built {} stage(s) on {}",
            stages.len(),
            self.model.collection_name()
        );
        stages
    }

    fn stage(&self, key: StageKey, raw: &str) -> Option<Stage> {
        match key {
            StageKey::Search => Self::search(raw),
            StageKey::Match => self.match_stage(raw),
            StageKey::Sort => self.sort(raw),
            StageKey::Skip => Some(Stage::Skip(self.skip(raw))),
            StageKey::Limit => Some(Stage::Limit(self.limit(raw))),
            StageKey::Include => self.project(raw, true),
            StageKey::Exclude => self.project(raw, false),
        }
    }

    fn search(raw: &str) -> Option<Stage> {
        if raw.trim().is_empty() { None } else { Some(Stage::Search(raw.to_owned())) }
    }

    fn match_stage(&self, raw: &str) -> Option<Stage> {
        let mut combined = Document::new();
        for clause in raw.split(CLAUSE_SEP).map(str::trim).filter(|c| !c.is_empty()) {
            let Some((field, value)) = clause.split_once(PAIR_SEP) else {
                log::debug!(target: "autoquery::dropped", "match clause `{clause}` lacks `:`");
                continue;
            };
            let (field, value) = (field.trim(), value.trim());
            if field.is_empty() || value.is_empty() {
                log::debug!(target: "autoquery::dropped", "match clause `{clause}` is incomplete");
                continue;
            }
            let path = self.dictionary.resolve_or_raw(field);
            self.merge_clause(&mut combined, path, value);
        }
        if combined.is_empty() { None } else { Some(Stage::Match(combined)) }
    }

    fn merge_clause(&self, combined: &mut Document, path: &str, value: &str) {
        if value.contains(LIST_SEP) {
            let items: Vec<QueryScalar> = value
                .split(LIST_SEP)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(QueryScalar::from)
                .collect();
            let partition = partition_negated(&items);
            if !partition.excluded.is_empty() {
                let nin = partition.excluded.iter().map(|v| self.model.cast(path, v)).collect();
                merge_operator(combined, path, "$nin", Bson::Array(nin));
            }
            if !partition.included.is_empty() {
                let vals = partition.included.iter().map(|v| v.cast(&self.model, path)).collect();
                merge_operator(combined, path, "$in", Bson::Array(vals));
            }
            return;
        }
        let tagged = parse_operator(value);
        let operand = self.model.cast(path, &tagged.operand);
        match tagged.op.map(|o| o.cmp_op()) {
            None | Some(CmpOp::Eq) => {
                combined.insert(path, operand);
            }
            Some(op) => merge_operator(combined, path, op.operator(), operand),
        }
    }

    /// `$meta` sorts by text score, `$natural:asc|desc` by natural order;
    /// anything else is `field:asc|desc` pairs, all of which are kept.
    fn sort(&self, raw: &str) -> Option<Stage> {
        let raw = raw.trim();
        let (head, tail) = raw.split_once(PAIR_SEP).unwrap_or((raw, ""));
        match head.trim() {
            "$meta" => {
                let mut sort = Document::new();
                sort.insert(
                    self.defaults.text_score_field.as_str(),
                    doc! { "$meta": "textScore" },
                );
                Some(Stage::Sort(sort))
            }
            "$natural" => {
                let dir = direction(tail);
                if dir.is_none() {
                    log::debug!(target: "autoquery::dropped", "invalid natural sort `{raw}`");
                }
                dir.map(|d| Stage::Sort(doc! { "$natural": d }))
            }
            _ => self.sort_pairs(raw),
        }
    }

    fn sort_pairs(&self, raw: &str) -> Option<Stage> {
        let mut sort = Document::new();
        for pair in raw.split(CLAUSE_SEP).map(str::trim).filter(|p| !p.is_empty()) {
            let parsed = pair
                .split_once(PAIR_SEP)
                .and_then(|(field, dir)| direction(dir).map(|d| (field.trim(), d)))
                .filter(|(field, _)| !field.is_empty());
            let Some((field, d)) = parsed else {
                log::debug!(target: "autoquery::dropped", "invalid sort pair `{pair}`");
                continue;
            };
            sort.insert(self.dictionary.resolve_or_raw(field), d);
        }
        if sort.is_empty() { None } else { Some(Stage::Sort(sort)) }
    }

    fn skip(&self, raw: &str) -> i64 {
        match raw.trim().parse::<i64>() {
            Ok(n) if n >= 0 => n,
            _ => {
                let fallback = self.defaults.skip;
                log::debug!(target: "autoquery::dropped", "skip `{raw}` replaced by {fallback}");
                self.defaults.skip
            }
        }
    }

    fn limit(&self, raw: &str) -> i64 {
        match raw.trim().parse::<i64>() {
            Ok(n) if n > 0 => n,
            _ => {
                let fallback = self.defaults.limit;
                log::debug!(target: "autoquery::dropped", "limit `{raw}` replaced by {fallback}");
                self.defaults.limit
            }
        }
    }

    fn project(&self, raw: &str, include: bool) -> Option<Stage> {
        let mut projection = Document::new();
        for field in raw.split(LIST_SEP).map(str::trim).filter(|f| !f.is_empty()) {
            projection.insert(self.dictionary.resolve_or_raw(field), include);
        }
        if projection.is_empty() { None } else { Some(Stage::Project(projection)) }
    }
}

fn direction(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("asc") {
        Some(1)
    } else if raw.eq_ignore_ascii_case("desc") {
        Some(-1)
    } else {
        None
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
