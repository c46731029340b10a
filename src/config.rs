//! Builder configuration loaded from TOML.
//!
//! ```toml
//! [schema]
//! collection = "users"
//! [schema.fields]
//! "car.year" = "number"
//!
//! [dictionary]
//! "vehicle.year" = "car.year"
//!
//! [pipeline]
//! limit = 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dictionary::Dictionary;
use crate::errors::QueryError;
use crate::pipeline::AutoQuery;
use crate::query::QueryBuilder;
use crate::schema::{Model, Schema};

/// Fallbacks used by the pipeline builder when a stage value is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineDefaults {
    pub skip: i64,
    pub limit: i64,
    /// Field the `$meta` text score is sorted under.
    pub text_score_field: String,
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self { skip: 0, limit: 1000, text_score_field: "score".to_owned() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub schema: Option<Schema>,
    pub dictionary: Dictionary,
    pub pipeline: PipelineDefaults,
}

impl BuilderConfig {
    /// # Errors
    /// Returns an error if `s` is not valid TOML for this structure.
    pub fn from_toml_str(s: &str) -> Result<Self, QueryError> {
        Ok(toml::from_str(s)?)
    }

    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, QueryError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| QueryError::Io(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    pub fn query_builder_for<M: Model>(&self, model: M) -> QueryBuilder<M> {
        QueryBuilder::with_dictionary(model, self.dictionary.clone())
    }

    pub fn auto_query_for<M: Model>(&self, model: M) -> AutoQuery<M> {
        AutoQuery::create(model, self.dictionary.clone()).with_defaults(self.pipeline.clone())
    }

    /// # Errors
    /// Returns an error if no `[schema]` table was configured.
    pub fn query_builder(&self) -> Result<QueryBuilder<Schema>, QueryError> {
        Ok(self.query_builder_for(self.configured_schema()?))
    }

    /// # Errors
    /// Returns an error if no `[schema]` table was configured.
    pub fn auto_query(&self) -> Result<AutoQuery<Schema>, QueryError> {
        Ok(self.auto_query_for(self.configured_schema()?))
    }

    fn configured_schema(&self) -> Result<Schema, QueryError> {
        self.schema.clone().ok_or_else(|| QueryError::Config("missing [schema] table".into()))
    }
}
