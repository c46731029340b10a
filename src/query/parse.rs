use crate::errors::QueryError;

use super::types::QueryParams;

/// # Errors
/// Returns an error if the JSON string cannot be parsed into a parameter bag.
pub fn parse_params_json(json: &str) -> Result<QueryParams, QueryError> {
    Ok(serde_json::from_str(json)?)
}
