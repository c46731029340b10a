// Submodules for separation of concerns
mod builder;
mod chain;
mod eval;
mod operators;
mod order;
mod parse;
mod types;

pub use builder::QueryBuilder;
pub use chain::ChainQuery;
pub use eval::{compare_bson, compare_docs, eval_filter, execute, project_fields};
pub use operators::{Operator, Partition, Tagged, parse_operator, partition_negated};
pub use order::sort_by_reference;
pub use parse::parse_params_json;
pub use types::{
    CmpOp, Filter, FindOptions, Order, QueryFilter, QueryParams, QueryScalar, QueryValue, SortSpec,
};

pub(crate) use chain::merge_operator;
