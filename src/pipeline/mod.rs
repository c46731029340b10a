//! Aggregation-pipeline variant of the builder.
mod builder;
mod stage;

pub use builder::AutoQuery;
pub use stage::Stage;
