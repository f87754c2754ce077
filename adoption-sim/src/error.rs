use thiserror::Error;

use crate::product::{ProductGroupId, ProductId};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown scheme identifier '{0}'")]
    UnknownScheme(String),

    #[error("unknown process model identifier '{0}'")]
    UnknownProcessModel(String),

    #[error("product {product} has no '{attribute}' attribute")]
    MissingAttribute { product: ProductId, attribute: String },

    #[error("unknown product id {0}")]
    UnknownProduct(ProductId),

    #[error("unknown product group id {0}")]
    UnknownProductGroup(ProductGroupId),

    #[error("unknown need '{0}'")]
    UnknownNeed(String),

    #[error("need indicator for '{need}' must lie in [0, 1], got {value}")]
    InvalidIndicator { need: String, value: f64 },

    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("event queue is empty")]
    EmptyQueue,

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SimResult<T> = Result<T, SimError>;
