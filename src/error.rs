use thiserror::Error;

/// Errors raised while turning an EAD document into nodes, descriptions and triples.
#[derive(Debug, Error)]
pub enum EadError {
    #[error("unable to decode xml: {0}")]
    XmlDecode(String),

    #[error("unable to pop from queue: {0}")]
    UnbalancedStack(String),

    #[error("missing required element <{element}> in <{parent}>")]
    MissingRequiredElement { parent: String, element: String },

    #[error("duplicate inventory number {key} (first seen at order {first_order})")]
    DuplicateInventoryNumber { key: String, first_order: u64 },

    #[error("first date {first} is later than second date {second}")]
    InvalidDateRange { first: String, second: String },

    #[error("ead period is empty")]
    EmptyPeriod,

    #[error("invalid spec {spec:?}: {reason}")]
    InvalidSpec { spec: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unable to publish index message: {0}")]
    Publish(String),
}

impl From<roxmltree::Error> for EadError {
    fn from(err: roxmltree::Error) -> Self {
        EadError::XmlDecode(err.to_string())
    }
}

impl From<quick_xml::Error> for EadError {
    fn from(err: quick_xml::Error) -> Self {
        EadError::XmlDecode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EadError>;
