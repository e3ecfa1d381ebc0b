pub mod core {
    pub mod context;
    pub mod description;
    pub mod html;
    pub mod index;
    pub mod model;
    pub mod nodes;
    pub mod numbered;
    pub mod parser;
    pub mod summary;
    pub mod triples;
    pub mod writer;
}

pub mod utils {
    pub mod document_processor;
}

pub mod config;
pub mod error;
pub mod mmap_reader;

pub use crate::core::description::{DataItem, DataType, Description, FlowType, ItemBuilder};
pub use crate::core::model::Ead;
pub use crate::core::nodes::{Header, Node, NodeDate, NodeID, NodeList};
pub use crate::error::{EadError, Result};
