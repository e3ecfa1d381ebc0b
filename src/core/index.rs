use crate::core::context::NodeConfig;
use crate::core::triples::Triple;
use crate::error::{EadError, Result};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

pub const DOC_TYPE_NODE: &str = "ead_node";
pub const DOC_TYPE_DESCRIPTION: &str = "ead_description";

/// Envelope handed to the indexing layer for one Node or Description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMessage {
    pub org_id: String,
    pub spec: String,
    pub revision: i32,
    #[serde(rename = "hubID")]
    pub hub_id: String,
    pub doc_type: String,
    #[serde(rename = "entryURI")]
    pub entry_uri: String,
    pub modified: i64,
    pub payload: serde_json::Value,
    pub triples: Vec<String>,
}

impl IndexMessage {
    /// Builds a message for the resource `id` of the dataset described by `cfg`.
    pub fn new<T: Serialize>(
        cfg: &NodeConfig,
        id: &str,
        doc_type: &str,
        payload: &T,
        triples: &[Triple],
    ) -> Result<Self> {
        Ok(IndexMessage {
            org_id: cfg.org_id.clone(),
            spec: cfg.spec.clone(),
            revision: cfg.revision,
            hub_id: format!("{}_{}_{}", cfg.org_id, cfg.spec, id.replace('/', "-")),
            doc_type: doc_type.to_string(),
            entry_uri: cfg.subject(id),
            modified: chrono::Utc::now().timestamp_millis(),
            payload: serde_json::to_value(payload)?,
            triples: triples.iter().map(Triple::to_ntriples).collect(),
        })
    }
}

/// Destination for index messages.
pub trait IndexPublisher: Send + Sync {
    fn publish(&self, message: IndexMessage) -> Result<()>;
}

/// Keeps published messages in memory.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    messages: Mutex<Vec<IndexMessage>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<IndexMessage> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IndexPublisher for MemoryPublisher {
    fn publish(&self, message: IndexMessage) -> Result<()> {
        let mut messages = self
            .messages
            .lock()
            .map_err(|e| EadError::Publish(e.to_string()))?;
        messages.push(message);
        Ok(())
    }
}

/// Appends one JSON document per message to a file.
#[derive(Debug)]
pub struct JsonLinesPublisher {
    file: Mutex<File>,
}

impl JsonLinesPublisher {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path.as_ref())?;
        Ok(JsonLinesPublisher {
            file: Mutex::new(file),
        })
    }
}

impl IndexPublisher for JsonLinesPublisher {
    fn publish(&self, message: IndexMessage) -> Result<()> {
        let line = serde_json::to_string(&message)?;
        let mut file = self
            .file
            .lock()
            .map_err(|e| EadError::Publish(e.to_string()))?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
