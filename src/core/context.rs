use crate::error::{EadError, Result};
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

lazy_static! {
    static ref NEWLINE: Regex = Regex::new(r"\r?\n").unwrap();
}

const CSV_HEADER: [&str; 11] = [
    "nr", "spec", "order", "path", "key", "label", "dupKey", "dupLabel", "ctype", "depth", "error",
];

/// Concurrency safe counter handing out node orders.
#[derive(Debug, Default)]
pub struct NodeCounter {
    counter: AtomicU64,
}

impl NodeCounter {
    /// Increments the count by one and returns the new value
    pub fn increment(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Snapshot of the current count
    pub fn count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

/// One recoverable problem found while processing a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub path: String,
    pub spec: String,
    pub order: u64,
    pub key: String,
    pub label: String,
    pub dup_key: String,
    pub dup_label: String,
    pub c_type: String,
    pub depth: u32,
    pub error: String,
}

/// Per-document processing context shared by the node, description and triple passes.
#[derive(Debug, Default)]
pub struct NodeConfig {
    pub org_id: String,
    pub spec: String,
    pub revision: i32,
    pub rdf_base_url: String,
    pub sparse: bool,
    pub title: Vec<String>,
    pub period_desc: Vec<String>,
    pub counter: NodeCounter,
    pub errors: Vec<ErrorRecord>,
    labels: HashMap<String, String>,
}

impl NodeConfig {
    pub fn new(org_id: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            spec: spec.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.rdf_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn with_revision(mut self, revision: i32) -> Self {
        self.revision = revision;
        self
    }

    /// Node path to tree label lookup for already visited nodes.
    pub fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }

    /// Registers the label of a node path and returns the path under which it was stored.
    ///
    /// A path that is already taken is renamed to `{path}-{order}`.
    pub fn register_path(&mut self, path: String, order: u64, label: impl Into<String>) -> String {
        let path = if self.labels.contains_key(&path) {
            let renamed = format!("{}-{}", path, order);
            warn!("renaming duplicate node path {} to {} in {}", path, renamed, self.spec);
            renamed
        } else {
            path
        };
        self.labels.insert(path.clone(), label.into());
        path
    }

    /// Subject URI for an id inside this dataset.
    pub fn subject(&self, id: &str) -> String {
        format!(
            "{}/{}/archive/{}/{}",
            self.rdf_base_url, self.org_id, self.spec, id
        )
    }

    pub fn record(&mut self, record: ErrorRecord) {
        self.errors.push(record);
    }

    /// Records a dataset level error that is not tied to a node.
    pub fn record_error(&mut self, err: &EadError) {
        let record = ErrorRecord {
            spec: self.spec.clone(),
            error: err.to_string(),
            ..Default::default()
        };
        self.errors.push(record);
    }

    /// Renders the accumulated errors as CSV for operator triage.
    pub fn errors_to_csv(&self) -> Result<String> {
        let clean = |input: &str| NEWLINE.replace_all(input.trim(), " ").into_owned();

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for (idx, record) in self.errors.iter().enumerate() {
            writer.serialize(CsvRow {
                nr: idx,
                spec: record.spec.trim(),
                order: record.order,
                path: &record.path,
                key: &record.key,
                label: clean(&record.label),
                dup_key: &record.dup_key,
                dup_label: clean(&record.dup_label),
                c_type: &record.c_type,
                depth: record.depth,
                error: clean(&record.error),
            })?;
        }
        let bytes = writer.into_inner().map_err(|e| EadError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// One line of the error export, in header order.
#[derive(Serialize)]
struct CsvRow<'a> {
    nr: usize,
    spec: &'a str,
    order: u64,
    path: &'a str,
    key: &'a str,
    label: String,
    dup_key: &'a str,
    dup_label: String,
    c_type: &'a str,
    depth: u32,
    error: String,
}

/// Checks that a dataset identifier is safe to use in paths and URIs.
pub fn validate_spec(spec: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(EadError::InvalidSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        })
    };

    if spec.is_empty() {
        return invalid("spec cannot be empty");
    }
    if spec.contains("..") {
        return invalid("spec cannot have two or more dots in sequence");
    }
    if spec.contains('/') || spec.contains('\\') {
        return invalid("spec cannot contain forward or backward slashes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic() {
        let counter = NodeCounter::default();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_taken_path_is_renamed() {
        let mut cfg = NodeConfig::new("org", "spec");
        assert_eq!(cfg.register_path("A~1".into(), 2, "Eerste"), "A~1");
        assert_eq!(cfg.register_path("B~1".into(), 4, "Tweede"), "B~1");
        assert_eq!(cfg.register_path("A~1".into(), 7, "Derde"), "A~1-7");
        assert_eq!(cfg.labels().get("A~1").map(String::as_str), Some("Eerste"));
        assert_eq!(cfg.labels().get("A~1-7").map(String::as_str), Some("Derde"));
    }

    #[test]
    fn test_subject_trims_base_url() {
        let cfg = NodeConfig::new("nl-hana", "2.13.71").with_base_url("http://data.example.org/");
        assert_eq!(
            cfg.subject("12"),
            "http://data.example.org/nl-hana/archive/2.13.71/12"
        );
    }

    #[test]
    fn test_errors_to_csv() {
        let mut cfg = NodeConfig::new("org", " 2.13.71 ");
        cfg.record(ErrorRecord {
            spec: cfg.spec.clone(),
            order: 4,
            path: "12".into(),
            key: "12".into(),
            label: "Notulen\nvergadering".into(),
            dup_key: "12".into(),
            dup_label: "Notulen".into(),
            c_type: "file".into(),
            depth: 2,
            error: "duplicate".into(),
        });
        let csv = cfg.errors_to_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("nr,spec,order,path,key,label,dupKey,dupLabel,ctype,depth,error")
        );
        assert_eq!(
            lines.next(),
            Some("0,2.13.71,4,12,12,Notulen vergadering,12,Notulen,file,2,duplicate")
        );
    }

    #[test]
    fn test_errors_to_csv_quotes_separators() {
        let mut cfg = NodeConfig::new("org", "spec");
        cfg.record(ErrorRecord {
            path: "12, 13".into(),
            key: "12, 13".into(),
            label: "Brieven \"in\" map".into(),
            dup_key: "12, 13".into(),
            error: "dup".into(),
            ..Default::default()
        });
        let csv = cfg.errors_to_csv().unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        assert_eq!(reader.headers().unwrap().len(), 11);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 11);
        assert_eq!(&rows[0][3], "12, 13");
        assert_eq!(&rows[0][4], "12, 13");
        assert_eq!(&rows[0][5], "Brieven \"in\" map");
        assert_eq!(&rows[0][6], "12, 13");
        assert_eq!(&rows[0][10], "dup");
    }

    #[test]
    fn test_errors_to_csv_without_errors_has_header() {
        let cfg = NodeConfig::new("org", "spec");
        assert_eq!(
            cfg.errors_to_csv().unwrap(),
            "nr,spec,order,path,key,label,dupKey,dupLabel,ctype,depth,error\n"
        );
    }

    #[test]
    fn test_validate_spec() {
        assert!(validate_spec("2.13.71").is_ok());
        assert!(validate_spec("").is_err());
        assert!(validate_spec("a..b").is_err());
        assert!(validate_spec("a/b").is_err());
        assert!(validate_spec("a\\b").is_err());
    }
}
