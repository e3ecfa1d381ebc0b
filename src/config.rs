use crate::core::context::NodeConfig;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_ORG_ID: &str = "hub3";
pub const DEFAULT_RDF_BASE_URL: &str = "http://data.hub3.org";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Settings shared by every document of a processing run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    pub org_id: String,
    pub rdf_base_url: String,
    pub sparse: bool,
    pub revision: i32,
    pub output_dir: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            org_id: DEFAULT_ORG_ID.to_string(),
            rdf_base_url: DEFAULT_RDF_BASE_URL.to_string(),
            sparse: false,
            revision: 0,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl ProcessorConfig {
    /// Reads `EAD_*` variables, loading a `.env` file first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();
        Self {
            org_id: lookup("EAD_ORG_ID").unwrap_or(defaults.org_id),
            rdf_base_url: lookup("EAD_RDF_BASE_URL").unwrap_or(defaults.rdf_base_url),
            sparse: lookup("EAD_SPARSE").map_or(defaults.sparse, |v| parse_bool(&v)),
            revision: lookup("EAD_REVISION")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.revision),
            output_dir: lookup("EAD_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        }
    }

    /// Processing context for one dataset.
    pub fn node_config(&self, spec: &str) -> NodeConfig {
        NodeConfig::new(self.org_id.as_str(), spec)
            .with_base_url(self.rdf_base_url.as_str())
            .with_sparse(self.sparse)
            .with_revision(self.revision)
    }
}
