use crate::core::context::ErrorRecord;
use crate::core::description::Description;
use crate::core::nodes::NodeList;
use crate::core::triples::{to_ntriples, Triple};
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything produced for one finding aid.
#[derive(Debug, Default)]
pub struct ProcessedDocument {
    pub spec: String,
    pub nodes: NodeList,
    pub description: Option<Description>,
    pub triples: Vec<Triple>,
    pub errors: Vec<ErrorRecord>,
    pub errors_csv: String,
}

/// Writer is responsible for persisting the results of one processed document.
pub trait Writer {
    /// Write the outputs of `document` into `output_dir`, returning the files written.
    fn write_document<P: AsRef<Path>>(
        &self,
        output_dir: P,
        document: &ProcessedDocument,
    ) -> Result<Vec<PathBuf>>;
}

/// FsWriter writes `{spec}.nodes.json`, `{spec}.description.json`, `{spec}.errors.csv` and `{spec}.nt`.
pub struct FsWriter;

impl Writer for FsWriter {
    fn write_document<P: AsRef<Path>>(
        &self,
        output_dir: P,
        document: &ProcessedDocument,
    ) -> Result<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

        let mut written = Vec::new();
        let spec = &document.spec;

        let nodes = serde_json::to_string_pretty(&document.nodes)?;
        written.push(self.write_file(output_dir, &format!("{}.nodes.json", spec), &nodes)?);

        if let Some(description) = &document.description {
            let json = serde_json::to_string_pretty(description)?;
            written.push(self.write_file(output_dir, &format!("{}.description.json", spec), &json)?);
        }

        written.push(self.write_file(
            output_dir,
            &format!("{}.errors.csv", spec),
            &document.errors_csv,
        )?);

        written.push(self.write_file(
            output_dir,
            &format!("{}.nt", spec),
            &to_ntriples(&document.triples),
        )?);

        Ok(written)
    }
}

impl FsWriter {
    fn write_file(&self, dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        let path = dir.join(name);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("wrote {} ({} bytes)", path.display(), content.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let document = ProcessedDocument {
            spec: "2.13.71".into(),
            description: Some(Description::default()),
            errors_csv: "nr,spec,order,path,key,label,dupKey,dupLabel,ctype,depth,error\n".into(),
            ..Default::default()
        };

        let written = FsWriter.write_document(dir.path(), &document).unwrap();
        assert_eq!(written.len(), 4);
        for name in [
            "2.13.71.nodes.json",
            "2.13.71.description.json",
            "2.13.71.errors.csv",
            "2.13.71.nt",
        ] {
            assert!(dir.path().join(name).exists(), "{} missing", name);
        }
    }

    #[test]
    fn test_skips_missing_description() {
        let dir = tempfile::tempdir().unwrap();
        let document = ProcessedDocument {
            spec: "leeg".into(),
            ..Default::default()
        };
        let written = FsWriter.write_document(dir.path(), &document).unwrap();
        assert_eq!(written.len(), 3);
        assert!(!dir.path().join("leeg.description.json").exists());
    }
}
