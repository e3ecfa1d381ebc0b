use crate::config::ProcessorConfig;
use crate::core::context::{validate_spec, NodeConfig};
use crate::core::description::Description;
use crate::core::index::{IndexMessage, IndexPublisher, JsonLinesPublisher, DOC_TYPE_DESCRIPTION, DOC_TYPE_NODE};
use crate::core::model::Ead;
use crate::core::nodes::{build_node_list, Node, NodeList};
use crate::core::parser::{EadParser, Parser};
use crate::core::triples::Triple;
use crate::core::writer::{FsWriter, ProcessedDocument, Writer};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Counts of what one finding aid produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingReport {
    pub spec: String,
    pub nodes: usize,
    pub items: usize,
    pub triples: usize,
    pub errors: usize,
}

impl ProcessedDocument {
    pub fn report(&self) -> ProcessingReport {
        ProcessingReport {
            spec: self.spec.clone(),
            nodes: self.nodes.flatten().len(),
            items: self.description.as_ref().map_or(0, |d| d.nr_items),
            triples: self.triples.len(),
            errors: self.errors.len(),
        }
    }
}

/// Dataset identifier of a finding aid: its file name without extension.
pub fn spec_from_path(path: &Path) -> Result<String> {
    let spec = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    validate_spec(&spec).with_context(|| format!("Invalid dataset name for {}", path.display()))?;
    Ok(spec)
}

/// The node as published: its own fields without the nested children.
fn node_payload(node: &Node) -> Node {
    Node {
        children: Vec::new(),
        ..node.clone()
    }
}

/// Builds the narrative description of a parsed document.
type Describe = fn(&Ead) -> crate::error::Result<Description>;

pub struct EadProcessor {
    parser: EadParser,
    writer: FsWriter,
    describe: Describe,
    config: ProcessorConfig,
}

impl EadProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            parser: EadParser,
            writer: FsWriter,
            describe: Description::build,
            config,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process one finding aid and publish its nodes and description.
    pub fn process_file<P: AsRef<Path>>(&self, path: P, publisher: &dyn IndexPublisher) -> Result<ProcessingReport> {
        let document = self.process(path.as_ref(), publisher)?;
        Ok(document.report())
    }

    /// Runs every pass over one file.
    ///
    /// Only parse and publish failures abort; everything else is recorded on the document.
    pub fn process(&self, path: &Path, publisher: &dyn IndexPublisher) -> Result<ProcessedDocument> {
        let spec = spec_from_path(path)?;
        info!("Processing finding aid {} ({})", spec, path.display());

        let ead = self
            .parser
            .parse(path)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let mut cfg = self.config.node_config(&spec);
        if let Some(header) = &ead.header {
            let title = header.title();
            if !title.is_empty() {
                cfg.title.push(title);
            }
        }

        let archdesc = ead.archdesc.as_ref();
        let nodes = build_node_list(archdesc.and_then(|a| a.dsc.as_ref()), &mut cfg)
            .with_context(|| format!("Failed to build nodes for {}", spec))?;

        let description = match (self.describe)(&ead) {
            Ok(description) => Some(description),
            Err(e) => {
                warn!("Unable to build description for {}: {}", spec, e);
                cfg.record_error(&e);
                None
            }
        };

        cfg.period_desc = archdesc.map(|a| a.normal_periods()).unwrap_or_default();

        let mut triples = Vec::new();
        for node in nodes.flatten() {
            let node_triples = node.triples(&cfg);
            let message = IndexMessage::new(
                &cfg,
                &node.path,
                DOC_TYPE_NODE,
                &node_payload(node),
                &node_triples,
            )?;
            publisher.publish(message)?;
            triples.extend(node_triples);
        }

        if let Some(description) = &description {
            let desc_triples = description.graph(&mut cfg, description.summary.unit());
            let message = IndexMessage::new(&cfg, "desc", DOC_TYPE_DESCRIPTION, description, &desc_triples)?;
            publisher.publish(message)?;
            triples.extend(desc_triples);
        }

        debug!("{}: {} triples, {} errors", spec, triples.len(), cfg.errors.len());

        Self::finish(spec, nodes, description, triples, cfg)
    }

    fn finish(
        spec: String,
        nodes: NodeList,
        description: Option<Description>,
        triples: Vec<Triple>,
        cfg: NodeConfig,
    ) -> Result<ProcessedDocument> {
        let errors_csv = cfg.errors_to_csv()?;
        Ok(ProcessedDocument {
            spec,
            nodes,
            description,
            triples,
            errors: cfg.errors,
            errors_csv,
        })
    }

    /// Process all `*.xml` files in the input directory in parallel and write results to the output directory
    pub fn process_directory<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        input_dir: P1,
        output_dir: P2,
    ) -> Result<Vec<ProcessingReport>> {
        let input_path = input_dir.as_ref();
        let output_path = output_dir.as_ref();

        info!("Starting to process finding aids from: {}", input_path.display());
        fs::create_dir_all(output_path)
            .with_context(|| format!("Failed to create output directory {}", output_path.display()))?;

        let mut files: Vec<PathBuf> = Vec::new();
        let entries = fs::read_dir(input_path)
            .with_context(|| format!("Failed to read input directory {}", input_path.display()))?;
        for entry in entries {
            let file_path = entry.context("Failed to read directory entry")?.path();
            let is_xml = file_path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case("xml"));

            if file_path.is_file() && is_xml {
                files.push(file_path);
            } else {
                debug!("Skipping entry: {:?}", file_path.file_name());
            }
        }
        files.sort();

        let reports: Vec<ProcessingReport> = files
            .par_iter()
            .filter_map(|file_path| match self.process_to_dir(file_path, output_path) {
                Ok(report) => {
                    info!(
                        "Processed {}: {} nodes, {} items, {} errors",
                        report.spec, report.nodes, report.items, report.errors
                    );
                    Some(report)
                }
                Err(e) => {
                    error!("Failed to process {:?}: {:#}", file_path.file_name(), e);
                    None
                }
            })
            .collect();

        info!(
            "Completed processing {} of {} finding aids",
            reports.len(),
            files.len()
        );
        Ok(reports)
    }

    /// Process one file, writing its outputs and published messages into `output_path`.
    pub fn process_to_dir(&self, file_path: &Path, output_path: &Path) -> Result<ProcessingReport> {
        let spec = spec_from_path(file_path)?;
        fs::create_dir_all(output_path)
            .with_context(|| format!("Failed to create output directory {}", output_path.display()))?;
        let publisher = JsonLinesPublisher::create(output_path.join(format!("{}.messages.jsonl", spec)))?;
        let document = self.process(file_path, &publisher)?;
        self.writer.write_document(output_path, &document)?;
        Ok(document.report())
    }
}

/// Processes the configured input directory into the configured output directory.
pub fn run_document_processing<P: AsRef<Path>>(input_dir: P, config: ProcessorConfig) -> Result<Vec<ProcessingReport>> {
    if env_logger::try_init().is_err() {
        debug!("logger already initialized");
    }

    let output_dir = config.output_dir.clone();
    info!(
        "Starting EAD processing from '{}' to '{}'",
        input_dir.as_ref().display(),
        output_dir.display()
    );

    let processor = EadProcessor::new(config);
    let reports = processor.process_directory(input_dir.as_ref(), &output_dir)?;

    info!("EAD processing completed!");
    Ok(reports)
}
