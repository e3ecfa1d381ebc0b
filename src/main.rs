use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser as CliParser, Subcommand};
use log::info;

use ead_parser::config::ProcessorConfig;
use ead_parser::core::nodes::build_node_list;
use ead_parser::core::parser::{EadParser, Parser};
use ead_parser::utils::document_processor::{spec_from_path, EadProcessor};
use ead_parser::Description;

#[derive(CliParser, Debug)]
#[command(author, version, about = "EAD finding aid ingestion", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process one EAD file or a directory of EAD files
    #[command(arg_required_else_help = true)]
    Process {
        /// EAD file or directory with `*.xml` files
        path: PathBuf,

        /// Directory the outputs are written to
        #[arg(long, short, value_name = "DIR", env = "EAD_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Organisation identifier used in subjects and hub ids
        #[arg(long, env = "EAD_ORG_ID")]
        org_id: Option<String>,

        /// Base URL of the RDF subjects
        #[arg(long, env = "EAD_RDF_BASE_URL")]
        base_url: Option<String>,

        /// Build sparse nodes without scope content
        #[arg(long)]
        sparse: bool,
    },
    /// Print the description of an EAD file as JSON
    #[command(arg_required_else_help = true)]
    Describe { file: PathBuf },
    /// Print the node tree of an EAD file as JSON
    #[command(arg_required_else_help = true)]
    Nodes { file: PathBuf },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    if env_logger::try_init().is_err() {
        // Logger already initialized
    }

    let cli = Cli::parse();
    let mut config = ProcessorConfig::from_env();

    match cli.command {
        Commands::Process {
            path,
            output,
            org_id,
            base_url,
            sparse,
        } => {
            if let Some(output) = output {
                config.output_dir = output;
            }
            if let Some(org_id) = org_id {
                config.org_id = org_id;
            }
            if let Some(base_url) = base_url {
                config.rdf_base_url = base_url;
            }
            config.sparse = config.sparse || sparse;

            let output_dir = config.output_dir.clone();
            let processor = EadProcessor::new(config);

            if path.is_dir() {
                let reports = processor.process_directory(&path, &output_dir)?;
                info!("processed {} finding aids", reports.len());
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                let report = processor.process_to_dir(&path, &output_dir)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Commands::Describe { file } => {
            let ead = EadParser
                .parse(&file)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let description = Description::build(&ead)?;
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Commands::Nodes { file } => {
            let ead = EadParser
                .parse(&file)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let spec = spec_from_path(&file)?;
            let mut cfg = config.node_config(&spec);
            let nodes = build_node_list(ead.archdesc.as_ref().and_then(|a| a.dsc.as_ref()), &mut cfg)?;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
    }

    Ok(())
}
