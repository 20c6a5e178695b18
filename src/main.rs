use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use labinsight_lib::config::{self, EngineConfig};
use labinsight_lib::interpretation::{
    DefaultLabEngine, InterpretedLabResult, LabInterpretationEngine, PanelRequest, TrendRequest,
};
use labinsight_lib::models::enums::{BiologicalSex, LabCategory};
use labinsight_lib::models::{LabTest, UserDemographics};

#[derive(Parser)]
#[command(name = "labinsight")]
#[command(version, about = "Lab result interpretation and pattern recognition")]
struct Cli {
    /// Engine config file (JSON). Defaults to ~/.labinsight/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Load catalogs from this directory instead of the bundled copies
    #[arg(long, global = true)]
    catalog_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single value
    Interpret {
        /// Catalog test id (e.g. hemoglobin)
        #[arg(long = "test")]
        test_id: String,
        #[arg(long, allow_negative_numbers = true)]
        value: f64,
        #[arg(long)]
        age: u32,
        /// male, female or unspecified
        #[arg(long, default_value = "unspecified")]
        sex: BiologicalSex,
        #[arg(long)]
        pregnant: bool,
        /// Explanation level to include (1-5)
        #[arg(long)]
        level: Option<u8>,
    },
    /// Analyze a panel file: { "demographics": {...}, "values": [...] }
    Panel { file: PathBuf },
    /// Analyze a trend file: { "test_id": "...", "points": [...] }
    Trend { file: PathBuf },
    /// List catalog tests
    Catalog {
        #[arg(long)]
        category: Option<LabCategory>,
        /// Organ name, case-insensitive substring
        #[arg(long)]
        organ: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Pathway id (e.g. raas, hpt-axis)
        #[arg(long)]
        pathway: Option<String>,
    },
}

#[derive(Serialize)]
struct InterpretOutput {
    result: InterpretedLabResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

#[derive(Serialize)]
struct CatalogEntry<'a> {
    id: &'a str,
    name: &'a str,
    category: LabCategory,
    unit: Option<&'a str>,
}

fn main() -> ExitCode {
    labinsight_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine_config = match cli.config.or_else(config::default_config_path) {
        Some(path) => EngineConfig::load_or_default(&path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = cli.catalog_dir {
        engine_config.catalog_dir = Some(dir);
    }
    let engine = DefaultLabEngine::from_config(engine_config)?;

    match cli.command {
        Commands::Interpret {
            test_id,
            value,
            age,
            sex,
            pregnant,
            level,
        } => {
            let demographics = UserDemographics::new(age, sex).pregnant(pregnant);
            let result = engine.interpret(&test_id, value, &demographics)?;
            let explanation = level.map(|l| engine.explain(&result, l)).transpose()?;
            print_json(&InterpretOutput {
                result,
                explanation,
            })
        }
        Commands::Panel { file } => {
            let request: PanelRequest = read_json(&file)?;
            let analysis = engine.analyze_panel(&request.values, &request.demographics)?;
            print_json(&analysis)
        }
        Commands::Trend { file } => {
            let request: TrendRequest = read_json(&file)?;
            let trend = engine.analyze_trend(&request.test_id, &request.points)?;
            print_json(&trend)
        }
        Commands::Catalog {
            category,
            organ,
            search,
            pathway,
        } => {
            let catalog = engine.catalog();
            let mut tests: Vec<&LabTest> = match (&search, &organ) {
                (Some(q), _) => catalog.search_tests(q),
                (None, Some(o)) => catalog.tests_by_organ(o),
                (None, None) => catalog.tests().iter().collect(),
            };
            if let Some(o) = organ.as_deref().filter(|_| search.is_some()) {
                let o = o.to_lowercase();
                tests.retain(|t| {
                    t.primary_organs
                        .iter()
                        .any(|p| p.to_lowercase().contains(&o))
                });
            }
            if let Some(c) = category {
                tests.retain(|t| t.category == c);
            }
            if let Some(p) = pathway {
                tests.retain(|t| t.related_pathways.contains(&p));
            }
            let entries: Vec<CatalogEntry> = tests
                .into_iter()
                .map(|t| CatalogEntry {
                    id: &t.id,
                    name: &t.name,
                    category: t.category,
                    unit: t.reference_range.general().map(|b| b.unit.as_str()),
                })
                .collect();
            print_json(&entries)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<T, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let value = serde_json::from_str(&json)
        .map_err(|e| format!("cannot parse {}: {}", path.display(), e))?;
    Ok(value)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
