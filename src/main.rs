use std::fs::File;
use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::info;

use addr_standardizer::app::ports::QualifyOutputPort;
use addr_standardizer::app::QualifyUseCase;
use addr_standardizer::constants::EXPORT_HEADERS;
use addr_standardizer::ingest;
use addr_standardizer::logging;
use addr_standardizer::pipeline::qualify::{
    DefaultQualificationGate, QualificationConfig, QualifiedRecord,
};
use addr_standardizer::pipeline::Pipeline;
use addr_standardizer::report::QualificationSummary;

#[derive(Parser)]
#[command(name = "addr-standardizer")]
#[command(about = "Address standardization and qualification pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map, parse and normalize input files and preview the result
    Standardize {
        /// CSV files to process
        files: Vec<PathBuf>,
        /// How many rows to show per file
        #[arg(long, default_value_t = 10)]
        preview_rows: usize,
    },
    /// Run the complete pipeline and report qualification verdicts
    Qualify {
        /// CSV files to process
        files: Vec<PathBuf>,
        /// Write qualified records to this CSV file
        #[arg(long)]
        qualified_out: Option<PathBuf>,
        /// Disqualify records with missing person names
        #[arg(long)]
        require_names: bool,
        /// Print the run summary as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

/// Streams qualified records into a CSV file in canonical column order.
struct CsvExportSink {
    writer: tokio::sync::Mutex<csv::Writer<File>>,
}

impl CsvExportSink {
    fn create(path: &PathBuf) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(EXPORT_HEADERS)?;
        Ok(Self {
            writer: tokio::sync::Mutex::new(writer),
        })
    }
}

#[async_trait]
impl QualifyOutputPort for CsvExportSink {
    async fn write_assessed_record(&self, record: &QualifiedRecord) -> Result<()> {
        let address = &record.record.address;
        let provenance = &record.record.provenance;
        let row_number = provenance.row_number.to_string();
        let mut writer = self.writer.lock().await;
        writer.write_record([
            address.first_name.as_str(),
            address.last_name.as_str(),
            address.street_address.as_str(),
            address.unit.as_str(),
            address.city.as_str(),
            address.state.as_str(),
            address.zip_code.as_str(),
            address.country.as_str(),
            provenance.source_file.as_str(),
            row_number.as_str(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}

/// Sink for records that are only reported on the terminal.
struct NullSink;

#[async_trait]
impl QualifyOutputPort for NullSink {
    async fn write_assessed_record(&self, _record: &QualifiedRecord) -> Result<()> {
        Ok(())
    }
}

async fn run_standardize(files: Vec<PathBuf>, preview_rows: usize) -> Result<()> {
    let batches = ingest::read_csv_paths(&files)?;
    let pipeline = Pipeline::default();

    for batch in &batches {
        let standardized = pipeline.standardize_batch(batch);

        println!("\n📄 {}", standardized.file_name);
        for (field, column) in &standardized.mapping.columns {
            println!("   {} <- {}", field.as_str(), column);
        }
        if let Some(combined) = &standardized.mapping.combined_address {
            println!("   combined address column: {}", combined);
        }

        for record in standardized.records.iter().take(preview_rows) {
            let address = &record.address;
            println!(
                "   [{}] {} {} | {} {} | {}, {} {}",
                record.provenance.row_number,
                address.first_name,
                address.last_name,
                address.street_address,
                address.unit,
                address.city,
                address.state,
                address.zip_code,
            );
        }
        if standardized.records.len() > preview_rows {
            println!("   ... {} more rows", standardized.records.len() - preview_rows);
        }
    }

    Ok(())
}

async fn run_qualify(
    files: Vec<PathBuf>,
    qualified_out: Option<PathBuf>,
    require_names: bool,
    json: bool,
) -> Result<()> {
    let batches = ingest::read_csv_paths(&files)?;
    let pipeline = Pipeline::default();

    // Standardize synchronously, then route verdicts through the use case
    // so a qualified-records export can be attached as an output port.
    let mut normalized = Vec::new();
    let mut infos = Vec::new();
    for batch in &batches {
        let standardized = pipeline.standardize_batch(batch);
        infos.push(addr_standardizer::pipeline::BatchInfo {
            file_name: standardized.file_name.clone(),
            row_count: standardized.records.len(),
            mapping: standardized.mapping.clone(),
        });
        normalized.extend(standardized.records);
    }

    let qualified_sink: Box<dyn QualifyOutputPort> = match &qualified_out {
        Some(path) => Box::new(CsvExportSink::create(path)?),
        None => Box::new(NullSink),
    };
    let gate = DefaultQualificationGate::with_config(QualificationConfig {
        require_person_name: require_names,
        ..Default::default()
    });
    let use_case = QualifyUseCase::new(Box::new(gate), qualified_sink, Box::new(NullSink));

    let assessed = use_case.assess_batch(&normalized).await?;

    if !json {
        for record in assessed.iter().filter(|r| !r.result.qualified) {
            println!(
                "❌ {} row {}: {}",
                record.record.provenance.source_file,
                record.record.provenance.row_number,
                record.result.error_messages().join("; "),
            );
        }
    }

    let result = addr_standardizer::pipeline::PipelineResult {
        run_id: uuid::Uuid::new_v4(),
        batches: infos,
        records: assessed,
    };
    let summary = QualificationSummary::from_result(&result);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\n{}", summary.render());
    }

    if let Some(path) = qualified_out {
        info!(path = %path.display(), "qualified records exported");
        if !json {
            println!("✅ Qualified records written to {}", path.display());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Standardize {
            files,
            preview_rows,
        } => run_standardize(files, preview_rows).await?,
        Commands::Qualify {
            files,
            qualified_out,
            require_names,
            json,
        } => run_qualify(files, qualified_out, require_names, json).await?,
    }

    Ok(())
}
