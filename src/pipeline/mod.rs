use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::ingest::RecordBatch;

pub mod mapper;
pub mod normalize;
pub mod parser;
pub mod qualify;

use mapper::{ColumnMapper, ColumnMapping};
use normalize::{FieldNormalizer, NormalizedRecord};
use qualify::{DefaultQualificationGate, QualificationGate, QualifiedRecord};

/// One input file after mapping and normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardizedBatch {
    pub file_name: String,
    pub mapping: ColumnMapping,
    pub records: Vec<NormalizedRecord>,
}

/// End-to-end result for a pipeline run over one or more files.
#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Identifier for this run, stamped into logs and exports
    pub run_id: Uuid,
    /// Per-file column mappings, in input order
    pub batches: Vec<BatchInfo>,
    /// Every assessed record, in input order
    pub records: Vec<QualifiedRecord>,
}

/// Mapping details for one processed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInfo {
    pub file_name: String,
    pub row_count: usize,
    pub mapping: ColumnMapping,
}

impl PipelineResult {
    pub fn qualified(&self) -> impl Iterator<Item = &QualifiedRecord> {
        self.records.iter().filter(|r| r.result.qualified)
    }

    pub fn disqualified(&self) -> impl Iterator<Item = &QualifiedRecord> {
        self.records.iter().filter(|r| !r.result.qualified)
    }

    pub fn qualified_count(&self) -> usize {
        self.qualified().count()
    }

    pub fn disqualified_count(&self) -> usize {
        self.disqualified().count()
    }
}

/// The standardization-and-qualification pipeline:
/// column mapping -> address parsing -> normalization -> qualification.
pub struct Pipeline {
    mapper: ColumnMapper,
    normalizer: FieldNormalizer,
    gate: Box<dyn QualificationGate + Send + Sync>,
}

impl Pipeline {
    pub fn new(
        mapper: ColumnMapper,
        normalizer: FieldNormalizer,
        gate: Box<dyn QualificationGate + Send + Sync>,
    ) -> Self {
        Self {
            mapper,
            normalizer,
            gate,
        }
    }

    /// Map and normalize one file's rows; no qualification verdicts yet.
    pub fn standardize_batch(&self, batch: &RecordBatch) -> StandardizedBatch {
        let mapping = self.mapper.detect(&batch.headers, &batch.records);

        let records = batch
            .records
            .iter()
            .map(|raw| self.normalizer.normalize(raw, &mapping))
            .collect::<Vec<_>>();

        info!(
            file = %batch.file_name,
            rows = records.len(),
            combined = mapping.combined_address.is_some(),
            "standardized batch"
        );

        StandardizedBatch {
            file_name: batch.file_name.clone(),
            mapping,
            records,
        }
    }

    /// Run the complete pipeline over several files. Output order follows
    /// input order: one assessed record per raw row.
    pub fn process(&self, batches: &[RecordBatch]) -> anyhow::Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let mut infos = Vec::new();
        let mut assessed = Vec::new();

        for batch in batches {
            let standardized = self.standardize_batch(batch);
            infos.push(BatchInfo {
                file_name: standardized.file_name.clone(),
                row_count: standardized.records.len(),
                mapping: standardized.mapping.clone(),
            });

            for record in &standardized.records {
                assessed.push(self.gate.assess(record)?);
            }
        }

        let qualified = assessed.iter().filter(|r| r.result.qualified).count();
        info!(
            %run_id,
            files = batches.len(),
            total = assessed.len(),
            qualified,
            disqualified = assessed.len() - qualified,
            "pipeline run complete"
        );

        Ok(PipelineResult {
            run_id,
            batches: infos,
            records: assessed,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(
            ColumnMapper::default(),
            FieldNormalizer::new(),
            Box::new(DefaultQualificationGate::new()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::read_csv_reader;

    #[test]
    fn test_pipeline_preserves_input_order() {
        let data = "first_name,last_name,street_address,city,state,zip_code\n\
                    John,Smith,1600 Pennsylvania Avenue NW,Washington,DC,20500\n\
                    Jane,Johnson,350 Fifth Avenue,New York,NY,10118\n";
        let batch = read_csv_reader(data.as_bytes(), "01_standard_format.csv").unwrap();

        let pipeline = Pipeline::default();
        let result = pipeline.process(&[batch]).unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].record.provenance.row_number, 1);
        assert_eq!(result.records[1].record.provenance.row_number, 2);
        assert_eq!(result.qualified_count(), 2);
    }

    #[test]
    fn test_pipeline_yields_one_verdict_per_row() {
        let data = "first_name,last_name,street_address,city,state,zip_code\n\
                    Paul,Johnson,741 Ash Boulevard,Jacksonville,FL,32099\n\
                    Missing,Address,,Missing State,,12345\n";
        let batch = read_csv_reader(data.as_bytes(), "mixed.csv").unwrap();

        let pipeline = Pipeline::default();
        let result = pipeline.process(&[batch]).unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.qualified_count(), 1);
        assert_eq!(result.disqualified_count(), 1);
    }
}
