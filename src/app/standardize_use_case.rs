use anyhow::Result;

use crate::app::ports::StandardizeOutputPort;
use crate::ingest::RecordBatch;
use crate::pipeline::mapper::ColumnMapper;
use crate::pipeline::normalize::{FieldNormalizer, NormalizedRecord};
use crate::pipeline::StandardizedBatch;

/// Use case for standardizing raw CSV batches into canonical addresses
/// without qualification verdicts (the "preview" step).
pub struct StandardizeUseCase {
    mapper: ColumnMapper,
    normalizer: FieldNormalizer,
    output: Box<dyn StandardizeOutputPort>,
}

impl StandardizeUseCase {
    pub fn new(
        mapper: ColumnMapper,
        normalizer: FieldNormalizer,
        output: Box<dyn StandardizeOutputPort>,
    ) -> Self {
        Self {
            mapper,
            normalizer,
            output,
        }
    }

    /// Create a use case with default mapper and normalizer.
    pub fn with_defaults(output: Box<dyn StandardizeOutputPort>) -> Self {
        Self::new(ColumnMapper::default(), FieldNormalizer::new(), output)
    }

    /// Standardize one file's batch and write every record to the output.
    pub async fn standardize_batch(&self, batch: &RecordBatch) -> Result<StandardizedBatch> {
        let mapping = self.mapper.detect(&batch.headers, &batch.records);

        let mut records: Vec<NormalizedRecord> = Vec::with_capacity(batch.records.len());
        for raw in &batch.records {
            let normalized = self.normalizer.normalize(raw, &mapping);
            self.output.write_normalized_record(&normalized).await?;
            records.push(normalized);
        }

        Ok(StandardizedBatch {
            file_name: batch.file_name.clone(),
            mapping,
            records,
        })
    }

    /// Standardize several files in input order.
    pub async fn standardize_all(&self, batches: &[RecordBatch]) -> Result<Vec<StandardizedBatch>> {
        let mut out = Vec::with_capacity(batches.len());
        for batch in batches {
            out.push(self.standardize_batch(batch).await?);
        }
        Ok(out)
    }
}
