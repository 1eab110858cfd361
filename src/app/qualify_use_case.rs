use anyhow::Result;
use tracing::info;

use crate::app::ports::QualifyOutputPort;
use crate::pipeline::normalize::NormalizedRecord;
use crate::pipeline::qualify::{DefaultQualificationGate, QualificationGate, QualifiedRecord};

/// Use case for running normalized records through the qualification gate
/// and routing them to the qualified or disqualified output.
pub struct QualifyUseCase {
    gate: Box<dyn QualificationGate + Send + Sync>,
    qualified_output: Box<dyn QualifyOutputPort>,
    disqualified_output: Box<dyn QualifyOutputPort>,
}

impl QualifyUseCase {
    pub fn new(
        gate: Box<dyn QualificationGate + Send + Sync>,
        qualified_output: Box<dyn QualifyOutputPort>,
        disqualified_output: Box<dyn QualifyOutputPort>,
    ) -> Self {
        Self {
            gate,
            qualified_output,
            disqualified_output,
        }
    }

    /// Create a use case with the default rule set.
    pub fn with_default_gate(
        qualified_output: Box<dyn QualifyOutputPort>,
        disqualified_output: Box<dyn QualifyOutputPort>,
    ) -> Self {
        Self::new(
            Box::new(DefaultQualificationGate::new()),
            qualified_output,
            disqualified_output,
        )
    }

    /// Assess a single record and route it by verdict.
    pub async fn assess_record(&self, record: &NormalizedRecord) -> Result<QualifiedRecord> {
        let assessed = self.gate.assess(record)?;

        if assessed.result.qualified {
            self.qualified_output.write_assessed_record(&assessed).await?;
        } else {
            self.disqualified_output.write_assessed_record(&assessed).await?;
        }

        Ok(assessed)
    }

    /// Assess records in batch, preserving input order.
    pub async fn assess_batch(&self, records: &[NormalizedRecord]) -> Result<Vec<QualifiedRecord>> {
        let mut all_assessed = Vec::with_capacity(records.len());
        let mut qualified_count = 0usize;

        for record in records {
            let assessed = self.assess_record(record).await?;
            if assessed.result.qualified {
                qualified_count += 1;
            }
            all_assessed.push(assessed);
        }

        info!(
            total = all_assessed.len(),
            qualified = qualified_count,
            disqualified = all_assessed.len() - qualified_count,
            "batch qualification complete"
        );
        Ok(all_assessed)
    }
}
