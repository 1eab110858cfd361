use async_trait::async_trait;

use crate::pipeline::normalize::NormalizedRecord;
use crate::pipeline::qualify::QualifiedRecord;

/// Sink for standardized records coming out of the normalization stage.
#[async_trait]
pub trait StandardizeOutputPort: Send + Sync {
    async fn write_normalized_record(&self, record: &NormalizedRecord) -> anyhow::Result<()>;
}

/// Sink for assessed records; the qualify use case routes qualified and
/// disqualified records to separate instances of this port.
#[async_trait]
pub trait QualifyOutputPort: Send + Sync {
    async fn write_assessed_record(&self, record: &QualifiedRecord) -> anyhow::Result<()>;
}
