use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::pipeline::qualify::QualifiedRecord;
use crate::pipeline::{BatchInfo, PipelineResult};

/// Aggregate view of a pipeline run: the numbers behind the preview tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualificationSummary {
    pub total_records: usize,
    pub qualified_records: usize,
    pub disqualified_records: usize,
    /// qualified / total, 0.0 when the run was empty
    pub qualification_rate: f64,
    /// Disqualification reasons ranked by frequency
    pub top_issues: Vec<IssueCount>,
    /// Per-file qualification breakdown, in input order
    pub file_breakdown: Vec<FileBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCount {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBreakdown {
    pub file_name: String,
    pub total: usize,
    pub qualified: usize,
    pub rate: f64,
    pub combined_address_parsed: bool,
}

impl QualificationSummary {
    pub fn from_result(result: &PipelineResult) -> Self {
        Self::build(&result.records, &result.batches)
    }

    fn build(records: &[QualifiedRecord], batches: &[BatchInfo]) -> Self {
        let total = records.len();
        let qualified = records.iter().filter(|r| r.result.qualified).count();

        let mut issue_counts: HashMap<String, usize> = HashMap::new();
        for record in records.iter().filter(|r| !r.result.qualified) {
            for message in record.result.error_messages() {
                *issue_counts.entry(message).or_default() += 1;
            }
        }
        let mut top_issues: Vec<IssueCount> = issue_counts
            .into_iter()
            .map(|(message, count)| IssueCount { message, count })
            .collect();
        top_issues.sort_by(|a, b| b.count.cmp(&a.count).then(a.message.cmp(&b.message)));

        let file_breakdown = batches
            .iter()
            .map(|batch| {
                let in_file: Vec<&QualifiedRecord> = records
                    .iter()
                    .filter(|r| r.record.provenance.source_file == batch.file_name)
                    .collect();
                let file_qualified = in_file.iter().filter(|r| r.result.qualified).count();
                let combined = in_file
                    .iter()
                    .any(|r| r.record.report.combined_address_parsed);

                FileBreakdown {
                    file_name: batch.file_name.clone(),
                    total: in_file.len(),
                    qualified: file_qualified,
                    rate: rate(file_qualified, in_file.len()),
                    combined_address_parsed: combined,
                }
            })
            .collect();

        Self {
            total_records: total,
            qualified_records: qualified,
            disqualified_records: total - qualified,
            qualification_rate: rate(qualified, total),
            top_issues,
            file_breakdown,
        }
    }

    /// Render the summary for terminal output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "📊 Qualification Summary\n   Total records: {}\n   Qualified: {}\n   Disqualified: {}\n   Qualification rate: {:.1}%\n",
            self.total_records,
            self.qualified_records,
            self.disqualified_records,
            self.qualification_rate * 100.0
        ));

        if !self.file_breakdown.is_empty() {
            out.push_str("\n   Per file:\n");
            for file in &self.file_breakdown {
                out.push_str(&format!(
                    "   - {}: {}/{} qualified ({:.1}%){}\n",
                    file.file_name,
                    file.qualified,
                    file.total,
                    file.rate * 100.0,
                    if file.combined_address_parsed {
                        " [combined addresses parsed]"
                    } else {
                        ""
                    }
                ));
            }
        }

        if !self.top_issues.is_empty() {
            out.push_str("\n   Top disqualification reasons:\n");
            for issue in self.top_issues.iter().take(5) {
                out.push_str(&format!("   - {} ({}x)\n", issue.message, issue.count));
            }
        }

        out
    }
}

fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
