/// Version of the qualification rule set, recorded on every assessment.
pub const RULE_VERSION: &str = "v1.0.0";

/// Minimum Jaro-Winkler similarity for a fuzzy header match.
pub const FUZZY_HEADER_THRESHOLD: f64 = 0.8;

/// How many rows to sample when sniffing for a combined address column.
pub const COMBINED_SAMPLE_ROWS: usize = 10;

/// Fraction of sampled values that must look like complete addresses for a
/// column to be treated as a combined address field.
pub const COMBINED_SAMPLE_RATIO: f64 = 0.5;

/// Header order used when exporting standardized records back to CSV.
pub const EXPORT_HEADERS: [&str; 10] = [
    "first_name",
    "last_name",
    "street_address",
    "unit",
    "city",
    "state",
    "zip_code",
    "country",
    "source_file",
    "source_row_number",
];
