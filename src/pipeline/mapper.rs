use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use tracing::{debug, info};

use crate::constants::{COMBINED_SAMPLE_RATIO, COMBINED_SAMPLE_ROWS, FUZZY_HEADER_THRESHOLD};
use crate::domain::RawRecord;
use crate::pipeline::parser::looks_like_combined_address;

/// Canonical fields an input column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    FirstName,
    LastName,
    StreetAddress,
    AddressLine2,
    HouseNumber,
    StreetName,
    City,
    State,
    ZipCode,
    Zip4,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::StreetAddress,
        CanonicalField::AddressLine2,
        CanonicalField::HouseNumber,
        CanonicalField::StreetName,
        CanonicalField::City,
        CanonicalField::State,
        CanonicalField::ZipCode,
        CanonicalField::Zip4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::FirstName => "first_name",
            CanonicalField::LastName => "last_name",
            CanonicalField::StreetAddress => "street_address",
            CanonicalField::AddressLine2 => "address_line_2",
            CanonicalField::HouseNumber => "house_number",
            CanonicalField::StreetName => "street_name",
            CanonicalField::City => "city",
            CanonicalField::State => "state",
            CanonicalField::ZipCode => "zip_code",
            CanonicalField::Zip4 => "zip4",
        }
    }

    /// Known header spellings for this field, most specific first.
    /// Exact matches walk this list in order, so earlier entries win.
    fn variants(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::FirstName => &[
                "first_name", "first", "fname", "given_name", "forename", "firstname",
                "first_nm", "contact_first",
            ],
            CanonicalField::LastName => &[
                "last_name", "last", "lname", "surname", "family_name", "lastname",
                "last_nm", "contact_last",
            ],
            CanonicalField::StreetAddress => &[
                "street_address", "street", "address", "addr", "address1", "street1",
                "street_addr", "street_line_1", "address_line_1", "addr1", "street_line1",
                "full_address", "mailing_address",
            ],
            CanonicalField::AddressLine2 => &[
                "address2", "addr2", "street2", "address_line_2", "street_line_2", "apt",
                "apartment", "unit", "suite", "ste", "floor", "fl",
            ],
            CanonicalField::HouseNumber => &["house_number", "house_no", "house_num"],
            CanonicalField::StreetName => &["street_name"],
            CanonicalField::City => &["city", "town", "municipality", "locality", "city_name"],
            CanonicalField::State => &[
                "state", "st", "state_code", "province", "region", "state_abbr",
            ],
            CanonicalField::ZipCode => &[
                "zip_code", "zip", "zipcode", "postal_code", "postcode", "zip5", "zip_5",
                "postal", "mail_code",
            ],
            CanonicalField::Zip4 => &["zip4", "zip_4", "plus4", "zip_plus4"],
        }
    }
}

/// Result of header detection for one input file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Canonical field -> source column header
    pub columns: HashMap<CanonicalField, String>,
    /// Column holding a full "street, city, ST zip" string, when detected
    pub combined_address: Option<String>,
}

impl ColumnMapping {
    pub fn source_column(&self, field: CanonicalField) -> Option<&str> {
        self.columns.get(&field).map(|s| s.as_str())
    }
}

/// Detects which input columns correspond to the canonical schema.
///
/// Exact matches against the variant tables win; headers that miss every
/// variant fall back to fuzzy Jaro-Winkler matching so near spellings like
/// `zip_cde` still land.
pub struct ColumnMapper {
    pub fuzzy_threshold: f64,
}

impl Default for ColumnMapper {
    fn default() -> Self {
        Self {
            fuzzy_threshold: FUZZY_HEADER_THRESHOLD,
        }
    }
}

fn taken(mapping: &ColumnMapping, header: &str) -> bool {
    mapping
        .columns
        .values()
        .any(|used| used.eq_ignore_ascii_case(header))
}

impl ColumnMapper {
    pub fn new(fuzzy_threshold: f64) -> Self {
        Self { fuzzy_threshold }
    }

    /// Detect the column mapping for a batch of rows sharing one header set.
    /// `sample` is used only for combined-address sniffing.
    ///
    /// Matching runs in two passes: every field takes its exact variant
    /// matches first, then the fields still unmapped compete for the
    /// remaining headers by fuzzy score. A single pass would let an early
    /// field's fuzzy guess steal a header that is a later field's exact
    /// spelling (an `st` column is State, not a near-miss for `ste`).
    pub fn detect(&self, headers: &[String], sample: &[RawRecord]) -> ColumnMapping {
        debug!(columns = headers.len(), "detecting column mapping");
        let mut mapping = ColumnMapping::default();

        for field in CanonicalField::ALL {
            if let Some(header) = self.match_exact(field, headers, &mapping) {
                mapping.columns.insert(field, header);
            }
        }
        for field in CanonicalField::ALL {
            if mapping.columns.contains_key(&field) {
                continue;
            }
            if let Some(header) = self.match_fuzzy(field, headers, &mapping) {
                mapping.columns.insert(field, header);
            }
        }

        self.detect_combined_address(headers, sample, &mut mapping);

        info!(
            mapped = mapping.columns.len(),
            combined = mapping.combined_address.is_some(),
            "column mapping detected"
        );
        mapping
    }

    fn match_exact(
        &self,
        field: CanonicalField,
        headers: &[String],
        mapping: &ColumnMapping,
    ) -> Option<String> {
        // Walk variants in priority order so earlier spellings win
        for variant in field.variants() {
            for header in headers {
                let cleaned = header.trim().to_lowercase();
                if cleaned == *variant && !taken(mapping, header) {
                    debug!(field = field.as_str(), header = %header, "exact header match");
                    return Some(header.clone());
                }
            }
        }
        None
    }

    fn match_fuzzy(
        &self,
        field: CanonicalField,
        headers: &[String],
        mapping: &ColumnMapping,
    ) -> Option<String> {
        let mut best: Option<(String, f64)> = None;
        for variant in field.variants() {
            for header in headers {
                if taken(mapping, header) {
                    continue;
                }
                let cleaned = header.trim().to_lowercase();
                let score = jaro_winkler(&cleaned, variant);
                if score >= self.fuzzy_threshold
                    && best.as_ref().map(|(_, s)| score > *s).unwrap_or(true)
                {
                    best = Some((header.clone(), score));
                }
            }
        }

        if let Some((header, score)) = best {
            debug!(field = field.as_str(), header = %header, score, "fuzzy header match");
            return Some(header);
        }
        None
    }

    /// Decide whether one of the columns carries complete addresses.
    ///
    /// Triggered when the street column is missing entirely, or when a street
    /// column exists but none of city/state/zip do (an `addr`-style column
    /// that really holds "street, city, ST zip" strings).
    fn detect_combined_address(
        &self,
        headers: &[String],
        sample: &[RawRecord],
        mapping: &mut ColumnMapping,
    ) {
        let has_street = mapping.columns.contains_key(&CanonicalField::StreetAddress);
        let has_components = mapping.columns.contains_key(&CanonicalField::City)
            || mapping.columns.contains_key(&CanonicalField::State)
            || mapping.columns.contains_key(&CanonicalField::ZipCode);

        if has_street && has_components {
            return;
        }

        let mut candidates: Vec<&String> = headers
            .iter()
            .filter(|header| {
                let lower = header.to_lowercase();
                ["address", "addr", "full", "complete", "mailing"]
                    .iter()
                    .any(|keyword| lower.contains(keyword))
            })
            .collect();

        // Prefer the already-mapped street column if it is a candidate
        if let Some(street) = mapping.source_column(CanonicalField::StreetAddress) {
            candidates.sort_by_key(|header| header.as_str() != street);
        }

        for candidate in candidates {
            let sampled: Vec<&str> = sample
                .iter()
                .filter_map(|record| record.get(candidate))
                .filter(|value| !value.trim().is_empty())
                .take(COMBINED_SAMPLE_ROWS)
                .collect();

            if sampled.is_empty() {
                continue;
            }

            let combined_count = sampled
                .iter()
                .filter(|value| looks_like_combined_address(value))
                .count();

            if (combined_count as f64) > (sampled.len() as f64) * COMBINED_SAMPLE_RATIO {
                info!(column = %candidate, "detected combined address column");
                mapping.combined_address = Some(candidate.clone());
                return;
            }
        }
    }
}
