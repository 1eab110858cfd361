use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::states::resolve_state_code;
use crate::domain::{CanonicalAddress, RawRecord, RecordProvenance};
use crate::pipeline::mapper::{CanonicalField, ColumnMapping};
use crate::pipeline::parser::AddressParser;

/// A record converted into the canonical address shape, with lineage back
/// to its source row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub address: CanonicalAddress,
    pub provenance: RecordProvenance,
    pub report: NormalizationReport,
}

/// What happened while normalizing one row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizationReport {
    /// Canonical fields that ended up empty
    pub missing_fields: Vec<String>,
    /// Notes about conversions and fallbacks applied
    pub warnings: Vec<String>,
    /// Whether the address came out of a combined single-field column
    pub combined_address_parsed: bool,
    /// Whether a full state name was converted to a 2-letter code
    pub state_name_converted: bool,
}

static NON_ZIP_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d\-]").unwrap());

/// Converts mapped raw rows into clean canonical addresses.
pub struct FieldNormalizer {
    parser: AddressParser,
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self {
            parser: AddressParser,
        }
    }
}

impl FieldNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one raw row under a detected column mapping.
    ///
    /// Every row yields exactly one normalized record; rows with no address
    /// data at all still come through (and are disqualified downstream)
    /// so output order stays one-to-one with input order.
    pub fn normalize(&self, raw: &RawRecord, mapping: &ColumnMapping) -> NormalizedRecord {
        let mut report = NormalizationReport::default();

        let value_of = |field: CanonicalField| -> String {
            mapping
                .source_column(field)
                .and_then(|column| raw.get(column))
                .unwrap_or("")
                .trim()
                .to_string()
        };

        // Start from the combined field when one was detected, then let any
        // separately-mapped columns override the parsed components.
        let mut street = String::new();
        let mut city = String::new();
        let mut state = String::new();
        let mut zip = String::new();

        if let Some(combined_column) = mapping.combined_address.as_deref() {
            if let Some(text) = raw.get(combined_column) {
                let parsed = self.parser.parse_combined(text);
                if !parsed.street.is_empty() || !parsed.zip.is_empty() {
                    report.combined_address_parsed = true;
                }
                street = parsed.street;
                city = parsed.city;
                state = parsed.state;
                zip = parsed.zip;
            }
        }

        let street_source = mapping.source_column(CanonicalField::StreetAddress);
        let street_is_combined = match (street_source, mapping.combined_address.as_deref()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        if !street_is_combined {
            let mapped_street = value_of(CanonicalField::StreetAddress);
            if !mapped_street.is_empty() {
                street = mapped_street;
            }
        }

        // house_number + street_name columns combine into one street line
        if street.is_empty() {
            let house = value_of(CanonicalField::HouseNumber);
            let name = value_of(CanonicalField::StreetName);
            if !house.is_empty() || !name.is_empty() {
                street = format!("{} {}", house, name).trim().to_string();
            }
        }

        for (field, slot) in [
            (CanonicalField::City, &mut city),
            (CanonicalField::State, &mut state),
            (CanonicalField::ZipCode, &mut zip),
        ] {
            let mapped = value_of(field);
            if !mapped.is_empty() {
                *slot = mapped;
            }
        }

        // Secondary unit: explicit address-line-2 column wins, otherwise
        // split a trailing designator off the street line
        let (main_street, trailing_unit) = self.parser.split_unit(&street);
        let explicit_unit = value_of(CanonicalField::AddressLine2);
        let unit = if !explicit_unit.is_empty() {
            explicit_unit
        } else {
            trailing_unit
        };
        street = main_street;

        // State: uppercase codes pass through, full names convert
        let raw_state = collapse_whitespace(&state);
        let state = if raw_state.is_empty() {
            String::new()
        } else {
            match resolve_state_code(&raw_state) {
                Some(code) => {
                    if raw_state.len() > 2 {
                        report.state_name_converted = true;
                        report
                            .warnings
                            .push(format!("converted state '{}' to '{}'", raw_state, code));
                    }
                    code.to_string()
                }
                // Keep the cleaned value so the qualification engine can
                // name it in its error message
                None => raw_state.to_uppercase(),
            }
        };

        // ZIP: strip junk, merge a separate plus-4 column, format ZIP+4
        let mut zip = clean_zip_code(&zip);
        let plus4 = value_of(CanonicalField::Zip4);
        if zip.len() == 5 && plus4.len() == 4 && plus4.chars().all(|c| c.is_ascii_digit()) {
            zip = format!("{}-{}", zip, plus4);
        }

        let address = CanonicalAddress {
            first_name: title_case(&value_of(CanonicalField::FirstName)),
            last_name: title_case(&value_of(CanonicalField::LastName)),
            street_address: collapse_whitespace(&street),
            unit: collapse_whitespace(&unit),
            city: collapse_whitespace(&city),
            state,
            zip_code: zip,
            country: "US".to_string(),
        };

        for (name, value) in [
            ("first_name", &address.first_name),
            ("last_name", &address.last_name),
            ("street_address", &address.street_address),
            ("city", &address.city),
            ("state", &address.state),
            ("zip_code", &address.zip_code),
        ] {
            if value.is_empty() {
                report.missing_fields.push(name.to_string());
            }
        }

        debug!(
            row = raw.provenance.row_number,
            file = %raw.provenance.source_file,
            missing = report.missing_fields.len(),
            "row normalized"
        );

        NormalizedRecord {
            address,
            provenance: raw.provenance.clone(),
            report,
        }
    }
}

/// Collapse internal whitespace runs and trim.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title-case a person name: "ROBERT" -> "Robert", "mary anne" -> "Mary Anne".
fn title_case(value: &str) -> String {
    collapse_whitespace(value)
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean a raw ZIP value: digits and hyphens only, 9 bare digits become
/// ZIP+4, anything else is returned as cleaned text for the gate to judge.
fn clean_zip_code(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let cleaned = NON_ZIP_CHARS.replace_all(trimmed, "").to_string();

    if cleaned.len() == 9 && cleaned.chars().all(|c| c.is_ascii_digit()) {
        return format!("{}-{}", &cleaned[..5], &cleaned[5..]);
    }

    cleaned
}
