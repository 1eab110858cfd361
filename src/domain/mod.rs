use serde::{Deserialize, Serialize};

pub mod states;

/// Where a record came from, carried through every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordProvenance {
    /// Name of the source CSV file
    pub source_file: String,
    /// 1-based data row number within the source file
    pub row_number: usize,
}

/// One raw input row: the original header/value pairs in file order.
/// Created at ingestion and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub columns: Vec<(String, String)>,
    pub provenance: RecordProvenance,
}

impl RawRecord {
    /// Look up a value by header name (case-insensitive, trimmed).
    pub fn get(&self, header: &str) -> Option<&str> {
        let wanted = header.trim().to_lowercase();
        self.columns
            .iter()
            .find(|(name, _)| name.trim().to_lowercase() == wanted)
            .map(|(_, value)| value.as_str())
    }
}

/// The canonical address schema every input format is mapped onto.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalAddress {
    pub first_name: String,
    pub last_name: String,
    pub street_address: String,
    /// Secondary line: apartment, suite, unit, floor
    pub unit: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl CanonicalAddress {
    /// True when every address component (not the name fields) is empty.
    pub fn is_address_empty(&self) -> bool {
        self.street_address.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.zip_code.is_empty()
    }
}
