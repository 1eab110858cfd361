use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::states::is_us_state_code;

/// Components extracted from a combined single-field address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Patterns for the common one-line address shapes, most punctuated first:
/// "123 Main St, City, ST 12345", "123 Main St, City ST 12345",
/// "123 Main St City ST 12345".
static COMBINED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^(.+?),\s*([^,]+),\s*([A-Za-z]{2})\s+(\d{5}(?:-\d{4})?)$").unwrap(),
        Regex::new(r"(?i)^(.+?),\s*([^,]+)\s+([A-Za-z]{2})\s+(\d{5}(?:-\d{4})?)$").unwrap(),
        Regex::new(r"(?i)^(.+?)\s+([^,]+),?\s+([A-Za-z]{2})\s+(\d{5}(?:-\d{4})?)$").unwrap(),
    ]
});

static ZIP_ANYWHERE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{5}(?:-\d{4})?)\b").unwrap());
static STATE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([A-Za-z]{2})\b").unwrap());

/// Secondary-unit designators that terminate a street line.
static UNIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\s+(apartment|apt|suite|ste|unit|#)\s*\.?\s*([A-Za-z0-9\-]+)$").unwrap(),
        Regex::new(r"(?i)\s+(building|bldg|floor|fl)\s*\.?\s*([A-Za-z0-9\-]+)$").unwrap(),
        Regex::new(r"(?i)\s+(\d+[A-Za-z]{1,2})$").unwrap(),
        Regex::new(r"(?i)\s+#([A-Za-z0-9\-]+)$").unwrap(),
    ]
});

/// Heuristic check for a value that holds a complete address in one field.
pub fn looks_like_combined_address(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.len() < 10 {
        return false;
    }

    if COMBINED_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return true;
    }

    let has_digits = trimmed.chars().any(|c| c.is_ascii_digit());
    let has_state = STATE_TOKEN
        .captures_iter(trimmed)
        .any(|c| is_us_state_code(&c[1].to_uppercase()));
    let has_zip = ZIP_ANYWHERE.is_match(trimmed);
    let has_commas = trimmed.contains(',');

    has_digits && has_state && (has_zip || has_commas)
}

/// Splits combined address text into street/city/state/zip components.
pub struct AddressParser;

impl AddressParser {
    /// Parse a combined address. Tries the known one-line shapes first,
    /// then falls back to peeling off the ZIP and state manually.
    pub fn parse_combined(&self, text: &str) -> ParsedAddress {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ParsedAddress::default();
        }

        for pattern in COMBINED_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(trimmed) {
                let parsed = ParsedAddress {
                    street: captures[1].trim().trim_end_matches(',').trim().to_string(),
                    city: captures[2].trim().to_string(),
                    state: captures[3].trim().to_uppercase(),
                    zip: captures[4].trim().to_string(),
                };
                debug!(?parsed, "combined address matched pattern");
                return parsed;
            }
        }

        self.manual_parse(trimmed)
    }

    /// Fallback for shapes the patterns miss: extract ZIP, then a token that
    /// is a real state code, then split the remainder on commas.
    fn manual_parse(&self, text: &str) -> ParsedAddress {
        let mut remainder = text.to_string();

        let zip = ZIP_ANYWHERE
            .captures(&remainder)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        if !zip.is_empty() {
            remainder = remainder.replacen(&zip, "", 1).trim().to_string();
        }

        let mut state = String::new();
        let snapshot = remainder.clone();
        for captures in STATE_TOKEN.captures_iter(&snapshot) {
            let token = captures[1].to_uppercase();
            if is_us_state_code(&token) {
                let found = captures.get(1).unwrap();
                state = token;
                remainder.replace_range(found.start()..found.end(), "");
                remainder = remainder.trim().to_string();
                break;
            }
        }

        let parts: Vec<&str> = remainder
            .split(',')
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();

        let (street, city) = match parts.len() {
            0 => (String::new(), String::new()),
            1 => {
                // Single run of words: assume the first three are the street
                let words: Vec<&str> = parts[0].split_whitespace().collect();
                if words.len() > 3 {
                    (words[..3].join(" "), words[3..].join(" "))
                } else {
                    (parts[0].to_string(), String::new())
                }
            }
            _ => (parts[0].to_string(), parts[1].to_string()),
        };

        let parsed = ParsedAddress { street, city, state, zip };
        debug!(?parsed, "combined address parsed manually");
        parsed
    }

    /// Split a street line into the main street and a trailing secondary
    /// unit (apt/suite/unit/#), returning `(street, unit)`.
    pub fn split_unit(&self, street: &str) -> (String, String) {
        let normalized = street.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return (String::new(), String::new());
        }

        for pattern in UNIT_PATTERNS.iter() {
            if let Some(found) = pattern.find(&normalized) {
                let main = normalized[..found.start()].trim().to_string();
                let unit = found.as_str().trim().to_string();
                // Never strip the house number itself
                if !main.is_empty() {
                    return (main, unit);
                }
            }
        }

        (normalized, String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_separated_combined_address() {
        let parser = AddressParser;
        let parsed = parser.parse_combined("1600 Pennsylvania Avenue NW, Washington, DC 20500");

        assert_eq!(parsed.street, "1600 Pennsylvania Avenue NW");
        assert_eq!(parsed.city, "Washington");
        assert_eq!(parsed.state, "DC");
        assert_eq!(parsed.zip, "20500");
    }

    #[test]
    fn test_parse_combined_address_with_zip_plus4() {
        let parser = AddressParser;
        let parsed = parser.parse_combined("350 Fifth Avenue, New York, NY 10118-0110");

        assert_eq!(parsed.state, "NY");
        assert_eq!(parsed.zip, "10118-0110");
    }

    #[test]
    fn test_parse_combined_address_single_comma() {
        let parser = AddressParser;
        let parsed = parser.parse_combined("410 Terry Avenue North, Seattle WA 98109");

        assert_eq!(parsed.street, "410 Terry Avenue North");
        assert_eq!(parsed.city, "Seattle");
        assert_eq!(parsed.state, "WA");
        assert_eq!(parsed.zip, "98109");
    }

    #[test]
    fn test_manual_parse_without_zip() {
        let parser = AddressParser;
        let parsed = parser.parse_combined("123 Main Street, Springfield, IL");

        assert_eq!(parsed.street, "123 Main Street");
        assert_eq!(parsed.city, "Springfield");
        assert_eq!(parsed.state, "IL");
        assert_eq!(parsed.zip, "");
    }

    #[test]
    fn test_split_unit_designators() {
        let parser = AddressParser;

        let (street, unit) = parser.split_unit("100 Business Park Dr Suite 200");
        assert_eq!(street, "100 Business Park Dr");
        assert_eq!(unit, "Suite 200");

        let (street, unit) = parser.split_unit("321 Elm St Apt B");
        assert_eq!(street, "321 Elm St");
        assert_eq!(unit, "Apt B");

        let (street, unit) = parser.split_unit("456 Oak Avenue #12");
        assert_eq!(street, "456 Oak Avenue");
        assert_eq!(unit, "#12");
    }

    #[test]
    fn test_split_unit_leaves_plain_streets_alone() {
        let parser = AddressParser;

        let (street, unit) = parser.split_unit("456 Highway 101");
        assert_eq!(street, "456 Highway 101");
        assert_eq!(unit, "");

        let (street, unit) = parser.split_unit("PO Box 12345");
        assert_eq!(street, "PO Box 12345");
        assert_eq!(unit, "");
    }

    #[test]
    fn test_combined_address_detection() {
        assert!(looks_like_combined_address(
            "1 Apple Park Way, Cupertino, CA 95014"
        ));
        assert!(!looks_like_combined_address("123 Main Street"));
        assert!(!looks_like_combined_address("short"));
    }
}
