//! Fuzzy matching of local-authority display names to register codes.
//!
//! The commission site refers to authorities by display name; downstream
//! consumers want the stable code from the local-authority register. Names
//! on the site rarely match the register exactly, so matching is fuzzy
//! with a fixed confidence threshold: below it the best candidate is still
//! reported, but without a code.

use serde::Deserialize;
use thiserror::Error;

/// Minimum similarity for a match to be trusted with a code.
const CONFIDENCE_THRESHOLD: f64 = 0.95;

const REGISTER_URL: &str =
    "https://www.registers.service.gov.uk/registers/local-authority-eng/download-json";

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("register request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("register payload was not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("register contains no open entries")]
    EmptyRegister,
}

/// One row of the local-authority register.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterEntry {
    #[serde(rename = "local-authority-eng")]
    pub code: String,
    pub name: String,
    #[serde(rename = "official-name")]
    pub official_name: String,
    /// Set once the authority has been abolished.
    #[serde(rename = "end-date", default)]
    pub end_date: Option<String>,
}

/// Result of matching one name.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// The register code, present only above the confidence threshold.
    pub code: Option<String>,
    /// The closest register name, whatever its score.
    pub matched: String,
    pub confidence: f64,
}

pub struct RegisterMatcher {
    entries: Vec<RegisterEntry>,
}

impl RegisterMatcher {
    /// Build a matcher over the given register rows, dropping closed
    /// authorities.
    pub fn new(entries: Vec<RegisterEntry>) -> Result<Self, MatchError> {
        let entries: Vec<RegisterEntry> = entries
            .into_iter()
            .filter(|e| e.end_date.is_none())
            .collect();
        if entries.is_empty() {
            return Err(MatchError::EmptyRegister);
        }
        tracing::debug!(entries = entries.len(), "Loaded register");
        Ok(Self { entries })
    }

    /// Build a matcher from a raw register JSON document.
    pub fn from_json(body: &str) -> Result<Self, MatchError> {
        let entries: Vec<RegisterEntry> = serde_json::from_str(body)?;
        Self::new(entries)
    }

    /// Download the current register and build a matcher from it.
    pub async fn load(client: &reqwest::Client) -> Result<Self, MatchError> {
        let body = client
            .get(REGISTER_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Self::from_json(&body)
    }

    /// Find the closest register entry for a display name.
    ///
    /// Formal names ("... Council", "... Borough Council") are scored
    /// against the register's official names; bare names against its
    /// short names.
    pub fn match_name(&self, name: &str) -> MatchOutcome {
        let formal = name.to_lowercase().contains("council");

        let (best, confidence) = self
            .entries
            .iter()
            .map(|entry| {
                let candidate = if formal { &entry.official_name } else { &entry.name };
                (entry, strsim::jaro_winkler(name, candidate))
            })
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            // entries is non-empty by construction
            .expect("register matcher has no entries");

        let matched = if formal {
            best.official_name.clone()
        } else {
            best.name.clone()
        };

        MatchOutcome {
            code: (confidence > CONFIDENCE_THRESHOLD).then(|| best.code.clone()),
            matched,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, name: &str, official: &str, end_date: Option<&str>) -> RegisterEntry {
        RegisterEntry {
            code: code.to_string(),
            name: name.to_string(),
            official_name: official.to_string(),
            end_date: end_date.map(|d| d.to_string()),
        }
    }

    fn matcher() -> RegisterMatcher {
        RegisterMatcher::new(vec![
            entry("BAB", "Babergh", "Babergh District Council", None),
            entry("ASH", "Ashford", "Ashford Borough Council", None),
            entry(
                "ALL",
                "Allerdale",
                "Allerdale Borough Council",
                Some("2023-04-01"),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn exact_short_name_matches_with_code() {
        let outcome = matcher().match_name("Babergh");
        assert_eq!(outcome.code.as_deref(), Some("BAB"));
        assert_eq!(outcome.matched, "Babergh");
        assert!(outcome.confidence > 0.99);
    }

    #[test]
    fn council_names_match_official_names() {
        let outcome = matcher().match_name("Ashford Borough Council");
        assert_eq!(outcome.code.as_deref(), Some("ASH"));
        assert_eq!(outcome.matched, "Ashford Borough Council");
    }

    #[test]
    fn low_confidence_reports_candidate_without_code() {
        let outcome = matcher().match_name("Somewhere Else Entirely");
        assert_eq!(outcome.code, None);
        assert!(outcome.confidence <= CONFIDENCE_THRESHOLD);
        assert!(!outcome.matched.is_empty());
    }

    #[test]
    fn closed_authorities_are_excluded() {
        let outcome = matcher().match_name("Allerdale");
        assert_ne!(outcome.code.as_deref(), Some("ALL"));
    }

    #[test]
    fn builds_from_register_json() {
        let body = r#"[
            {
                "local-authority-eng": "BAB",
                "name": "Babergh",
                "official-name": "Babergh District Council"
            },
            {
                "local-authority-eng": "ALL",
                "name": "Allerdale",
                "official-name": "Allerdale Borough Council",
                "end-date": "2023-04-01"
            }
        ]"#;
        let matcher = RegisterMatcher::from_json(body).unwrap();
        assert_eq!(matcher.match_name("Babergh").code.as_deref(), Some("BAB"));
        assert_eq!(matcher.match_name("Allerdale").code, None);
    }

    #[test]
    fn malformed_register_json_is_a_payload_error() {
        assert!(matches!(
            RegisterMatcher::from_json("<html>sorry</html>"),
            Err(MatchError::Payload(_))
        ));
    }

    #[test]
    fn empty_register_is_an_error() {
        let result = RegisterMatcher::new(vec![entry(
            "ALL",
            "Allerdale",
            "Allerdale Borough Council",
            Some("2023-04-01"),
        )]);
        assert!(matches!(result, Err(MatchError::EmptyRegister)));
    }
}
