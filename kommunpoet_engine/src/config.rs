// Data-driven poem engine configuration.
//
// All tunable generation parameters live in `PoetConfig`, loaded from JSON
// (usually as the `poet` section of the server's config file). The engine
// never uses magic numbers: line targets, section-length thresholds, chain
// order, attempt budgets and the hardcoded special case are all read from
// here. `Default` reproduces the documented behavior exactly.
//
// Missing fields in a JSON config fall back to their defaults, so a config
// file only needs to name what it changes.

use serde::{Deserialize, Serialize};

/// Tunable parameters for poem generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoetConfig {
    /// Non-break lines a poem aims for before generation stops.
    pub min_lines: usize,
    /// Sections whose subsections total fewer characters are never used.
    pub min_section_chars: usize,
    /// Preferred section lengths, tried from the first (strictest) onward.
    pub preferred_section_chars: Vec<usize>,
    /// A preferred threshold is only applied if at least this many sections
    /// reach it.
    pub min_preferred_sections: usize,
    /// Chain order: how many preceding words form a state.
    pub state_size: usize,
    /// Chain walks per `make_sentence` call before giving up.
    pub sentence_tries: usize,
    /// Longest verbatim overlap with the training text, as a fraction of
    /// the generated sentence's word count.
    pub max_overlap_ratio: f64,
    /// Longest verbatim overlap with the training text, in words.
    pub max_overlap_total: usize,
    /// Upper bound on sentence requests per chaos poem, so a degenerate
    /// model cannot loop forever.
    pub max_chaos_rounds: usize,
    /// Record identifier that always gets `SPECIAL_CASE_POEM`.
    pub special_case_id: String,
}

impl Default for PoetConfig {
    fn default() -> Self {
        Self {
            min_lines: 10,
            min_section_chars: 100,
            preferred_section_chars: vec![400, 300, 200],
            min_preferred_sections: 10,
            state_size: 2,
            sentence_tries: 100,
            max_overlap_ratio: 0.7,
            max_overlap_total: 15,
            max_chaos_rounds: 1000,
            special_case_id: "Tranemo_kommun".into(),
        }
    }
}

impl PoetConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
