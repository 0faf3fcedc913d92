// Word-level Markov chain trained on a municipality's article text.
//
// The chain maps a state (the last `state_size` words, padded with a begin
// sentinel at sentence start) to a table of follow-word counts. A walk
// starts from the all-begin state and draws follow words in proportion to
// their counts until the end sentinel comes up.
//
// `TextModel` bundles the chain with the tokenized training sentences. The
// sentences are kept so generated text can be checked for verbatim overlap
// with the source (see `chaos.rs`).
//
// Serialized form (`SerializedModel`), stored as JSON on each record:
//
//   { "state_size": 2,
//     "chain": [ [["___BEGIN__", "___BEGIN__"], {"Staden": 3, "Byn": 1}], ... ],
//     "parsed_sentences": [["Staden", "ligger", "vid", "sjön."], ...] }
//
// Decoding rebuilds exactly the same states and counts. Tables use
// `BTreeMap`, so iteration order (and thus which word a given random draw
// selects) does not depend on hashing or insertion order.

use std::collections::BTreeMap;

use kommunpoet_prng::ReseedingRng;
use kommunpoet_text::tokenize::training_corpus;
use serde::{Deserialize, Serialize};

use crate::error::PoemError;

/// Padding word for states at the start of a sentence.
pub const BEGIN: &str = "___BEGIN__";
/// Follow word marking the end of a sentence.
pub const END: &str = "___END__";

/// Walks longer than this are abandoned. Only reachable if the draw
/// sequence keeps cycling through the same states.
const MAX_WALK_WORDS: usize = 500;

/// Follow-word counts for one state.
pub type FollowTable = BTreeMap<String, u64>;

/// A Markov chain over words.
#[derive(Clone, Debug, PartialEq)]
pub struct Chain {
    state_size: usize,
    model: BTreeMap<Vec<String>, FollowTable>,
}

impl Chain {
    /// Count transitions over a corpus of word runs (one run per sentence).
    ///
    /// A state size of zero is treated as one.
    pub fn build(corpus: &[Vec<String>], state_size: usize) -> Self {
        let state_size = state_size.max(1);
        let mut model: BTreeMap<Vec<String>, FollowTable> = BTreeMap::new();

        for run in corpus {
            let mut items: Vec<&str> = vec![BEGIN; state_size];
            items.extend(run.iter().map(String::as_str));
            items.push(END);

            for i in 0..=run.len() {
                let state: Vec<String> = items[i..i + state_size]
                    .iter()
                    .map(|w| w.to_string())
                    .collect();
                let follow = items[i + state_size].to_string();
                *model.entry(state).or_default().entry(follow).or_insert(0) += 1;
            }
        }

        Self { state_size, model }
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// Number of distinct states.
    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// The state every walk starts from.
    pub fn begin_state(&self) -> Vec<String> {
        vec![BEGIN.to_string(); self.state_size]
    }

    /// Draw the word that follows `state`.
    ///
    /// Advances the generator's seed (if it has one) before drawing, so
    /// every transition of a seeded walk starts from a fresh stream.
    /// Returns `None` for unknown states or all-zero tables.
    pub fn move_from(&self, state: &[String], rng: &mut ReseedingRng) -> Option<&str> {
        rng.advance();
        let table = self.model.get(state)?;
        let weights: Vec<u64> = table.values().copied().collect();
        let idx = rng.rng().weighted_index(&weights)?;
        table.keys().nth(idx).map(String::as_str)
    }

    /// Generate one sentence's words, without sentinels.
    ///
    /// Returns an empty run if the walk dead-ends on the first step or runs
    /// past `MAX_WALK_WORDS`.
    pub fn walk(&self, rng: &mut ReseedingRng) -> Vec<String> {
        let mut state = self.begin_state();
        let mut words = Vec::new();

        while let Some(next) = self.move_from(&state, rng) {
            if next == END {
                break;
            }
            if words.len() >= MAX_WALK_WORDS {
                return Vec::new();
            }
            words.push(next.to_string());
            state.remove(0);
            state.push(next.to_string());
        }
        words
    }

    fn to_entries(&self) -> Vec<ChainEntry> {
        self.model
            .iter()
            .map(|(state, follow)| ChainEntry(state.clone(), follow.clone()))
            .collect()
    }

    fn from_entries(state_size: usize, entries: Vec<ChainEntry>) -> Result<Self, PoemError> {
        if state_size == 0 {
            return Err(PoemError::MalformedModel("state size must be positive".into()));
        }
        let mut model = BTreeMap::new();
        for ChainEntry(state, follow) in entries {
            if state.len() != state_size {
                return Err(PoemError::MalformedModel(format!(
                    "state {state:?} has {} words, expected {state_size}",
                    state.len()
                )));
            }
            if model.insert(state, follow).is_some() {
                return Err(PoemError::MalformedModel("duplicate chain state".into()));
            }
        }
        Ok(Self { state_size, model })
    }
}

/// One `[state, follow-counts]` pair of the serialized chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainEntry(pub Vec<String>, pub FollowTable);

/// Portable representation of a trained `TextModel`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedModel {
    pub state_size: usize,
    pub chain: Vec<ChainEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_sentences: Option<Vec<Vec<String>>>,
}

/// A trained chain plus the sentences it was trained on.
#[derive(Clone, Debug, PartialEq)]
pub struct TextModel {
    chain: Chain,
    parsed_sentences: Option<Vec<Vec<String>>>,
    rejoined_text: Option<String>,
}

impl TextModel {
    /// Train on running text (typically a record's flattened sections).
    pub fn train(text: &str, state_size: usize) -> Self {
        let corpus = training_corpus(text);
        let chain = Chain::build(&corpus, state_size);
        Self::new(chain, Some(corpus))
    }

    fn new(chain: Chain, parsed_sentences: Option<Vec<Vec<String>>>) -> Self {
        let rejoined_text = parsed_sentences.as_ref().map(|sentences| {
            sentences
                .iter()
                .map(|words| words.join(" "))
                .collect::<Vec<_>>()
                .join(" ")
        });
        Self {
            chain,
            parsed_sentences,
            rejoined_text,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// All training sentences joined by spaces, if they were retained.
    pub fn rejoined_text(&self) -> Option<&str> {
        self.rejoined_text.as_deref()
    }

    pub fn to_serialized(&self) -> SerializedModel {
        SerializedModel {
            state_size: self.chain.state_size(),
            chain: self.chain.to_entries(),
            parsed_sentences: self.parsed_sentences.clone(),
        }
    }

    pub fn from_serialized(model: SerializedModel) -> Result<Self, PoemError> {
        let chain = Chain::from_entries(model.state_size, model.chain)?;
        Ok(Self::new(chain, model.parsed_sentences))
    }

    /// Encode as the JSON value stored on a record.
    pub fn to_value(&self) -> Result<serde_json::Value, PoemError> {
        Ok(serde_json::to_value(self.to_serialized())?)
    }

    /// Decode the JSON value stored on a record.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, PoemError> {
        let model = SerializedModel::deserialize(value)?;
        Self::from_serialized(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kommunpoet_prng::PoemRng;

    fn corpus(sentences: &[&str]) -> Vec<Vec<String>> {
        sentences
            .iter()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    fn state(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn build_counts_transitions() {
        let chain = Chain::build(&corpus(&["a b c", "a b d"]), 2);
        assert_eq!(chain.state_size(), 2);

        let begin = chain.model.get(&state(&[BEGIN, BEGIN])).unwrap();
        assert_eq!(begin.get("a"), Some(&2));

        let after_ab = chain.model.get(&state(&["a", "b"])).unwrap();
        assert_eq!(after_ab.get("c"), Some(&1));
        assert_eq!(after_ab.get("d"), Some(&1));

        let after_bc = chain.model.get(&state(&["b", "c"])).unwrap();
        assert_eq!(after_bc.get(END), Some(&1));
    }

    #[test]
    fn zero_state_size_becomes_one() {
        let chain = Chain::build(&corpus(&["a b"]), 0);
        assert_eq!(chain.state_size(), 1);
        assert_eq!(chain.begin_state(), state(&[BEGIN]));
    }

    #[test]
    fn walk_reproduces_single_sentence() {
        let chain = Chain::build(&corpus(&["ett två tre"]), 2);
        let mut rng = ReseedingRng::unseeded(PoemRng::new(1));
        assert_eq!(chain.walk(&mut rng), state(&["ett", "två", "tre"]));
    }

    #[test]
    fn walk_on_empty_chain_is_empty() {
        let chain = Chain::build(&[], 2);
        assert!(chain.is_empty());
        let mut rng = ReseedingRng::seeded(3);
        assert!(chain.walk(&mut rng).is_empty());
    }

    #[test]
    fn seeded_walks_are_deterministic() {
        let chain = Chain::build(
            &corpus(&["a b c d", "a x c e", "y b c f", "a b z d"]),
            1,
        );
        for seed in [1, 42, 2_000_000_000] {
            let mut r1 = ReseedingRng::seeded(seed);
            let mut r2 = ReseedingRng::seeded(seed);
            for _ in 0..20 {
                assert_eq!(chain.walk(&mut r1), chain.walk(&mut r2));
            }
        }
    }

    #[test]
    fn move_advances_seed() {
        let chain = Chain::build(&corpus(&["a b"]), 2);
        let mut rng = ReseedingRng::seeded(100);
        let _ = chain.move_from(&chain.begin_state(), &mut rng);
        assert_eq!(rng.seed(), Some(300));
    }

    #[test]
    fn serialization_roundtrip_preserves_states_and_counts() {
        let model = TextModel::train("Sjön är djup. Sjön är kall. Ön är grön.", 2);
        let value = model.to_value().unwrap();
        let restored = TextModel::from_value(&value).unwrap();
        assert_eq!(model, restored);
        assert_eq!(restored.chain().state_size(), 2);
        assert_eq!(
            restored.rejoined_text(),
            Some("Sjön är djup. Sjön är kall. Ön är grön.")
        );
    }

    #[test]
    fn serialized_form_is_state_count_pairs() {
        let model = TextModel::train("Ett två.", 1);
        let value = model.to_value().unwrap();
        assert_eq!(value["state_size"], 1);
        let entries = value["chain"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        let begin = entries
            .iter()
            .find(|entry| entry[0][0] == BEGIN)
            .unwrap();
        assert_eq!(begin[1]["Ett"], 1);
    }

    #[test]
    fn decode_accepts_model_without_sentences() {
        let json = serde_json::json!({
            "state_size": 1,
            "chain": [[["___BEGIN__"], {"hej": 2}], [["hej"], {"___END__": 2}]]
        });
        let model = TextModel::from_value(&json).unwrap();
        assert_eq!(model.rejoined_text(), None);
        assert_eq!(model.chain().len(), 2);
    }

    #[test]
    fn decode_rejects_inconsistent_state_size() {
        let json = serde_json::json!({
            "state_size": 2,
            "chain": [[["___BEGIN__"], {"hej": 1}]]
        });
        assert!(matches!(
            TextModel::from_value(&json),
            Err(PoemError::MalformedModel(_))
        ));
    }

    #[test]
    fn decode_rejects_garbage() {
        let json = serde_json::json!({"chain": "not a chain"});
        assert!(matches!(
            TextModel::from_value(&json),
            Err(PoemError::MalformedModel(_))
        ));
        assert!(TextModel::from_value(&serde_json::json!([1, 2, 3])).is_err());
    }

    #[test]
    fn decode_rejects_duplicate_states() {
        let json = serde_json::json!({
            "state_size": 1,
            "chain": [[["a"], {"b": 1}], [["a"], {"c": 1}]]
        });
        assert!(TextModel::from_value(&json).is_err());
    }
}
