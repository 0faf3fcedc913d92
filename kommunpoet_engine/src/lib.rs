// kommunpoet_engine: poem generation from municipality articles.
//
// Given a compiled record (the article split into sections, plus a trained
// word chain), produces a short poem in one of two modes:
// - Extractive: pick a section at random, cut its sentences into short
//   rows, and fall back to further sections until the poem is long enough.
// - Chaos: generate novel sentences from the record's Markov chain, steered
//   by a seed that evolves before every random step.
//
// Module overview:
// - `record.rs`:   `Record` (id, name, sections, serialized model) and
//                  copy-on-write compilation.
// - `sections.rs`: Section length filtering and the extractive selector with
//                  its retry-on-short-poem loop.
// - `markov.rs`:   Word chain, `TextModel`, and the serialized model format.
// - `chaos.rs`:    `SeededText` (seed hook points, overlap check) and chaos
//                  poem assembly.
// - `poem.rs`:     `Poem`, `Mode`, the special-case override, and the
//                  `generate_poem` entry point.
// - `config.rs`:   `PoetConfig`, every tunable constant.
// - `error.rs`:    `PoemError` (chaos mode only).
//
// The engine is synchronous and does no I/O. Each request owns its own
// `PoemRng`; nothing here is shared between requests, so callers may run
// any number of generations concurrently without locking.

pub mod chaos;
pub mod config;
pub mod error;
pub mod markov;
pub mod poem;
pub mod record;
pub mod sections;

pub use config::PoetConfig;
pub use error::PoemError;
pub use poem::{Mode, Poem, generate_poem, get_poem};
pub use record::{Record, Section};

use kommunpoet_prng::PoemRng;

/// A generator for requests without a seed.
pub(crate) fn entropy_rng() -> PoemRng {
    PoemRng::new(rand::random())
}
