// Swedish text rules for the poem engine.
//
// Pure string processing shared by `kommunpoet_engine` (poem assembly,
// model training) and `kommunpoet_corpus` (sorted municipality lists). No
// randomness and no I/O live here.
//
// Architecture:
// - `lines.rs`: Line splitter, one sentence in, short display rows out
// - `sentences.rs`: Paragraph to sentence extraction for extractive poems
// - `tokenize.rs`: Sentence boundaries and word splitting for the chain model
// - `collation.rs`: Swedish alphabetical sort keys (å, ä, ö after z)
//
// All rules are specific to Swedish encyclopedia prose: the breakword and
// idiom lists, the "blasonering" heraldry heading, and the abbreviation list
// used for sentence boundaries.

pub mod collation;
pub mod lines;
pub mod sentences;
pub mod tokenize;

pub use collation::swedish_sort_key;
pub use lines::split_sentence_into_rows;
pub use sentences::extract_sentences;
