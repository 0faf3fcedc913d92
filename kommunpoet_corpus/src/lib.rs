// kommunpoet_corpus: where municipality records come from.
//
// Everything around the poem engine that touches the outside world:
// fetching wiki pages, cutting article HTML into sections, compiling records
// (sections plus trained model), persisting them as JSON, and looking them
// up for requests.
//
// Module overview:
// - `config.rs`:   `CorpusConfig` (wiki URLs, HTTP settings, data directory).
// - `source.rs`:   `PageSource` trait and the blocking `HttpPageSource`.
// - `html.rs`:     Section extraction, infobox and list-page parsing.
// - `fetch.rs`:    Pages for one record (article plus central town).
// - `store.rs`:    `kommuner.json` / `html.json` with atomic replacement.
// - `registry.rs`: `Registry`: fetch/compile pipeline, lookup, random pick,
//                  picker choices, and name-and-poem for front ends.
// - `error.rs`:    `CorpusError`.

pub mod config;
pub mod error;
pub mod fetch;
pub mod html;
pub mod registry;
pub mod source;
pub mod store;

pub use config::CorpusConfig;
pub use error::CorpusError;
pub use registry::Registry;
pub use source::{HttpPageSource, PageSource};
pub use store::Store;
