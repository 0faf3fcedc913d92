// kommunpoet_server: HTTP front end and command-line tool.
//
// Serves one page: pick a Swedish municipality (or let chance pick one),
// optionally tick "kaos", and read the poem. The same operations are
// available from the `kommunpoet` binary, along with the fetch and compile
// pipeline that builds the record store.
//
// Module overview:
// - `server.rs`: `tiny_http` request loop on a background thread, routing,
//                and query parsing.
// - `page.rs`:   HTML rendering of the poem page.
// - `config.rs`: `AppConfig` (poet, corpus and server sections) and
//                `ServerConfig`.
// - `error.rs`:  `ServerError`.
//
// The binary lives in `main.rs`.

pub mod config;
pub mod error;
pub mod page;
pub mod server;

pub use config::{AppConfig, ServerConfig};
pub use error::ServerError;
pub use server::{ServerHandle, start_server};
