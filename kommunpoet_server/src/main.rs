// CLI entry point for the municipality poet.
//
// Usage:
//   kommunpoet [--data-dir DIR] [--config FILE] <COMMAND>
//
// Commands:
//   fetch-links                      Register municipalities from the list page
//   fetch [--force]                  Download article HTML
//   compile [--force]                Extract sections and train models
//   test-server [--port N]           Serve the poem page
//   random [--chaos] [--seed N]      Print a poem for a random municipality
//   poem <ID> [--chaos] [--seed N]   Print a poem for one municipality
//
// Logging goes to stderr; set RUST_LOG to change the level (default: info).

use std::path::PathBuf;
use std::sync::Arc;

use kommunpoet_corpus::{CorpusError, HttpPageSource, Registry, Store};
use kommunpoet_engine::Mode;
use kommunpoet_server::{AppConfig, ServerError, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

enum Command {
    FetchLinks,
    Fetch { force: bool },
    Compile { force: bool },
    TestServer { port: Option<u16> },
    Random { chaos: bool, seed: Option<u64> },
    Poem { id: String, chaos: bool, seed: Option<u64> },
}

struct Args {
    data_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    command: Command,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    if let Err(e) = run(args) {
        eprintln!("kommunpoet: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ServerError> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.corpus.data_dir = dir;
    }

    let store = Store::open(&config.corpus.data_dir)?;
    let source = HttpPageSource::new(&config.corpus)?;
    let registry = Registry::open(
        store,
        Box::new(source),
        config.corpus.clone(),
        config.poet.clone(),
    )?;

    match args.command {
        Command::FetchLinks => {
            let added = registry.fetch_links()?;
            println!("{added} new municipalities, {} in total", registry.len());
        }
        Command::Fetch { force } => {
            registry.ensure_links()?;
            let fetched = registry.fetch_data(force)?;
            println!("Fetched pages for {fetched} municipalities");
        }
        Command::Compile { force } => {
            registry.ensure_links()?;
            let compiled = registry.compile(force)?;
            println!("Compiled {compiled} municipalities");
        }
        Command::TestServer { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let (_handle, addr) = start_server(&config.server, Arc::new(registry))?;
            println!("Listening on http://{addr}/");
            println!("Press Ctrl+C to stop.");
            // The process exits on SIGINT; the server thread goes with it.
            loop {
                std::thread::park();
            }
        }
        Command::Random { chaos, seed } => {
            registry.ensure_links()?;
            let record = registry
                .random_record(seed)
                .ok_or(CorpusError::NoRecords)?;
            info!(id = %record.id, "picked");
            let (name, poem) = registry.name_and_poem(Some(record.id.as_str()), Mode::from_flag(chaos), seed)?;
            println!("{name}\n\n{poem}");
        }
        Command::Poem { id, chaos, seed } => {
            let (name, poem) = registry.name_and_poem(Some(id.as_str()), Mode::from_flag(chaos), seed)?;
            println!("{name}\n\n{poem}");
        }
    }
    Ok(())
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut data_dir = None;
    let mut config = None;
    let mut command_name: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();
    let mut force = false;
    let mut chaos = false;
    let mut seed: Option<u64> = None;
    let mut port: Option<u16> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" => {
                i += 1;
                data_dir = Some(PathBuf::from(required_value(&args, i, "--data-dir")));
            }
            "--config" => {
                i += 1;
                config = Some(PathBuf::from(required_value(&args, i, "--config")));
            }
            "--force" => force = true,
            "--chaos" => chaos = true,
            "--seed" => {
                i += 1;
                seed = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a non-negative integer");
                    std::process::exit(1);
                }));
            }
            "--port" => {
                i += 1;
                port = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--port requires a valid port number");
                    std::process::exit(1);
                }));
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
            other => {
                if command_name.is_none() {
                    command_name = Some(other.to_string());
                } else {
                    positional.push(other.to_string());
                }
            }
        }
        i += 1;
    }

    let command = match command_name.as_deref() {
        Some("fetch-links") => Command::FetchLinks,
        Some("fetch") => Command::Fetch { force },
        Some("compile") => Command::Compile { force },
        Some("test-server") => Command::TestServer { port },
        Some("random") => Command::Random { chaos, seed },
        Some("poem") => match positional.first() {
            Some(id) => Command::Poem {
                id: id.clone(),
                chaos,
                seed,
            },
            None => {
                eprintln!("poem requires a municipality id, e.g. Huddinge_kommun");
                std::process::exit(1);
            }
        },
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_usage();
            std::process::exit(1);
        }
        None => {
            print_usage();
            std::process::exit(1);
        }
    };

    Args {
        data_dir,
        config,
        command,
    }
}

fn required_value(args: &[String], i: usize, flag: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{flag} requires a value");
        std::process::exit(1);
    })
}

fn print_usage() {
    println!("Usage: kommunpoet [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  fetch-links                      Register municipalities from the list page");
    println!("  fetch [--force]                  Download article HTML");
    println!("  compile [--force]                Extract sections and train models");
    println!("  test-server [--port N]           Serve the poem page (default port: 8000)");
    println!("  random [--chaos] [--seed N]      Print a poem for a random municipality");
    println!("  poem <ID> [--chaos] [--seed N]   Print a poem for one municipality");
    println!();
    println!("Options:");
    println!("  --data-dir <DIR>                 Record store directory (default: data)");
    println!("  --config <FILE>                  JSON config file");
    println!("  --help, -h                       Show this help");
}
