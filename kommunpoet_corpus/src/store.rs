// JSON file persistence.
//
// A data directory holds two files:
// - `kommuner.json`: every record (id, name, sections, serialized model),
// - `html.json`: fetched page HTML per record id, kept apart so records
//   stay small enough to load at server start.
//
// Writes go to a temporary file in the same directory which is then renamed
// over the target, so a crash mid-write never leaves a truncated file.
// Missing files read as empty.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use kommunpoet_engine::Record;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::CorpusError;

const RECORDS_FILE: &str = "kommuner.json";
const HTML_FILE: &str = "html.json";

/// Fetched HTML pages per record id.
pub type HtmlPages = BTreeMap<String, Vec<String>>;

#[derive(Clone, Debug)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Use `dir` as data directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| CorpusError::io(&dir, err))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_records(&self) -> Result<Vec<Record>, CorpusError> {
        self.read_json(RECORDS_FILE)
    }

    pub fn save_records(&self, records: &[Record]) -> Result<(), CorpusError> {
        self.write_json(RECORDS_FILE, records)
    }

    pub fn load_html(&self) -> Result<HtmlPages, CorpusError> {
        self.read_json(HTML_FILE)
    }

    pub fn save_html(&self, pages: &HtmlPages) -> Result<(), CorpusError> {
        self.write_json(HTML_FILE, pages)
    }

    fn read_json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, CorpusError> {
        let path = self.dir.join(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(err) => return Err(CorpusError::io(path, err)),
        };
        serde_json::from_slice(&bytes).map_err(|err| CorpusError::json(path, err))
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), CorpusError> {
        let path = self.dir.join(name);
        let bytes = serde_json::to_vec(value).map_err(|err| CorpusError::json(&path, err))?;

        let mut file = NamedTempFile::new_in(&self.dir).map_err(|err| CorpusError::io(&self.dir, err))?;
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|err| CorpusError::io(file.path(), err))?;
        file.persist(&path)
            .map_err(|err| CorpusError::io(&path, err.error))?;
        Ok(())
    }
}
