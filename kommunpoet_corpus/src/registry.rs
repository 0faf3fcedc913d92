// The set of known municipalities and the operations on it.
//
// `Registry` owns the record list loaded from a `Store` and the page source
// used to refresh it. Records are shared as `Arc<Record>`; compiling a record
// builds a new value and swaps the `Arc` under a short write lock, so a
// concurrent reader holds either the old record or the new one, never a
// mixture. Generation itself runs outside any lock.
//
// Pipeline (each step persisted before returning):
// 1. `fetch_links`: read the list page and register unknown municipalities.
// 2. `fetch_data`: download article HTML for records that lack it.
// 3. `compile`: extract sections and train a model for records that need it.

use std::sync::{Arc, PoisonError, RwLock};

use kommunpoet_engine::{Mode, PoetConfig, Record, get_poem};
use kommunpoet_prng::PoemRng;
use kommunpoet_text::swedish_sort_key;
use tracing::{info, warn};

use crate::config::CorpusConfig;
use crate::error::CorpusError;
use crate::fetch::fetch_record_pages;
use crate::html::{decode_id, extract_municipality_links, extract_sections};
use crate::source::PageSource;
use crate::store::Store;

/// Label of the empty choice, which asks for a random municipality.
pub const RANDOM_CHOICE_LABEL: &str = "SLUMPMÄSSIG KOMMUN";

pub struct Registry {
    store: Store,
    source: Box<dyn PageSource>,
    corpus: CorpusConfig,
    poet: PoetConfig,
    records: RwLock<Vec<Arc<Record>>>,
}

impl Registry {
    /// Load the records persisted in `store`.
    pub fn open(
        store: Store,
        source: Box<dyn PageSource>,
        corpus: CorpusConfig,
        poet: PoetConfig,
    ) -> Result<Self, CorpusError> {
        let records: Vec<Arc<Record>> = store.load_records()?.into_iter().map(Arc::new).collect();
        info!(count = records.len(), dir = %store.dir().display(), "loaded records");
        Ok(Self {
            store,
            source,
            corpus,
            poet,
            records: RwLock::new(records),
        })
    }

    pub fn poet_config(&self) -> &PoetConfig {
        &self.poet
    }

    /// Snapshot of all records.
    pub fn records(&self) -> Vec<Arc<Record>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register municipalities from the list page. Returns how many were new.
    pub fn fetch_links(&self) -> Result<usize, CorpusError> {
        let html = self.source.fetch(&self.corpus.list_url()?)?;
        let links = extract_municipality_links(&html)?;

        let added = {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            let mut added = 0;
            for link in links {
                if records.iter().all(|record| record.id != link.id) {
                    records.push(Arc::new(Record::new(link.id, link.name)));
                    added += 1;
                }
            }
            added
        };
        info!(added, total = self.len(), "fetched municipality links");
        self.persist_records()?;
        Ok(added)
    }

    /// Fetch the list page first if nothing is registered yet.
    pub fn ensure_links(&self) -> Result<(), CorpusError> {
        if self.is_empty() {
            self.fetch_links()?;
        }
        Ok(())
    }

    /// Download article HTML for every record without it (all records with
    /// `force`). Pages fetched before a failure are kept.
    pub fn fetch_data(&self, force: bool) -> Result<usize, CorpusError> {
        let mut html = self.store.load_html()?;
        let mut fetched = 0;
        let mut failure: Option<CorpusError> = None;

        for record in self.records() {
            if !force && html.contains_key(&record.id) {
                continue;
            }
            info!(name = %record.name, "fetching");
            match fetch_record_pages(self.source.as_ref(), &self.corpus, &record) {
                Ok(pages) => {
                    html.insert(record.id.clone(), pages);
                    fetched += 1;
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        self.store.save_html(&html)?;
        match failure {
            Some(err) => Err(err),
            None => Ok(fetched),
        }
    }

    /// Compile every record that is not compiled yet (all records with
    /// `force`). Records without fetched HTML are skipped with a warning.
    pub fn compile(&self, force: bool) -> Result<usize, CorpusError> {
        let html = self.store.load_html()?;
        let mut compiled = 0;
        let mut failure: Option<CorpusError> = None;

        for record in self.records() {
            if !force && record.is_compiled() {
                continue;
            }
            let Some(pages) = html.get(&record.id).filter(|pages| !pages.is_empty()) else {
                warn!(name = %record.name, "no HTML found; fetch needed");
                continue;
            };
            info!(name = %record.name, "compiling");

            let mut sections = Vec::new();
            for page in pages {
                match extract_sections(page) {
                    Ok(found) => sections.extend(found),
                    Err(err) => warn!(name = %record.name, error = %err, "skipping page"),
                }
            }
            match record.compiled(sections, &self.poet) {
                Ok(new_record) => {
                    self.replace(Arc::new(new_record));
                    compiled += 1;
                }
                Err(err) => {
                    failure = Some(err.into());
                    break;
                }
            }
        }

        self.persist_records()?;
        match failure {
            Some(err) => Err(err),
            None => Ok(compiled),
        }
    }

    /// Look up a record by id. Percent-encoded ids are decoded first.
    pub fn get_by_id(&self, id: &str) -> Option<Arc<Record>> {
        let id = decode_id(id);
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    /// A random record; the same seed always picks the same one.
    pub fn random_record(&self, seed: Option<u64>) -> Option<Arc<Record>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        if records.is_empty() {
            return None;
        }
        let mut rng = PoemRng::new(seed.unwrap_or_else(rand::random));
        let idx = rng.range_usize(0, records.len());
        Some(Arc::clone(&records[idx]))
    }

    /// Options for a municipality picker: `("", RANDOM_CHOICE_LABEL)` first,
    /// then `(id, name)` in Swedish alphabetical order.
    pub fn choices(&self) -> Vec<(String, String)> {
        let mut records = self.records();
        records.sort_by_cached_key(|record| swedish_sort_key(&record.name));

        std::iter::once((String::new(), RANDOM_CHOICE_LABEL.to_string()))
            .chain(
                records
                    .iter()
                    .map(|record| (record.id.clone(), record.name.clone())),
            )
            .collect()
    }

    /// Display name and poem text for a request.
    ///
    /// No id picks a random record. An unknown id is not an error: the id is
    /// returned as the name and the poem says nothing was found.
    pub fn name_and_poem(
        &self,
        id: Option<&str>,
        mode: Mode,
        seed: Option<u64>,
    ) -> Result<(String, String), CorpusError> {
        let record = match id.filter(|id| !id.is_empty()) {
            Some(id) => match self.get_by_id(id) {
                Some(record) => record,
                None => {
                    let id = decode_id(id);
                    let message = format!("Hittade ingen kommun med id {id}.");
                    return Ok((id, message));
                }
            },
            None => self.random_record(seed).ok_or(CorpusError::NoRecords)?,
        };
        let poem = get_poem(&record, mode, seed, &self.poet)?;
        Ok((record.name.clone(), poem))
    }

    fn replace(&self, record: Arc<Record>) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = records.iter_mut().find(|slot| slot.id == record.id) {
            *slot = record;
        }
    }

    fn persist_records(&self) -> Result<(), CorpusError> {
        let snapshot: Vec<Record> = self
            .records()
            .iter()
            .map(|record| Record::clone(record))
            .collect();
        self.store.save_records(&snapshot)
    }
}
