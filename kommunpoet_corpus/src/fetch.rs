// Page fetching for one municipality.
//
// A record is compiled from its own article plus, when the infobox links
// one, the article about its central town. The central town is a bonus: if
// the link is missing or its page cannot be fetched, the record still gets
// its main article and a warning is logged.

use kommunpoet_engine::Record;
use tracing::{debug, warn};

use crate::config::CorpusConfig;
use crate::error::CorpusError;
use crate::html::find_central_town_href;
use crate::source::PageSource;

/// Fetch the HTML pages a record is compiled from, main article first.
pub fn fetch_record_pages(
    source: &dyn PageSource,
    config: &CorpusConfig,
    record: &Record,
) -> Result<Vec<String>, CorpusError> {
    let article = source.fetch(&config.article_url(&record.id)?)?;

    let Some(href) = find_central_town_href(&article) else {
        debug!(id = %record.id, "no central town link");
        return Ok(vec![article]);
    };

    let central_town = config.resolve(&href).and_then(|url| source.fetch(&url));
    match central_town {
        Ok(page) => Ok(vec![article, page]),
        Err(err) => {
            warn!(name = %record.name, error = %err, "could not get central town page");
            Ok(vec![article])
        }
    }
}
