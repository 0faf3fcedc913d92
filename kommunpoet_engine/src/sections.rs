// Extractive poems: section filtering and selection.
//
// `filter_sections` drops sections too short to be interesting and, when a
// record has plenty of long sections, keeps only those. `select_and_render`
// then picks one section at random and cuts its sentences into rows. If
// that leaves the poem short, it removes the section from the candidates,
// adds a stanza break, and picks again. It stops when the poem is long
// enough or no candidates remain, so a poor corpus yields a short (possibly
// empty) poem rather than an error.
//
// Seeding: with a seed, every pick draws from a generator freshly seeded
// with that same value. Retries are therefore deterministic, but each one
// restarts the stream rather than continuing it. Without a seed, one
// entropy-seeded generator serves all picks.

use kommunpoet_prng::PoemRng;
use kommunpoet_text::{extract_sentences, split_sentence_into_rows};
use tracing::debug;

use crate::config::PoetConfig;
use crate::entropy_rng;
use crate::poem::Poem;
use crate::record::Section;

/// Total characters over all paragraphs of a section.
pub fn section_chars(section: &[String]) -> usize {
    section.iter().map(|paragraph| paragraph.chars().count()).sum()
}

/// Sections worth making a poem from.
///
/// Discards sections under `min_section_chars`, then tries each of
/// `preferred_section_chars` in order and keeps the sections reaching the
/// first threshold that at least `min_preferred_sections` of them reach.
/// If none qualifies, the looser set is kept.
pub fn filter_sections<'a>(sections: &'a [Section], config: &PoetConfig) -> Vec<&'a Section> {
    let mut kept: Vec<&Section> = sections
        .iter()
        .filter(|section| section_chars(section) >= config.min_section_chars)
        .collect();

    for &threshold in &config.preferred_section_chars {
        let preferred: Vec<&Section> = kept
            .iter()
            .copied()
            .filter(|section| section_chars(section) >= threshold)
            .collect();
        if preferred.len() >= config.min_preferred_sections {
            kept = preferred;
            break;
        }
    }
    kept
}

/// Where section indices come from.
enum IndexSource {
    /// Seeded: every draw restarts from the same seed.
    Reseeded(u64),
    /// Unseeded: one continuing stream.
    Stream(PoemRng),
}

impl IndexSource {
    fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => IndexSource::Reseeded(seed),
            None => IndexSource::Stream(entropy_rng()),
        }
    }

    fn draw(&mut self, len: usize) -> usize {
        match self {
            IndexSource::Reseeded(seed) => PoemRng::new(*seed).range_usize(0, len),
            IndexSource::Stream(rng) => rng.range_usize(0, len),
        }
    }
}

/// Build an extractive poem from candidate sections.
///
/// Candidates are used as given; callers normally pass `filter_sections`
/// output. Each failed attempt removes its section from the candidates.
pub fn select_and_render(sections: &[&Section], seed: Option<u64>, config: &PoetConfig) -> Poem {
    let mut candidates: Vec<&Section> = sections.to_vec();
    let mut source = IndexSource::new(seed);
    let mut poem = Poem::new();

    while !candidates.is_empty() {
        let idx = source.draw(candidates.len());
        let section = candidates.remove(idx);
        debug!(section = idx, remaining = candidates.len(), "picked section");

        append_section(&mut poem, section, config.min_lines);
        if poem.line_count() >= config.min_lines || candidates.is_empty() {
            break;
        }
        poem.push_break();
    }
    poem
}

/// Add the rows of a section's sentences until the poem has `min_lines`.
///
/// The check happens before each sentence, so the last sentence's rows are
/// added whole.
fn append_section(poem: &mut Poem, section: &Section, min_lines: usize) {
    for subsection in section {
        for sentence in extract_sentences(subsection) {
            if poem.line_count() >= min_lines {
                return;
            }
            poem.extend(split_sentence_into_rows(&sentence));
        }
    }
}
