// HTML extraction from wiki pages.
//
// Article body: the direct children of `.mw-parser-output` are scanned in
// order. Consecutive `<p>` elements form one section, one subsection per
// paragraph. Any other element (heading, list, table, figure) closes the
// current section. Whitespace-only text and comments between elements are
// ignored. Paragraph text is cleaned:
// - `<sup>` content (reference markers like "[3]") is dropped,
// - NFKC normalization (non-breaking spaces become plain spaces),
// - newlines become spaces and "*" with surrounding spaces becomes one space,
// - "Kungl." loses its period so it does not end a sentence,
// - outer whitespace is trimmed.
//
// Also reads the municipality list page and the infobox link to a
// municipality's central town.

use std::sync::LazyLock;

use kommunpoet_engine::Section;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use unicode_normalization::UnicodeNormalization;

use crate::error::CorpusError;

static PARSER_OUTPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".mw-parser-output").expect("selector is valid"));
static INFOBOX_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.infobox tr").expect("selector is valid"));
static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("selector is valid"));
static CELL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td > a").expect("selector is valid"));
static WIKITABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.wikitable").expect("selector is valid"));
static NAME_COLUMN_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td:nth-child(2) a").expect("selector is valid"));

static STAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *\* *").expect("star pattern is valid"));
static KUNGL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(kungl)\.").expect("kungl pattern is valid"));

/// Infobox row label naming the central town.
const CENTRAL_TOWN_LABEL: &str = "Centralort";

/// A municipality as listed on the list page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MunicipalityLink {
    /// Article slug, percent-decoded.
    pub id: String,
    pub name: String,
}

/// Cut an article body into sections of cleaned paragraph text.
pub fn extract_sections(html: &str) -> Result<Vec<Section>, CorpusError> {
    let document = Html::parse_document(html);
    let body = document
        .select(&PARSER_OUTPUT)
        .next()
        .ok_or(CorpusError::MissingElement(".mw-parser-output"))?;

    let mut sections = Vec::new();
    let mut current: Section = Vec::new();
    for child in body.children() {
        match child.value() {
            Node::Element(element) if element.name() == "p" => {
                if let Some(paragraph) = ElementRef::wrap(child) {
                    current.push(paragraph_text(paragraph));
                }
            }
            Node::Text(text) if text.trim().is_empty() => {}
            Node::Comment(_) => {}
            _ => {
                if !current.is_empty() {
                    sections.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }
    Ok(sections)
}

fn paragraph_text(paragraph: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(paragraph, &mut raw);
    clean_paragraph(&raw)
}

/// Append all text under `element`, skipping `<sup>` subtrees.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) if inner.name() != "sup" => {
                if let Some(inner) = ElementRef::wrap(child) {
                    collect_text(inner, out);
                }
            }
            _ => {}
        }
    }
}

/// Normalize paragraph text (see module comment).
pub fn clean_paragraph(raw: &str) -> String {
    let text: String = raw.nfkc().collect();
    let text = text.replace('\n', " ");
    let text = STAR.replace_all(&text, " ");
    let text = KUNGL.replace_all(&text, "$1");
    text.trim().to_string()
}

/// Link to the central town's article, from the first infobox.
pub fn find_central_town_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&INFOBOX_ROW)
        .find(|row| {
            row.select(&HEADER_CELL)
                .any(|th| element_text(th).trim() == CENTRAL_TOWN_LABEL)
        })
        .and_then(|row| row.select(&CELL_LINK).next())
        .and_then(|link| link.value().attr("href"))
        .map(str::to_string)
}

/// Every municipality named in the second column of the list page's first
/// `wikitable`.
pub fn extract_municipality_links(html: &str) -> Result<Vec<MunicipalityLink>, CorpusError> {
    let document = Html::parse_document(html);
    let table = document
        .select(&WIKITABLE)
        .next()
        .ok_or(CorpusError::MissingElement("table.wikitable"))?;

    Ok(table
        .select(&NAME_COLUMN_LINK)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            let slug = href.strip_prefix("/wiki/").unwrap_or(href);
            Some(MunicipalityLink {
                id: decode_id(slug),
                name: element_text(link).trim().to_string(),
            })
        })
        .collect())
}

/// Percent-decode an article slug; invalid UTF-8 leaves it as is.
pub fn decode_id(slug: &str) -> String {
    urlencoding::decode(slug)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| slug.to_string())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(body: &str) -> String {
        format!(
            "<html><body><div class=\"mw-parser-output\">{body}</div></body></html>"
        )
    }

    #[test]
    fn consecutive_paragraphs_form_one_section() {
        let html = article(
            "<p>Första stycket.</p>\n<p>Andra stycket.</p>\n\
             <h2>Historia</h2>\n<p>Tredje stycket.</p>\n<ul><li>lista</li></ul>",
        );
        let sections = extract_sections(&html).unwrap();
        assert_eq!(
            sections,
            vec![
                vec!["Första stycket.".to_string(), "Andra stycket.".to_string()],
                vec!["Tredje stycket.".to_string()],
            ]
        );
    }

    #[test]
    fn leading_elements_do_not_create_empty_sections() {
        let html = article("<table><tr><td>x</td></tr></table><h2>A</h2><p>Text.</p>");
        assert_eq!(extract_sections(&html).unwrap(), vec![vec!["Text.".to_string()]]);
    }

    #[test]
    fn trailing_paragraphs_are_kept() {
        let html = article("<p>Sista.</p>");
        assert_eq!(extract_sections(&html).unwrap().len(), 1);
    }

    #[test]
    fn references_and_markup_are_cleaned() {
        let html = article(
            "<p>Orten <b>grundades</b> 1862<sup>[1]</sup> av Kungl. Maj:t\n \
             * enligt arkivet.</p><h2>x</h2>",
        );
        let sections = extract_sections(&html).unwrap();
        assert_eq!(
            sections[0][0],
            "Orten grundades 1862 av Kungl Maj:t enligt arkivet."
        );
    }

    #[test]
    fn nfkc_turns_non_breaking_spaces_into_spaces() {
        assert_eq!(clean_paragraph("12\u{a0}000 invånare"), "12 000 invånare");
    }

    #[test]
    fn missing_body_is_an_error() {
        assert!(matches!(
            extract_sections("<html><body><p>x</p></body></html>"),
            Err(CorpusError::MissingElement(_))
        ));
    }

    #[test]
    fn finds_central_town_link() {
        let html = "<table class=\"infobox\">\
            <tr><th>Län</th><td><a href=\"/wiki/Stockholms_l%C3%A4n\">Stockholms län</a></td></tr>\
            <tr><th>Centralort</th><td><a href=\"/wiki/Flemingsberg\">Flemingsberg</a></td></tr>\
            </table>";
        assert_eq!(
            find_central_town_href(html),
            Some("/wiki/Flemingsberg".to_string())
        );
    }

    #[test]
    fn no_infobox_means_no_central_town() {
        assert_eq!(find_central_town_href(&article("<p>x</p>")), None);
    }

    #[test]
    fn reads_second_column_of_list_table() {
        let html = "<table class=\"wikitable\">\
            <tr><th>Kod</th><th>Kommun</th></tr>\
            <tr><td>0114</td><td><a href=\"/wiki/Upplands_V%C3%A4sby_kommun\">Upplands Väsby kommun</a></td></tr>\
            <tr><td>0115</td><td><a href=\"/wiki/Vallentuna_kommun\">Vallentuna kommun</a></td></tr>\
            </table>\
            <table class=\"wikitable\"><tr><td>x</td><td><a href=\"/wiki/Annat\">Annat</a></td></tr></table>";
        let links = extract_municipality_links(html).unwrap();
        assert_eq!(
            links,
            vec![
                MunicipalityLink {
                    id: "Upplands_Väsby_kommun".into(),
                    name: "Upplands Väsby kommun".into(),
                },
                MunicipalityLink {
                    id: "Vallentuna_kommun".into(),
                    name: "Vallentuna kommun".into(),
                },
            ]
        );
    }

    #[test]
    fn decode_id_handles_plain_and_encoded_slugs() {
        assert_eq!(decode_id("Ale_kommun"), "Ale_kommun");
        assert_eq!(decode_id("%C3%96rebro_kommun"), "Örebro_kommun");
    }
}
