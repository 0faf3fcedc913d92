// Poems and the generation entry point.
//
// A `Poem` is an ordered list of lines where an empty string marks a stanza
// break. Its "line count" is the number of non-empty lines; breaks never
// count towards the minimum length.
//
// `generate_poem` dispatches on `Mode`. One municipality (by default
// "Tranemo_kommun", which already has a human poet) always gets the fixed
// poem below, whatever mode or seed is asked for.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::chaos::render_chaos;
use crate::config::PoetConfig;
use crate::error::PoemError;
use crate::record::Record;
use crate::sections::select_and_render;

/// The poem served for the special-case municipality.
pub const SPECIAL_CASE_POEM: [&str; 8] = [
    "tranemo har redan",
    "en kommunpoet",
    "",
    "så de får",
    "ingenting",
    "av mig",
    "",
    "sorry",
];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Poem {
    lines: Vec<String>,
}

impl Poem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// All lines, stanza breaks included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines.extend(lines);
    }

    pub fn push_break(&mut self) {
        self.lines.push(String::new());
    }

    /// Number of non-break lines.
    pub fn line_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines joined by newlines, with leading and trailing whitespace
    /// (including trailing stanza breaks) removed.
    pub fn to_text(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl fmt::Display for Poem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// How a poem is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Sentences lifted from the article.
    #[default]
    Extractive,
    /// Sentences generated from the record's chain.
    Chaos,
}

impl Mode {
    pub fn from_flag(chaos: bool) -> Self {
        if chaos { Mode::Chaos } else { Mode::Extractive }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Extractive => f.write_str("extractive"),
            Mode::Chaos => f.write_str("chaos"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "extractive" | "normal" => Ok(Mode::Extractive),
            "chaos" => Ok(Mode::Chaos),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Produce a poem for `record`.
///
/// Only chaos mode can fail, and only when the record's model is missing
/// or cannot be decoded.
pub fn generate_poem(
    record: &Record,
    mode: Mode,
    seed: Option<u64>,
    config: &PoetConfig,
) -> Result<Poem, PoemError> {
    if record.id == config.special_case_id {
        return Ok(Poem::from_lines(SPECIAL_CASE_POEM));
    }
    match mode {
        Mode::Extractive => {
            let sections = record.filtered_sections(config);
            Ok(select_and_render(&sections, seed, config))
        }
        Mode::Chaos => {
            let model = record.text_model()?;
            Ok(render_chaos(&model, seed, config))
        }
    }
}

/// `generate_poem`, rendered as newline-joined text.
pub fn get_poem(
    record: &Record,
    mode: Mode,
    seed: Option<u64>,
    config: &PoetConfig,
) -> Result<String, PoemError> {
    generate_poem(record, mode, seed, config).map(|poem| poem.to_text())
}
