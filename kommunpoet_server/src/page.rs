// The single HTML page: a municipality picker, a chaos toggle, and the poem.
//
// Rendered with Askama from `templates/index.html`. Every interpolated value
// is HTML-escaped by the template engine.

use askama::Template;

/// One `<option>` of the municipality picker.
pub struct Choice<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct PageView<'a> {
    pub choices: Vec<Choice<'a>>,
    pub chaos: bool,
    pub name: &'a str,
    /// Poem lines; empty lines are stanza breaks.
    pub lines: Vec<&'a str>,
}

impl<'a> PageView<'a> {
    /// Build the view from `(id, name)` picker entries and the poem text.
    pub fn new(
        choices: &'a [(String, String)],
        selected_id: Option<&str>,
        chaos: bool,
        name: &'a str,
        poem: &'a str,
    ) -> Self {
        let choices = choices
            .iter()
            .map(|(id, name)| Choice {
                id,
                name,
                selected: Some(id.as_str()) == selected_id,
            })
            .collect();
        Self {
            choices,
            chaos,
            name,
            lines: poem.lines().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> Vec<(String, String)> {
        vec![
            (String::new(), "SLUMPMÄSSIG KOMMUN".into()),
            ("Ale_kommun".into(), "Ale kommun".into()),
        ]
    }

    #[test]
    fn marks_selected_choice_and_breaks_lines() {
        let choices = choices();
        let html = PageView::new(
            &choices,
            Some("Ale_kommun"),
            true,
            "Ale kommun",
            "ale ligger\n\nvid älven",
        )
        .render()
        .unwrap();
        assert!(html.contains("<option value=\"Ale_kommun\" selected>Ale kommun</option>"));
        assert!(html.contains("<option value=\"\">SLUMPMÄSSIG KOMMUN</option>"));
        assert!(html.contains("ale ligger<br>\n<br>\nvid älven\n"));
        assert!(!html.contains("vid älven<br>"));
        assert!(html.contains("value=\"1\" checked"));
        assert!(html.contains("<h1>Ale kommun</h1>"));
    }

    #[test]
    fn poem_text_is_escaped() {
        let html = PageView::new(&[], None, false, "<script>", "<b>fet")
            .render()
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;fet"));
        assert!(!html.contains(" checked"));
    }

    #[test]
    fn picker_values_are_escaped() {
        let choices = vec![("a\"b".to_string(), "A & B".to_string())];
        let html = PageView::new(&choices, Some("a\"b"), false, "x", "")
            .render()
            .unwrap();
        assert!(html.contains("value=\"a&quot;b\" selected>A &amp; B</option>"));
    }
}
