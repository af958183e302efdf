//! Extracts slide fields from a page's wikitext.
//!
//! Training pages are authored as:
//!
//! ```text
//! <noinclude><languages/></noinclude>
//! == <translate><!--T:1--> Title</translate> ==
//! <translate><!--T:2--> Body text...</translate>
//! {{Training module quiz
//! | question = ...
//! | correct_answer_id = 2
//! | answer1 = ...
//! | explanation1 = ...
//! }}
//! ```

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{ContentKind, PageFields, Quiz, QuizAnswer};

fn noinclude_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<noinclude>.*?</noinclude>").expect("valid regex"))
}

fn translate_markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?translate>|<languages\s*/>|<!--T:\d+-->\s?").expect("valid regex"))
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*==+[ \t]*(.+?)[ \t]*==+[ \t]*$\n?").expect("valid regex"))
}

const QUIZ_TEMPLATE: &str = "Training module quiz";

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

/// Parsed view of one training page
#[derive(Debug, Clone)]
pub struct WikiSlideParser {
    wikitext: String,
}

impl WikiSlideParser {
    pub fn new(raw: &str) -> Self {
        let without_noinclude = noinclude_re().replace_all(raw, "");
        let wikitext = translate_markup_re()
            .replace_all(&without_noinclude, "")
            .into_owned();

        Self { wikitext }
    }

    /// Text of the first section heading
    pub fn title(&self) -> String {
        heading_re()
            .captures(&self.wikitext)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }

    /// Page body without the title heading and quiz template
    pub fn content(&self) -> String {
        let without_title = heading_re().replacen(&self.wikitext, 1, "");

        let mut without_quiz = String::with_capacity(without_title.len());
        let mut rest: &str = &without_title;
        while let Some(span) = find_quiz(rest) {
            without_quiz.push_str(&rest[..span.start]);
            rest = &rest[span.end..];
        }
        without_quiz.push_str(rest);

        blank_lines_re()
            .replace_all(&without_quiz, "\n\n")
            .trim()
            .to_string()
    }

    /// The quiz template, if the page has one
    pub fn quiz(&self) -> Option<Quiz> {
        let span = find_quiz(&self.wikitext)?;
        let body = &self.wikitext[span.body];

        let mut quiz = Quiz::default();
        let mut answers: BTreeMap<u32, (String, Option<String>)> = BTreeMap::new();

        for param in split_params(body) {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().to_string();

            if key == "question" {
                quiz.question = value;
            } else if key == "correct_answer_id" {
                quiz.correct_answer_id = value.parse().ok();
            } else if let Some(id) = numbered(key, "answer") {
                answers.entry(id).or_default().0 = value;
            } else if let Some(id) = numbered(key, "explanation") {
                answers.entry(id).or_default().1 = Some(value);
            }
        }

        quiz.answers = answers
            .into_iter()
            .filter(|(_, (text, _))| !text.is_empty())
            .map(|(id, (text, explanation))| QuizAnswer {
                id,
                text,
                explanation,
            })
            .collect();

        Some(quiz)
    }

    /// Fields shaped for the given content kind
    pub fn fields(&self, kind: ContentKind) -> PageFields {
        match kind {
            ContentKind::Slide => PageFields::Slide {
                title: self.title(),
                content: self.content(),
                assessment: self.quiz(),
            },
            ContentKind::Module => PageFields::Module {
                name: self.title(),
                description: self.content(),
            },
        }
    }
}

/// Byte ranges of one quiz template: the whole `{{...}}` and its parameters
struct TemplateSpan {
    start: usize,
    end: usize,
    body: Range<usize>,
}

/// First quiz template in `text`, matched by brace depth so nested
/// templates and wikilinks inside it stay part of it
fn find_quiz(text: &str) -> Option<TemplateSpan> {
    let mut from = 0;

    while let Some(offset) = text[from..].find("{{") {
        let start = from + offset;
        let name_start = start + 2;
        let after_ws = text[name_start..].trim_start();
        let name_at = text.len() - after_ws.len();

        if after_ws.starts_with(QUIZ_TEMPLATE) {
            let end = closing_braces(text, start)?;
            return Some(TemplateSpan {
                start,
                end,
                body: (name_at + QUIZ_TEMPLATE.len())..(end - 2),
            });
        }
        from = name_start;
    }

    None
}

/// End (exclusive) of the template opening at `start`; `None` if unclosed
fn closing_braces(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;

    while i + 1 < bytes.len() {
        match &bytes[i..i + 2] {
            b"{{" => {
                depth += 1;
                i += 2;
            }
            b"}}" => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => i += 1,
        }
    }

    None
}

/// Template parameters, split on `|` outside nested `{{...}}` and `[[...]]`
fn split_params(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut params = Vec::new();
    let mut braces = 0usize;
    let mut links = 0usize;
    let mut param_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes.get(i..i + 2) {
            Some(b"{{") => braces += 1,
            Some(b"}}") => braces = braces.saturating_sub(1),
            Some(b"[[") => links += 1,
            Some(b"]]") => links = links.saturating_sub(1),
            _ => {
                if bytes[i] == b'|' && braces == 0 && links == 0 {
                    params.push(&body[param_start..i]);
                    param_start = i + 1;
                }
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    params.push(&body[param_start..]);

    params
}

/// `answer3` -> Some(3) for prefix "answer"
fn numbered(key: &str, prefix: &str) -> Option<u32> {
    key.strip_prefix(prefix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<noinclude><languages/></noinclude>
== <translate><!--T:1--> Five pillars</translate> ==
<translate><!--T:2--> Wikipedia is an encyclopedia.</translate>



<translate><!--T:3--> It is written from a neutral point of view.</translate>
{{Training module quiz
| question = What is Wikipedia?
| correct_answer_id = 2
| answer1 = A blog
| explanation1 = No.
| answer2 = An encyclopedia
| explanation2 = Correct!
}}
"#;

    #[test]
    fn test_title_strips_translation_markup() {
        let parser = WikiSlideParser::new(SLIDE);
        assert_eq!(parser.title(), "Five pillars");
    }

    #[test]
    fn test_content_excludes_title_and_quiz() {
        let parser = WikiSlideParser::new(SLIDE);
        assert_eq!(
            parser.content(),
            "Wikipedia is an encyclopedia.\n\nIt is written from a neutral point of view."
        );
    }

    #[test]
    fn test_quiz_parsing() {
        let quiz = WikiSlideParser::new(SLIDE).quiz().unwrap();
        assert_eq!(quiz.question, "What is Wikipedia?");
        assert_eq!(quiz.correct_answer_id, Some(2));
        assert_eq!(quiz.answers.len(), 2);
        assert_eq!(quiz.answers[1].text, "An encyclopedia");
        assert_eq!(quiz.answers[1].explanation.as_deref(), Some("Correct!"));
    }

    const LINKED_QUIZ: &str = r#"== Sources ==
Body
{{Training module quiz
| question = Which policy covers [[WP:RS|reliable sources]]?
| correct_answer_id = 1
| answer1 = [[WP:V|Verifiability]]
| explanation1 = See {{Tl|cite}} and [[WP:RS|sources]].
| answer2 = {{Tl|citation needed}}
| explanation2 = Not a policy, see [[WP:CN|the essay]].
| answer3 = None
}}
After quiz.
"#;

    #[test]
    fn test_quiz_keeps_wikilinks_and_nested_templates() {
        let quiz = WikiSlideParser::new(LINKED_QUIZ).quiz().unwrap();

        assert_eq!(quiz.question, "Which policy covers [[WP:RS|reliable sources]]?");
        assert_eq!(quiz.correct_answer_id, Some(1));
        assert_eq!(quiz.answers.len(), 3);
        assert_eq!(quiz.answers[0].text, "[[WP:V|Verifiability]]");
        assert_eq!(
            quiz.answers[0].explanation.as_deref(),
            Some("See {{Tl|cite}} and [[WP:RS|sources]].")
        );
        assert_eq!(quiz.answers[1].text, "{{Tl|citation needed}}");
        assert_eq!(
            quiz.answers[1].explanation.as_deref(),
            Some("Not a policy, see [[WP:CN|the essay]].")
        );
        assert_eq!(quiz.answers[2].id, 3);
        assert_eq!(quiz.answers[2].text, "None");
        assert!(quiz.answers[2].explanation.is_none());
    }

    #[test]
    fn test_content_drops_whole_quiz_with_nested_markup() {
        let parser = WikiSlideParser::new(LINKED_QUIZ);
        assert_eq!(parser.content(), "Body\n\nAfter quiz.");
    }

    #[test]
    fn test_other_templates_stay_in_content() {
        let parser = WikiSlideParser::new("== T ==\nSee {{Tl|cite}} here.");
        assert_eq!(parser.content(), "See {{Tl|cite}} here.");
        assert!(parser.quiz().is_none());
    }

    #[test]
    fn test_unclosed_quiz_is_ignored() {
        let parser = WikiSlideParser::new("== T ==\nBody\n{{Training module quiz\n| question = Q");
        assert!(parser.quiz().is_none());
        assert!(parser.content().starts_with("Body"));
    }

    #[test]
    fn test_page_without_heading_or_quiz() {
        let parser = WikiSlideParser::new("Just some text.");
        assert_eq!(parser.title(), "");
        assert_eq!(parser.content(), "Just some text.");
        assert!(parser.quiz().is_none());
    }

    #[test]
    fn test_module_fields_shape() {
        let parser = WikiSlideParser::new("== Editing basics ==\nLearn to edit.");
        assert_eq!(
            parser.fields(ContentKind::Module),
            PageFields::Module {
                name: "Editing basics".to_string(),
                description: "Learn to edit.".to_string(),
            }
        );
    }
}
