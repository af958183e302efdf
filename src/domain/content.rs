//! Typed training content records.
//!
//! Parsed YAML and JSON arrive as [`RawContent`] (every field optional) and
//! are mapped into a [`ContentRecord`] in one step, so nothing downstream has
//! to inspect loosely-typed data for field presence.

use indexmap::IndexMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which kind of training content a loader produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A single slide: title, body, optional quiz
    Slide,

    /// A training module: name, description, ordered slides
    Module,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Slide => write!(f, "slide"),
            ContentKind::Module => write!(f, "module"),
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "slide" | "slides" | "training_slide" => Ok(ContentKind::Slide),
            "module" | "modules" | "training_module" => Ok(ContentKind::Module),
            _ => anyhow::bail!("Unknown content kind: {}", s),
        }
    }
}

/// Multiple-choice assessment attached to a slide
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub question: String,

    #[serde(default)]
    pub correct_answer_id: Option<u32>,

    #[serde(default)]
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub id: u32,
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Kind-specific fields of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBody {
    Slide {
        title: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assessment: Option<Quiz>,
    },
    Module {
        name: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estimated_ttc: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        slide_slugs: Vec<String>,
    },
}

/// Fields rendered from a single wiki page.
///
/// Used both to fill a record from its referenced page and as the value
/// type of a record's translations. Never nests further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageFields {
    Slide {
        title: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assessment: Option<Quiz>,
    },
    Module { name: String, description: String },
}

/// A loaded slide or module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Stable short identifier
    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Page holding the authored wikitext, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_page: Option<String>,

    #[serde(flatten)]
    pub body: ContentBody,

    /// Language code -> translated fields. `Some` on wiki-sourced records
    /// (possibly empty), `None` on file-sourced ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<IndexMap<String, PageFields>>,
}

impl ContentRecord {
    pub fn kind(&self) -> ContentKind {
        match self.body {
            ContentBody::Slide { .. } => ContentKind::Slide,
            ContentBody::Module { .. } => ContentKind::Module,
        }
    }

    /// Title of a slide or name of a module
    pub fn display_name(&self) -> &str {
        match &self.body {
            ContentBody::Slide { title, .. } => title,
            ContentBody::Module { name, .. } => name,
        }
    }

    pub fn is_wiki_sourced(&self) -> bool {
        self.translations.is_some()
    }

    /// Overwrite the kind-specific fields with those rendered from a page.
    ///
    /// Fields a page cannot carry (module slide lists, ttc) are kept.
    pub fn merge_page_fields(&mut self, fields: PageFields) {
        match (&mut self.body, fields) {
            (
                ContentBody::Slide {
                    title,
                    content,
                    assessment,
                },
                PageFields::Slide {
                    title: new_title,
                    content: new_content,
                    assessment: new_assessment,
                },
            ) => {
                *title = new_title;
                *content = new_content;
                *assessment = new_assessment;
            }
            (
                ContentBody::Module {
                    name, description, ..
                },
                PageFields::Module {
                    name: new_name,
                    description: new_description,
                },
            ) => {
                *name = new_name;
                *description = new_description;
            }
            // Page fields are always rendered for the record's own kind.
            _ => {}
        }
    }

    /// Required-fields check applied to wiki-sourced content
    pub fn validate(&self) -> Result<(), ContentValidationError> {
        let missing = |field: &'static str| ContentValidationError::MissingField {
            slug: self.slug.clone(),
            field,
        };

        if self.slug.trim().is_empty() {
            return Err(missing("slug"));
        }

        match &self.body {
            ContentBody::Slide { title, content, .. } => {
                if title.trim().is_empty() {
                    return Err(missing("title"));
                }
                if content.trim().is_empty() {
                    return Err(missing("content"));
                }
            }
            ContentBody::Module {
                name, description, ..
            } => {
                if name.trim().is_empty() {
                    return Err(missing("name"));
                }
                if description.trim().is_empty() {
                    return Err(missing("description"));
                }
            }
        }

        if self.wiki_page.is_some() && self.translations.is_none() {
            return Err(ContentValidationError::MissingTranslations(self.slug.clone()));
        }

        Ok(())
    }
}

/// Why a record failed its required-fields check
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentValidationError {
    #[error("Content '{slug}' is missing required field '{field}'")]
    MissingField { slug: String, field: &'static str },

    #[error("Wiki content '{0}' has no translations map")]
    MissingTranslations(String),
}

/// Module slide entries appear either as bare slugs or as `{slug: ...}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SlideRef {
    Slug(String),
    Entry { slug: String },
}

impl SlideRef {
    fn into_slug(self) -> String {
        match self {
            SlideRef::Slug(slug) | SlideRef::Entry { slug } => slug,
        }
    }
}

/// Loosely-typed content as found in YAML files and wiki JSON pages
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContent {
    pub id: Option<u64>,
    pub slug: Option<String>,
    pub wiki_page: Option<String>,

    // Slide fields
    pub title: Option<String>,
    pub content: Option<String>,
    pub assessment: Option<Quiz>,

    // Module fields
    pub name: Option<String>,
    pub description: Option<String>,
    pub estimated_ttc: Option<String>,
    #[serde(default)]
    slides: Vec<SlideRef>,
}

impl RawContent {
    /// Map parsed data into a record of the configured kind.
    ///
    /// The kind comes from configuration; whichever fields the data lacks
    /// are left empty for [`ContentRecord::validate`] to judge.
    pub fn into_record(self, kind: ContentKind, slug: impl Into<String>) -> ContentRecord {
        let body = match kind {
            ContentKind::Slide => ContentBody::Slide {
                title: self.title.unwrap_or_default(),
                content: self.content.unwrap_or_default(),
                assessment: self.assessment,
            },
            ContentKind::Module => ContentBody::Module {
                name: self.name.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
                estimated_ttc: self.estimated_ttc,
                slide_slugs: self.slides.into_iter().map(SlideRef::into_slug).collect(),
            },
        };

        ContentRecord {
            slug: slug.into(),
            id: self.id,
            wiki_page: self.wiki_page,
            body,
            translations: None,
        }
    }
}
