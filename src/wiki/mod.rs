//! Wiki-sourced training content.
//!
//! - Parser: wikitext -> title, body, quiz
//! - Resolver: which pages link to a base page, which languages a page has
//! - Assembler: one component page -> one record with its translations

pub mod assembler;
pub mod parser;
pub mod resolver;

pub use assembler::{wiki_slug, AssembleError, ContentAssembler};
pub use parser::WikiSlideParser;
pub use resolver::{resolve_components, resolve_translations, MAX_COMPONENT_LINKS};
