#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

//! A small reader for INI-style configuration files.
//!
//! ```text
//! ; comments start with ';' or '#'
//! top = level      ; lands in the implicit "global" section
//!
//! [server]
//! host = example.org
//! port = 8080
//! ```
//!
//! Values are kept as raw text. Syntax problems are never reported: lines that do not look like
//! a section header or a `key = value` pair are ignored.

mod error;
mod parser;
mod section;

use std::convert::Infallible;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

pub use crate::error::{ParseError, Result};
use crate::parser::Parser;
pub use crate::section::{Entry, Section};

/// Name of the section that holds entries appearing before any section header.
pub const GLOBAL_SECTION: &str = "global";

/// Upper bound on the length of a section name, and of any line in the source.
pub const SECTION_LIMIT: usize = 255;

/// A parsed file: its sections in source order.
///
/// Sections with the same name are kept apart, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Open and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotFound`] if the file cannot be opened. The contents themselves
    /// never cause an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ParseError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "parsing file");
        Ok(Self::from_reader(BufReader::new(file)))
    }

    /// Parse everything `reader` yields. A read error ends the input early.
    #[must_use]
    pub fn from_reader<R: BufRead>(reader: R) -> Self {
        let sections = Parser::new(reader).into_sections();
        tracing::debug!(sections = sections.len(), "parsed document");

        Self { sections }
    }

    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_reader(text.as_bytes())
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns the first section named exactly `name`.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name() == name)
    }

    /// All sections named `name`, in source order.
    pub fn sections_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections
            .iter()
            .filter(move |section| section.name() == name)
    }

    /// Shorthand for looking up `key` in the first section named `section`.
    #[must_use]
    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.entry(key).map(Entry::value)
    }

    /// Tear the document down: each section's entries, then its name, then the section list.
    ///
    /// Dropping a `Document` does the same; this exists for callers that want the release to be
    /// explicit.
    pub fn release(self) {
        let Self { sections } = self;
        let count = sections.len();

        for section in sections {
            let (name, entries) = section.into_parts();
            drop(entries);
            drop(name);
        }

        tracing::trace!(sections = count, "released document");
    }
}

impl FromStr for Document {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Open and parse the file at `path`. See [`Document::open`].
///
/// # Errors
///
/// Returns [`ParseError::NotFound`] if the file cannot be opened.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<Document> {
    Document::open(path)
}

#[must_use]
pub fn find_section<'a>(document: &'a Document, name: &str) -> Option<&'a Section> {
    document.section(name)
}

#[must_use]
pub fn find_entry<'a>(section: &'a Section, name: &str) -> Option<&'a Entry> {
    section.entry(name)
}

pub fn release(document: Document) {
    document.release();
}
