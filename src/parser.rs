use std::io::{self, BufRead};

use crate::GLOBAL_SECTION;
use crate::section::{Entry, Section};

/// Number of visible bytes kept from a single line. The rest of the line is discarded.
pub(crate) const MAX_LINE_LEN: usize = crate::SECTION_LIMIT;

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Represents an on-going parse.
#[derive(Debug)]
pub(crate) struct Parser<R> {
    reader: R,
    line: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> Parser<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::with_capacity(MAX_LINE_LEN),
            line_number: 0,
        }
    }

    /// Reads the input to the end in a single forward pass.
    ///
    /// Malformed lines are skipped or interpreted best-effort. A read error stops the parse and
    /// keeps whatever was built up to that point.
    pub fn into_sections(mut self) -> Vec<Section> {
        let mut sections = Vec::<Section>::with_capacity(16);

        loop {
            match self.read_line() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    tracing::warn!(
                        line = self.line_number + 1,
                        error = %err,
                        "read failed, treating as end of input"
                    );
                    break;
                }
            }

            let text = String::from_utf8_lossy(&self.line);
            parse_line(&text, &mut sections, self.line_number);
        }

        sections
    }

    /// Fill `self.line` with the next line, without its terminator. Returns `false` at EOF.
    fn read_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        let mut read_any = false;
        let mut overflow = 0_usize;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };

            if available.is_empty() {
                break;
            }
            read_any = true;

            let (chunk, used, done) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (&available[..i], i + 1, true),
                None => (available, available.len(), false),
            };

            let room = MAX_LINE_LEN - self.line.len();
            let keep = chunk.len().min(room);
            self.line.extend_from_slice(&chunk[..keep]);
            overflow += chunk.len() - keep;

            self.reader.consume(used);

            if done {
                break;
            }
        }

        if !read_any {
            return Ok(false);
        }

        if self.line.last() == Some(&b'\r') {
            self.line.pop();
        }

        if self.line_number == 0 && self.line.starts_with(BOM_UTF8) {
            self.line.drain(..BOM_UTF8.len());
        }

        self.line_number += 1;

        if overflow > 0 {
            tracing::warn!(
                line = self.line_number,
                discarded = overflow,
                "line exceeds {MAX_LINE_LEN} bytes, truncating"
            );
        }

        Ok(true)
    }
}

/// Classify a single line (terminator already removed) and add it to `sections`.
fn parse_line(line: &str, sections: &mut Vec<Section>, line_number: usize) {
    let line = strip_comment(line);

    if let Some(rest) = line.strip_prefix('[') {
        let name = if let Some(end) = rest.find(']') {
            &rest[..end]
        } else {
            tracing::trace!(line = line_number, "section header has no closing bracket");
            rest
        };

        sections.push(Section::new(name.to_owned(), Vec::new()));
    } else if let Some(entry) = parse_entry(line) {
        current_section(sections).push(entry);
    } else if !line.trim().is_empty() {
        tracing::trace!(line = line_number, "ignoring line without '=' or section header");
    }
}

/// Everything from the first `;` or `#` onward is a comment.
fn strip_comment(line: &str) -> &str {
    line.find([';', '#']).map_or(line, |i| &line[..i])
}

fn parse_entry(line: &str) -> Option<Entry> {
    let (key, rest) = line.split_once('=')?;

    // Spaces anywhere in the key are dropped, not just at the edges.
    let name = key.chars().filter(|&c| c != ' ').collect::<String>();

    let value = rest.trim_start_matches(' ');
    let value = value.find(['\r', '\n']).map_or(value, |end| &value[..end]);
    let value = value.trim_end_matches(' ');

    Some(Entry::new(name, value.to_owned()))
}

/// The section new entries belong to, creating the implicit global section when there is none.
fn current_section(sections: &mut Vec<Section>) -> &mut Section {
    if sections.is_empty() {
        tracing::debug!("entry precedes any section header, adding implicit {GLOBAL_SECTION:?}");
        sections.push(Section::new(GLOBAL_SECTION.to_owned(), Vec::new()));
    }

    let last = sections.len() - 1;
    &mut sections[last]
}
