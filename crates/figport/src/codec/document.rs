//! Document assembly and splitting.
//!
//! A document is a block of `//` comment lines followed by sections:
//!
//! ```text
//! // Generated with figport v0.1.0
//! // Please do not modify this file unless you know what you're doing.
//! // format: 1
//! // defaults-digest: 5d0c…
//!
//! :R
//! Sport╵/static/sport.png
//! :B
//! 1╵Ford Model T╵…
//! ```
//!
//! A section with no records has no marker line at all.

use tracing::debug;

use crate::error::DecodeError;
use crate::limits::FORMAT_VERSION;
use crate::registry::{DefaultsDigest, Registry};

/// Prefix of a section marker line.
pub const SECTION_PREFIX: char = ':';

/// Prefix of a comment line.
pub const COMMENT_PREFIX: &str = "//";

const FORMAT_KEY: &str = "format";
const DIGEST_KEY: &str = "defaults-digest";

/// Encoded lines for one section code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// No records; nothing is written.
    Absent,
    /// At least one encoded line.
    Present(Vec<String>),
}

impl Section {
    /// Wraps encoded lines, mapping an empty list to [`Section::Absent`].
    pub fn from_lines(lines: Vec<String>) -> Self {
        if lines.is_empty() {
            Section::Absent
        } else {
            Section::Present(lines)
        }
    }

    /// Number of records in the section.
    pub fn len(&self) -> usize {
        match self {
            Section::Absent => 0,
            Section::Present(lines) => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Section::Absent)
    }
}

/// Metadata read back from a document's comment lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Comment text with the `//` prefix and one leading space removed.
    pub comments: Vec<String>,
    pub format_version: Option<u32>,
    pub defaults_digest: Option<DefaultsDigest>,
}

impl DocumentHeader {
    /// Builds the header block written at the top of every document.
    pub fn generated(defaults_digest: Option<DefaultsDigest>, extra: &[String]) -> Self {
        let mut comments = vec![
            format!("Generated with figport v{}", crate::VERSION),
            "Please do not modify this file unless you know what you're doing.".to_string(),
        ];
        comments.extend(extra.iter().cloned());
        comments.push(format!("{}: {}", FORMAT_KEY, FORMAT_VERSION));
        if let Some(digest) = defaults_digest {
            comments.push(format!("{}: {}", DIGEST_KEY, digest));
        }
        Self {
            comments,
            format_version: Some(FORMAT_VERSION),
            defaults_digest,
        }
    }

    /// Records one comment line, picking out the keys the header understands.
    fn absorb(&mut self, comment: &str) {
        if let Some((key, value)) = comment.split_once(':') {
            let value = value.trim();
            match key.trim() {
                FORMAT_KEY => self.format_version = value.parse().ok(),
                DIGEST_KEY => self.defaults_digest = value.parse().ok(),
                _ => {}
            }
        }
        self.comments.push(comment.to_string());
    }
}

/// Concatenates the header and every present section into document text.
///
/// Each line, including the last, ends in `\n`. A blank line separates the
/// header from the first section.
pub fn assemble<'a, I>(header: &DocumentHeader, sections: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Section)>,
{
    let mut out = String::new();
    for comment in &header.comments {
        out.push_str(COMMENT_PREFIX);
        if !comment.is_empty() {
            out.push(' ');
            out.push_str(comment);
        }
        out.push('\n');
    }
    out.push('\n');

    for (code, section) in sections {
        if let Section::Present(lines) = section {
            out.push(SECTION_PREFIX);
            out.push_str(code);
            out.push('\n');
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

/// A run of lines under one section marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRun<'a> {
    pub code: &'a str,
    /// 1-based line number of the marker.
    pub marker_line: usize,
    /// Record lines with their 1-based line numbers.
    pub lines: Vec<(usize, &'a str)>,
}

/// A document cut into its header and section runs, before any record is decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub header: DocumentHeader,
    /// Runs in document order. A code that appears twice yields two runs.
    pub runs: Vec<SectionRun<'a>>,
}

/// Splits document text into sections.
///
/// Blank lines and `//` comments are skipped anywhere. A marker for a code
/// the registry does not know aborts the split. Lines that appear before
/// the first marker are ignored.
pub fn split<'a>(text: &'a str, registry: &Registry) -> Result<SplitDocument<'a>, DecodeError> {
    let mut doc = SplitDocument::default();

    for (index, raw) in text.split('\n').enumerate() {
        let line_no = index + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix(COMMENT_PREFIX) {
            doc.header.absorb(comment.strip_prefix(' ').unwrap_or(comment));
            continue;
        }

        if let Some(code) = line.strip_prefix(SECTION_PREFIX) {
            if !registry.contains(code) {
                return Err(DecodeError::UnknownSection {
                    code: code.to_string(),
                    line: line_no,
                });
            }
            debug!(code, line = line_no, "section marker");
            doc.runs.push(SectionRun {
                code,
                marker_line: line_no,
                lines: Vec::new(),
            });
            continue;
        }

        if let Some(run) = doc.runs.last_mut() {
            run.lines.push((line_no, line));
        }
    }

    Ok(doc)
}
