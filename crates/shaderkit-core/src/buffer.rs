//! The merge buffer: composed code lines tagged with the part that wrote them.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::Arc;

use crate::part::{leading_whitespace, CodePart, Section};

/// One line of merged code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferLine {
    text: String,
    owner: Arc<str>,
}

impl BufferLine {
    /// Returns the line text, with its original indentation.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the name of the part that contributed this line.
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

/// Merged code as an ordered list of owner-tagged lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeBuffer {
    lines: Vec<BufferLine>,
}

impl MergeBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding every line of `part`, verbatim.
    pub fn seed(part: &CodePart) -> Self {
        let owner: Arc<str> = Arc::from(part.name());
        let lines = part
            .source()
            .lines()
            .map(|line| BufferLine {
                text: line.to_string(),
                owner: Arc::clone(&owner),
            })
            .collect();
        Self { lines }
    }

    /// Returns all lines.
    pub fn lines(&self) -> &[BufferLine] {
        &self.lines
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the buffer holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Joins the line texts with newlines.
    pub fn code(&self) -> String {
        self.lines
            .iter()
            .map(BufferLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Joins the line texts, each stripped of surrounding whitespace.
    ///
    /// Needles are searched for in this text, so matching ignores indentation.
    pub fn matching_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.trim())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns the names of all parts that own at least one line.
    pub fn owners(&self) -> BTreeSet<&str> {
        self.lines.iter().map(BufferLine::owner).collect()
    }

    /// Iterates over the lines owned by `name`, with their zero-based index.
    pub fn lines_owned_by<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (usize, &'a BufferLine)> + 'a {
        self.lines
            .iter()
            .enumerate()
            .filter(move |(_, line)| line.owner() == name)
    }

    /// Replaces every occurrence of the section's needle with its body.
    ///
    /// Returns the number of line ranges that were replaced. Occurrences are
    /// applied from the bottom of the buffer up.
    pub(crate) fn apply_section(&mut self, section: &Section, owner: &Arc<str>) -> usize {
        let ranges = self.occurrences(section.needle());

        for range in ranges.iter().rev() {
            let indent = leading_whitespace(&self.lines[range.start].text).to_string();
            let replacement: Vec<BufferLine> = section
                .body_lines()
                .map(|line| BufferLine {
                    text: format!("{indent}{line}"),
                    owner: Arc::clone(owner),
                })
                .collect();
            log::trace!(
                "part '{owner}' replaces lines {}-{} with {} line(s)",
                range.start + 1,
                range.end,
                replacement.len()
            );
            self.lines.splice(range.clone(), replacement);
        }

        ranges.len()
    }

    /// Finds the line ranges spanned by each occurrence of `needle` in the
    /// matching text. Ranges sharing a line with an earlier one are dropped.
    fn occurrences(&self, needle: &str) -> Vec<Range<usize>> {
        if needle.is_empty() {
            return Vec::new();
        }

        let text = self.matching_text();
        let span = needle.matches('\n').count() + 1;
        let mut ranges: Vec<Range<usize>> = Vec::new();
        let mut line = 0;
        let mut cursor = 0;

        for (offset, _) in text.match_indices(needle) {
            line += text[cursor..offset].matches('\n').count();
            cursor = offset;
            let range = line..line + span;
            if ranges.last().map_or(true, |prev| range.start >= prev.end) {
                ranges.push(range);
            }
        }

        ranges
    }
}
