//! Code parts and their sections.
//!
//! A [`CodePart`] is a named fragment of shader source. Apart from the first
//! part of a composer (the base), a part's source is a sequence of sections.
//! Each section starts with one or more needle lines, marked with `>>`, naming
//! the code to replace. The lines that follow are inserted in its place:
//!
//! ```text
//! >>int i=0;
//! >>while (i<n)
//! // reversed loop
//! int i = n-1;
//! while (i>0)
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

/// Marker that starts a needle line.
pub const NEEDLE_MARKER: &str = ">>";

/// A needle to find in the merged code, and the code to put in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    needle: String,
    body: String,
}

impl Section {
    fn new(needle: String, body_lines: &[&str]) -> Self {
        let mut body = body_lines.join("\n").trim_end().to_string();
        body.push('\n');
        Self { needle, body }
    }

    /// The text to search for. Multi-line needles are joined with `\n`, each
    /// line stripped of leading whitespace.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// The replacement text. Always ends with exactly one newline.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Iterates over the replacement lines. An empty body yields one empty line.
    pub fn body_lines(&self) -> impl Iterator<Item = &str> {
        self.body.lines()
    }
}

/// An immutable, named and versioned fragment of shader source.
///
/// Parts are usually wrapped in an [`Arc`] and shared between composers.
#[derive(Debug, Clone)]
pub struct CodePart {
    name: String,
    version: String,
    source: String,
    sections: OnceLock<Vec<Section>>,
}

impl CodePart {
    /// Creates a new part.
    ///
    /// The source is canonicalized: leading and trailing blank lines are
    /// dropped, the common indentation of the non-blank lines is removed and
    /// every line is right-trimmed.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source: impl AsRef<str>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source: canonicalize(source.as_ref()),
            sections: OnceLock::new(),
        }
    }

    /// Returns the name of this part, describing its role (e.g. "renderstyle").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the version of this part (e.g. "mip" or "iso").
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the canonical source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the sections of this part, in order of appearance.
    pub fn sections(&self) -> &[Section] {
        self.sections.get_or_init(|| extract_sections(&self.source))
    }
}

impl fmt::Display for CodePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Identifies a part in a composer, either by name or by identity.
#[derive(Debug, Clone, Copy)]
pub enum PartKey<'a> {
    /// Any part with this name.
    Name(&'a str),
    /// Exactly this part instance.
    Part(&'a Arc<CodePart>),
}

impl PartKey<'_> {
    /// Returns the name of the referenced part.
    pub fn name(&self) -> &str {
        match self {
            PartKey::Name(name) => name,
            PartKey::Part(part) => part.name(),
        }
    }

    /// Returns true if `part` is the part this key refers to.
    pub fn matches(&self, part: &Arc<CodePart>) -> bool {
        match self {
            PartKey::Name(name) => part.name() == *name,
            PartKey::Part(other) => Arc::ptr_eq(part, other),
        }
    }
}

impl<'a> From<&'a str> for PartKey<'a> {
    fn from(name: &'a str) -> Self {
        PartKey::Name(name)
    }
}

impl<'a> From<&'a String> for PartKey<'a> {
    fn from(name: &'a String) -> Self {
        PartKey::Name(name)
    }
}

impl<'a> From<&'a Arc<CodePart>> for PartKey<'a> {
    fn from(part: &'a Arc<CodePart>) -> Self {
        PartKey::Part(part)
    }
}

/// Returns the leading whitespace of a line.
pub(crate) fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn canonicalize(source: &str) -> String {
    let lines: Vec<&str> = source
        .trim_end()
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .collect();

    let min_indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line).chars().count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| skip_chars(line, min_indent).trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

fn skip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((offset, _)) => &line[offset..],
        None => "",
    }
}

fn extract_sections(source: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut needle: Option<Vec<&str>> = None;
    let mut body: Vec<&str> = Vec::new();
    let mut in_needle = false;

    for line in source.lines() {
        if let Some(rest) = line.strip_prefix(NEEDLE_MARKER) {
            if !in_needle {
                if let Some(lines) = needle.take() {
                    sections.push(Section::new(lines.join("\n"), &body));
                    body.clear();
                }
                in_needle = true;
            }
            needle.get_or_insert_with(Vec::new).push(rest.trim_start());
        } else {
            in_needle = false;
            // Lines before the first needle belong to no section
            if needle.is_some() {
                body.push(line);
            }
        }
    }

    if let Some(lines) = needle {
        sections.push(Section::new(lines.join("\n"), &body));
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_source_is_dedented() {
        let part = CodePart::new(
            "base",
            "",
            "\n\n        int i = 0;   \n        if (x)\n            i++;\n\n\n   ",
        );
        assert_eq!(part.source(), "int i = 0;\nif (x)\n    i++;");
    }

    #[test]
    fn test_canonical_source_keeps_inner_blank_lines() {
        let part = CodePart::new("base", "", "    a;\n\n    b;\n");
        assert_eq!(part.source(), "a;\n\nb;");
    }

    #[test]
    fn test_name_and_version() {
        let part = CodePart::new("renderstyle", "iso", "x;");
        assert_eq!(part.name(), "renderstyle");
        assert_eq!(part.version(), "iso");
        assert_eq!(part.to_string(), "x;");
    }

    #[test]
    fn test_no_needles_means_no_sections() {
        let part = CodePart::new("base", "", "void main() {}\n");
        assert!(part.sections().is_empty());
    }

    #[test]
    fn test_single_section() {
        let part = CodePart::new("p", "", ">>X;\nY;\nZ;");
        let sections = part.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].needle(), "X;");
        assert_eq!(sections[0].body(), "Y;\nZ;\n");
        assert_eq!(sections[0].body_lines().collect::<Vec<_>>(), vec!["Y;", "Z;"]);
    }

    #[test]
    fn test_consecutive_needle_lines_join() {
        let part = CodePart::new(
            "s2",
            "",
            "
            >>int i=0;
            >>while (i<n)
            >>{
            >>for (i=i; i<n; i++)
            // reversed loop
            int i = n-1;
            ",
        );
        let sections = part.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].needle(), "int i=0;\nwhile (i<n)\n{\nfor (i=i; i<n; i++)");
        assert_eq!(sections[0].body(), "// reversed loop\nint i = n-1;\n");
    }

    #[test]
    fn test_multiple_sections() {
        let part = CodePart::new(
            "p",
            "",
            "
            >>--uniforms--
            uniform float th;
            // --uniforms--

            >>  --functions--
            float f() { return th; }
            ",
        );
        let sections = part.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].needle(), "--uniforms--");
        assert_eq!(sections[0].body(), "uniform float th;\n// --uniforms--\n");
        assert_eq!(sections[1].needle(), "--functions--");
        assert_eq!(sections[1].body(), "float f() { return th; }\n");
    }

    #[test]
    fn test_empty_body_is_single_newline() {
        let part = CodePart::new("p", "", ">>remove me;");
        let sections = part.sections();
        assert_eq!(sections[0].body(), "\n");
        assert_eq!(sections[0].body_lines().collect::<Vec<_>>(), vec![""]);
    }

    #[test]
    fn test_text_before_first_needle_is_ignored() {
        let part = CodePart::new("p", "", "// header\n>>a;\nb;");
        let sections = part.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body(), "b;\n");
    }

    #[test]
    fn test_indented_marker_is_not_a_needle() {
        let part = CodePart::new("p", "", ">>a;\nb;\n    >>c;");
        let sections = part.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body(), "b;\n    >>c;\n");
    }

    #[test]
    fn test_part_key_matching() {
        let a = Arc::new(CodePart::new("a", "1", "x;"));
        let a2 = Arc::new(CodePart::new("a", "2", "y;"));
        assert!(PartKey::from("a").matches(&a2));
        assert!(PartKey::from(&a).matches(&a));
        assert!(!PartKey::from(&a).matches(&a2));
        assert_eq!(PartKey::from(&a2).name(), "a");
    }
}
