//! Merging an ordered list of parts into one buffer.

use std::sync::Arc;

use crate::buffer::MergeBuffer;
use crate::part::CodePart;

/// Merges `parts` into a single buffer.
///
/// The first part is the base and is copied verbatim. Every following part is
/// applied section by section; each section sees the result of all sections
/// before it. Needles that do not occur are skipped.
pub fn merge_parts(parts: &[Arc<CodePart>]) -> MergeBuffer {
    let Some((base, rest)) = parts.split_first() else {
        return MergeBuffer::new();
    };

    let mut buffer = MergeBuffer::seed(base);

    for part in rest {
        let owner: Arc<str> = Arc::from(part.name());
        for section in part.sections() {
            if buffer.apply_section(section, &owner) == 0 {
                log::trace!(
                    "part '{}' ({}): section '{}' not found",
                    part.name(),
                    part.version(),
                    section.needle()
                );
            }
        }
    }

    log::debug!(
        "merged {} part(s) into {} line(s)",
        parts.len(),
        buffer.len()
    );
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(name: &str, source: &str) -> Arc<CodePart> {
        Arc::new(CodePart::new(name, "", source))
    }

    #[test]
    fn test_empty_list_gives_empty_buffer() {
        assert!(merge_parts(&[]).is_empty());
    }

    #[test]
    fn test_base_needles_are_literal() {
        let buffer = merge_parts(&[part("base", "foo();\n>>foo();\nbar();")]);
        assert_eq!(buffer.code(), "foo();\n>>foo();\nbar();");
    }

    #[test]
    fn test_loop_reversal() {
        let base = part(
            "s1",
            "
            // Cast ray.
            int i=0;
            while (i<n)
            {
                for (i=i; i<n; i++)
                {
                    // Calculate location.
                    vec3 loc = edgeLoc + float(i) * ray;
            ",
        );
        let patch = part(
            "s2",
            "
            >>int i=0;
            >>while (i<n)
            >>{
            >>for (i=i; i<n; i++)
            // reversed loop
            int i = n-1;
            while (i>0)
            {
                for (i=i; i>=0; i--)
            ",
        );

        let buffer = merge_parts(&[base, patch]);

        assert_eq!(
            buffer.code(),
            "// Cast ray.\n\
             // reversed loop\n\
             int i = n-1;\n\
             while (i>0)\n\
             {\n    \
             for (i=i; i>=0; i--)\n    \
             {\n        \
             // Calculate location.\n        \
             vec3 loc = edgeLoc + float(i) * ray;"
        );
    }

    #[test]
    fn test_sections_apply_in_order() {
        let base = part("base", "a;");
        let patch = part("patch", ">>a;\nb;\n>>b;\nc;");
        assert_eq!(merge_parts(&[base, patch]).code(), "c;");
    }

    #[test]
    fn test_order_of_parts_matters() {
        let base = part("a", "start;\nhook;");
        let b = part("b", ">>hook;\nintroduced;");
        let c = part("c", ">>introduced;\nfinal;");

        let forward = merge_parts(&[Arc::clone(&base), Arc::clone(&b), Arc::clone(&c)]);
        assert_eq!(forward.code(), "start;\nfinal;");

        let reversed = merge_parts(&[base, c, b]);
        assert_eq!(reversed.code(), "start;\nintroduced;");
    }
}
