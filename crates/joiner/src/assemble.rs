//! Joining resolved segments into the combined text.

use log::debug;

use crate::error::BuildError;
use crate::resolver::Segment;

/// Inserted between consecutive segments.
pub const SEPARATOR: &str = "\n\n";

/// Join all segment contents with [`SEPARATOR`], preserving order.
pub fn assemble(segments: &[Segment]) -> Result<String, BuildError> {
    if segments.is_empty() {
        return Err(BuildError::empty("no segments were resolved"));
    }

    let capacity = segments.iter().map(|s| s.content().len()).sum::<usize>()
        + SEPARATOR.len() * (segments.len() - 1);
    let mut combined = String::with_capacity(capacity);
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            combined.push_str(SEPARATOR);
        }
        combined.push_str(segment.content());
    }

    debug!(
        "Data combined: {} segment(s), {} bytes",
        segments.len(),
        combined.len()
    );
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(content: &str) -> Segment {
        Segment::File {
            path: PathBuf::from("x.js"),
            content: content.to_owned(),
        }
    }

    #[test]
    fn test_joins_with_blank_line() -> Result<(), BuildError> {
        let combined = assemble(&[file("var a=1;"), file("var b=2;")])?;
        assert_eq!(combined, "var a=1;\n\nvar b=2;");
        Ok(())
    }

    #[test]
    fn test_single_segment_is_verbatim() -> Result<(), BuildError> {
        assert_eq!(assemble(&[Segment::Literal("/* only */".to_owned())])?, "/* only */");
        assert_eq!(assemble(&[file("")])?, "");
        Ok(())
    }

    #[test]
    fn test_split_recovers_segments() -> Result<(), BuildError> {
        let parts = ["/* hdr */", "body{color:red}", "", "p{}\n"];
        let segments: Vec<_> = parts
            .iter()
            .map(|p| Segment::Literal((*p).to_owned()))
            .collect();

        let combined = assemble(&segments)?;
        assert_eq!(combined.matches(SEPARATOR).count(), parts.len() - 1);
        assert_eq!(combined.split(SEPARATOR).collect::<Vec<_>>(), parts);
        Ok(())
    }

    #[test]
    fn test_nothing_to_combine() {
        assert!(matches!(assemble(&[]), Err(BuildError::EmptyInput { .. })));
    }
}
