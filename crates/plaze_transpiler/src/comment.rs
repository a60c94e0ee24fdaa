//! Template comments, removed before any other transformation.

use regex::Regex;

use crate::config::{TagKind, TagPair};
use crate::error::{TranspileError, TranspileResult};

#[derive(Debug)]
pub(crate) struct CommentStripper {
    tags: TagPair,
    pattern: Regex,
}

impl CommentStripper {
    pub(crate) fn new(tags: &TagPair) -> TranspileResult<Self> {
        let pattern = Regex::new(&format!(
            r"(?s){}.*?{}",
            regex::escape(&tags.open),
            regex::escape(&tags.close)
        ))?;
        Ok(Self {
            tags: tags.clone(),
            pattern,
        })
    }

    /// Remove every comment from `text`, which starts at `offset` in the template.
    pub(crate) fn strip(&self, text: &str, offset: usize) -> TranspileResult<String> {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;

        for found in self.pattern.find_iter(text) {
            result.push_str(&text[last..found.start()]);
            last = found.end();
        }

        let rest = &text[last..];
        if let Some(position) = rest.find(&self.tags.open) {
            return Err(TranspileError::UnterminatedTag {
                tag: TagKind::Comment,
                offset: offset + last + position,
            });
        }
        result.push_str(rest);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripper() -> CommentStripper {
        CommentStripper::new(&TagPair::new("{{--", "--}}")).unwrap()
    }

    #[test]
    fn test_comments_removed() {
        let output = stripper()
            .strip("a{{-- note --}}b{{--\n {{ $x }}\n--}}c", 0)
            .unwrap();
        assert_eq!(output, "abc");
    }

    #[test]
    fn test_text_without_comments_unchanged() {
        assert_eq!(stripper().strip("{{ $x }}", 0).unwrap(), "{{ $x }}");
    }

    #[test]
    fn test_unterminated_comment() {
        let err = stripper().strip("ok {{-- never closed", 10).unwrap_err();
        assert!(matches!(
            err,
            TranspileError::UnterminatedTag {
                tag: TagKind::Comment,
                offset: 13
            }
        ));
    }
}
