//! Echo tags: raw `{!! !!}`, escaped `{{{ }}}` and regular `{{ }}`.
//!
//! The passes run raw, then escaped, then regular. Longer markers are
//! consumed first, so `{{{` is never seen by the regular pass. Code emitted
//! by one pass, or by a directive handler, is not rescanned by the next.
//! Unterminated tags are reported once all passes have run, and only for an
//! opening marker with no closing marker anywhere after it.

use regex::{Captures, Regex};

use crate::config::{TagKind, TagPair, TranspilerConfig};
use crate::error::{TranspileError, TranspileResult};

/// Marker that makes an echo tag literal text.
pub const ESCAPE_MARKER: char = '@';

/// A slice of the text being transformed.
#[derive(Debug)]
pub(crate) enum Piece<'a> {
    /// Template text not yet matched by any pass
    Markup { text: &'a str, offset: usize },
    /// Final output, skipped by later passes
    Output(String),
}

impl Piece<'_> {
    fn as_str(&self) -> &str {
        match self {
            Piece::Markup { text, .. } => text,
            Piece::Output(code) => code,
        }
    }
}

/// Concatenate pieces back into text.
pub(crate) fn join(pieces: &[Piece<'_>]) -> String {
    pieces.iter().map(Piece::as_str).collect()
}

#[derive(Debug)]
struct EchoPass {
    kind: TagKind,
    tags: TagPair,
    pattern: Regex,
}

impl EchoPass {
    fn new(kind: TagKind, tags: &TagPair) -> TranspileResult<Self> {
        let pattern = Regex::new(&format!(
            r"(?s)({})?{}\s*(.+?)\s*{}(\r?\n)?",
            regex::escape(&ESCAPE_MARKER.to_string()),
            regex::escape(&tags.open),
            regex::escape(&tags.close)
        ))?;
        Ok(Self {
            kind,
            tags: tags.clone(),
            pattern,
        })
    }

    fn apply<'a>(
        &self,
        pieces: Vec<Piece<'a>>,
        render: &dyn Fn(&Captures<'a>, usize) -> Piece<'a>,
    ) -> Vec<Piece<'a>> {
        let mut out = Vec::with_capacity(pieces.len());

        for piece in pieces {
            let (text, offset) = match piece {
                Piece::Markup { text, offset } => (text, offset),
                done => {
                    out.push(done);
                    continue;
                }
            };

            let mut last = 0;
            for caps in self.pattern.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                push_markup(&mut out, &text[last..whole.start()], offset + last);
                out.push(render(&caps, offset + whole.start()));
                last = whole.end();
            }
            push_markup(&mut out, &text[last..], offset + last);
        }

        out
    }

    /// Position of the first opening marker in `text` that no closing marker
    /// follows, either later in `text` or in the markup after it.
    fn unterminated(&self, text: &str, later: &[(&str, usize)]) -> Option<usize> {
        if later.iter().any(|(rest, _)| rest.contains(&self.tags.close)) {
            return None;
        }
        text.match_indices(&self.tags.open)
            .map(|(position, _)| position)
            .find(|&position| !text[position + self.tags.open.len()..].contains(&self.tags.close))
    }
}

/// Keep non-empty markup.
pub(crate) fn push_markup<'a>(out: &mut Vec<Piece<'a>>, text: &'a str, offset: usize) {
    if !text.is_empty() {
        out.push(Piece::Markup { text, offset });
    }
}

/// The three echo passes, built from a configuration.
#[derive(Debug)]
pub(crate) struct EchoTranspiler {
    raw: EchoPass,
    escaped: EchoPass,
    regular: EchoPass,
    config: TranspilerConfig,
}

impl EchoTranspiler {
    pub(crate) fn new(config: &TranspilerConfig) -> TranspileResult<Self> {
        Ok(Self {
            raw: EchoPass::new(TagKind::RawEcho, &config.raw_tags)?,
            escaped: EchoPass::new(TagKind::EscapedEcho, &config.escaped_tags)?,
            regular: EchoPass::new(TagKind::RegularEcho, &config.content_tags)?,
            config: config.clone(),
        })
    }

    /// Transpile every echo tag in `text`, which starts at `offset` in the template.
    pub(crate) fn transpile(&self, text: &str, offset: usize) -> TranspileResult<String> {
        self.transpile_pieces(vec![Piece::Markup { text, offset }])
    }

    /// Transpile the echo tags found in the markup pieces.
    pub(crate) fn transpile_pieces(&self, pieces: Vec<Piece<'_>>) -> TranspileResult<String> {
        let pieces = self.raw.apply(pieces, &|caps, _| {
            if caps.get(1).is_some() {
                Piece::Output(unescape(caps))
            } else {
                Piece::Output(format!("<?php echo {}; ?>{}", &caps[2], trailing(caps)))
            }
        });

        let pieces = self.escaped.apply(pieces, &|caps, at| match caps.get(0) {
            // doubly escaped: left whole for the regular pass
            Some(whole) if caps.get(1).is_some() => Piece::Markup {
                text: whole.as_str(),
                offset: at,
            },
            _ => Piece::Output(format!("<?php echo e({}); ?>{}", &caps[2], trailing(caps))),
        });

        let pieces = self.regular.apply(pieces, &|caps, _| {
            if caps.get(1).is_some() {
                Piece::Output(unescape(caps))
            } else {
                Piece::Output(format!(
                    "<?php echo {}; ?>{}",
                    self.config.format_echo(&caps[2]),
                    trailing(caps)
                ))
            }
        });

        self.check_terminated(&pieces)?;
        Ok(join(&pieces))
    }

    /// Fail on the earliest opening marker left in markup without a closing one.
    fn check_terminated(&self, pieces: &[Piece<'_>]) -> TranspileResult<()> {
        let markup: Vec<(&str, usize)> = pieces
            .iter()
            .filter_map(|piece| match piece {
                Piece::Markup { text, offset } => Some((*text, *offset)),
                Piece::Output(_) => None,
            })
            .collect();

        for (index, (text, offset)) in markup.iter().enumerate() {
            let mut first: Option<(usize, TagKind)> = None;
            // on a tie the longer marker wins, so `{{{` beats `{{`
            for pass in [&self.raw, &self.escaped, &self.regular] {
                if let Some(position) = pass.unterminated(text, &markup[index + 1..]) {
                    if first.map_or(true, |(at, _)| position < at) {
                        first = Some((position, pass.kind));
                    }
                }
            }
            if let Some((position, tag)) = first {
                return Err(TranspileError::UnterminatedTag {
                    tag,
                    offset: offset + position,
                });
            }
        }

        Ok(())
    }
}

/// The matched tag without its leading escape marker.
fn unescape(caps: &Captures<'_>) -> String {
    caps[0][ESCAPE_MARKER.len_utf8()..].to_string()
}

/// A newline consumed after the tag, doubled so line numbers survive.
fn trailing(caps: &Captures<'_>) -> String {
    caps.get(3).map(|m| m.as_str().repeat(2)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(text: &str) -> String {
        EchoTranspiler::new(&TranspilerConfig::default())
            .unwrap()
            .transpile(text, 0)
            .unwrap()
    }

    #[test]
    fn test_raw_echo() {
        assert_eq!(echo("{!! $html !!}"), "<?php echo $html; ?>");
    }

    #[test]
    fn test_escaped_echo() {
        assert_eq!(echo("{{{ $name }}}"), "<?php echo e($name); ?>");
    }

    #[test]
    fn test_regular_echo_uses_format() {
        assert_eq!(echo("{{ $name }}"), "<?php echo e($name); ?>");

        let config = TranspilerConfig::default().with_echo_format("htmlentities(%s)");
        let custom = EchoTranspiler::new(&config).unwrap();
        assert_eq!(
            custom.transpile("{{ $name }}", 0).unwrap(),
            "<?php echo htmlentities($name); ?>"
        );
    }

    #[test]
    fn test_escape_marker_leaves_literal() {
        assert_eq!(echo("@{{ $name }}"), "{{ $name }}");
        assert_eq!(echo("@{!! $html !!}"), "{!! $html !!}");
    }

    #[test]
    fn test_doubly_escaped_tag_shows_delimiters() {
        assert_eq!(echo("@{{{ $name }}}"), "{{{ $name }}}");
    }

    #[test]
    fn test_trailing_newline_is_doubled() {
        assert_eq!(echo("{{ $a }}\nnext"), "<?php echo e($a); ?>\n\nnext");
        assert_eq!(echo("{!! $a !!}\r\n"), "<?php echo $a; ?>\r\n\r\n");
    }

    #[test]
    fn test_multiline_expression() {
        assert_eq!(
            echo("{{ $a\n  ?? $b }}"),
            "<?php echo e($a\n  ?? $b); ?>"
        );
    }

    #[test]
    fn test_raw_output_not_rescanned() {
        assert_eq!(
            echo("{!! '{{' . $x !!}"),
            "<?php echo '{{' . $x; ?>"
        );
    }

    #[test]
    fn test_unterminated_echo_reports_offset() {
        let err = EchoTranspiler::new(&TranspilerConfig::default())
            .unwrap()
            .transpile("ok {{ $a }} then {{ $b", 100)
            .unwrap_err();
        match err {
            TranspileError::UnterminatedTag { tag, offset } => {
                assert_eq!(tag, TagKind::RegularEcho);
                assert_eq!(offset, 117);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_echoes_pass_through() {
        assert_eq!(echo("{{}}"), "{{}}");
        assert_eq!(echo("{!!!!}"), "{!!!!}");
        assert_eq!(echo("a {{}} b\n"), "a {{}} b\n");
    }

    #[test]
    fn test_markers_inside_literal_echo_are_not_unterminated() {
        assert_eq!(echo("@{{ '{!!' }}"), "{{ '{!!' }}");
        assert_eq!(echo("@{!! '{{' !!}"), "{!! '{{' !!}");
    }

    #[test]
    fn test_output_pieces_are_not_checked() {
        let transpiler = EchoTranspiler::new(&TranspilerConfig::default()).unwrap();
        let pieces = vec![
            Piece::Output("<?php if ($a == '{{'): ?>".to_string()),
            Piece::Markup {
                text: " {{ $b }}",
                offset: 20,
            },
        ];
        assert_eq!(
            transpiler.transpile_pieces(pieces).unwrap(),
            "<?php if ($a == '{{'): ?> <?php echo e($b); ?>"
        );
    }

    #[test]
    fn test_close_in_later_markup_counts() {
        let transpiler = EchoTranspiler::new(&TranspilerConfig::default()).unwrap();
        let pieces = vec![
            Piece::Markup {
                text: "{{ ",
                offset: 0,
            },
            Piece::Output("<input>".to_string()),
            Piece::Markup {
                text: " }}",
                offset: 9,
            },
        ];
        assert_eq!(transpiler.transpile_pieces(pieces).unwrap(), "{{ <input> }}");
    }

    #[test]
    fn test_unterminated_escaped_echo_prefers_longer_marker() {
        let err = EchoTranspiler::new(&TranspilerConfig::default())
            .unwrap()
            .transpile("x {{{ $a", 0)
            .unwrap_err();
        assert!(matches!(
            err,
            TranspileError::UnterminatedTag {
                tag: TagKind::EscapedEcho,
                offset: 2
            }
        ));
    }

    #[test]
    fn test_unterminated_raw_echo() {
        let err = EchoTranspiler::new(&TranspilerConfig::default())
            .unwrap()
            .transpile("{!! $a", 0)
            .unwrap_err();
        assert!(matches!(
            err,
            TranspileError::UnterminatedTag {
                tag: TagKind::RawEcho,
                offset: 0
            }
        ));
    }
}
