//! Splits a template into markup and native code spans.
//!
//! Native code is anything between an open tag (`<?php` or `<?=`) and the
//! matching `?>`. It is copied to the output untouched, so tag markers that
//! happen to appear inside it are never transpiled.

const SHORT_ECHO_OPEN: &str = "<?=";
const LONG_OPEN: &str = "<?php";

/// What a span contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Template text, eligible for transpilation
    Markup,
    /// Executable code written directly in the template
    Native,
}

/// A contiguous slice of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub kind: SpanKind,
    pub text: &'a str,
    /// Byte offset of the span in the template.
    pub offset: usize,
}

impl<'a> Span<'a> {
    fn markup(text: &'a str, offset: usize) -> Self {
        Self {
            kind: SpanKind::Markup,
            text,
            offset,
        }
    }

    fn native(text: &'a str, offset: usize) -> Self {
        Self {
            kind: SpanKind::Native,
            text,
            offset,
        }
    }

    pub fn is_markup(&self) -> bool {
        self.kind == SpanKind::Markup
    }
}

/// Tokenize a template into ordered spans covering the whole input.
pub fn tokenize(source: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while cursor < source.len() {
        match find_open_tag(source, cursor) {
            Some(start) => {
                if start > cursor {
                    spans.push(Span::markup(&source[cursor..start], cursor));
                }
                let end = native_end(source.as_bytes(), start);
                spans.push(Span::native(&source[start..end], start));
                cursor = end;
            }
            None => {
                spans.push(Span::markup(&source[cursor..], cursor));
                break;
            }
        }
    }

    spans
}

fn find_open_tag(source: &str, from: usize) -> Option<usize> {
    let mut search = from;

    while let Some(found) = source[search..].find("<?") {
        let at = search + found;
        let rest = &source[at..];

        if rest.starts_with(SHORT_ECHO_OPEN) {
            return Some(at);
        }

        let long = rest
            .get(..LONG_OPEN.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(LONG_OPEN));
        if long {
            let follows_space = rest[LONG_OPEN.len()..]
                .chars()
                .next()
                .map_or(true, char::is_whitespace);
            if follows_space {
                return Some(at);
            }
        }

        search = at + 2;
    }

    None
}

#[derive(Clone, Copy)]
enum Scan {
    Code,
    Quoted(u8),
    LineComment,
    BlockComment,
}

/// End offset of the native span opened at `start`.
///
/// `?>` inside a quoted string or a block comment does not close the span,
/// while a line comment is ended by it. An unclosed span runs to the end.
fn native_end(bytes: &[u8], start: usize) -> usize {
    let mut state = Scan::Code;
    let mut i = start + 2;

    while i < bytes.len() {
        let byte = bytes[i];
        let next = bytes.get(i + 1).copied();

        match state {
            Scan::Code => match (byte, next) {
                (b'?', Some(b'>')) => return close_tag_end(bytes, i + 2),
                (b'\'' | b'"', _) => state = Scan::Quoted(byte),
                (b'#', _) => state = Scan::LineComment,
                (b'/', Some(b'/')) => {
                    state = Scan::LineComment;
                    i += 1;
                }
                (b'/', Some(b'*')) => {
                    state = Scan::BlockComment;
                    i += 1;
                }
                _ => {}
            },
            Scan::Quoted(quote) => {
                if byte == b'\\' {
                    i += 1;
                } else if byte == quote {
                    state = Scan::Code;
                }
            }
            Scan::LineComment => match (byte, next) {
                (b'\n', _) => state = Scan::Code,
                (b'?', Some(b'>')) => return close_tag_end(bytes, i + 2),
                _ => {}
            },
            Scan::BlockComment => {
                if byte == b'*' && next == Some(b'/') {
                    state = Scan::Code;
                    i += 1;
                }
            }
        }

        i += 1;
    }

    bytes.len()
}

/// A single newline right after `?>` belongs to the close tag.
fn close_tag_end(bytes: &[u8], end: usize) -> usize {
    match &bytes[end..] {
        [b'\r', b'\n', ..] => end + 2,
        [b'\n', ..] => end + 1,
        _ => end,
    }
}
