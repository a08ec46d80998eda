//! Path tokenizer for dotted, bracketed and attribute paths.
//!
//! `root.items[2]@id` splits into `root`, `items`, `2`, `@id`. Brackets act
//! as dividers, a `@` opens a new segment and stays part of it, and empty
//! segments are dropped. Spans are byte ranges into the original path, so the
//! segments can be sliced from it without allocating.

use memchr::{memchr2_iter, memchr3};
use smallvec::SmallVec;

use crate::constants::{is_bracket, ATTRIBUTE_MARKER, DEFAULT_SHORT_PATH_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.hi == self.lo
    }
}

type SpanBuf = SmallVec<[Span; 8]>;

/// Reusable splitter. Its buffers are cleared, never freed, between calls.
#[derive(Debug, Clone)]
pub struct PathSplitter {
    buf: SmallVec<[u8; 64]>,
    spans: SpanBuf,
    short_limit: usize,
}

impl Default for PathSplitter {
    fn default() -> Self {
        Self::with_short_limit(DEFAULT_SHORT_PATH_LIMIT)
    }
}

impl PathSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_short_limit(short_limit: usize) -> Self {
        Self {
            buf: SmallVec::new(),
            spans: SmallVec::new(),
            short_limit,
        }
    }

    pub fn split(&mut self, path: &str, sep: &str) -> &[Span] {
        self.spans.clear();
        self.buf.clear();
        if path.is_empty() {
            return &self.spans;
        }
        if path.len() <= self.short_limit {
            split_direct(path.as_bytes(), sep.as_bytes(), &mut self.spans);
        } else {
            self.split_normalized(path.as_bytes(), sep.as_bytes());
        }
        &self.spans
    }

    /// Splits `path` and returns its segments as sub-slices of `path`.
    pub fn split_keys<'p>(&mut self, path: &'p str, sep: &str) -> SmallVec<[&'p str; 8]> {
        self.split(path, sep)
            .iter()
            .filter_map(|span| path.get(span.lo..span.hi))
            .collect()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    fn split_normalized(&mut self, path: &[u8], sep: &[u8]) {
        let div = divider_byte(sep);
        self.buf.extend_from_slice(path);
        for pos in memchr2_iter(b'[', b']', path) {
            self.buf[pos] = div;
        }

        let buf = &self.buf;
        let lead = sep.first().copied().unwrap_or(div);
        let mut start = 0;
        let mut i = 0;
        while let Some(rel) = memchr3(div, ATTRIBUTE_MARKER, lead, &buf[i..]) {
            let pos = i + rel;
            if !sep.is_empty() && buf[pos..].starts_with(sep) {
                push_span(&mut self.spans, buf, start, pos);
                i = pos + sep.len();
                start = i;
            } else if buf[pos] == div {
                push_span(&mut self.spans, buf, start, pos);
                i = pos + 1;
                start = i;
            } else if buf[pos] == ATTRIBUTE_MARKER {
                push_span(&mut self.spans, buf, start, pos);
                start = pos;
                i = pos + 1;
            } else {
                i = pos + 1;
            }
        }
        push_span(&mut self.spans, buf, start, buf.len());
    }
}

/// Byte that brackets are rewritten to before splitting. Multi-byte
/// separators cannot replace a single byte in place, so NUL stands in.
fn divider_byte(sep: &[u8]) -> u8 {
    match sep {
        [single] => *single,
        _ => 0,
    }
}

fn split_direct(path: &[u8], sep: &[u8], out: &mut SpanBuf) {
    let div = divider_byte(sep);
    let mut start = 0;
    let mut i = 0;
    while i < path.len() {
        if !sep.is_empty() && path[i..].starts_with(sep) {
            push_span(out, path, start, i);
            i += sep.len();
            start = i;
            continue;
        }
        let byte = path[i];
        if is_bracket(byte) || byte == div {
            push_span(out, path, start, i);
            i += 1;
            start = i;
            continue;
        }
        if byte == ATTRIBUTE_MARKER {
            push_span(out, path, start, i);
            start = i;
        }
        i += 1;
    }
    push_span(out, path, start, path.len());
}

fn push_span(out: &mut SpanBuf, path: &[u8], lo: usize, hi: usize) {
    if hi <= lo {
        return;
    }
    // a bare marker names no attribute
    if hi - lo == 1 && path[lo] == ATTRIBUTE_MARKER {
        return;
    }
    out.push(Span { lo, hi });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(path: &str, sep: &str) -> Vec<String> {
        let mut splitter = PathSplitter::with_short_limit(usize::MAX);
        collect(&mut splitter, path, sep)
    }

    fn normalized(path: &str, sep: &str) -> Vec<String> {
        let mut splitter = PathSplitter::with_short_limit(0);
        collect(&mut splitter, path, sep)
    }

    fn collect(splitter: &mut PathSplitter, path: &str, sep: &str) -> Vec<String> {
        splitter
            .split_keys(path, sep)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[rstest::rstest]
    #[case("root.qwe.rty@version", ".", &["root", "qwe", "rty", "@version"])]
    #[case("@version", ".", &["@version"])]
    #[case("root@version", ".", &["root", "@version"])]
    #[case("foobar", ".", &["foobar"])]
    #[case("foobar@", ".", &["foobar"])]
    #[case("foo.bar[2]", ".", &["foo", "bar", "2"])]
    #[case("foo[2].bar", ".", &["foo", "2", "bar"])]
    #[case("a..b.", ".", &["a", "b"])]
    #[case("a/b[0]/c", "/", &["a", "b", "0", "c"])]
    #[case("a::b::[1]", "::", &["a", "b", "1"])]
    #[case("a:b", "::", &["a:b"])]
    #[case("items[0][1]", "", &["items", "0", "1"])]
    fn test_split_segments(#[case] path: &str, #[case] sep: &str, #[case] expected: &[&str]) {
        assert_eq!(direct(path, sep), expected);
        assert_eq!(normalized(path, sep), expected);
    }

    #[rstest::rstest]
    #[case("root.qwe.rty@version", ".")]
    #[case("x[1][22].y@z", ".")]
    #[case("one::two:[3]::@four", "::")]
    fn test_strategies_yield_identical_spans(#[case] path: &str, #[case] sep: &str) {
        let mut short = PathSplitter::with_short_limit(usize::MAX);
        let mut long = PathSplitter::with_short_limit(0);
        assert_eq!(short.split(path, sep), long.split(path, sep));
    }

    #[rstest::rstest]
    fn test_spans_cover_original_path() {
        let mut splitter = PathSplitter::new();
        let spans = splitter.split("root.qwe.rty@version", ".").to_vec();
        assert_eq!(
            spans,
            vec![
                Span { lo: 0, hi: 4 },
                Span { lo: 5, hi: 8 },
                Span { lo: 9, hi: 12 },
                Span { lo: 12, hi: 20 },
            ]
        );
    }

    #[rstest::rstest]
    fn test_long_path_uses_scratch_and_reuses_it() {
        let long_path = vec!["segment"; 16].join(".");
        let mut splitter = PathSplitter::new();
        assert_eq!(splitter.split(&long_path, ".").len(), 16);
        assert_eq!(splitter.split("a.b", ".").len(), 2);
        assert_eq!(splitter.spans().len(), 2);
        assert!(splitter.split("", ".").is_empty());
    }
}
