//! Scratch-buffer writes and view construction.

use crate::view::{Base, ByteView};

use super::Arena;

impl Arena<'_> {
    pub fn buf(&self) -> &[u8] {
        &self.buf
    }

    pub fn buf_len(&self) -> usize {
        self.buf.len()
    }

    /// Appends `bytes` to the scratch buffer and returns a view over the copy.
    pub fn bufferize(&mut self, bytes: &[u8]) -> ByteView {
        let offset = self.buf.len();
        self.buf.extend_from_slice(bytes);
        ByteView::new(Base::Buffer, offset, bytes.len())
    }

    pub fn bufferize_text(&mut self, text: &str) -> ByteView {
        self.bufferize(text.as_bytes())
    }

    pub fn bufferize_byte(&mut self, byte: u8) -> ByteView {
        self.bufferize(&[byte])
    }

    pub fn bufferize_int(&mut self, value: i64) -> ByteView {
        let mut fmt = itoa::Buffer::new();
        let text = fmt.format(value);
        self.bufferize(text.as_bytes())
    }

    pub fn bufferize_uint(&mut self, value: u64) -> ByteView {
        let mut fmt = itoa::Buffer::new();
        let text = fmt.format(value);
        self.bufferize(text.as_bytes())
    }

    /// Shortest round-tripping decimal form; non-finite values render as
    /// `NaN`, `inf` or `-inf`.
    pub fn bufferize_float(&mut self, value: f64) -> ByteView {
        let mut fmt = ryu::Buffer::new();
        let text = fmt.format(value);
        self.bufferize(text.as_bytes())
    }

    /// View over `source[offset..offset + len]`, clamped to the source.
    pub fn view_source(&self, offset: usize, len: usize) -> ByteView {
        let total = self.source_len();
        let offset = offset.min(total);
        let len = len.min(total - offset);
        ByteView::new(Base::Source, offset, len)
    }

    /// Builds a view over `bytes` without copying, provided `bytes` is a
    /// sub-slice of the installed source or of the scratch buffer.
    pub fn take_from(&self, bytes: &[u8]) -> Option<ByteView> {
        if let Some(offset) = sub_offset(self.source(), bytes) {
            return Some(ByteView::new(Base::Source, offset, bytes.len()));
        }
        sub_offset(&self.buf, bytes).map(|offset| ByteView::new(Base::Buffer, offset, bytes.len()))
    }

    pub fn take_from_text(&self, text: &str) -> Option<ByteView> {
        self.take_from(text.as_bytes())
    }
}

fn sub_offset(outer: &[u8], inner: &[u8]) -> Option<usize> {
    let outer_lo = outer.as_ptr() as usize;
    let inner_lo = inner.as_ptr() as usize;
    let offset = inner_lo.checked_sub(outer_lo)?;
    let end = offset.checked_add(inner.len())?;
    (end <= outer.len()).then_some(offset)
}

#[cfg(test)]
mod tests {
    use crate::Arena;

    #[rstest::rstest]
    #[case(0, "0")]
    #[case(-42, "-42")]
    #[case(i64::MAX, "9223372036854775807")]
    fn test_bufferize_int(#[case] value: i64, #[case] expected: &str) {
        let mut arena = Arena::new();
        let view = arena.bufferize_int(value);
        assert_eq!(view.raw_text(&arena), expected);
    }

    #[rstest::rstest]
    #[case(1.5, "1.5")]
    #[case(0.1, "0.1")]
    #[case(-3.0, "-3.0")]
    fn test_bufferize_float(#[case] value: f64, #[case] expected: &str) {
        let mut arena = Arena::new();
        let view = arena.bufferize_float(value);
        assert_eq!(view.raw_text(&arena), expected);
    }

    #[rstest::rstest]
    fn test_buffered_views_append() {
        let mut arena = Arena::new();
        let a = arena.bufferize_uint(7);
        let b = arena.bufferize_byte(b'x');
        let c = arena.bufferize_text("yz");
        assert_eq!(arena.buf(), b"7xyz");
        assert_eq!(arena.buf_len(), 4);
        assert_eq!((a.offset(), b.offset(), c.offset()), (0, 1, 2));
        assert_eq!(c.raw_bytes(&arena), b"yz");
    }

    #[rstest::rstest]
    fn test_view_source_clamps() {
        let mut arena = Arena::new();
        arena.set_source(b"abcdef").unwrap();
        assert_eq!(arena.view_source(2, 3).raw_bytes(&arena), b"cde");
        assert_eq!(arena.view_source(4, 10).raw_bytes(&arena), b"ef");
        assert!(arena.view_source(10, 1).is_empty());
    }

    #[rstest::rstest]
    fn test_take_from_rejects_foreign_bytes() {
        let source = b"inside";
        let foreign = b"inside".to_vec();
        let mut arena = Arena::new();
        arena.set_source(source).unwrap();
        assert!(arena.take_from(&foreign).is_none());
        let view = arena.take_from(&source[2..4]).unwrap();
        assert_eq!((view.offset(), view.len()), (2, 2));
    }

    #[rstest::rstest]
    fn test_take_from_copied_source_and_buffer() {
        let mut arena = Arena::new();
        arena.set_source_copy(b"owned text").unwrap();
        let tail = &arena.source()[6..];
        let view = arena.take_from(tail).unwrap();
        assert!(view.is_source());
        assert_eq!(view.raw_text(&arena), "text");

        arena.bufferize_text("scratch");
        let inner = &arena.buf()[3..];
        let view = arena.take_from(inner).unwrap();
        assert!(view.is_buffered());
        assert_eq!(view.raw_text(&arena), "atch");
    }
}
