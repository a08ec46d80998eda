//! Zero-copy views over arena-owned memory.
//!
//! A [`ByteView`] never owns the bytes it describes. It records which arena
//! buffer it points into (the installed source or the scratch buffer) plus an
//! offset and a length, and is resolved against an [`Arena`] on read.

use std::borrow::Cow;

use crate::arena::Arena;

/// Fixed-width, position-addressed bit set carried by every view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    /// Set when the viewed bytes still contain escape sequences.
    pub const ESCAPE: u8 = 0;
    /// First position free for format-specific use.
    pub const USER: u8 = 1;
    pub const WIDTH: u8 = 8;

    pub const fn empty() -> Self {
        Flags(0)
    }

    pub fn set(&mut self, pos: u8, value: bool) {
        if pos >= Self::WIDTH {
            return;
        }
        if value {
            self.0 |= 1 << pos;
        } else {
            self.0 &= !(1 << pos);
        }
    }

    pub fn check(self, pos: u8) -> bool {
        pos < Self::WIDTH && self.0 & (1 << pos) != 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) enum Base {
    #[default]
    Empty,
    Source,
    Buffer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    base: Base,
    offset: usize,
    len: usize,
    flags: Flags,
}

impl ByteView {
    pub const EMPTY: ByteView = ByteView {
        base: Base::Empty,
        offset: 0,
        len: 0,
        flags: Flags::empty(),
    };

    pub(crate) fn new(base: Base, offset: usize, len: usize) -> Self {
        Self {
            base,
            offset,
            len,
            flags: Flags::empty(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the view points into the installed source.
    pub fn is_source(&self) -> bool {
        self.base == Base::Source
    }

    /// True when the view points into the arena scratch buffer.
    pub fn is_buffered(&self) -> bool {
        self.base == Base::Buffer
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn set_flag(&mut self, pos: u8, value: bool) -> &mut Self {
        self.flags.set(pos, value);
        self
    }

    pub fn check_flag(&self, pos: u8) -> bool {
        self.flags.check(pos)
    }

    /// Shortcut for flagging escape sequences in the viewed bytes.
    pub fn with_escape(mut self, escaped: bool) -> Self {
        self.flags.set(Flags::ESCAPE, escaped);
        self
    }

    /// Viewed bytes exactly as stored, bypassing the helper.
    pub fn raw_bytes<'s>(&self, arena: &'s Arena<'_>) -> &'s [u8] {
        let backing = match self.base {
            Base::Empty => return &[],
            Base::Source => arena.source(),
            Base::Buffer => arena.buf(),
        };
        self.offset
            .checked_add(self.len)
            .and_then(|end| backing.get(self.offset..end))
            .unwrap_or(&[])
    }

    pub fn raw_text<'s>(&self, arena: &'s Arena<'_>) -> Cow<'s, str> {
        String::from_utf8_lossy(self.raw_bytes(arena))
    }

    /// Viewed bytes after the arena helper's decode step, if one is installed.
    pub fn bytes<'s>(&self, arena: &'s Arena<'_>) -> Cow<'s, [u8]> {
        let raw = self.raw_bytes(arena);
        match arena.helper() {
            Some(helper) => helper.decode(raw, self.flags),
            None => Cow::Borrowed(raw),
        }
    }

    pub fn text<'s>(&self, arena: &'s Arena<'_>) -> Cow<'s, str> {
        match self.bytes(arena) {
            Cow::Borrowed(raw) => String::from_utf8_lossy(raw),
            Cow::Owned(decoded) => match String::from_utf8(decoded) {
                Ok(text) => Cow::Owned(text),
                Err(err) => Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned()),
            },
        }
    }

    pub fn reset(&mut self) {
        *self = ByteView::EMPTY;
    }
}
