//! Extension seams for concrete formats.
//!
//! A format crate plugs in at two points: a [`Parser`] that fills an arena
//! from source bytes, and a [`Helper`] that decodes escaped views and
//! serializes built trees back out.

use std::borrow::Cow;
use std::io::{Read, Write};

use crate::node::NodeRef;
use crate::view::Flags;
use crate::{Error, Result};

/// Format-specific decoding and serialization, shared by every arena it is
/// installed on.
pub trait Helper: Send + Sync {
    /// Turns raw viewed bytes into their logical form, e.g. resolving escape
    /// sequences when `flags` carries [`Flags::ESCAPE`].
    fn decode<'s>(&self, raw: &'s [u8], flags: Flags) -> Cow<'s, [u8]> {
        let _ = flags;
        Cow::Borrowed(raw)
    }

    fn beautify(&self, w: &mut dyn Write, node: NodeRef<'_>) -> Result<()> {
        let _ = (w, node);
        Err(Error::not_implemented("beautify"))
    }

    fn marshal(&self, w: &mut dyn Write, node: NodeRef<'_>) -> Result<()> {
        let _ = (w, node);
        Err(Error::not_implemented("marshal"))
    }
}

/// Grammar entry points. Implementors build nodes into an arena; the
/// defaults report `NotImplemented`.
pub trait Parser<'a> {
    fn parse(&mut self, source: &'a [u8]) -> Result<()> {
        let _ = source;
        Err(Error::not_implemented("parse"))
    }

    fn parse_copy(&mut self, source: &[u8]) -> Result<()> {
        let _ = source;
        Err(Error::not_implemented("parse_copy"))
    }

    fn parse_text(&mut self, source: &'a str) -> Result<()> {
        self.parse(source.as_bytes())
    }

    fn parse_copy_text(&mut self, source: &str) -> Result<()> {
        self.parse_copy(source.as_bytes())
    }

    fn parse_from_reader<R: Read>(&mut self, mut reader: R) -> Result<()>
    where
        Self: Sized,
    {
        let mut source = Vec::new();
        reader.read_to_end(&mut source)?;
        self.parse_copy(&source)
    }
}
