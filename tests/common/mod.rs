#![allow(dead_code)]

use std::borrow::Cow;
use std::io::Write;
use std::sync::Arc;

use serde_json::{Map, Value};
use treevec::{
    Arena, ArenaOptions, ArenaParts, ByteView, Error, Flags, Helper, NodeId, NodeRef, NodeType,
    Parser, Result,
};

/// Minimal zero-copy JSON grammar over the engine. Keys starting with `@`
/// holding string values are stored as attribute nodes. Several top-level
/// values in one source become several roots.
pub struct JsonVector<'a> {
    pub arena: Arena<'a>,
}

impl<'a> JsonVector<'a> {
    pub fn new() -> Self {
        Self::with_options(ArenaOptions::default())
    }

    pub fn with_options(options: ArenaOptions) -> Self {
        let mut arena = Arena::with_options(options);
        arena.set_helper(Arc::new(JsonHelper));
        Self { arena }
    }

    pub fn with_parts(parts: ArenaParts) -> Self {
        Self {
            arena: Arena::with_parts(parts),
        }
    }

    pub fn into_parts(self) -> ArenaParts {
        self.arena.into_parts()
    }

    fn document(&mut self) -> Result<()> {
        let mark = self.arena.len();
        let result = self.roots();
        if result.is_err() {
            self.arena.forget_from(mark);
        }
        result
    }

    fn roots(&mut self) -> Result<()> {
        let mut pos = self.skip_ws(0);
        while pos < self.arena.source_len() {
            pos = self.value(pos, None, ByteView::EMPTY, false)?;
            pos = self.skip_ws(pos);
        }
        Ok(())
    }

    fn fail(&mut self, pos: usize) -> Error {
        self.arena.set_error_offset(pos);
        Error::internal("unexpected byte in json source")
    }

    fn skip_ws(&self, mut pos: usize) -> usize {
        while matches!(self.arena.source_at(pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            pos += 1;
        }
        pos
    }

    fn value(
        &mut self,
        pos: usize,
        parent: Option<NodeId>,
        key: ByteView,
        attribute: bool,
    ) -> Result<usize> {
        let pos = self.skip_ws(pos);
        let Some(byte) = self.arena.source_at(pos) else {
            return Err(self.fail(pos));
        };
        let kind = match byte {
            b'{' => NodeType::Object,
            b'[' => NodeType::Array,
            b'"' if attribute => NodeType::Attribute,
            b'"' => NodeType::String,
            b't' | b'f' => NodeType::Bool,
            b'n' => NodeType::Null,
            b'-' | b'0'..=b'9' => NodeType::Number,
            _ => return Err(self.fail(pos)),
        };
        let id = match parent {
            Some(parent) => self.arena.acquire_child_with_type(parent, kind)?,
            None => self.arena.acquire_node_with_type(0, kind),
        };
        let (value, end) = match kind {
            NodeType::Object => (ByteView::EMPTY, self.object(pos + 1, id)?),
            NodeType::Array => (ByteView::EMPTY, self.array(pos + 1, id)?),
            NodeType::String | NodeType::Attribute => self.string(pos)?,
            NodeType::Number => {
                let mut end = pos + 1;
                while matches!(
                    self.arena.source_at(end),
                    Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
                ) {
                    end += 1;
                }
                (self.arena.view_source(pos, end - pos), end)
            }
            _ => {
                let word: &[u8] = match byte {
                    b't' => b"true",
                    b'f' => b"false",
                    _ => b"null",
                };
                if !self.arena.source()[pos..].starts_with(word) {
                    return Err(self.fail(pos));
                }
                (self.arena.view_source(pos, word.len()), pos + word.len())
            }
        };
        if let Some(node) = self.arena.node_mut(id) {
            node.set_key(key).set_value(value);
        }
        Ok(end)
    }

    fn object(&mut self, pos: usize, id: NodeId) -> Result<usize> {
        let mut pos = self.skip_ws(pos);
        if self.arena.source_at(pos) == Some(b'}') {
            return Ok(pos + 1);
        }
        loop {
            pos = self.skip_ws(pos);
            if self.arena.source_at(pos) != Some(b'"') {
                return Err(self.fail(pos));
            }
            let (mut key, end) = self.string(pos)?;
            let attribute = self.arena.source_at(key.offset()) == Some(b'@') && key.len() > 1;
            if attribute {
                key = self
                    .arena
                    .view_source(key.offset() + 1, key.len() - 1)
                    .with_escape(key.check_flag(Flags::ESCAPE));
            }
            pos = self.skip_ws(end);
            if self.arena.source_at(pos) != Some(b':') {
                return Err(self.fail(pos));
            }
            pos = self.value(pos + 1, Some(id), key, attribute)?;
            pos = self.skip_ws(pos);
            match self.arena.source_at(pos) {
                Some(b',') => pos += 1,
                Some(b'}') => return Ok(pos + 1),
                _ => return Err(self.fail(pos)),
            }
        }
    }

    fn array(&mut self, pos: usize, id: NodeId) -> Result<usize> {
        let mut pos = self.skip_ws(pos);
        if self.arena.source_at(pos) == Some(b']') {
            return Ok(pos + 1);
        }
        loop {
            pos = self.value(pos, Some(id), ByteView::EMPTY, false)?;
            pos = self.skip_ws(pos);
            match self.arena.source_at(pos) {
                Some(b',') => pos += 1,
                Some(b']') => return Ok(pos + 1),
                _ => return Err(self.fail(pos)),
            }
        }
    }

    /// `pos` sits on the opening quote. Returns the view between the quotes
    /// and the position after the closing one.
    fn string(&mut self, pos: usize) -> Result<(ByteView, usize)> {
        let start = pos + 1;
        let mut end = start;
        let mut escaped = false;
        loop {
            match self.arena.source_at(end) {
                Some(b'"') => break,
                Some(b'\\') => {
                    escaped = true;
                    end += 2;
                }
                Some(_) => end += 1,
                None => return Err(self.fail(end)),
            }
        }
        let view = self.arena.view_source(start, end - start).with_escape(escaped);
        Ok((view, end + 1))
    }
}

impl<'a> Parser<'a> for JsonVector<'a> {
    fn parse(&mut self, source: &'a [u8]) -> Result<()> {
        self.arena.reset();
        self.arena.set_source(source)?;
        self.document()
    }

    fn parse_copy(&mut self, source: &[u8]) -> Result<()> {
        self.arena.reset();
        self.arena.set_source_copy(source)?;
        self.document()
    }
}

/// Unescapes flagged views and serializes trees with `serde_json`.
pub struct JsonHelper;

impl Helper for JsonHelper {
    fn decode<'s>(&self, raw: &'s [u8], flags: Flags) -> Cow<'s, [u8]> {
        if !flags.check(Flags::ESCAPE) {
            return Cow::Borrowed(raw);
        }
        let mut quoted = Vec::with_capacity(raw.len() + 2);
        quoted.push(b'"');
        quoted.extend_from_slice(raw);
        quoted.push(b'"');
        match serde_json::from_slice::<String>(&quoted) {
            Ok(text) => Cow::Owned(text.into_bytes()),
            Err(_) => Cow::Borrowed(raw),
        }
    }

    fn beautify(&self, w: &mut dyn Write, node: NodeRef<'_>) -> Result<()> {
        serde_json::to_writer_pretty(w, &to_value(node)).map_err(std::io::Error::from)?;
        Ok(())
    }

    fn marshal(&self, w: &mut dyn Write, node: NodeRef<'_>) -> Result<()> {
        serde_json::to_writer(w, &to_value(node)).map_err(std::io::Error::from)?;
        Ok(())
    }
}

pub fn to_value(node: NodeRef<'_>) -> Value {
    let node = node.resolve();
    match node.kind() {
        NodeType::Object => Value::Object(
            node.children()
                .map(|child| {
                    let key = match child.kind() {
                        NodeType::Attribute => format!("@{}", child.key_text()),
                        _ => child.key_text().into_owned(),
                    };
                    (key, to_value(child))
                })
                .collect::<Map<String, Value>>(),
        ),
        NodeType::Array => Value::Array(node.children().map(to_value).collect()),
        NodeType::String | NodeType::Attribute => Value::String(node.value_text().into_owned()),
        NodeType::Number => {
            serde_json::from_slice(node.value().raw_bytes(node.arena())).unwrap_or(Value::Null)
        }
        NodeType::Bool => Value::Bool(node.bool().unwrap_or(false)),
        _ => Value::Null,
    }
}

pub fn parse(source: &[u8]) -> JsonVector<'_> {
    let mut json = JsonVector::new();
    json.parse(source).expect("fixture parses");
    json
}
