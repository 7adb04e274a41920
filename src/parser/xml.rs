//! Event-driven tree construction on top of `quick-xml`.

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;

use super::ParseOptions;
use crate::error::{ParseError, SourceLocation};
use crate::tree::{Document, NodeId, NodeKind};

/// Builds a `Document` from the events of a `quick-xml` reader.
pub(super) struct TreeBuilder<'a> {
    input: &'a str,
    reader: Reader<&'a [u8]>,
    options: &'a ParseOptions,
    doc: Document,
    /// Open elements, innermost last.
    stack: Vec<NodeId>,
}

impl<'a> TreeBuilder<'a> {
    pub(super) fn new(input: &'a str, options: &'a ParseOptions) -> Self {
        let mut reader = Reader::from_str(input);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = true;
        Self {
            input,
            reader,
            options,
            doc: Document::new(),
            stack: Vec::new(),
        }
    }

    pub(super) fn build(mut self) -> Result<Document, ParseError> {
        loop {
            #[allow(clippy::cast_possible_truncation)]
            let event_start = self.reader.buffer_position() as usize;
            match self.reader.read_event() {
                Ok(Event::Decl(decl)) => self.handle_decl(&decl),
                Ok(Event::Start(e)) => {
                    let id = self.open_element(&e, event_start)?;
                    self.stack.push(id);
                }
                Ok(Event::Empty(e)) => {
                    self.open_element(&e, event_start)?;
                }
                Ok(Event::End(_)) => {
                    self.stack.pop();
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| self.error(format!("invalid text: {err}"), event_start))?;
                    self.handle_text(text, event_start)?;
                }
                Ok(Event::CData(e)) => {
                    let content = String::from_utf8_lossy(&e).into_owned();
                    self.attach(NodeKind::CData { content });
                }
                Ok(Event::Comment(e)) => {
                    let content = String::from_utf8_lossy(&e).into_owned();
                    self.attach(NodeKind::Comment { content });
                }
                Ok(Event::PI(e)) => {
                    let target = String::from_utf8_lossy(e.target()).into_owned();
                    let data = String::from_utf8_lossy(e.content()).trim().to_string();
                    let data = (!data.is_empty()).then_some(data);
                    self.attach(NodeKind::ProcessingInstruction { target, data });
                }
                Ok(Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(err) => {
                    #[allow(clippy::cast_possible_truncation)]
                    let pos = self.reader.error_position() as usize;
                    return Err(self.error(err.to_string(), pos));
                }
            }
        }

        if let Some(&open) = self.stack.last() {
            let name = self.doc.node_name(open).unwrap_or_default().to_string();
            return Err(self.error(
                format!("unexpected end of input: <{name}> is not closed"),
                self.input.len(),
            ));
        }
        if self.doc.root_element().is_none() {
            return Err(self.error("document has no root element", self.input.len()));
        }
        Ok(self.doc)
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::new(message, SourceLocation::from_offset(self.input, offset))
    }

    fn handle_decl(&mut self, decl: &BytesDecl<'_>) {
        fn lossy(value: Cow<'_, [u8]>) -> String {
            String::from_utf8_lossy(&value).into_owned()
        }
        self.doc.version = decl.version().ok().map(lossy);
        self.doc.encoding = decl.encoding().and_then(Result::ok).map(lossy);
        self.doc.standalone = decl
            .standalone()
            .and_then(Result::ok)
            .map(|value| value.as_ref() == b"yes");
    }

    fn open_element(&mut self, e: &BytesStart<'_>, offset: usize) -> Result<NodeId, ParseError> {
        let depth = self.stack.len() + 1;
        if depth > self.options.max_depth as usize {
            return Err(self.error(
                format!("maximum nesting depth {} exceeded", self.options.max_depth),
                offset,
            ));
        }
        if self.stack.is_empty() && self.doc.root_element().is_some() {
            return Err(self.error("content after the root element", offset));
        }

        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let id = self.doc.create_element(&name);
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.error(format!("attribute error: {err}"), offset))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| self.error(format!("invalid value for `{key}`: {err}"), offset))?;
            self.doc.set_attribute(id, &key, &value);
        }
        let parent = self.current_parent();
        self.doc.append_child(parent, id);
        Ok(id)
    }

    fn handle_text(&mut self, text: Cow<'_, str>, offset: usize) -> Result<(), ParseError> {
        let blank = text.trim().is_empty();
        if self.stack.is_empty() {
            // Whitespace between prolog items and after the root is allowed.
            if blank {
                return Ok(());
            }
            return Err(self.error("text outside the root element", offset));
        }
        if blank && self.options.no_blanks {
            return Ok(());
        }
        self.attach(NodeKind::text(text));
        Ok(())
    }

    fn attach(&mut self, kind: NodeKind) {
        let parent = self.current_parent();
        let id = self.doc.create_node(kind);
        self.doc.append_child(parent, id);
    }

    fn current_parent(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.doc.root())
    }
}
