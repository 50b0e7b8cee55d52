//! A streaming XML writer that counts its own nesting depth.
use std::fmt::Debug;
use std::io::{self, BufWriter, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::params::ParamLike;

use super::{ExportError, ExportResult};

const BUFFER_SIZE: usize = 10000;

macro_rules! bstart {
    ($e:tt) => {
        quick_xml::events::BytesStart::from_content($e, $e.len())
    };
}

macro_rules! attrib {
    ($name:expr, $value:expr, $elt:ident) => {
        $elt.push_attribute(($name, AsRef::<str>::as_ref(&$value)));
    };
}

pub(crate) use attrib;
pub(crate) use bstart;

/// The conventions a document renders vocabulary terms with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `cvRef` attributes naming entries of the document's `cvList`
    MzIdentML,
    /// `cvLabel` attributes naming entries of the `cvLookup` list
    Pride,
}

/// Writes XML events to a buffered stream, tracking how many elements are open.
///
/// Every attribute value and text node is escaped. [`XmlSink::element`] pairs
/// the start and end tags of a block. When the block fails, its end tag is
/// never written and the depth stays raised, which is how a cancelled document
/// can be told apart from a finished one.
pub struct XmlSink<W: Write> {
    handle: Writer<BufWriter<W>>,
    depth: usize,
    dialect: Dialect,
}

impl<W: Write> Debug for XmlSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlSink")
            .field("handle", &"...")
            .field("depth", &self.depth)
            .field("dialect", &self.dialect)
            .finish()
    }
}

impl<W: Write> XmlSink<W> {
    pub fn new(inner: W, dialect: Dialect) -> Self {
        let handle = BufWriter::with_capacity(BUFFER_SIZE, inner);
        Self {
            handle: Writer::new_with_indent(handle, b'\t', 1),
            depth: 0,
            dialect,
        }
    }

    /// The number of elements currently open
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn declaration(&mut self, encoding: &str) -> ExportResult {
        self.handle
            .write_event(Event::Decl(BytesDecl::new("1.0", Some(encoding), None)))?;
        Ok(())
    }

    pub fn start(&mut self, elt: BytesStart<'_>) -> ExportResult {
        self.handle.write_event(Event::Start(elt))?;
        self.depth += 1;
        Ok(())
    }

    pub fn end(&mut self, tag: &str) -> ExportResult {
        self.depth = match self.depth.checked_sub(1) {
            Some(depth) => depth,
            None => return Err(ExportError::UnbalancedDocument { depth: 0 }),
        };
        self.handle.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    /// Write a self-closing element
    pub fn empty(&mut self, elt: BytesStart<'_>) -> ExportResult {
        self.handle.write_event(Event::Empty(elt))?;
        Ok(())
    }

    /// Write an element containing only `text`
    pub fn text_element(&mut self, elt: BytesStart<'_>, text: &str) -> ExportResult {
        let end = elt.to_end().into_owned();
        self.handle.write_event(Event::Start(elt))?;
        self.handle.write_event(Event::Text(BytesText::new(text)))?;
        self.handle.write_event(Event::End(end))?;
        Ok(())
    }

    /// Write a bare `<tag>text</tag>` element
    pub fn simple(&mut self, tag: &str, text: &str) -> ExportResult {
        self.text_element(BytesStart::new(tag), text)
    }

    /// Open `elt`, let `body` write its content, then close it
    pub fn element<F>(&mut self, elt: BytesStart<'_>, body: F) -> ExportResult
    where
        F: FnOnce(&mut Self) -> ExportResult,
    {
        let end = elt.to_end().into_owned();
        self.start(elt)?;
        body(self)?;
        self.depth = match self.depth.checked_sub(1) {
            Some(depth) => depth,
            None => return Err(ExportError::UnbalancedDocument { depth: 0 }),
        };
        self.handle.write_event(Event::End(end))?;
        Ok(())
    }

    /// Write a vocabulary term in this sink's dialect
    pub fn cv_param<P: ParamLike>(&mut self, param: &P) -> ExportResult {
        let mut elt = bstart!("cvParam");
        if let Some(cv) = param.controlled_vocabulary() {
            match self.dialect {
                Dialect::MzIdentML => {
                    attrib!("cvRef", cv.mzidentml_ref(), elt);
                }
                Dialect::Pride => {
                    attrib!("cvLabel", cv.pride_label(), elt);
                }
            }
        }
        if let Some(curie) = param.curie() {
            attrib!("accession", curie, elt);
        }
        attrib!("name", param.name(), elt);
        if !param.value().is_empty() {
            attrib!("value", param.value(), elt);
        }
        if self.dialect == Dialect::MzIdentML {
            let unit = param.unit();
            if let Some(unit_cv) = unit.vocabulary() {
                let (unit_acc, unit_name) = unit.for_param();
                attrib!("unitCvRef", unit_cv.mzidentml_ref(), elt);
                attrib!("unitAccession", unit_acc, elt);
                attrib!("unitName", unit_name, elt);
            }
        }
        self.empty(elt)
    }

    /// Write a free-text parameter for a value without a vocabulary term
    pub fn user_param(&mut self, name: &str, value: Option<&str>) -> ExportResult {
        let mut elt = bstart!("userParam");
        attrib!("name", name, elt);
        if let Some(value) = value {
            attrib!("value", value, elt);
        }
        self.empty(elt)
    }

    /// Write `param` as a `cvParam` if it is controlled, otherwise as a `userParam`
    pub fn param<P: ParamLike>(&mut self, param: &P) -> ExportResult {
        if param.is_controlled() {
            self.cv_param(param)
        } else if param.value().is_empty() {
            self.user_param(param.name(), None)
        } else {
            self.user_param(param.name(), Some(param.value()))
        }
    }

    pub fn params<'p, P: ParamLike + 'p, I: IntoIterator<Item = &'p P>>(
        &mut self,
        params: I,
    ) -> ExportResult {
        for param in params {
            self.param(param)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.handle.get_mut().flush()
    }

    /// Flush buffered output and recover the wrapped stream
    pub fn into_inner(self) -> io::Result<W> {
        self.handle
            .into_inner()
            .into_inner()
            .map_err(|e| e.into_error())
    }
}
