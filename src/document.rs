//! Dictionary document reassembly and formatting.
//!
//! Extracted entries are bare `<d:entry>` fragments; Apple's Dictionary
//! Development Kit sources wrap them in a single `<d:dictionary>` root
//! carrying the XHTML and DictionaryService namespaces. This module
//! rebuilds that document and optionally re-indents it.

use log::debug;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::error::{PeelError, Result};

/// XHTML namespace of the dictionary root element.
pub const XHTML_XMLNS: &str = "http://www.w3.org/1999/xhtml";

/// DictionaryService namespace of the dictionary root element.
pub const DICTIONARY_XMLNS: &str = "http://www.apple.com/DTDs/DictionaryService-1.0.rng";

/// Indentation used by [`prettify`], in spaces per nesting level.
const INDENT: usize = 2;

/// Wraps the extracted entries into a complete dictionary document.
///
/// The wrapper is a single line with no whitespace between entries, mirroring
/// the source layout the container was built from.
pub fn assemble(entries: &[String]) -> String {
    let payload: usize = entries.iter().map(String::len).sum();
    let mut document = String::with_capacity(payload + 160);
    document.push_str("<d:dictionary xmlns=\"");
    document.push_str(XHTML_XMLNS);
    document.push_str("\" xmlns:d=\"");
    document.push_str(DICTIONARY_XMLNS);
    document.push_str("\">");
    for entry in entries {
        document.push_str(entry);
    }
    document.push_str("</d:dictionary>");
    document
}

/// Re-indents a dictionary document for human consumption.
///
/// Streams events through a quick-xml reader/writer pair with 2-space
/// indentation. Whitespace-only text nodes are dropped so the indentation
/// comes out clean; all other content passes through untouched.
///
/// # Errors
/// [`PeelError::Xml`] if the document is not well-formed.
pub fn prettify(xml: &str) -> Result<String> {
    debug!("Prettifying {} bytes of XML", xml.len());
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Text(ref text)) if is_blank(text.as_ref()) => continue,
            Ok(event) => writer
                .write_event(event)
                .map_err(|e| PeelError::Xml(e.to_string()))?,
            Err(e) => return Err(PeelError::Xml(e.to_string())),
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

fn is_blank(text: &[u8]) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}
