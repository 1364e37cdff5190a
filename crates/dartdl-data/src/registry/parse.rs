//! XML parsing for the registry snapshot.

use super::RegistryEntry;
use crate::error::{DataError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

#[derive(Debug, Clone, Copy)]
enum Field {
    CorpCode,
    CorpName,
    StockCode,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"corp_code" => Some(Self::CorpCode),
            b"corp_name" => Some(Self::CorpName),
            b"stock_code" => Some(Self::StockCode),
            _ => None,
        }
    }

    fn slot(self, entry: &mut RegistryEntry) -> &mut String {
        match self {
            Self::CorpCode => &mut entry.corp_code,
            Self::CorpName => &mut entry.corp_name,
            Self::StockCode => &mut entry.stock_code,
        }
    }
}

/// Parse the registry snapshot markup into entries, in document order.
///
/// Every `<list>` node becomes one entry. Child fields that are missing or
/// blank default to the empty string; unknown children are ignored.
///
/// # Errors
/// Returns [`DataError::XmlParse`] for malformed markup and
/// [`DataError::Parse`] if the document holds no `<list>` nodes at all.
///
/// # Example
/// ```
/// use dartdl_data::registry::parse_registry;
///
/// let xml = "<result><list><corp_code>00126380</corp_code>\
///            <corp_name>삼성전자</corp_name><stock_code>005930</stock_code></list></result>";
/// let entries = parse_registry(xml).unwrap();
/// assert_eq!(entries[0].corp_name, "삼성전자");
/// ```
pub fn parse_registry(xml: &str) -> Result<Vec<RegistryEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<RegistryEntry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                if name.as_ref() == b"list" {
                    current = Some(RegistryEntry::default());
                    field = None;
                } else {
                    field = Field::from_tag(name.as_ref());
                }
            }
            Event::Text(text) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    field.slot(entry).push_str(text.unescape()?.trim());
                }
            }
            Event::CData(data) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    let raw = data.into_inner();
                    field.slot(entry).push_str(String::from_utf8_lossy(&raw).trim());
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"list" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if entries.is_empty() {
        return Err(DataError::Parse(
            "registry snapshot contains no <list> entries".to_string(),
        ));
    }

    Ok(entries)
}

/// Extract an OpenDART `<status>`/`<message>` pair from an error body.
///
/// OpenDART reports key and quota problems with a small XML document and a
/// 200 status, so callers expecting binary content use this to tell an API
/// refusal apart from plain garbage.
pub fn parse_api_status(body: &str) -> Option<(String, String)> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut status = None;
    let mut message = None;
    let mut tag: Vec<u8> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => tag = e.name().as_ref().to_vec(),
            Ok(Event::Text(text)) => {
                let value = text.unescape().ok()?.trim().to_string();
                match tag.as_slice() {
                    b"status" => status = Some(value),
                    b"message" => message = Some(value),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => tag.clear(),
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }

    Some((status?, message.unwrap_or_default()))
}
