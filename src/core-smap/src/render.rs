//! Sitemap protocol XML: rendering URL records and index references, and reading them back.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

use crate::record::{SitemapRef, UrlRecord, format_timestamp};

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Renders a `<urlset>` document. Records are written in the order given.
pub fn render_sitemap(records: &[UrlRecord]) -> String {
    let mut xml = open_document("urlset");

    for record in records {
        xml.push_str("  <url>\n");
        push_element(&mut xml, "loc", record.location.as_str());
        if let Some(last_modified) = &record.last_modified {
            push_element(&mut xml, "lastmod", &format_timestamp(last_modified));
        }
        if let Some(change_frequency) = &record.change_frequency {
            push_element(&mut xml, "changefreq", change_frequency.as_str());
        }
        if let Some(priority) = &record.priority {
            push_element(&mut xml, "priority", &priority.to_string());
        }
        xml.push_str("  </url>\n");
    }

    close_document(xml, "urlset")
}

/// Renders a `<sitemapindex>` document. References are written in the order given.
pub fn render_sitemap_index(refs: &[SitemapRef]) -> String {
    let mut xml = open_document("sitemapindex");

    for sitemap in refs {
        xml.push_str("  <sitemap>\n");
        push_element(&mut xml, "loc", sitemap.location.as_str());
        push_element(&mut xml, "lastmod", &format_timestamp(&sitemap.last_modified));
        xml.push_str("  </sitemap>\n");
    }

    close_document(xml, "sitemapindex")
}

fn open_document(root: &str) -> String {
    format!("{}\n<{} xmlns=\"{}\">\n", XML_DECLARATION, root, SITEMAP_NAMESPACE)
}

fn close_document(mut xml: String, root: &str) -> String {
    xml.push_str(&format!("</{}>\n", root));
    xml
}

fn push_element(xml: &mut String, name: &str, text: &str) {
    xml.push_str(&format!("    <{name}>{}</{name}>\n", escape(text)));
}

/// One `<url>` or `<sitemap>` entry read back from a document, text unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

/// A sitemap or sitemap index read back from XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// `urlset` or `sitemapindex`.
    pub root: String,
    pub namespace: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Clone, Copy)]
enum Field {
    Loc,
    Lastmod,
    Changefreq,
    Priority,
}

/// Parses a `<urlset>` or `<sitemapindex>` document.
///
/// Entries without a `<loc>` are dropped. An empty document is valid.
pub fn parse_document(xml: &str) -> Result<ParsedDocument, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<String> = None;
    let mut namespace: Option<String> = None;
    let mut entries = Vec::new();
    let mut current: Option<ParsedEntry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if root.is_none() {
                    namespace = e
                        .try_get_attribute("xmlns")
                        .map_err(|e| format!("Invalid XML attribute: {}", e))?
                        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned());
                    root = Some(name);
                    continue;
                }
                match name.as_str() {
                    "url" | "sitemap" => current = Some(ParsedEntry::default()),
                    "loc" => field = Some(Field::Loc),
                    "lastmod" => field = Some(Field::Lastmod),
                    "changefreq" => field = Some(Field::Changefreq),
                    "priority" => field = Some(Field::Priority),
                    _ => field = None,
                }
            }
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map_err(|e| format!("Invalid XML text: {}", e))?
                    .into_owned();
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    match field {
                        Field::Loc => entry.loc = value,
                        Field::Lastmod => entry.lastmod = Some(value),
                        Field::Changefreq => entry.changefreq = Some(value),
                        Field::Priority => entry.priority = Some(value),
                    }
                }
            }
            Ok(Event::End(e)) => {
                field = None;
                if matches!(e.name().as_ref(), b"url" | b"sitemap")
                    && let Some(entry) = current.take()
                    && !entry.loc.is_empty()
                {
                    entries.push(entry);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parsing error: {}", e)),
            _ => {}
        }
    }

    let root = root.ok_or_else(|| "Document has no root element".to_string())?;
    Ok(ParsedDocument {
        root,
        namespace,
        entries,
    })
}
