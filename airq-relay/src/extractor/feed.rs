//! Syndication document reader
//!
//! Walks an RSS 2.0 / RSS 1.0 (RDF) / Atom document and returns its items in
//! document order with the three text fields the extractor needs. Markup
//! nested inside a field (unescaped HTML in a description) is flattened to
//! its text, one fragment per line.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::ExtractError;

/// Text fields of one feed item (RSS `<item>` or Atom `<entry>`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    PubDate,
}

impl Field {
    fn from_local_name(name: &str) -> Option<Field> {
        match name {
            "title" => Some(Field::Title),
            "description" | "summary" | "content" => Some(Field::Description),
            "pubDate" | "published" | "updated" | "date" => Some(Field::PubDate),
            _ => None,
        }
    }
}

/// Field currently being captured: which one, at what element depth
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

impl Capture {
    fn push(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(fragment);
    }
}

fn is_feed_root(name: &str) -> bool {
    matches!(name, "rss" | "RDF" | "feed")
}

fn local_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parse a feed document into its items
///
/// Fails with `MalformedDocument` when the text is not well-formed XML, has no
/// root element, its root is not a feed (`rss`, `rdf:RDF`, `feed`), or text
/// follows the root.
pub fn parse_feed_items(xml: &str) -> Result<Vec<FeedItem>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut depth: usize = 0;
    let mut saw_root = false;

    let mut current_item: Option<(FeedItem, usize)> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(e.local_name().as_ref());

                if depth == 0 {
                    if saw_root {
                        return Err(ExtractError::MalformedDocument(
                            "multiple root elements".to_string(),
                        ));
                    }
                    if !is_feed_root(&name) {
                        return Err(ExtractError::MalformedDocument(format!(
                            "unexpected root element <{}>",
                            name
                        )));
                    }
                    saw_root = true;
                }
                depth += 1;

                if capture.is_some() {
                    // Nested markup inside a captured field: keep collecting text
                    continue;
                }

                if name == "item" || name == "entry" {
                    current_item = Some((FeedItem::default(), depth));
                } else if let Some((_, item_depth)) = &current_item {
                    if depth == item_depth + 1 {
                        if let Some(field) = Field::from_local_name(&name) {
                            capture = Some(Capture {
                                field,
                                depth,
                                text: String::new(),
                            });
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    let name = local_name(e.local_name().as_ref());
                    if saw_root || !is_feed_root(&name) {
                        return Err(ExtractError::MalformedDocument(format!(
                            "unexpected root element <{}/>",
                            name
                        )));
                    }
                    saw_root = true;
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return Err(ExtractError::MalformedDocument(
                        "unbalanced end tag".to_string(),
                    ));
                }

                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let (Some(done), Some((item, _))) = (capture.take(), current_item.as_mut()) {
                        let text = done.text.trim().to_string();
                        let slot = match done.field {
                            Field::Title => &mut item.title,
                            Field::Description => &mut item.description,
                            Field::PubDate => &mut item.pub_date,
                        };
                        // First occurrence wins (Atom may carry both summary and content)
                        if slot.is_none() {
                            *slot = Some(text);
                        }
                    }
                } else if current_item.as_ref().is_some_and(|(_, d)| *d == depth) {
                    if let Some((item, _)) = current_item.take() {
                        items.push(item);
                    }
                }

                depth -= 1;
            }
            Ok(Event::Text(e)) => {
                if depth == 0 && saw_root && !e.iter().all(u8::is_ascii_whitespace) {
                    return Err(ExtractError::MalformedDocument(
                        "text after root element".to_string(),
                    ));
                }
                if let Some(capture) = capture.as_mut() {
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        // Unknown entities (e.g. HTML &nbsp;): keep the raw text
                        Err(_) => String::from_utf8_lossy(&e).into_owned(),
                    };
                    capture.push(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if depth == 0 && saw_root {
                    return Err(ExtractError::MalformedDocument(
                        "CDATA after root element".to_string(),
                    ));
                }
                if let Some(capture) = capture.as_mut() {
                    capture.push(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::MalformedDocument(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(ExtractError::MalformedDocument(
            "document has no root element".to_string(),
        ));
    }
    if depth != 0 {
        return Err(ExtractError::MalformedDocument(
            "unexpected end of document".to_string(),
        ));
    }

    Ok(items)
}
