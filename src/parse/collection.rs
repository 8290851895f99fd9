//! Collection API XML parser
//!
//! The collection endpoint answers with a document of repeated `<item>`
//! elements, each identified by an `objectid` attribute and optionally
//! carrying a `<stats><rating value="..."/></stats>` subtree. Only items
//! with a parseable, finite rating become records; everything else is
//! skipped item by item.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One rated game from a user's collection
#[derive(Debug, Clone, PartialEq)]
pub struct RatedItem {
    /// Remote object identifier of the game
    pub item_id: String,
    /// The owner's rating, always finite
    pub rating: f64,
    /// The user this record was collected from
    pub owner: String,
}

/// Parses a collection document into rated items.
///
/// A document with N items of which M carry a valid numeric rating yields
/// exactly M records. Items without a rating subtree, with a missing
/// `value` attribute, or with a non-numeric or non-finite value are
/// dropped one at a time. Malformed XML ends the scan early, keeping the
/// records collected so far; this function never fails.
pub fn parse_collection(xml: &[u8], owner: &str) -> Vec<RatedItem> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();

    // Parser position: the objectid of the open <item>, whether we are
    // inside its <stats>, and the first rating seen there.
    let mut current_item: Option<String> = None;
    let mut in_stats = false;
    let mut rating: Option<f64> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" if current_item.is_none() => {
                    current_item = attribute_value(&e, b"objectid");
                    in_stats = false;
                    rating = None;
                }
                b"stats" if current_item.is_some() => {
                    in_stats = true;
                }
                b"rating" if in_stats && rating.is_none() => {
                    rating = parse_rating_value(&e);
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"rating" if in_stats && rating.is_none() => {
                    rating = parse_rating_value(&e);
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"stats" => {
                    in_stats = false;
                }
                b"item" => {
                    if let (Some(item_id), Some(value)) = (current_item.take(), rating.take()) {
                        items.push(RatedItem {
                            item_id,
                            rating: value,
                            owner: owner.to_string(),
                        });
                    }
                    current_item = None;
                    in_stats = false;
                    rating = None;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            // Malformed markup: keep what parsed cleanly
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    items
}

/// Reads an attribute as a UTF-8 string, if present
fn attribute_value(element: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    element
        .try_get_attribute(name)
        .ok()
        .flatten()
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Parses a rating element's `value` attribute, accepting only finite numbers
fn parse_rating_value(element: &BytesStart<'_>) -> Option<f64> {
    attribute_value(element, b"value")
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|rating| rating.is_finite())
}
