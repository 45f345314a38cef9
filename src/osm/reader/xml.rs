// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::{from_utf8, FromStr};

use quick_xml::events::BytesStart;

use super::model;
use crate::Node;

pub(super) fn features_from_io<R: io::BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<model::Feature, quick_xml::Error>> {
    Reader::from_io(reader)
}

pub(super) fn features_from_buffer(
    b: &[u8],
) -> impl Iterator<Item = Result<model::Feature, quick_xml::Error>> + '_ {
    Reader::from_buffer(b)
}

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<quick_xml::events::Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<quick_xml::events::Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<quick_xml::events::Event<'b>> {
        self.0.read_event()
    }
}

/// Reader reads osm [Features](model::Feature) from an XML file.
struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self { parser, eof: false }
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<model::Feature, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        use quick_xml::events::Event;

        // Way currently being assembled from its child elements
        let mut way: Option<model::Way> = None;

        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            match event {
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"node" => {
                        if let Some(n) = parse_node(&e) {
                            return Some(Ok(model::Feature::Node(n)));
                        }
                    }
                    b"nd" => {
                        let ref_ = attr_value::<i64>(&e, b"ref").filter(|&r| r != 0);
                        if let (Some(w), Some(ref_)) = (way.as_mut(), ref_) {
                            w.nodes.push(ref_);
                        }
                    }
                    b"tag" => {
                        if let (Some(w), Some((k, v))) = (way.as_mut(), parse_tag(&e)) {
                            w.tags.insert(k, v);
                        }
                    }
                    _ => {}
                },

                Event::Start(e) => match e.local_name().as_ref() {
                    // Tags of nodes are not needed, so nodes with children
                    // are returned right away, just like self-closing ones.
                    b"node" => {
                        if let Some(n) = parse_node(&e) {
                            return Some(Ok(model::Feature::Node(n)));
                        }
                    }
                    b"way" => way = parse_way(&e),
                    // Relations (and their tags and members) are not needed for routing
                    b"relation" => way = None,
                    _ => {}
                },

                Event::End(e) if e.local_name().as_ref() == b"way" => {
                    if let Some(w) = way.take() {
                        return Some(Ok(model::Feature::Way(w)));
                    }
                }

                Event::Eof => self.eof = true,

                _ => {}
            }
        }

        way.map(|w| Ok(model::Feature::Way(w)))
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

/// Parses the value of the `key` attribute into `T`. Returns `None` if the attribute
/// is missing or can't be parsed.
fn attr_value<T: FromStr>(e: &BytesStart<'_>, key: &[u8]) -> Option<T> {
    let attr = e.try_get_attribute(key).ok()??;
    from_utf8(&attr.value).ok()?.trim().parse().ok()
}

fn parse_node(e: &BytesStart<'_>) -> Option<Node> {
    let id: i64 = attr_value(e, b"id").unwrap_or(0);
    let lat: f64 = attr_value(e, b"lat").unwrap_or(f64::NAN);
    let lon: f64 = attr_value(e, b"lon").unwrap_or(f64::NAN);

    if id != 0 && lat.is_finite() && lon.is_finite() {
        Some(Node { id, lat, lon })
    } else {
        log::debug!("skipping invalid node (id={}, lat={}, lon={})", id, lat, lon);
        None
    }
}

fn parse_way(e: &BytesStart<'_>) -> Option<model::Way> {
    match attr_value::<i64>(e, b"id") {
        Some(id) if id != 0 => Some(model::Way {
            id,
            nodes: Vec::default(),
            tags: HashMap::default(),
        }),
        _ => {
            log::debug!("skipping way without a valid id");
            None
        }
    }
}

fn parse_tag(e: &BytesStart<'_>) -> Option<(String, String)> {
    let k = unescaped_attr_value(e, b"k")?;
    let v = unescaped_attr_value(e, b"v").unwrap_or_default();
    Some((k, v))
}

fn unescaped_attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    let attr = e.try_get_attribute(key).ok()??;
    attr.unescape_value().ok().map(|v| v.into_owned())
}
