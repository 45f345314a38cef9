// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use graph_builder::GraphBuilder;

use crate::directions::MetadataTable;
use crate::osm::Profile;
use crate::Graph;

mod graph_builder;
mod model;
mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format of a file from its first few bytes.
    /// Returns [FileFormat::Unknown] if the data doesn't look like any supported format.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&[0x1F, 0x8B]) {
            return Self::XmlGz;
        }

        if head.starts_with(b"BZh") {
            return Self::XmlBz2;
        }

        let text = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
        match text.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'<') => Self::Xml,
            _ => Self::Unknown,
        }
    }
}

/// Additional controls for interpreting OSM data as a routing [Graph].
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    /// How OSM features should be interpreted and converted into a [Graph].
    pub profile: &'a Profile<'a>,

    /// Format of the input data. [FileFormat::Unknown] sniffs the format from the first bytes.
    pub file_format: FileFormat,

    /// Filter features by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite.
    pub bbox: [f64; 4],
}

impl<'a> Options<'a> {
    /// Options loading the whole file with the given profile and automatic format detection.
    pub fn new(profile: &'a Profile<'a>) -> Self {
        Self {
            profile,
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
        }
    }
}

/// A street network loaded from OSM data: the routing [Graph]
/// and names and lengths of its edges, used for narrating directions.
#[derive(Debug, Default)]
pub struct Network {
    pub graph: Graph,
    pub metadata: MetadataTable,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unsupported file format (expected OSM XML, optionally gzip or bzip2 compressed)")]
    UnsupportedFormat,
}

/// Parse OSM features from a reader into a [Network] as per the provided [Options].
///
/// The provided stream is always wrapped in a buffered reader.
pub fn load_io<R: io::Read>(options: &Options<'_>, reader: R) -> Result<Network, Error> {
    let mut b = io::BufReader::new(reader);
    let file_format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(b.fill_buf()?),
        f => f,
    };

    let mut network = Network::default();
    {
        let mut builder = GraphBuilder::new(&mut network.graph, &mut network.metadata, options);
        match file_format {
            FileFormat::Unknown => return Err(Error::UnsupportedFormat),

            FileFormat::Xml => builder.add_features(xml::features_from_io(b))?,

            FileFormat::XmlGz => {
                let d = flate2::read::MultiGzDecoder::new(b);
                builder.add_features(xml::features_from_io(io::BufReader::new(d)))?;
            }

            FileFormat::XmlBz2 => {
                let d = bzip2::read::MultiBzDecoder::new(b);
                builder.add_features(xml::features_from_io(io::BufReader::new(d)))?;
            }
        }
    }

    log::info!(
        "loaded {} nodes and {} edges using the {} profile",
        network.graph.len(),
        network.graph.edge_count(),
        options.profile.name,
    );
    Ok(network)
}

/// Parse OSM features from a file at the provided path into a [Network] as per the provided [Options].
pub fn load_file<P: AsRef<Path>>(options: &Options<'_>, path: P) -> Result<Network, Error> {
    log::debug!("loading {}", path.as_ref().display());
    let f = File::open(path)?;
    load_io(options, f)
}

/// Parse OSM features from an in-memory buffer into a [Network] as per the provided [Options].
pub fn load_buffer(options: &Options<'_>, data: &[u8]) -> Result<Network, Error> {
    let file_format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        f => f,
    };

    if file_format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        let mut network = Network::default();
        GraphBuilder::new(&mut network.graph, &mut network.metadata, options)
            .add_features(xml::features_from_buffer(data))?;
        Ok(network)
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let options = Options {
            file_format,
            ..*options
        };
        load_io(&options, io::Cursor::new(data))
    }
}
