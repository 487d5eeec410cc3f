// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::{
    cell::RefCell,
    collections::HashMap,
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
    rc::Rc,
};

use crate::{
    parser::{
        BoundedStream, BoxContents, BoxHeader, DecodeOptions, DecodedBox, Error, FileType,
        InputSlice, JpegPlenoLightField, ParserRegistry, Signature, Thumbnail, TypedBox, Xml,
    },
    BoxType,
};

/// Smallest stream that can hold a signature box and a file type box.
pub const MINIMUM_FILE_SIZE: u64 = 20;

/// A plenoptic codestream found in a JPEG Pleno file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Codestream<R> {
    LightField(JpegPlenoLightField<R>),

    /// Point cloud payload, left in the source.
    PointCloud(InputSlice<R>),

    /// Hologram payload, left in the source.
    Hologram(InputSlice<R>),
}

/// A fully decoded and validated JPEG Pleno (JPL) file.
///
/// Construction decodes every top-level box of the source, checks the file
/// organization rules, and then sorts the decoded boxes into the fields
/// below. There is no partially decoded `JplFile`: any error aborts the
/// whole decode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JplFile<R> {
    signature: Option<Signature>,
    file_type: FileType,
    thumbnail: Option<Thumbnail<R>>,
    catalog: Option<Xml>,
    codestreams: Vec<Codestream<R>>,
    other_boxes: HashMap<BoxType, Vec<DecodedBox<R>>>,
    number_of_decoded_boxes: usize,
}

impl JplFile<BufReader<File>> {
    /// Open and decode the file at `path` with every known box parser and
    /// default [`DecodeOptions`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        let reader = Rc::new(RefCell::new(BufReader::new(file)));
        Self::from_reader(reader, &ParserRegistry::with_known_parsers())
    }
}

impl<R: Read + Seek> JplFile<R> {
    /// Decode everything from the source's current position to its end.
    pub fn from_reader(reader: Rc<RefCell<R>>, registry: &ParserRegistry<R>) -> Result<Self, Error> {
        Self::from_reader_with_options(reader, registry, &DecodeOptions::default())
    }

    /// Decode everything from the source's current position to its end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooSmallFile`] before reading any box if fewer than
    /// [`MINIMUM_FILE_SIZE`] bytes remain. Any error from a box header or box
    /// parser aborts the decode, as does a violation of the file
    /// organization rules (see [`Error::is_document_invariant`]).
    pub fn from_reader_with_options(
        reader: Rc<RefCell<R>>,
        registry: &ParserRegistry<R>,
        options: &DecodeOptions,
    ) -> Result<Self, Error> {
        let size = remaining_size(&reader)?;
        if size < MINIMUM_FILE_SIZE {
            return Err(Error::TooSmallFile(size));
        }

        let mut stream = BoundedStream::with_max_offset(reader, size)?;
        let decoded = DecodedBoxes::decode(&mut stream, registry, options)?;

        decoded.check_organization(options)?;
        Ok(decoded.assemble())
    }
}

impl<R> JplFile<R> {
    /// The JPEG Pleno signature box, if the file started with one.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn file_type(&self) -> &FileType {
        &self.file_type
    }

    /// The first thumbnail box, if any.
    pub fn thumbnail(&self) -> Option<&Thumbnail<R>> {
        self.thumbnail.as_ref()
    }

    /// The XML box holding the cataloging document, if any.
    pub fn catalog(&self) -> Option<&Xml> {
        self.catalog.as_ref()
    }

    /// Plenoptic codestreams in stream order.
    pub fn codestreams(&self) -> &[Codestream<R>] {
        &self.codestreams
    }

    /// Decoded boxes of type `tbox` in stream order.
    ///
    /// Only boxes that were not sorted into one of the accessors above are
    /// found here.
    pub fn boxes_of_type(&self, tbox: BoxType) -> &[DecodedBox<R>] {
        self.other_boxes
            .get(&tbox)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of top-level boxes decoded, including boxes of unknown type.
    pub fn number_of_decoded_boxes(&self) -> usize {
        self.number_of_decoded_boxes
    }
}

fn remaining_size<R: Seek>(reader: &Rc<RefCell<R>>) -> Result<u64, Error> {
    let mut source = reader.borrow_mut();
    let start = source.stream_position()?;
    let end = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(start))?;
    Ok(end.saturating_sub(start))
}

/// A decoded box and its ordinal index among the top-level boxes.
type Indexed<R> = (u64, DecodedBox<R>);

/// Every top-level box of a file, bucketed by box type.
struct DecodedBoxes<R> {
    signature: Option<Signature>,
    file_type: FileType,
    file_type_index: u64,
    buckets: HashMap<BoxType, Vec<Indexed<R>>>,
    count: u64,
}

impl<R: Read + Seek> DecodedBoxes<R> {
    fn decode(
        stream: &mut BoundedStream<R>,
        registry: &ParserRegistry<R>,
        options: &DecodeOptions,
    ) -> Result<Self, Error> {
        let mut buckets: HashMap<BoxType, Vec<Indexed<R>>> = HashMap::new();
        let mut count = 0;

        let first = BoxHeader::peek(stream)?.tbox;
        let signature = if first.is_signature() {
            if !registry.is_registered(first) {
                return Err(Error::NoParserRegistered(first));
            }

            let decoded = registry.parse_with_options(stream, options)?;
            let signature = Signature::from_contents(decoded.contents).ok_or(
                Error::WrongTypeCode {
                    found: first,
                    expected: BoxType::SIGNATURE,
                },
            )?;
            log::debug!("signature box {first} at 0");
            count += 1;
            Some(signature)
        } else {
            log::debug!("no signature box; decoding as a plain box stream");
            None
        };

        let mut file_type = None;
        while stream.is_valid() {
            let index = count;
            count += 1;

            if BoxHeader::peek(stream)?.is_a_box_with_id(BoxType::FILE_TYPE) {
                file_type = Some(registry.parse_as_with_options::<FileType>(stream, options)?);
                break;
            }

            let decoded = registry.parse_with_options(stream, options)?;
            log_box(index, &decoded);
            buckets.entry(decoded.tbox()).or_default().push((index, decoded));
        }

        let file_type = file_type.ok_or(Error::MissingFileTypeBox)?;
        let file_type_index = count - 1;

        if !file_type.is_compatible_with(BoxType::JPL_BRAND) {
            return Err(Error::IncompatibleBrand {
                brand: file_type.brand,
            });
        }

        log::debug!(
            "file type box at index {file_type_index}: brand {}, {} compatible brands",
            file_type.brand,
            file_type.compatibility_list.len()
        );

        while stream.is_valid() {
            let index = count;
            let decoded = registry.parse_with_options(stream, options)?;
            count += 1;

            if decoded.tbox() == BoxType::FILE_TYPE {
                return Err(Error::MoreThanOneFileTypeBox);
            }

            log_box(index, &decoded);
            buckets.entry(decoded.tbox()).or_default().push((index, decoded));
        }

        Ok(Self {
            signature,
            file_type,
            file_type_index,
            buckets,
            count,
        })
    }
}

fn log_box<R>(index: u64, decoded: &DecodedBox<R>) {
    if decoded.is_known() {
        log::debug!(
            "box {index}: {} at {}, {} bytes",
            decoded.tbox(),
            decoded.position(),
            decoded.header.length
        );
    } else {
        log::warn!(
            "box {index}: skipping {} at {}, no parser registered",
            decoded.tbox(),
            decoded.position()
        );
    }
}

fn tolerate(violation: Error, options: &DecodeOptions) -> Result<(), Error> {
    if options.lenient {
        log::warn!("ignoring file organization violation: {violation}");
        Ok(())
    } else {
        Err(violation)
    }
}

impl<R> DecodedBoxes<R> {
    fn indices_of(&self, tbox: BoxType) -> impl Iterator<Item = u64> + '_ {
        self.buckets
            .get(&tbox)
            .into_iter()
            .flatten()
            .map(|(index, _)| *index)
    }

    fn plenoptic_indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.buckets
            .iter()
            .filter(|(tbox, _)| tbox.is_plenoptic())
            .flat_map(|(_, boxes)| boxes.iter().map(|(index, _)| *index))
    }

    fn catalog_index(&self) -> Option<u64> {
        self.buckets
            .get(&BoxType::XML)
            .into_iter()
            .flatten()
            .filter(|(_, decoded)| is_catalog(decoded))
            .map(|(index, _)| *index)
            .max()
    }

    /// File organization rules, checked by ordinal box index.
    fn check_organization(&self, options: &DecodeOptions) -> Result<(), Error> {
        let first_plenoptic = self.plenoptic_indices().min();
        let last_plenoptic = self.plenoptic_indices().max();
        let plenoptic_count = self.plenoptic_indices().count() as u64;

        if let (Some(thumbnail), Some(first_plenoptic)) =
            (self.indices_of(BoxType::THUMBNAIL).max(), first_plenoptic)
        {
            if thumbnail > first_plenoptic {
                tolerate(
                    Error::ThumbnailAfterPlenopticData {
                        thumbnail,
                        first_plenoptic,
                    },
                    options,
                )?;
            }
        }

        if let Some(catalog) = self.catalog_index() {
            let after_plenoptic = first_plenoptic.is_some_and(|first| catalog > first);
            if catalog < self.file_type_index || after_plenoptic {
                tolerate(
                    Error::CatalogOutOfOrder {
                        catalog,
                        file_type: self.file_type_index,
                        first_plenoptic: first_plenoptic.unwrap_or(u64::MAX),
                    },
                    options,
                )?;
            }
        }

        if let (Some(first), Some(last)) = (first_plenoptic, last_plenoptic) {
            if last - first + 1 != plenoptic_count {
                tolerate(Error::BoxBetweenPlenopticBoxes { first, last }, options)?;
            }
        }

        Ok(())
    }

    fn assemble(mut self) -> JplFile<R> {
        let thumbnail = self.take_thumbnail();
        let catalog = self.take_catalog();
        let codestreams = self.take_codestreams();

        let other_boxes = self
            .buckets
            .into_iter()
            .map(|(tbox, boxes)| (tbox, boxes.into_iter().map(|(_, decoded)| decoded).collect()))
            .collect();

        JplFile {
            signature: self.signature,
            file_type: self.file_type,
            thumbnail,
            catalog,
            codestreams,
            other_boxes,
            number_of_decoded_boxes: self.count as usize,
        }
    }

    fn take_thumbnail(&mut self) -> Option<Thumbnail<R>> {
        let boxes = self.buckets.get_mut(&BoxType::THUMBNAIL)?;
        if boxes.len() > 1 {
            log::warn!(
                "found {} thumbnail boxes; using the first one",
                boxes.len()
            );
        }

        let at = boxes
            .iter()
            .position(|(_, decoded)| matches!(decoded.contents, BoxContents::Thumbnail(_)))?;

        match boxes.remove(at).1.contents {
            BoxContents::Thumbnail(thumbnail) => Some(thumbnail),
            _ => None,
        }
    }

    fn take_catalog(&mut self) -> Option<Xml> {
        let boxes = self.buckets.get_mut(&BoxType::XML)?;
        let at = boxes.iter().rposition(|(_, decoded)| is_catalog(decoded))?;

        match boxes.remove(at).1.contents {
            BoxContents::Xml(xml) => Some(xml),
            _ => None,
        }
    }

    fn take_codestreams(&mut self) -> Vec<Codestream<R>> {
        let mut plenoptic: Vec<Indexed<R>> = vec![];

        let plenoptic_types: Vec<BoxType> = self
            .buckets
            .keys()
            .copied()
            .filter(|tbox| tbox.is_plenoptic())
            .collect();

        for tbox in plenoptic_types {
            if let Some(boxes) = self.buckets.remove(&tbox) {
                plenoptic.extend(boxes);
            }
        }

        plenoptic.sort_by_key(|(index, _)| *index);

        let mut codestreams = vec![];
        for (index, decoded) in plenoptic {
            let tbox = decoded.tbox();
            match (tbox, decoded.contents) {
                (BoxType::LIGHT_FIELD, BoxContents::JpegPlenoLightField(jplf)) => {
                    codestreams.push(Codestream::LightField(jplf));
                }
                (BoxType::POINT_CLOUD, BoxContents::Unknown(payload)) => {
                    codestreams.push(Codestream::PointCloud(payload));
                }
                (BoxType::HOLOGRAM, BoxContents::Unknown(payload)) => {
                    codestreams.push(Codestream::Hologram(payload));
                }
                (_, contents) => {
                    log::debug!("box {index}: keeping {tbox} box outside the codestream list");
                    self.buckets.entry(tbox).or_default().push((
                        index,
                        DecodedBox {
                            header: decoded.header,
                            contents,
                        },
                    ));
                }
            }
        }

        codestreams
    }
}

fn is_catalog<R>(decoded: &DecodedBox<R>) -> bool {
    matches!(&decoded.contents, BoxContents::Xml(xml) if xml.is_catalog())
}
