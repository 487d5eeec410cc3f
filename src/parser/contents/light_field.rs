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

use std::io::{Read, Seek};

use nom::{
    combinator::map,
    number::complete::{be_u16, be_u32, be_u8},
    sequence::tuple,
    IResult,
};

use crate::{
    parser::{
        BitsPerComponent, BoxContents, BoxParserHelper, ChannelDefinition, ColourSpecification,
        ContiguousCodestream, Error, ParserRegistry,
    },
    BoxType,
};

/// JPEG Pleno profile and level box (`jplv`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProfileAndLevel {
    /// Profile (`Ppih`).
    pub profile: u16,

    /// Level (`Plev`).
    pub level: u16,
}

/// Light field header box (`lhdr`).
///
/// The light field is a grid of `rows` x `columns` views, each `height` x
/// `width` samples.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LightFieldHeader {
    /// Number of view rows (`T`).
    pub rows: u32,

    /// Number of view columns (`S`).
    pub columns: u32,

    /// View height in samples (`V`).
    pub height: u32,

    /// View width in samples (`U`).
    pub width: u32,

    /// Number of components (`NC`).
    pub components: u16,

    /// Bits per component (`BPC`), encoded as in [`BitsPerComponent`].
    pub bits_per_component: u8,

    /// Compression type (`C`).
    pub coding_type: CodingType,

    /// Colourspace unknown (`UnkC`).
    pub colour_space_unknown: bool,

    /// Intellectual property (`IPR`).
    pub has_intellectual_property: bool,
}

/// Light field compression type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CodingType {
    /// 4D transform mode.
    Transform,

    /// 4D prediction mode.
    Prediction,

    Other(u8),
}

impl From<u8> for CodingType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Transform,
            1 => Self::Prediction,
            other => Self::Other(other),
        }
    }
}

/// JPEG Pleno light field header box (`jplh`).
///
/// A super box holding the light field header, optional bits per component
/// and channel definition boxes, and one or more colour specifications.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JpegPlenoLightFieldHeader {
    pub light_field_header: LightFieldHeader,
    pub bits_per_component: Option<BitsPerComponent>,
    pub colour_specifications: Vec<ColourSpecification>,
    pub channel_definition: Option<ChannelDefinition>,
}

/// JPEG Pleno light field box (`jplf`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JpegPlenoLightField<R> {
    pub profile_and_level: ProfileAndLevel,
    pub header: JpegPlenoLightFieldHeader,

    /// Codestream, if it is carried in a contiguous codestream box.
    pub codestream: Option<ContiguousCodestream<R>>,
}

fn profile_and_level_fields(i: &[u8]) -> IResult<&[u8], ProfileAndLevel> {
    map(tuple((be_u16, be_u16)), |(profile, level)| ProfileAndLevel {
        profile,
        level,
    })(i)
}

fn light_field_header_fields(i: &[u8]) -> IResult<&[u8], LightFieldHeader> {
    map(
        tuple((
            be_u32, be_u32, be_u32, be_u32, be_u16, be_u8, be_u8, be_u8, be_u8,
        )),
        |(rows, columns, height, width, components, bits_per_component, c, unkc, ipr)| {
            LightFieldHeader {
                rows,
                columns,
                height,
                width,
                components,
                bits_per_component,
                coding_type: CodingType::from(c),
                colour_space_unknown: unkc != 0,
                has_intellectual_property: ipr != 0,
            }
        },
    )(i)
}

pub(crate) fn parse_jplv<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    _registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    helper
        .parse_payload(profile_and_level_fields)
        .map(BoxContents::ProfileAndLevel)
}

pub(crate) fn parse_lhdr<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    _registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    helper
        .parse_payload(light_field_header_fields)
        .map(BoxContents::LightFieldHeader)
}

pub(crate) fn parse_jplh<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    let light_field_header = registry.parse_child_as::<LightFieldHeader>(helper)?;

    let mut bits_per_component = None;
    let mut colour_specifications = vec![];
    let mut channel_definition = None;

    while helper.has_data_available() {
        let child = registry.parse_child(helper)?;
        match child.contents {
            BoxContents::BitsPerComponent(bpcc) if bits_per_component.is_none() => {
                bits_per_component = Some(bpcc);
            }
            BoxContents::ColourSpecification(colr) => colour_specifications.push(colr),
            BoxContents::ChannelDefinition(cdef) if channel_definition.is_none() => {
                channel_definition = Some(cdef);
            }
            _ => log::warn!(
                "ignoring {} box at {} inside light field header box",
                child.header.tbox,
                child.header.position
            ),
        }
    }

    if colour_specifications.is_empty() {
        return Err(Error::MissingColourSpecification(BoxType::LIGHT_FIELD_HEADER));
    }

    Ok(BoxContents::JpegPlenoLightFieldHeader(
        JpegPlenoLightFieldHeader {
            light_field_header,
            bits_per_component,
            colour_specifications,
            channel_definition,
        },
    ))
}

pub(crate) fn parse_jplf<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    let profile_and_level = registry.parse_child_as::<ProfileAndLevel>(helper)?;
    let header = registry.parse_child_as::<JpegPlenoLightFieldHeader>(helper)?;

    let mut codestream = None;

    while helper.has_data_available() {
        let child = registry.parse_child(helper)?;
        match child.contents {
            BoxContents::ContiguousCodestream(jp2c) if codestream.is_none() => {
                codestream = Some(jp2c);
            }
            _ => log::debug!(
                "skipping {} box at {} inside light field box",
                child.header.tbox,
                child.header.position
            ),
        }
    }

    Ok(BoxContents::JpegPlenoLightField(JpegPlenoLightField {
        profile_and_level,
        header,
        codestream,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use std::{cell::RefCell, io::Cursor, rc::Rc};

    use hex_literal::hex;
    use pretty_assertions_sorted::assert_eq;

    use super::*;
    use crate::parser::{
        BoundedStream, BoxData, ColourSpace, DecodeOptions, EnumeratedColourSpace, TypedBox,
    };

    type Source = Cursor<Vec<u8>>;

    fn stream_over(data: &[u8]) -> BoundedStream<Source> {
        let reader = Rc::new(RefCell::new(Cursor::new(data.to_vec())));
        BoundedStream::new(reader, 0, data.len() as u64).unwrap()
    }

    fn parse_boxes<T: TypedBox<Source>>(data: &[u8]) -> Result<T, Error> {
        let registry = ParserRegistry::with_known_parsers();
        registry.parse_as::<T>(&mut stream_over(data))
    }

    const SRGB: ColourSpecification = ColourSpecification {
        method: 1,
        precedence: 0,
        approximation: 0,
        colour_space: ColourSpace::Enumerated(EnumeratedColourSpace::Srgb),
    };

    const LIGHT_FIELD_HEADER: LightFieldHeader = LightFieldHeader {
        rows: 13,
        columns: 13,
        height: 434,
        width: 625,
        components: 3,
        bits_per_component: 10,
        coding_type: CodingType::Transform,
        colour_space_unknown: false,
        has_intellectual_property: false,
    };

    #[test]
    fn light_field_header() {
        let boxes = hex!(
            "0000001e" // box size
            "6c686472" // box type = 'lhdr'
            "0000000d" // T (rows)
            "0000000d" // S (columns)
            "000001b2" // V (height)
            "00000271" // U (width)
            "0003" // NC
            "0a" // BPC
            "00" // C = transform
            "00" // UnkC
            "00" // IPR
        );

        assert_eq!(
            parse_boxes::<LightFieldHeader>(&boxes).unwrap(),
            LIGHT_FIELD_HEADER
        );
    }

    #[test]
    fn light_field_header_flags() {
        let boxes = hex!(
            "0000001e" // box size
            "6c686472" // box type = 'lhdr'
            "00000001" "00000002" "00000003" "00000004" // T, S, V, U
            "0001" // NC
            "07" // BPC
            "01" // C = prediction
            "01" // UnkC
            "01" // IPR
        );

        let lhdr = parse_boxes::<LightFieldHeader>(&boxes).unwrap();
        assert_eq!(lhdr.coding_type, CodingType::Prediction);
        assert!(lhdr.colour_space_unknown);
        assert!(lhdr.has_intellectual_property);
        assert_eq!(CodingType::from(7), CodingType::Other(7));
    }

    #[test]
    fn profile_and_level() {
        let boxes = hex!(
            "0000000c" // box size
            "6a706c76" // box type = 'jplv'
            "0001" // profile
            "0002" // level
        );

        assert_eq!(
            parse_boxes::<ProfileAndLevel>(&boxes).unwrap(),
            ProfileAndLevel {
                profile: 1,
                level: 2
            }
        );
    }

    const JPLH: [u8; 53] = hex!(
        "00000035" // box size
        "6a706c68" // box type = 'jplh'
            "0000001e" // box size
            "6c686472" // box type = 'lhdr'
            "0000000d" "0000000d" "000001b2" "00000271" // T, S, V, U
            "0003" "0a" "00" "00" "00" // NC, BPC, C, UnkC, IPR
            // ----
            "0000000f" // box size
            "636f6c72" // box type = 'colr'
            "01" "00" "00" // METH, PREC, APPROX
            "00000010" // EnumCS = sRGB
    );

    #[test]
    fn nested_colour_specification() {
        let jplh = parse_boxes::<JpegPlenoLightFieldHeader>(&JPLH).unwrap();

        assert_eq!(
            jplh,
            JpegPlenoLightFieldHeader {
                light_field_header: LIGHT_FIELD_HEADER,
                bits_per_component: None,
                colour_specifications: vec![SRGB],
                channel_definition: None,
            }
        );

        assert_eq!(jplh.colour_specifications.len(), 1);
        assert_eq!(
            jplh.colour_specifications[0].enumerated_colour_space(),
            Some(EnumeratedColourSpace::Srgb)
        );
    }

    #[test]
    fn all_optional_boxes() {
        let boxes = hex!(
            "00000069" // box size
            "6a706c68" // box type = 'jplh'
                "0000001e" // box size
                "6c686472" // box type = 'lhdr'
                "0000000d" "0000000d" "000001b2" "00000271" // T, S, V, U
                "0003" "0a" "00" "00" "00" // NC, BPC, C, UnkC, IPR
                // ----
                "0000000b" // box size
                "62706363" // box type = 'bpcc'
                "090909" // 10 bits x 3
                // ----
                "0000000f" // box size
                "636f6c72" // box type = 'colr'
                "01" "00" "00" // METH, PREC, APPROX
                "00000010" // EnumCS = sRGB
                // ----
                "0000000f" // box size
                "636f6c72" // box type = 'colr'
                "01" "01" "00" // METH, PREC, APPROX
                "00000011" // EnumCS = greyscale
                // ----
                "00000010" // box size
                "75756964" // box type = 'uuid'
                "0011223344556677" // unknown payload
                // ----
                "0000000a" // box size
                "63646566" // box type = 'cdef'
                "0000" // N = 0
        );

        let jplh = parse_boxes::<JpegPlenoLightFieldHeader>(&boxes).unwrap();
        assert_eq!(
            jplh.bits_per_component,
            Some(BitsPerComponent(vec![9, 9, 9]))
        );
        assert_eq!(
            jplh.colour_specifications
                .iter()
                .map(|colr| colr.enumerated_colour_space())
                .collect::<Vec<_>>(),
            vec![
                Some(EnumeratedColourSpace::Srgb),
                Some(EnumeratedColourSpace::Greyscale)
            ]
        );
        assert_eq!(
            jplh.channel_definition,
            Some(ChannelDefinition { channels: vec![] })
        );
    }

    #[test]
    fn missing_colour_specification() {
        let boxes = hex!(
            "00000026" // box size
            "6a706c68" // box type = 'jplh'
                "0000001e" // box size
                "6c686472" // box type = 'lhdr'
                "0000000d" "0000000d" "000001b2" "00000271" // T, S, V, U
                "0003" "0a" "00" "00" "00" // NC, BPC, C, UnkC, IPR
        );

        assert_eq!(
            parse_boxes::<JpegPlenoLightFieldHeader>(&boxes).unwrap_err(),
            Error::MissingColourSpecification(BoxType::LIGHT_FIELD_HEADER)
        );
    }

    #[test]
    fn light_field_header_must_come_first() {
        let boxes = hex!(
            "00000017" // box size
            "6a706c68" // box type = 'jplh'
                "0000000f" // box size
                "636f6c72" // box type = 'colr'
                "01" "00" "00" // METH, PREC, APPROX
                "00000010" // EnumCS = sRGB
        );

        assert_eq!(
            parse_boxes::<JpegPlenoLightFieldHeader>(&boxes).unwrap_err(),
            Error::WrongTypeCode {
                found: BoxType::COLOUR_SPECIFICATION,
                expected: BoxType::LIGHT_FIELD_HEADER_CONTENTS,
            }
        );
    }

    #[test]
    fn child_box_overruns_parent() {
        let boxes = hex!(
            "00000017" // box size
            "6a706c68" // box type = 'jplh'
                "0000001e" // box size (larger than the parent)
                "6c686472" // box type = 'lhdr'
                "0000000d" "0000000d" "000001b2" // T, S, V
        );

        assert!(matches!(
            parse_boxes::<JpegPlenoLightFieldHeader>(&boxes),
            Err(Error::OutOfRange { .. })
        ));
    }

    fn light_field_box() -> Vec<u8> {
        let mut boxes = hex!(
            "00000057" // box size
            "6a706c66" // box type = 'jplf'
                "0000000c" // box size
                "6a706c76" // box type = 'jplv'
                "0000" "0000" // profile, level
        )
        .to_vec();

        boxes.extend_from_slice(&JPLH);

        boxes.extend_from_slice(&hex!(
                "0000000e" // box size
                "6a703263" // box type = 'jp2c'
                "ff4fff51ff52" // codestream
        ));

        boxes
    }

    #[test]
    fn light_field() {
        let jplf = parse_boxes::<JpegPlenoLightField<Source>>(&light_field_box()).unwrap();

        assert_eq!(
            jplf,
            JpegPlenoLightField {
                profile_and_level: ProfileAndLevel {
                    profile: 0,
                    level: 0
                },
                header: JpegPlenoLightFieldHeader {
                    light_field_header: LIGHT_FIELD_HEADER,
                    bits_per_component: None,
                    colour_specifications: vec![SRGB],
                    channel_definition: None,
                },
                codestream: Some(ContiguousCodestream {
                    data: BoxData::InMemory(hex!("ff4fff51ff52").to_vec()),
                }),
            }
        );
    }

    #[test]
    fn depth_limit() {
        let registry = ParserRegistry::with_known_parsers();

        // jplf (0) > jplh (1) > colr (2)
        let options = DecodeOptions::default().with_depth_limit(2);
        let decoded = registry
            .parse_with_options(&mut stream_over(&light_field_box()), &options)
            .unwrap();
        assert!(decoded.is_known());

        let options = DecodeOptions::default().with_depth_limit(1);
        assert_eq!(
            registry
                .parse_with_options(&mut stream_over(&light_field_box()), &options)
                .unwrap_err(),
            Error::DepthLimitExceeded(1)
        );
    }
}
