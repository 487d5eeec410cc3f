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

//! Contents of the box types this crate understands.

use std::io::{Read, Seek};

use crate::{
    parser::{BoxHeader, InputSlice, ParseFn},
    BoxType,
};

mod channel;
mod codestream;
mod colour_specification;
mod file_type;
mod light_field;
mod signature;
mod thumbnail;
mod xml;

pub use channel::{BitsPerComponent, Channel, ChannelDefinition};
pub use codestream::ContiguousCodestream;
pub use colour_specification::{ColourSpace, ColourSpecification, EnumeratedColourSpace};
pub use file_type::FileType;
pub use light_field::{
    CodingType, JpegPlenoLightField, JpegPlenoLightFieldHeader, LightFieldHeader,
    ProfileAndLevel,
};
pub use signature::Signature;
pub use thumbnail::Thumbnail;
pub use xml::Xml;

/// Decoded contents of a box, by box type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BoxContents<R> {
    Signature(Signature),
    FileType(FileType),
    ColourSpecification(ColourSpecification),
    BitsPerComponent(BitsPerComponent),
    ChannelDefinition(ChannelDefinition),
    Xml(Xml),
    ContiguousCodestream(ContiguousCodestream<R>),
    ProfileAndLevel(ProfileAndLevel),
    LightFieldHeader(LightFieldHeader),
    JpegPlenoLightFieldHeader(JpegPlenoLightFieldHeader),
    JpegPlenoLightField(JpegPlenoLightField<R>),
    Thumbnail(Thumbnail<R>),

    /// A box for which no parser is registered. Its payload is left in the
    /// source.
    Unknown(InputSlice<R>),
}

/// A box as produced by the [`ParserRegistry`](crate::parser::ParserRegistry):
/// its header and its decoded contents.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedBox<R> {
    pub header: BoxHeader,
    pub contents: BoxContents<R>,
}

impl<R> DecodedBox<R> {
    pub fn tbox(&self) -> BoxType {
        self.header.tbox
    }

    /// Absolute position of the first byte of the box.
    pub fn position(&self) -> u64 {
        self.header.position
    }

    /// Returns `false` if no parser was registered for this box type.
    pub fn is_known(&self) -> bool {
        !matches!(self.contents, BoxContents::Unknown(_))
    }
}

/// A box contents type with a fixed box type.
///
/// Used by [`ParserRegistry::parse_as`] to return concrete contents when a
/// caller structurally expects one specific box next.
///
/// [`ParserRegistry::parse_as`]: crate::parser::ParserRegistry::parse_as
pub trait TypedBox<R>: Sized {
    /// The box type holding this kind of contents.
    const TBOX: BoxType;

    /// Extract this kind of contents, if that's what `contents` holds.
    fn from_contents(contents: BoxContents<R>) -> Option<Self>;
}

macro_rules! typed_box {
    ($contents:ident, $variant:ident, $tbox:expr) => {
        impl<R> TypedBox<R> for $contents {
            const TBOX: BoxType = $tbox;

            fn from_contents(contents: BoxContents<R>) -> Option<Self> {
                match contents {
                    BoxContents::$variant(c) => Some(c),
                    _ => None,
                }
            }
        }
    };
    ($contents:ident<R>, $variant:ident, $tbox:expr) => {
        impl<R> TypedBox<R> for $contents<R> {
            const TBOX: BoxType = $tbox;

            fn from_contents(contents: BoxContents<R>) -> Option<Self> {
                match contents {
                    BoxContents::$variant(c) => Some(c),
                    _ => None,
                }
            }
        }
    };
}

typed_box!(Signature, Signature, BoxType::SIGNATURE);
typed_box!(FileType, FileType, BoxType::FILE_TYPE);
typed_box!(
    ColourSpecification,
    ColourSpecification,
    BoxType::COLOUR_SPECIFICATION
);
typed_box!(BitsPerComponent, BitsPerComponent, BoxType::BITS_PER_COMPONENT);
typed_box!(
    ChannelDefinition,
    ChannelDefinition,
    BoxType::CHANNEL_DEFINITION
);
typed_box!(Xml, Xml, BoxType::XML);
typed_box!(
    ContiguousCodestream<R>,
    ContiguousCodestream,
    BoxType::CONTIGUOUS_CODESTREAM
);
typed_box!(ProfileAndLevel, ProfileAndLevel, BoxType::PROFILE_AND_LEVEL);
typed_box!(
    LightFieldHeader,
    LightFieldHeader,
    BoxType::LIGHT_FIELD_HEADER_CONTENTS
);
typed_box!(
    JpegPlenoLightFieldHeader,
    JpegPlenoLightFieldHeader,
    BoxType::LIGHT_FIELD_HEADER
);
typed_box!(
    JpegPlenoLightField<R>,
    JpegPlenoLightField,
    BoxType::LIGHT_FIELD
);
typed_box!(Thumbnail<R>, Thumbnail, BoxType::THUMBNAIL);

/// Parsers for every box type in this module.
pub(crate) fn known_parsers<R: Read + Seek>() -> Vec<(BoxType, ParseFn<R>)> {
    vec![
        (BoxType::SIGNATURE, signature::parse::<R> as ParseFn<R>),
        (BoxType::JPL_SIGNATURE, signature::parse::<R>),
        (BoxType::FILE_TYPE, file_type::parse::<R>),
        (
            BoxType::COLOUR_SPECIFICATION,
            colour_specification::parse::<R>,
        ),
        (BoxType::BITS_PER_COMPONENT, channel::parse_bpcc::<R>),
        (BoxType::CHANNEL_DEFINITION, channel::parse_cdef::<R>),
        (BoxType::XML, xml::parse::<R>),
        (BoxType::CONTIGUOUS_CODESTREAM, codestream::parse::<R>),
        (BoxType::PROFILE_AND_LEVEL, light_field::parse_jplv::<R>),
        (
            BoxType::LIGHT_FIELD_HEADER_CONTENTS,
            light_field::parse_lhdr::<R>,
        ),
        (BoxType::LIGHT_FIELD_HEADER, light_field::parse_jplh::<R>),
        (BoxType::LIGHT_FIELD, light_field::parse_jplf::<R>),
        (BoxType::THUMBNAIL, thumbnail::parse::<R>),
    ]
}
