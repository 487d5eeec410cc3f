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
    multi::{count, many0},
    number::complete::{be_u16, be_u8},
    sequence::tuple,
    IResult,
};

use crate::parser::{BoxContents, BoxParserHelper, Error, ParserRegistry};

/// Bits per component box (`bpcc`).
///
/// Holds one byte per component: the low seven bits are the bit depth minus
/// one, and the high bit is set for signed values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitsPerComponent(pub Vec<u8>);

impl BitsPerComponent {
    pub fn component_count(&self) -> usize {
        self.0.len()
    }

    /// Bit depth of component `index`.
    pub fn bit_depth(&self, index: usize) -> Option<u8> {
        self.0.get(index).map(|bpc| (bpc & 0x7f) + 1)
    }

    pub fn is_signed(&self, index: usize) -> Option<bool> {
        self.0.get(index).map(|bpc| bpc & 0x80 != 0)
    }
}

/// Channel definition box (`cdef`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChannelDefinition {
    pub channels: Vec<Channel>,
}

/// One entry of a [`ChannelDefinition`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Channel {
    /// Channel index (`Cn`).
    pub index: u16,

    /// Channel type (`Typ`): 0 colour, 1 opacity, 2 premultiplied opacity.
    pub channel_type: u16,

    /// Channel association (`Asoc`).
    pub association: u16,
}

fn bits_per_component_fields(i: &[u8]) -> IResult<&[u8], BitsPerComponent> {
    map(many0(be_u8), BitsPerComponent)(i)
}

fn channel_definition_fields(i: &[u8]) -> IResult<&[u8], ChannelDefinition> {
    let (i, n) = be_u16(i)?;

    let channel = map(
        tuple((be_u16, be_u16, be_u16)),
        |(index, channel_type, association)| Channel {
            index,
            channel_type,
            association,
        },
    );

    map(count(channel, n as usize), |channels| ChannelDefinition {
        channels,
    })(i)
}

pub(crate) fn parse_bpcc<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    _registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    helper
        .parse_payload(bits_per_component_fields)
        .map(BoxContents::BitsPerComponent)
}

pub(crate) fn parse_cdef<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    _registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    helper
        .parse_payload(channel_definition_fields)
        .map(BoxContents::ChannelDefinition)
}
