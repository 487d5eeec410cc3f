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
    fmt::{Debug, Formatter},
    io::{Read, Seek},
};

use nom::{
    combinator::{map, rest},
    number::complete::{be_i8, be_u32, be_u8},
    sequence::tuple,
    IResult,
};

use crate::{
    debug::DebugByteSlice,
    parser::{BoxContents, BoxParserHelper, Error, ParserRegistry},
};

/// Colour specification box (`colr`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColourSpecification {
    /// Specification method (`METH`).
    pub method: u8,

    /// Precedence (`PREC`).
    pub precedence: i8,

    /// Colourspace approximation (`APPROX`).
    pub approximation: u8,

    pub colour_space: ColourSpace,
}

/// How a [`ColourSpecification`] describes its colourspace.
#[derive(Clone, Eq, PartialEq)]
pub enum ColourSpace {
    /// Method 1: an enumerated colourspace (`EnumCS`).
    Enumerated(EnumeratedColourSpace),

    /// Method 2: a restricted ICC profile.
    IccProfile(Vec<u8>),

    /// Any other method. The remaining payload is kept as is.
    Unsupported(Vec<u8>),
}

impl Debug for ColourSpace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enumerated(cs) => write!(f, "Enumerated({cs:?})"),
            Self::IccProfile(profile) => write!(f, "IccProfile({:?})", DebugByteSlice(profile)),
            Self::Unsupported(data) => write!(f, "Unsupported({:?})", DebugByteSlice(data)),
        }
    }
}

/// Enumerated colourspace values (`EnumCS`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnumeratedColourSpace {
    Srgb,
    Greyscale,
    Sycc,
    Other(u32),
}

impl From<u32> for EnumeratedColourSpace {
    fn from(value: u32) -> Self {
        match value {
            16 => Self::Srgb,
            17 => Self::Greyscale,
            18 => Self::Sycc,
            other => Self::Other(other),
        }
    }
}

impl From<EnumeratedColourSpace> for u32 {
    fn from(cs: EnumeratedColourSpace) -> Self {
        match cs {
            EnumeratedColourSpace::Srgb => 16,
            EnumeratedColourSpace::Greyscale => 17,
            EnumeratedColourSpace::Sycc => 18,
            EnumeratedColourSpace::Other(value) => value,
        }
    }
}

impl ColourSpecification {
    /// Returns the enumerated colourspace, if this box uses method 1.
    pub fn enumerated_colour_space(&self) -> Option<EnumeratedColourSpace> {
        match self.colour_space {
            ColourSpace::Enumerated(cs) => Some(cs),
            _ => None,
        }
    }
}

fn colour_specification_fields(i: &[u8]) -> IResult<&[u8], ColourSpecification> {
    let (i, (method, precedence, approximation)) = tuple((be_u8, be_i8, be_u8))(i)?;

    let (i, colour_space) = match method {
        1 => map(be_u32, |cs| {
            ColourSpace::Enumerated(EnumeratedColourSpace::from(cs))
        })(i)?,
        2 => map(rest, |profile: &[u8]| ColourSpace::IccProfile(profile.to_vec()))(i)?,
        _ => map(rest, |data: &[u8]| ColourSpace::Unsupported(data.to_vec()))(i)?,
    };

    Ok((
        i,
        ColourSpecification {
            method,
            precedence,
            approximation,
            colour_space,
        },
    ))
}

pub(crate) fn parse<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    _registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    let colr = helper.parse_payload(colour_specification_fields)?;

    if let ColourSpace::Unsupported(_) = colr.colour_space {
        log::warn!(
            "colour specification method {} is not supported; keeping raw payload",
            colr.method
        );
    }

    Ok(BoxContents::ColourSpecification(colr))
}
