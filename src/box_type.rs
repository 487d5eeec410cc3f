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

use std::fmt::{Debug, Display, Formatter};

/// Box type (`TBox`).
///
/// This is encoded on the wire as a 4-byte big-endian unsigned integer, but
/// boxes are generally referred to by an ISO/IEC 646 character string
/// translation of the integer value. For that reason, this is represented
/// here as a 4-byte array which can be matched against a byte string
/// constant (i.e. `b"ftyp"`).
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BoxType(pub [u8; 4]);

impl BoxType {
    /// Returns the box type as the big-endian integer found on the wire.
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Returns `true` if every byte of the type code is printable ASCII.
    pub fn is_printable(&self) -> bool {
        self.0.iter().all(|b| (0x20..0x7f).contains(b))
    }
}

impl From<u32> for BoxType {
    fn from(code: u32) -> Self {
        Self(code.to_be_bytes())
    }
}

impl From<&[u8; 4]> for BoxType {
    fn from(code: &[u8; 4]) -> Self {
        Self(*code)
    }
}

impl Debug for BoxType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_printable() {
            write!(f, "b\"{}\"", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "0x{:08x}", self.to_u32())
        }
    }
}

impl Display for BoxType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_printable() {
            write!(f, "'{}'", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "0x{:08x}", self.to_u32())
        }
    }
}

impl BoxType {
    /// JPEG Pleno signature box (`jP\x20\x20`).
    pub const SIGNATURE: Self = Self(*b"jP  ");

    /// Signature box type written by the JPEG Pleno reference software.
    /// Shares its code with [`BoxType::JPL_BRAND`].
    pub const JPL_SIGNATURE: Self = Self(*b"jpl ");

    /// File type box.
    pub const FILE_TYPE: Self = Self(*b"ftyp");

    /// Brand that a JPEG Pleno file type box must list as compatible.
    pub const JPL_BRAND: Self = Self(*b"jpl ");

    pub const THUMBNAIL: Self = Self(*b"jpth");
    pub const XML: Self = Self(*b"xml ");

    // Plenoptic data boxes.
    pub const LIGHT_FIELD: Self = Self(*b"jplf");
    pub const POINT_CLOUD: Self = Self(*b"jppc");
    pub const HOLOGRAM: Self = Self(*b"jpho");

    pub const PROFILE_AND_LEVEL: Self = Self(*b"jplv");
    pub const LIGHT_FIELD_HEADER: Self = Self(*b"jplh");
    pub const LIGHT_FIELD_HEADER_CONTENTS: Self = Self(*b"lhdr");
    pub const BITS_PER_COMPONENT: Self = Self(*b"bpcc");
    pub const COLOUR_SPECIFICATION: Self = Self(*b"colr");
    pub const CHANNEL_DEFINITION: Self = Self(*b"cdef");
    pub const CONTIGUOUS_CODESTREAM: Self = Self(*b"jp2c");

    /// Returns `true` for either signature box type.
    pub fn is_signature(self) -> bool {
        self == Self::SIGNATURE || self == Self::JPL_SIGNATURE
    }

    /// Returns `true` for box types that carry plenoptic data
    /// (light field, point cloud, or hologram).
    pub fn is_plenoptic(self) -> bool {
        self == Self::LIGHT_FIELD || self == Self::POINT_CLOUD || self == Self::HOLOGRAM
    }
}
