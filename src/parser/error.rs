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

use thiserror::Error;

use crate::BoxType;

/// Describes errors that can be identified when parsing a JPEG Pleno file.
///
/// Positions are absolute byte offsets within the underlying source unless
/// noted otherwise. Positions reported by document-level ordering errors are
/// box indices in stream order.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A bounded stream was requested over an empty or inverted range.
    #[error("invalid stream range: initial position {initial} must be less than final position {final_pos}")]
    InvalidRange { initial: u64, final_pos: u64 },

    /// The underlying source could not be positioned.
    #[error("the underlying source is not open or not seekable: {0}")]
    ClosedSource(String),

    /// A sub-stream was requested outside the parent stream's range.
    #[error("requested range [{requested_initial}, {requested_final}) is outside the stream range [{initial}, {final_pos}]")]
    OutOfRange {
        requested_initial: u64,
        requested_final: u64,
        initial: u64,
        final_pos: u64,
    },

    /// A seek target fell before the stream's initial position.
    #[error("seek to {target} is before the initial position {initial}")]
    SeekBeforeInitialPosition { target: i128, initial: u64 },

    /// A seek target fell after the stream's final position.
    #[error("seek to {target} is after the final position {final_pos}")]
    SeekAfterFinalPosition { target: i128, final_pos: u64 },

    /// Bounded streams only seek from their start or their current position.
    #[error("seeking relative to the end of a bounded stream is not supported")]
    UnknownSeekDirection,

    /// A read would cross the stream's bounds.
    #[error("reading {requested} bytes at {current} is outside the stream range [{initial}, {final_pos})")]
    OutOfBounds {
        requested: u64,
        initial: u64,
        final_pos: u64,
        current: u64,
    },

    /// The box length is smaller than its own header.
    #[error("box {tbox} at {position} declares length {length}, which is smaller than its {header_size}-byte header")]
    MalformedBoxLength {
        tbox: BoxType,
        position: u64,
        length: u64,
        header_size: u64,
    },

    /// A specific box type was expected, but another was found.
    #[error("expected box type {expected}, found {found}")]
    WrongTypeCode { found: BoxType, expected: BoxType },

    /// A parser is already registered for this box type.
    #[error("a parser is already registered for box type {0}")]
    DuplicateParser(BoxType),

    /// The box type is required here, but no parser is registered for it.
    #[error("box type {0} is required, but no parser is registered for it")]
    NoParserRegistered(BoxType),

    /// Boxes are nested more deeply than the configured limit.
    #[error("box nesting exceeds the depth limit of {0}")]
    DepthLimitExceeded(usize),

    /// The signature box does not hold the JPEG Pleno signature.
    #[error("invalid JPEG Pleno signature {0:02x?}")]
    InvalidSignature(Vec<u8>),

    /// The fields of a box could not be decoded.
    #[error("invalid contents in box {tbox}: {reason}")]
    InvalidContents { tbox: BoxType, reason: String },

    /// A header box holds no colour specification box.
    #[error("box {0} must contain at least one colour specification box")]
    MissingColourSpecification(BoxType),

    /// The source is too small to hold a JPEG Pleno file.
    #[error("file of {0} bytes is too small to be a JPEG Pleno file")]
    TooSmallFile(u64),

    /// No file type box was found.
    #[error("no file type box was found")]
    MissingFileTypeBox,

    /// More than one file type box was found.
    #[error("more than one file type box was found")]
    MoreThanOneFileTypeBox,

    /// The file type box does not list the JPEG Pleno brand as compatible.
    #[error("file type box with brand {brand} does not list 'jpl ' as compatible")]
    IncompatibleBrand { brand: BoxType },

    /// A thumbnail box follows the first plenoptic data box.
    #[error("thumbnail box at index {thumbnail} must be signalled before the first plenoptic box at index {first_plenoptic}")]
    ThumbnailAfterPlenopticData { thumbnail: u64, first_plenoptic: u64 },

    /// A cataloging XML box is not between the file type box and the
    /// first plenoptic data box.
    #[error("cataloging XML box at index {catalog} must be signalled after the file type box at index {file_type} and before the first plenoptic box at index {first_plenoptic}")]
    CatalogOutOfOrder {
        catalog: u64,
        file_type: u64,
        first_plenoptic: u64,
    },

    /// Another box was found between two plenoptic data boxes.
    #[error("plenoptic boxes between indices {first} and {last} are not contiguous")]
    BoxBetweenPlenopticBoxes { first: u64, last: u64 },

    /// An error was reported by the underlying source.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl Error {
    /// Returns `true` for stream and header errors, which indicate a corrupt
    /// source (or a box parser that misbehaved).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. }
                | Self::ClosedSource(_)
                | Self::OutOfRange { .. }
                | Self::SeekBeforeInitialPosition { .. }
                | Self::SeekAfterFinalPosition { .. }
                | Self::UnknownSeekDirection
                | Self::OutOfBounds { .. }
                | Self::MalformedBoxLength { .. }
                | Self::DepthLimitExceeded(_)
                | Self::IoError(_)
        )
    }

    /// Returns `true` when a specific box type was expected but another was
    /// found. Callers that try several candidate box types may recover from
    /// this error.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::WrongTypeCode { .. })
    }

    /// Returns `true` for errors found while assembling a decoded file.
    pub fn is_document_invariant(&self) -> bool {
        matches!(
            self,
            Self::TooSmallFile(_)
                | Self::MissingFileTypeBox
                | Self::MoreThanOneFileTypeBox
                | Self::IncompatibleBrand { .. }
                | Self::ThumbnailAfterPlenopticData { .. }
                | Self::CatalogOutOfOrder { .. }
                | Self::BoxBetweenPlenopticBoxes { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
