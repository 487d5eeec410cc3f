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

//! A parser for the box stream of [JPEG Pleno (ISO/IEC 21794-1)] files.
//!
//! The parser is layered:
//!
//! * [`BoundedStream`] is a range-limited view over a shared
//!   `Read + Seek` source. Nothing read through it can fall outside its
//!   range.
//! * [`BoxHeader`] decodes the length/type header every box starts with.
//! * [`ParserRegistry`] maps box types to box parsers and dispatches to them,
//!   recursively for boxes that contain other boxes.
//! * [`JplFile`] decodes a whole file, checks the file organization rules,
//!   and sorts the decoded boxes into semantic fields.
//!
//! # Decoding a file
//!
//! ```rust,no_run
//! use jpl::parser::{Codestream, JplFile};
//!
//! let jpl = JplFile::open("plenoptic.jpl").unwrap();
//!
//! for codestream in jpl.codestreams() {
//!     if let Codestream::LightField(light_field) = codestream {
//!         let lhdr = &light_field.header.light_field_header;
//!         println!("{} x {} views", lhdr.rows, lhdr.columns);
//!     }
//! }
//! ```
//!
//! # Decoding single boxes
//!
//! A registry can also be used on its own, for example to decode boxes
//! from a byte buffer:
//!
//! ```rust
//! use std::{cell::RefCell, io::Cursor, rc::Rc};
//!
//! use hex_literal::hex;
//! use jpl::parser::{BoundedStream, ParserRegistry, ProfileAndLevel};
//!
//! let boxes = hex!(
//!     "0000000c" // box size
//!     "6a706c76" // box type = 'jplv'
//!     "0001" // profile
//!     "0002" // level
//! );
//!
//! let reader = Rc::new(RefCell::new(Cursor::new(boxes.to_vec())));
//! let mut stream = BoundedStream::new(reader, 0, boxes.len() as u64).unwrap();
//!
//! let registry = ParserRegistry::with_known_parsers();
//! let jplv = registry.parse_as::<ProfileAndLevel>(&mut stream).unwrap();
//!
//! assert_eq!(jplv, ProfileAndLevel { profile: 1, level: 2 });
//! assert!(!stream.is_valid());
//! ```
//!
//! [JPEG Pleno (ISO/IEC 21794-1)]: https://www.iso.org/standard/74530.html

mod bounded_stream;
mod box_data;
mod box_header;
mod box_parser_helper;
pub mod contents;
mod error;
mod input_slice;
mod jpl_file;
mod options;
mod registry;

pub use bounded_stream::BoundedStream;
pub use box_data::BoxData;
pub use box_header::{BoxHeader, BoxSize};
pub use box_parser_helper::BoxParserHelper;
pub use contents::{
    BitsPerComponent, BoxContents, Channel, ChannelDefinition, CodingType, ColourSpace,
    ColourSpecification, ContiguousCodestream, DecodedBox, EnumeratedColourSpace, FileType,
    JpegPlenoLightField, JpegPlenoLightFieldHeader, LightFieldHeader, ProfileAndLevel, Signature,
    Thumbnail, TypedBox, Xml,
};
pub use error::Error;
pub use input_slice::InputSlice;
pub use jpl_file::{Codestream, JplFile, MINIMUM_FILE_SIZE};
pub use options::DecodeOptions;
pub use registry::{ParseFn, ParserRegistry};
