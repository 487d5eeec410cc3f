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

use crate::{
    parser::{BoundedStream, Error},
    BoxType,
};

/// How a box declared its length.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoxSize {
    /// `LBox` held the length directly.
    Compact(u32),

    /// `LBox` was 1 and the 64-bit `XLBox` field held the length.
    Extended(u64),

    /// `LBox` was 0: the box extends to the end of the enclosing stream.
    ToEnd,
}

/// The length/type header shared by every box.
///
/// ```text
/// offset  size  field
/// 0       4     LBox  (1 => XLBox follows; 0 => box extends to end of container)
/// 4       4     TBox
/// 8       8     XLBox (only if LBox == 1)
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BoxHeader {
    /// Box type.
    pub tbox: BoxType,

    /// The length as declared in the header.
    pub size: BoxSize,

    /// Absolute position of the first byte of the box.
    pub position: u64,

    /// Total length of the box in bytes, including the header.
    ///
    /// For [`BoxSize::ToEnd`] this is resolved against the enclosing stream.
    pub length: u64,
}

impl BoxHeader {
    /// Read a box header at the stream's current position, leaving the stream
    /// positioned at the start of the box payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBoxLength`] if the declared length is smaller
    /// than the header itself, or [`Error::OutOfBounds`] if the stream ends
    /// inside the header.
    pub fn read<R: Read + Seek>(stream: &mut BoundedStream<R>) -> Result<Self, Error> {
        let position = stream.tell();

        let lbox = u32::from_be_bytes(stream.get_bytes::<4>()?);
        let tbox = BoxType(stream.get_bytes::<4>()?);

        let (size, length) = match lbox {
            0 => (BoxSize::ToEnd, stream.final_pos() - position),
            1 => {
                let xlbox = u64::from_be_bytes(stream.get_bytes::<8>()?);
                (BoxSize::Extended(xlbox), xlbox)
            }
            lbox => (BoxSize::Compact(lbox), u64::from(lbox)),
        };

        let header = Self {
            tbox,
            size,
            position,
            length,
        };

        if length < header.header_size() {
            return Err(Error::MalformedBoxLength {
                tbox,
                position,
                length,
                header_size: header.header_size(),
            });
        }

        log::trace!(
            "box {tbox} at {position}: {size:?}, {} payload bytes",
            header.data_length()
        );

        Ok(header)
    }

    /// Read a box header and verify that it has the expected type.
    ///
    /// On a type mismatch, the stream is returned to the start of the box so
    /// the caller may try another box type.
    pub fn read_expecting<R: Read + Seek>(
        stream: &mut BoundedStream<R>,
        expected: BoxType,
    ) -> Result<Self, Error> {
        let header = Self::read(stream)?;

        if header.tbox != expected {
            stream.seek_to(header.position)?;
            return Err(Error::WrongTypeCode {
                found: header.tbox,
                expected,
            });
        }

        Ok(header)
    }

    /// Read a box header without consuming it.
    pub fn peek<R: Read + Seek>(stream: &mut BoundedStream<R>) -> Result<Self, Error> {
        let header = Self::read(stream)?;
        stream.seek_to(header.position)?;
        Ok(header)
    }

    pub fn has_extended_length(&self) -> bool {
        matches!(self.size, BoxSize::Extended(_))
    }

    /// Size of the header: 8 bytes, or 16 with an extended length.
    pub fn header_size(&self) -> u64 {
        if self.has_extended_length() {
            16
        } else {
            8
        }
    }

    /// Size of the box payload.
    pub fn data_length(&self) -> u64 {
        self.length.saturating_sub(self.header_size())
    }

    /// Absolute position of the box payload.
    pub fn data_position(&self) -> u64 {
        self.position + self.header_size()
    }

    /// Absolute position just past the end of the box.
    pub fn end(&self) -> u64 {
        self.position.saturating_add(self.length)
    }

    pub fn is_a_box_with_id(&self, tbox: BoxType) -> bool {
        self.tbox == tbox
    }
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

    fn stream_over(data: &[u8]) -> BoundedStream<Cursor<Vec<u8>>> {
        let reader = Rc::new(RefCell::new(Cursor::new(data.to_vec())));
        BoundedStream::new(reader, 0, data.len() as u64).unwrap()
    }

    #[test]
    fn compact_length() {
        let boxes = hex!(
            "0000000c" // box size
            "6a502020" // box type = 'jP  '
            "0d0a870a" // signature
        );

        let mut stream = stream_over(&boxes);
        let header = BoxHeader::read(&mut stream).unwrap();

        assert_eq!(
            header,
            BoxHeader {
                tbox: BoxType::SIGNATURE,
                size: BoxSize::Compact(12),
                position: 0,
                length: 12,
            }
        );

        assert!(!header.has_extended_length());
        assert_eq!(header.header_size(), 8);
        assert_eq!(header.data_length(), 4);
        assert_eq!(header.data_position(), 8);
        assert_eq!(header.end(), 12);
        assert!(header.is_a_box_with_id(BoxType::SIGNATURE));

        // Positioned at the payload.
        assert_eq!(stream.tell(), 8);
        assert_eq!(stream.get_bytes::<4>().unwrap(), hex!("0d0a870a"));
    }

    #[test]
    fn extended_length() {
        let boxes = hex!(
            "00000001" // box size (extended)
            "786d6c20" // box type = 'xml '
            "0000000000000014" // extended box size
            "3c612f3e" // payload = '<a/>'
        );

        let mut stream = stream_over(&boxes);
        let header = BoxHeader::read(&mut stream).unwrap();

        assert_eq!(header.tbox, BoxType::XML);
        assert_eq!(header.size, BoxSize::Extended(20));
        assert_eq!(header.length, 20);
        assert!(header.has_extended_length());
        assert_eq!(header.header_size(), 16);
        assert_eq!(header.data_length(), 4);
        assert_eq!(stream.tell(), 16);
    }

    #[test]
    fn extends_to_end_of_stream() {
        let boxes = hex!(
            "0000000c" // box size
            "6a502020" // box type = 'jP  '
            "0d0a870a" // signature
            // ----
            "00000000" // box size (to end)
            "6a703263" // box type = 'jp2c'
            "ff4fff51ff52" // codestream
        );

        let mut stream = stream_over(&boxes);
        stream.seek_to(12).unwrap();

        let header = BoxHeader::read(&mut stream).unwrap();
        assert_eq!(header.tbox, BoxType::CONTIGUOUS_CODESTREAM);
        assert_eq!(header.size, BoxSize::ToEnd);
        assert_eq!(header.position, 12);
        assert_eq!(header.length, 14);
        assert_eq!(header.data_length(), 6);
        assert_eq!(header.end(), 26);
    }

    #[test]
    fn extends_to_end_of_enclosing_stream() {
        let boxes = hex!(
            "00000000" // box size (to end)
            "6a703263" // box type = 'jp2c'
            "ff4fff51ff52" // codestream
            "00000008" // box size
            "66726565" // box type = 'free'
        );

        // The enclosing stream ends before the second box.
        let mut stream = stream_over(&boxes).sub_stream(0, 14).unwrap();
        let header = BoxHeader::read(&mut stream).unwrap();
        assert_eq!(header.length, 14);
        assert_eq!(header.data_length(), 6);
    }

    #[test]
    fn length_smaller_than_header() {
        let boxes = hex!(
            "00000004" // box size (too small)
            "66747970" // box type = 'ftyp'
            "6a706c20"
        );

        let mut stream = stream_over(&boxes);
        assert_eq!(
            BoxHeader::read(&mut stream).unwrap_err(),
            Error::MalformedBoxLength {
                tbox: BoxType::FILE_TYPE,
                position: 0,
                length: 4,
                header_size: 8,
            }
        );
    }

    #[test]
    fn extended_length_smaller_than_header() {
        let boxes = hex!(
            "00000001" // box size (extended)
            "66747970" // box type = 'ftyp'
            "000000000000000c" // extended box size (too small)
        );

        let mut stream = stream_over(&boxes);
        assert_eq!(
            BoxHeader::read(&mut stream).unwrap_err(),
            Error::MalformedBoxLength {
                tbox: BoxType::FILE_TYPE,
                position: 0,
                length: 12,
                header_size: 16,
            }
        );
    }

    #[test]
    fn truncated_header() {
        let boxes = hex!(
            "00000001" // box size (extended)
            "66747970" // box type = 'ftyp'
            "00000000" // half of the extended box size
        );

        let mut stream = stream_over(&boxes);
        assert!(matches!(
            BoxHeader::read(&mut stream),
            Err(Error::OutOfBounds { requested: 8, .. })
        ));
    }

    #[test]
    fn expected_type() {
        let boxes = hex!(
            "00000014" // box size
            "66747970" // box type = 'ftyp'
            "6a706c20" // brand = 'jpl '
            "00000000" // minor version
            "6a706c20" // compatibility list = ['jpl ']
        );

        let mut stream = stream_over(&boxes);
        let header = BoxHeader::read_expecting(&mut stream, BoxType::FILE_TYPE).unwrap();
        assert_eq!(header.tbox, BoxType::FILE_TYPE);
        assert_eq!(stream.tell(), 8);

        stream.rewind();
        assert_eq!(
            BoxHeader::read_expecting(&mut stream, BoxType::SIGNATURE).unwrap_err(),
            Error::WrongTypeCode {
                found: BoxType::FILE_TYPE,
                expected: BoxType::SIGNATURE,
            }
        );

        // The box was not consumed.
        assert_eq!(stream.tell(), 0);
    }

    #[test]
    fn peek() {
        let boxes = hex!(
            "00000008" // box size
            "66726565" // box type = 'free'
        );

        let mut stream = stream_over(&boxes);
        let header = BoxHeader::peek(&mut stream).unwrap();
        assert_eq!(header.tbox, BoxType(*b"free"));
        assert_eq!(header.data_length(), 0);
        assert_eq!(stream.tell(), 0);
    }
}
