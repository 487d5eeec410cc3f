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

use nom::{combinator::all_consuming, IResult};

use crate::{
    parser::{BoundedStream, BoxHeader, DecodeOptions, Error, InputSlice},
    BoxType,
};

/// A resolved box header together with a stream over exactly that box.
///
/// This is what a box parser receives from the
/// [`ParserRegistry`](crate::parser::ParserRegistry). The stream starts out
/// positioned at the first payload byte and can not be read past the end of
/// the box.
pub struct BoxParserHelper<R> {
    header: BoxHeader,
    stream: BoundedStream<R>,
    options: DecodeOptions,
    depth: usize,
}

impl<R: Read + Seek> BoxParserHelper<R> {
    /// Bind a header that was just read from `parent` to a stream covering
    /// the whole box.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the box claims to extend past the end
    /// of `parent`.
    pub fn new(
        parent: &BoundedStream<R>,
        header: BoxHeader,
        options: DecodeOptions,
        depth: usize,
    ) -> Result<Self, Error> {
        let mut stream = parent.sub_stream(header.position, header.end())?;
        stream.seek_to(header.data_position())?;

        Ok(Self {
            header,
            stream,
            options,
            depth,
        })
    }

    /// Read `N` bytes of payload.
    pub fn get_bytes<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        self.stream.get_bytes::<N>()
    }

    /// Read `n` bytes of payload.
    pub fn get_n_bytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        self.stream.get_n_bytes(n)
    }

    /// Read the rest of the payload.
    pub fn payload_bytes(&mut self) -> Result<Vec<u8>, Error> {
        self.stream.get_remaining_bytes()
    }

    /// Read the rest of the payload and decode it with a `nom` parser, which
    /// must consume every byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContents`] if the parser fails or leaves
    /// bytes unconsumed.
    pub fn parse_payload<T>(
        &mut self,
        parser: impl FnMut(&[u8]) -> IResult<&[u8], T>,
    ) -> Result<T, Error> {
        let tbox = self.header.tbox;
        let bytes = self.payload_bytes()?;

        let (_, value) = all_consuming(parser)(bytes.as_slice()).map_err(|err| {
            let reason = match err {
                nom::Err::Incomplete(_) => "truncated payload".to_string(),
                nom::Err::Error(e) | nom::Err::Failure(e) => format!(
                    "{:?} at payload byte {}",
                    e.code,
                    bytes.len() - e.input.len()
                ),
            };
            Error::InvalidContents { tbox, reason }
        })?;

        Ok(value)
    }

    /// A fresh stream over the whole payload.
    pub fn data_stream(&self) -> Result<BoundedStream<R>, Error> {
        self.stream
            .sub_stream(self.header.data_position(), self.header.end())
    }

    /// A stream over the payload that hasn't been read yet.
    pub fn remaining_stream(&self) -> Result<BoundedStream<R>, Error> {
        self.stream.remaining_sub_stream()
    }
}

impl<R> BoxParserHelper<R> {
    pub fn header(&self) -> &BoxHeader {
        &self.header
    }

    pub fn tbox(&self) -> BoxType {
        self.header.tbox
    }

    /// Total box length, including the header.
    pub fn length(&self) -> u64 {
        self.header.length
    }

    pub fn header_size(&self) -> u64 {
        self.header.header_size()
    }

    pub fn data_length(&self) -> u64 {
        self.header.data_length()
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Nesting depth of this box. Top-level boxes are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` while payload bytes remain unread.
    pub fn has_data_available(&self) -> bool {
        self.stream.is_valid()
    }

    /// Current absolute position within the payload.
    pub fn tell(&self) -> u64 {
        self.stream.tell()
    }

    /// Lazy reference to the payload that hasn't been read yet.
    pub fn remaining_input_slice(&self) -> InputSlice<R> {
        self.stream.remaining_input_slice()
    }

    /// Mark the rest of the payload as consumed.
    pub fn skip_to_end(&mut self) {
        self.stream.forward();
    }

    /// The stream over this box, for parsing child boxes.
    pub(crate) fn stream_mut(&mut self) -> &mut BoundedStream<R> {
        &mut self.stream
    }
}
