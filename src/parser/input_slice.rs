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
    io::{Read, Seek, SeekFrom},
    rc::Rc,
};

use crate::parser::Error;

/// A lazy reference to a byte range within the shared source.
///
/// Payloads that this crate does not interpret (unknown boxes, point cloud
/// and hologram codestreams, large contiguous codestreams) are kept as an
/// `InputSlice`. The bytes are only read when requested via
/// [`to_vec()`](Self::to_vec) or [`read_range()`](Self::read_range).
///
/// # Example
///
/// ```
/// use std::{cell::RefCell, io::Cursor, rc::Rc};
///
/// use jpl::parser::InputSlice;
///
/// let reader = Rc::new(RefCell::new(Cursor::new(vec![0u8, 1, 2, 3, 4, 5])));
/// let slice = InputSlice::new(reader, 2, 3);
///
/// assert_eq!(slice.len(), 3);
/// assert_eq!(slice.to_vec().unwrap(), vec![2, 3, 4]);
/// ```
pub struct InputSlice<R> {
    reader: Rc<RefCell<R>>,

    /// Absolute position of the data within the source.
    offset: u64,

    /// Length of the data in bytes.
    len: u64,
}

impl<R> InputSlice<R> {
    pub fn new(reader: Rc<RefCell<R>>, offset: u64, len: u64) -> Self {
        Self {
            reader,
            offset,
            len,
        }
    }

    /// Get the length of the data without reading it.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the absolute position of the data within the source.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<R: Read + Seek> InputSlice<R> {
    /// Read the entire range into a `Vec`.
    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        self.read_range(0, self.len)
    }

    /// Read `len` bytes starting `start` bytes into this slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the range exceeds the slice, or an
    /// I/O error if the source can't supply the bytes.
    pub fn read_range(&self, start: u64, len: u64) -> Result<Vec<u8>, Error> {
        let out_of_bounds = || Error::OutOfBounds {
            requested: len,
            initial: self.offset,
            final_pos: self.offset + self.len,
            current: self.offset.saturating_add(start),
        };

        match start.checked_add(len) {
            Some(end) if end <= self.len => (),
            _ => return Err(out_of_bounds()),
        }

        let buf_len = usize::try_from(len).map_err(|_| out_of_bounds())?;

        let mut reader = self.reader.borrow_mut();
        reader.seek(SeekFrom::Start(self.offset + start))?;
        let mut buf = vec![0u8; buf_len];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl<R> std::fmt::Debug for InputSlice<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSlice")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

impl<R> Clone for InputSlice<R> {
    fn clone(&self) -> Self {
        Self {
            reader: Rc::clone(&self.reader),
            offset: self.offset,
            len: self.len,
        }
    }
}

// Two slices are equal when they describe the same range. The source itself
// is not compared.
impl<R> PartialEq for InputSlice<R> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.len == other.len
    }
}

impl<R> Eq for InputSlice<R> {}
