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
    fmt::{Debug, Formatter},
    io::{Read, Seek, SeekFrom},
    rc::Rc,
};

use crate::parser::{Error, InputSlice};

/// A view over a shared readable/seekable source, restricted to the byte
/// range `[initial_pos, final_pos)`.
///
/// Every box is parsed through a `BoundedStream` covering exactly that box,
/// so a box parser can never read into the next box's header, even when the
/// box is malformed.
///
/// Several streams may refer to the same source. Each stream keeps its own
/// position and seeks the source immediately before every read, so
/// interleaving reads on sibling or nested streams never disturbs another
/// stream's position.
///
/// # Example
///
/// ```
/// use std::{cell::RefCell, io::Cursor, rc::Rc};
///
/// use jpl::parser::BoundedStream;
///
/// let reader = Rc::new(RefCell::new(Cursor::new(vec![0u8, 1, 2, 3, 4, 5])));
/// let mut stream = BoundedStream::new(reader, 1, 4).unwrap();
///
/// assert_eq!(stream.get_bytes::<2>().unwrap(), [1, 2]);
/// assert_eq!(stream.get_byte().unwrap(), 3);
/// assert!(stream.get_byte().is_err());
/// ```
pub struct BoundedStream<R> {
    reader: Rc<RefCell<R>>,
    initial_pos: u64,
    final_pos: u64,
    pos: u64,
}

impl<R: Read + Seek> BoundedStream<R> {
    /// Create a stream over the absolute range `[initial_pos, final_pos)`.
    ///
    /// The source is positioned at `initial_pos` if it is not already there.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `initial_pos >= final_pos` and
    /// [`Error::ClosedSource`] if the source can not be positioned.
    pub fn new(reader: Rc<RefCell<R>>, initial_pos: u64, final_pos: u64) -> Result<Self, Error> {
        if initial_pos >= final_pos {
            return Err(Error::InvalidRange {
                initial: initial_pos,
                final_pos,
            });
        }

        {
            let mut source = reader.borrow_mut();
            let current = source.stream_position().map_err(closed_source)?;
            if current != initial_pos {
                source
                    .seek(SeekFrom::Start(initial_pos))
                    .map_err(closed_source)?;
            }
        }

        Ok(Self {
            reader,
            initial_pos,
            final_pos,
            pos: initial_pos,
        })
    }

    /// Create a stream starting at the source's current position and
    /// extending `max_offset` bytes.
    pub fn with_max_offset(reader: Rc<RefCell<R>>, max_offset: u64) -> Result<Self, Error> {
        let initial_pos = reader
            .borrow_mut()
            .stream_position()
            .map_err(closed_source)?;

        let final_pos = initial_pos
            .checked_add(max_offset)
            .ok_or(Error::InvalidRange {
                initial: initial_pos,
                final_pos: u64::MAX,
            })?;

        Self::new(reader, initial_pos, final_pos)
    }

    /// Read exactly `N` bytes, advancing the position by `N`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the read would cross `final_pos`.
    pub fn get_bytes<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut buf = [0u8; N];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Read `n` bytes, advancing the position by `n`.
    ///
    /// The bounds are checked before any memory is allocated.
    pub fn get_n_bytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        self.check_access_bounds(n as u64)?;
        let mut buf = vec![0u8; n];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Read a single byte.
    pub fn get_byte(&mut self) -> Result<u8, Error> {
        let [b] = self.get_bytes::<1>()?;
        Ok(b)
    }

    /// Read everything from the current position to `final_pos`.
    pub fn get_remaining_bytes(&mut self) -> Result<Vec<u8>, Error> {
        let n = usize::try_from(self.remaining()).map_err(|_| Error::OutOfBounds {
            requested: self.remaining(),
            initial: self.initial_pos,
            final_pos: self.final_pos,
            current: self.pos,
        })?;
        self.get_n_bytes(n)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.check_access_bounds(buf.len() as u64)?;

        let mut source = self.reader.borrow_mut();
        source.seek(SeekFrom::Start(self.pos))?;
        source.read_exact(buf)?;

        self.pos += buf.len() as u64;
        Ok(())
    }
}

impl<R> BoundedStream<R> {
    /// Derive a stream over `[initial_pos, final_pos)` of the same source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] unless the requested range lies within
    /// this stream's range, and [`Error::InvalidRange`] if it is empty.
    pub fn sub_stream(&self, initial_pos: u64, final_pos: u64) -> Result<Self, Error> {
        if initial_pos < self.initial_pos || final_pos > self.final_pos {
            return Err(Error::OutOfRange {
                requested_initial: initial_pos,
                requested_final: final_pos,
                initial: self.initial_pos,
                final_pos: self.final_pos,
            });
        }

        if initial_pos >= final_pos {
            return Err(Error::InvalidRange {
                initial: initial_pos,
                final_pos,
            });
        }

        Ok(Self {
            reader: Rc::clone(&self.reader),
            initial_pos,
            final_pos,
            pos: initial_pos,
        })
    }

    /// Derive a stream starting at the current position and extending
    /// `max_offset` bytes.
    pub fn sub_stream_with_max_offset(&self, max_offset: u64) -> Result<Self, Error> {
        let final_pos = self.pos.saturating_add(max_offset);
        self.sub_stream(self.pos, final_pos)
    }

    /// Derive a stream from the current position to `final_pos`.
    pub fn remaining_sub_stream(&self) -> Result<Self, Error> {
        self.sub_stream(self.pos, self.final_pos)
    }

    /// Returns `true` if the current position lies within the stream.
    ///
    /// A stream that has been read to its end is no longer valid; this is
    /// the loop condition for "more boxes to decode."
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(self.pos)
    }

    /// Returns `true` if the absolute position `index` lies within
    /// `[initial_pos, final_pos)`.
    pub fn is_valid_at(&self, index: u64) -> bool {
        index >= self.initial_pos && index < self.final_pos
    }

    /// Move to `initial_pos`.
    pub fn rewind(&mut self) {
        self.pos = self.initial_pos;
    }

    /// Move to `final_pos`.
    pub fn forward(&mut self) {
        self.pos = self.final_pos;
    }

    /// Move to a new position and return it.
    ///
    /// [`SeekFrom::Start`] is relative to `initial_pos` and
    /// [`SeekFrom::Current`] to the current position. `final_pos` itself is a
    /// valid target (the stream is then exhausted).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSeekDirection`] for [`SeekFrom::End`] and
    /// [`Error::SeekBeforeInitialPosition`] or
    /// [`Error::SeekAfterFinalPosition`] when the target is out of range.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, Error> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(self.initial_pos) + i128::from(offset),
            SeekFrom::Current(offset) => i128::from(self.pos) + i128::from(offset),
            SeekFrom::End(_) => {
                return Err(Error::UnknownSeekDirection);
            }
        };

        if target < i128::from(self.initial_pos) {
            return Err(Error::SeekBeforeInitialPosition {
                target,
                initial: self.initial_pos,
            });
        }

        if target > i128::from(self.final_pos) {
            return Err(Error::SeekAfterFinalPosition {
                target,
                final_pos: self.final_pos,
            });
        }

        self.pos = target as u64;
        Ok(self.pos)
    }

    /// Move to the absolute position `pos`.
    pub fn seek_to(&mut self, pos: u64) -> Result<u64, Error> {
        if pos < self.initial_pos {
            return Err(Error::SeekBeforeInitialPosition {
                target: i128::from(pos),
                initial: self.initial_pos,
            });
        }

        self.seek(SeekFrom::Start(pos - self.initial_pos))
    }

    /// Current absolute position.
    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// Length of the stream (`final_pos - initial_pos`).
    pub fn length(&self) -> u64 {
        self.final_pos - self.initial_pos
    }

    /// Number of bytes between the current position and `final_pos`.
    pub fn remaining(&self) -> u64 {
        self.final_pos.saturating_sub(self.pos)
    }

    pub fn initial_pos(&self) -> u64 {
        self.initial_pos
    }

    pub fn final_pos(&self) -> u64 {
        self.final_pos
    }

    /// Lazy reference to the bytes from the current position to
    /// `final_pos`. Nothing is read until the slice is asked for its data.
    pub fn remaining_input_slice(&self) -> InputSlice<R> {
        InputSlice::new(Rc::clone(&self.reader), self.pos, self.remaining())
    }

    fn check_access_bounds(&self, n: u64) -> Result<(), Error> {
        match self.pos.checked_add(n) {
            Some(end) if self.pos >= self.initial_pos && end <= self.final_pos => Ok(()),
            _ => Err(Error::OutOfBounds {
                requested: n,
                initial: self.initial_pos,
                final_pos: self.final_pos,
                current: self.pos,
            }),
        }
    }
}

fn closed_source(err: std::io::Error) -> Error {
    Error::ClosedSource(err.to_string())
}

impl<R> Clone for BoundedStream<R> {
    fn clone(&self) -> Self {
        Self {
            reader: Rc::clone(&self.reader),
            initial_pos: self.initial_pos,
            final_pos: self.final_pos,
            pos: self.pos,
        }
    }
}

impl<R> Debug for BoundedStream<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedStream")
            .field("initial_pos", &self.initial_pos)
            .field("final_pos", &self.final_pos)
            .field("pos", &self.pos)
            .finish()
    }
}
