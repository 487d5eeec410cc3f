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
    debug::DebugByteSlice,
    parser::{Error, InputSlice},
};

/// Payload bytes that were either read into memory during parsing or left
/// in the source to be read on request.
///
/// Small codestream payloads are read eagerly; anything larger than
/// [`DecodeOptions::in_memory_limit`] stays lazy.
///
/// [`DecodeOptions::in_memory_limit`]: crate::parser::DecodeOptions::in_memory_limit
pub enum BoxData<R> {
    /// Bytes that were read while parsing.
    InMemory(Vec<u8>),

    /// Bytes referenced by position in the source.
    Lazy(InputSlice<R>),
}

impl<R> BoxData<R> {
    /// Get the length without reading data.
    pub fn len(&self) -> u64 {
        match self {
            Self::InMemory(bytes) => bytes.len() as u64,
            Self::Lazy(slice) => slice.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the data as a slice if it was read into memory.
    pub fn as_slice(&self) -> Option<&[u8]> {
        match self {
            Self::InMemory(bytes) => Some(bytes),
            Self::Lazy(_) => None,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }
}

impl<R: Read + Seek> BoxData<R> {
    /// Read the data into a `Vec`.
    ///
    /// In-memory data is cloned; lazy data is read from the source.
    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        match self {
            Self::InMemory(bytes) => Ok(bytes.clone()),
            Self::Lazy(slice) => slice.to_vec(),
        }
    }
}

impl<R> std::fmt::Debug for BoxData<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InMemory(bytes) => write!(f, "InMemory({:?})", DebugByteSlice(bytes)),
            Self::Lazy(slice) => write!(f, "Lazy({slice:?})"),
        }
    }
}

impl<R> PartialEq for BoxData<R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InMemory(a), Self::InMemory(b)) => a == b,
            (Self::Lazy(a), Self::Lazy(b)) => a == b,
            _ => false,
        }
    }
}

impl<R> Eq for BoxData<R> {}

impl<R> Clone for BoxData<R> {
    fn clone(&self) -> Self {
        match self {
            Self::InMemory(bytes) => Self::InMemory(bytes.clone()),
            Self::Lazy(slice) => Self::Lazy(slice.clone()),
        }
    }
}
