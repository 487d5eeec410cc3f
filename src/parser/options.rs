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

/// Configuration for decoding a JPEG Pleno file.
///
/// # Examples
///
/// ```
/// use jpl::parser::DecodeOptions;
///
/// let options = DecodeOptions::default()
///     .with_depth_limit(4)
///     .with_in_memory_limit(64 * 1024)
///     .with_lenient(true);
///
/// assert_eq!(options.depth_limit, 4);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodeOptions {
    /// Maximum nesting of boxes within boxes. Top-level boxes are at depth 0.
    ///
    /// Default: 16
    pub depth_limit: usize,

    /// Contiguous codestream payloads up to this many bytes are read into
    /// memory while parsing. Larger payloads are left in the source and read
    /// on request.
    ///
    /// Default: 1024 bytes
    pub in_memory_limit: u64,

    /// Enable lenient parsing mode.
    ///
    /// When true, violations of the file organization rules (thumbnail and
    /// catalog placement, contiguous plenoptic boxes) are logged instead of
    /// failing the decode. A missing or duplicate file type box and an
    /// incompatible brand are always errors.
    ///
    /// Default: false (strict validation)
    pub lenient: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            depth_limit: 16,
            in_memory_limit: 1024,
            lenient: false,
        }
    }
}

impl DecodeOptions {
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn with_in_memory_limit(mut self, bytes: u64) -> Self {
        self.in_memory_limit = bytes;
        self
    }

    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }
}
