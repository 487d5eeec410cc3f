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

use std::fmt::{Debug, Error, Formatter};

/// Number of leading bytes shown for long payloads.
const PREVIEW_LEN: usize = 16;

/// Formats opaque payload bytes (ICC profiles, codestreams) as hex,
/// abbreviating long payloads.
pub(crate) struct DebugByteSlice<'a>(pub(crate) &'a [u8]);

impl Debug for DebugByteSlice<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        if self.0.len() > PREVIEW_LEN {
            write!(
                f,
                "{} bytes starting with {:02x?}",
                self.0.len(),
                &self.0[..PREVIEW_LEN]
            )
        } else {
            write!(f, "{:02x?}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use hex_literal::hex;
    use pretty_assertions_sorted::assert_eq;

    use crate::debug::*;

    #[test]
    fn short_payload() {
        let h = hex!("ff4fff51");
        assert_eq!(format!("{:?}", DebugByteSlice(&h)), "[ff, 4f, ff, 51]");
        assert_eq!(format!("{:?}", DebugByteSlice(&[])), "[]");
    }

    #[test]
    fn long_payload() {
        let h = hex!("000102030405060708090a0b0c0d0e0f");
        assert_eq!(
            format!("{:?}", DebugByteSlice(&h)),
            "[00, 01, 02, 03, 04, 05, 06, 07, 08, 09, 0a, 0b, 0c, 0d, 0e, 0f]"
        );

        let h = hex!("000102030405060708090a0b0c0d0e0f10");
        assert_eq!(
            format!("{:?}", DebugByteSlice(&h)),
            "17 bytes starting with [00, 01, 02, 03, 04, 05, 06, 07, 08, 09, 0a, 0b, 0c, 0d, 0e, 0f]"
        );
    }
}
