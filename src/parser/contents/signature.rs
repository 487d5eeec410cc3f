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

use crate::parser::{BoxContents, BoxParserHelper, Error, ParserRegistry};

const JPL_SIGNATURE: [u8; 4] = [0x0d, 0x0a, 0x87, 0x0a];

/// JPEG Pleno signature box.
///
/// The box has no fields; it is valid only if it holds exactly the 4-byte
/// signature `<CR><LF><0x87><LF>`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Signature;

impl Signature {
    pub fn bytes(&self) -> [u8; 4] {
        JPL_SIGNATURE
    }
}

pub(crate) fn parse<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    _registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    let found = helper.get_n_bytes(helper.data_length().min(4) as usize)?;

    if found != JPL_SIGNATURE || helper.has_data_available() {
        return Err(Error::InvalidSignature(found));
    }

    Ok(BoxContents::Signature(Signature))
}
