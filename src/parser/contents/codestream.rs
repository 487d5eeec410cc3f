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

use crate::parser::{BoxContents, BoxData, BoxParserHelper, Error, ParserRegistry};

/// Contiguous codestream box (`jp2c`).
///
/// The codestream itself is opaque to this crate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContiguousCodestream<R> {
    pub data: BoxData<R>,
}

pub(crate) fn parse<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    _registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    let data = if helper.data_length() <= helper.options().in_memory_limit {
        BoxData::InMemory(helper.payload_bytes()?)
    } else {
        let slice = helper.remaining_input_slice();
        helper.skip_to_end();
        BoxData::Lazy(slice)
    };

    Ok(BoxContents::ContiguousCodestream(ContiguousCodestream {
        data,
    }))
}
