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

/// Root element of a cataloging XML document.
const CATALOG_ELEMENT: &str = "<pleno-elements>";

/// XML box (`xml\x20`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Xml {
    pub text: String,
}

impl Xml {
    /// Returns `true` if this box holds a cataloging document, which lists
    /// the plenoptic elements of the file.
    pub fn is_catalog(&self) -> bool {
        self.text.contains(CATALOG_ELEMENT)
    }
}

pub(crate) fn parse<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    _registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    let tbox = helper.tbox();
    let bytes = helper.payload_bytes()?;

    let text = String::from_utf8(bytes).map_err(|err| Error::InvalidContents {
        tbox,
        reason: err.to_string(),
    })?;

    Ok(BoxContents::Xml(Xml { text }))
}
