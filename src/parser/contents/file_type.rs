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

use nom::{
    combinator::map, multi::many0, number::complete::be_u32, sequence::tuple, IResult,
};

use crate::{
    parser::{BoxContents, BoxParserHelper, Error, ParserRegistry},
    BoxType,
};

/// File type box (`ftyp`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileType {
    /// Brand (`BR`).
    pub brand: BoxType,

    /// Minor version (`MinV`).
    pub minor_version: u32,

    /// Compatibility list (`CL`).
    pub compatibility_list: Vec<BoxType>,
}

impl FileType {
    /// Returns `true` if `brand` appears in the compatibility list.
    pub fn is_compatible_with(&self, brand: BoxType) -> bool {
        self.compatibility_list.contains(&brand)
    }
}

fn file_type_fields(i: &[u8]) -> IResult<&[u8], FileType> {
    map(
        tuple((
            map(be_u32, BoxType::from),
            be_u32,
            many0(map(be_u32, BoxType::from)),
        )),
        |(brand, minor_version, compatibility_list)| FileType {
            brand,
            minor_version,
            compatibility_list,
        },
    )(i)
}

pub(crate) fn parse<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    _registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    helper
        .parse_payload(file_type_fields)
        .map(BoxContents::FileType)
}
