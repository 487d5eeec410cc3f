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
    parser::{
        BitsPerComponent, BoxContents, BoxParserHelper, ChannelDefinition, ColourSpecification,
        ContiguousCodestream, Error, ParserRegistry,
    },
    BoxType,
};

/// JPEG Pleno thumbnail box (`jpth`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Thumbnail<R> {
    pub bits_per_component: Option<BitsPerComponent>,
    pub colour_specifications: Vec<ColourSpecification>,
    pub channel_definition: Option<ChannelDefinition>,
    pub codestream: Option<ContiguousCodestream<R>>,
}

pub(crate) fn parse<R: Read + Seek>(
    helper: &mut BoxParserHelper<R>,
    registry: &ParserRegistry<R>,
) -> Result<BoxContents<R>, Error> {
    let mut thumbnail = Thumbnail {
        bits_per_component: None,
        colour_specifications: vec![],
        channel_definition: None,
        codestream: None,
    };

    while helper.has_data_available() {
        let child = registry.parse_child(helper)?;
        // The first of each single-valued child box wins.
        match child.contents {
            BoxContents::BitsPerComponent(bpcc) if thumbnail.bits_per_component.is_none() => {
                thumbnail.bits_per_component = Some(bpcc);
            }
            BoxContents::ColourSpecification(colr) => thumbnail.colour_specifications.push(colr),
            BoxContents::ChannelDefinition(cdef) if thumbnail.channel_definition.is_none() => {
                thumbnail.channel_definition = Some(cdef);
            }
            BoxContents::ContiguousCodestream(jp2c) if thumbnail.codestream.is_none() => {
                thumbnail.codestream = Some(jp2c);
            }
            _ => log::debug!(
                "skipping {} box at {} inside thumbnail box",
                child.header.tbox,
                child.header.position
            ),
        }
    }

    if thumbnail.colour_specifications.is_empty() {
        return Err(Error::MissingColourSpecification(BoxType::THUMBNAIL));
    }

    Ok(BoxContents::Thumbnail(thumbnail))
}
