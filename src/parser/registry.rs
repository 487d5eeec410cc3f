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
    collections::HashMap,
    fmt::{Debug, Formatter},
    io::{Read, Seek},
};

use crate::{
    parser::{
        contents, BoundedStream, BoxContents, BoxHeader, BoxParserHelper, DecodeOptions,
        DecodedBox, Error, TypedBox,
    },
    BoxType,
};

/// Signature of a box parser.
///
/// The parser receives a helper positioned at the first payload byte of the
/// box and the registry itself, so that it can decode child boxes.
pub type ParseFn<R> =
    fn(&mut BoxParserHelper<R>, &ParserRegistry<R>) -> Result<BoxContents<R>, Error>;

/// Maps box types to the parsers that decode them.
///
/// A registry is built once and then only read while decoding, so one
/// instance can be shared by any number of decodes.
pub struct ParserRegistry<R> {
    parsers: HashMap<BoxType, ParseFn<R>>,
}

impl<R> ParserRegistry<R> {
    /// An empty registry. Every box decoded through it will be
    /// [`BoxContents::Unknown`].
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register `parser` for boxes of type `tbox`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateParser`] if a parser is already registered
    /// for `tbox`. Use [`replace`](Self::replace) to overwrite one.
    pub fn register(&mut self, tbox: BoxType, parser: ParseFn<R>) -> Result<(), Error> {
        if self.parsers.contains_key(&tbox) {
            return Err(Error::DuplicateParser(tbox));
        }

        self.parsers.insert(tbox, parser);
        Ok(())
    }

    /// Register `parser` for boxes of type `tbox`, returning the parser it
    /// displaced, if any.
    pub fn replace(&mut self, tbox: BoxType, parser: ParseFn<R>) -> Option<ParseFn<R>> {
        self.parsers.insert(tbox, parser)
    }

    pub fn is_registered(&self, tbox: BoxType) -> bool {
        self.parsers.contains_key(&tbox)
    }
}

impl<R: Read + Seek> ParserRegistry<R> {
    /// A registry holding a parser for every box type in
    /// [`contents`](crate::parser::contents).
    pub fn with_known_parsers() -> Self {
        Self {
            parsers: contents::known_parsers().into_iter().collect(),
        }
    }

    /// Decode the box at the stream's current position with default
    /// [`DecodeOptions`].
    ///
    /// The stream is left positioned just past the end of the box, whether
    /// or not the parser consumed the whole payload.
    pub fn parse(&self, stream: &mut BoundedStream<R>) -> Result<DecodedBox<R>, Error> {
        self.parse_with_options(stream, &DecodeOptions::default())
    }

    /// Decode the box at the stream's current position.
    ///
    /// # Errors
    ///
    /// Errors from the box header or from the parser are returned as-is.
    /// A box with no registered parser is not an error: it decodes to
    /// [`BoxContents::Unknown`].
    pub fn parse_with_options(
        &self,
        stream: &mut BoundedStream<R>,
        options: &DecodeOptions,
    ) -> Result<DecodedBox<R>, Error> {
        self.dispatch(stream, options, 0)
    }

    /// Decode the box at the stream's current position, which must have
    /// type `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongTypeCode`] without invoking any parser and
    /// without moving the stream if the next box has another type.
    pub fn parse_expecting(
        &self,
        stream: &mut BoundedStream<R>,
        expected: BoxType,
    ) -> Result<DecodedBox<R>, Error> {
        self.dispatch_expecting(stream, &DecodeOptions::default(), 0, expected)
    }

    /// Decode the box at the stream's current position if it has type
    /// `expected`. Otherwise, return `None` and leave the stream where it
    /// was.
    pub fn parse_optional(
        &self,
        stream: &mut BoundedStream<R>,
        expected: BoxType,
    ) -> Result<Option<DecodedBox<R>>, Error> {
        self.parse_optional_with_options(stream, expected, &DecodeOptions::default())
    }

    pub fn parse_optional_with_options(
        &self,
        stream: &mut BoundedStream<R>,
        expected: BoxType,
        options: &DecodeOptions,
    ) -> Result<Option<DecodedBox<R>>, Error> {
        if !stream.is_valid() || !BoxHeader::peek(stream)?.is_a_box_with_id(expected) {
            return Ok(None);
        }

        self.dispatch(stream, options, 0).map(Some)
    }

    /// Decode the box at the stream's current position and return its
    /// contents as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoParserRegistered`] if no parser is registered for
    /// `T::TBOX` and [`Error::WrongTypeCode`] if the next box has another
    /// type.
    pub fn parse_as<T: TypedBox<R>>(&self, stream: &mut BoundedStream<R>) -> Result<T, Error> {
        self.parse_as_with_options(stream, &DecodeOptions::default())
    }

    pub fn parse_as_with_options<T: TypedBox<R>>(
        &self,
        stream: &mut BoundedStream<R>,
        options: &DecodeOptions,
    ) -> Result<T, Error> {
        self.typed(stream, options, 0)
    }

    /// Decode the next child box inside the box `parent` is decoding.
    ///
    /// The child inherits the parent's options and sits one level deeper.
    pub fn parse_child(&self, parent: &mut BoxParserHelper<R>) -> Result<DecodedBox<R>, Error> {
        let options = *parent.options();
        let depth = parent.depth() + 1;
        self.dispatch(parent.stream_mut(), &options, depth)
    }

    /// Decode the next child box inside the box `parent` is decoding, which
    /// must hold contents of type `T`.
    pub fn parse_child_as<T: TypedBox<R>>(
        &self,
        parent: &mut BoxParserHelper<R>,
    ) -> Result<T, Error> {
        let options = *parent.options();
        let depth = parent.depth() + 1;
        self.typed(parent.stream_mut(), &options, depth)
    }

    fn typed<T: TypedBox<R>>(
        &self,
        stream: &mut BoundedStream<R>,
        options: &DecodeOptions,
        depth: usize,
    ) -> Result<T, Error> {
        if !self.is_registered(T::TBOX) {
            return Err(Error::NoParserRegistered(T::TBOX));
        }

        let decoded = self.dispatch_expecting(stream, options, depth, T::TBOX)?;
        let found = decoded.tbox();

        // Only reachable if a replacement parser returned foreign contents.
        T::from_contents(decoded.contents).ok_or(Error::WrongTypeCode {
            found,
            expected: T::TBOX,
        })
    }

    fn dispatch_expecting(
        &self,
        stream: &mut BoundedStream<R>,
        options: &DecodeOptions,
        depth: usize,
        expected: BoxType,
    ) -> Result<DecodedBox<R>, Error> {
        let header = BoxHeader::peek(stream)?;
        if !header.is_a_box_with_id(expected) {
            return Err(Error::WrongTypeCode {
                found: header.tbox,
                expected,
            });
        }

        self.dispatch(stream, options, depth)
    }

    fn dispatch(
        &self,
        stream: &mut BoundedStream<R>,
        options: &DecodeOptions,
        depth: usize,
    ) -> Result<DecodedBox<R>, Error> {
        if depth > options.depth_limit {
            return Err(Error::DepthLimitExceeded(options.depth_limit));
        }

        let header = BoxHeader::read(stream)?;
        let mut helper = BoxParserHelper::new(stream, header, *options, depth)?;

        let contents = match self.parsers.get(&header.tbox) {
            Some(parser) => parser(&mut helper, self)?,
            None => {
                log::debug!(
                    "no parser for {} box at {}; keeping {} payload bytes unparsed",
                    header.tbox,
                    header.position,
                    header.data_length()
                );
                BoxContents::Unknown(helper.remaining_input_slice())
            }
        };

        if helper.has_data_available() {
            log::trace!(
                "{} box at {}: parser left {} bytes unread",
                header.tbox,
                header.position,
                header.end() - helper.tell()
            );
        }

        stream.seek_to(header.end())?;

        Ok(DecodedBox { header, contents })
    }
}

impl<R> Default for ParserRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Debug for ParserRegistry<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&BoxType> = self.parsers.keys().collect();
        types.sort();
        f.debug_struct("ParserRegistry")
            .field("parsers", &types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use std::{
        cell::{Cell, RefCell},
        io::Cursor,
        rc::Rc,
    };

    use hex_literal::hex;
    use pretty_assertions_sorted::assert_eq;

    use super::*;
    use crate::parser::{InputSlice, ProfileAndLevel, Xml};

    type Source = Cursor<Vec<u8>>;

    fn reader_over(data: &[u8]) -> Rc<RefCell<Source>> {
        Rc::new(RefCell::new(Cursor::new(data.to_vec())))
    }

    fn stream_over(data: &[u8]) -> BoundedStream<Source> {
        BoundedStream::new(reader_over(data), 0, data.len() as u64).unwrap()
    }

    thread_local! {
        static CALLS: Cell<usize> = const { Cell::new(0) };
    }

    fn counting_parser(
        helper: &mut BoxParserHelper<Source>,
        _registry: &ParserRegistry<Source>,
    ) -> Result<BoxContents<Source>, Error> {
        CALLS.with(|calls| calls.set(calls.get() + 1));
        let bytes = helper.payload_bytes()?;
        Ok(BoxContents::Xml(Xml {
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }))
    }

    fn lazy_parser(
        _helper: &mut BoxParserHelper<Source>,
        _registry: &ParserRegistry<Source>,
    ) -> Result<BoxContents<Source>, Error> {
        Ok(BoxContents::ProfileAndLevel(ProfileAndLevel {
            profile: 7,
            level: 7,
        }))
    }

    const TWO_BOXES: [u8; 22] = hex!(
        "0000000c" // box size
        "74657374" // box type = 'test'
        "61626364" // 'abcd'
        // ----
        "0000000a" // box size
        "66726565" // box type = 'free'
        "0102"
    );

    #[test]
    fn registered_parser_invoked_once() {
        let test = BoxType(*b"test");

        let mut registry = ParserRegistry::<Source>::new();
        registry.register(test, counting_parser).unwrap();
        assert!(registry.is_registered(test));

        CALLS.with(|calls| calls.set(0));
        let mut stream = stream_over(&TWO_BOXES);

        let decoded = registry.parse(&mut stream).unwrap();
        assert_eq!(CALLS.with(Cell::get), 1);
        assert_eq!(decoded.tbox(), test);
        assert_eq!(decoded.position(), 0);
        assert_eq!(
            decoded.contents,
            BoxContents::Xml(Xml {
                text: "abcd".to_string()
            })
        );
        assert_eq!(stream.tell(), 12);
    }

    #[test]
    fn unregistered_box_is_unknown() {
        let reader = reader_over(&TWO_BOXES);
        let mut stream = BoundedStream::new(Rc::clone(&reader), 0, 22).unwrap();
        let registry = ParserRegistry::<Source>::new();

        let first = registry.parse(&mut stream).unwrap();
        assert!(!first.is_known());
        assert_eq!(
            first.contents,
            BoxContents::Unknown(InputSlice::new(Rc::clone(&reader), 8, 4))
        );

        let second = registry.parse(&mut stream).unwrap();
        assert_eq!(second.tbox(), BoxType(*b"free"));
        assert_eq!(
            second.contents,
            BoxContents::Unknown(InputSlice::new(reader, 20, 2))
        );
        assert!(!stream.is_valid());
    }

    #[test]
    fn wrong_type_never_invokes_parser() {
        let test = BoxType(*b"test");

        let mut registry = ParserRegistry::<Source>::new();
        registry.register(test, counting_parser).unwrap();
        registry.register(BoxType(*b"free"), counting_parser).unwrap();

        CALLS.with(|calls| calls.set(0));
        let mut stream = stream_over(&TWO_BOXES);

        assert_eq!(
            registry
                .parse_expecting(&mut stream, BoxType(*b"free"))
                .unwrap_err(),
            Error::WrongTypeCode {
                found: test,
                expected: BoxType(*b"free"),
            }
        );
        assert_eq!(CALLS.with(Cell::get), 0);
        assert_eq!(stream.tell(), 0);

        let decoded = registry.parse_expecting(&mut stream, test).unwrap();
        assert_eq!(decoded.tbox(), test);
        assert_eq!(CALLS.with(Cell::get), 1);
    }

    #[test]
    fn duplicate_registration() {
        let test = BoxType(*b"test");

        let mut registry = ParserRegistry::<Source>::new();
        registry.register(test, counting_parser).unwrap();

        assert_eq!(
            registry.register(test, lazy_parser).unwrap_err(),
            Error::DuplicateParser(test)
        );

        // The first parser is still in place.
        CALLS.with(|calls| calls.set(0));
        registry.parse(&mut stream_over(&TWO_BOXES)).unwrap();
        assert_eq!(CALLS.with(Cell::get), 1);

        assert!(registry.replace(test, lazy_parser).is_some());
        assert!(registry
            .replace(BoxType(*b"free"), lazy_parser)
            .is_none());

        let decoded = registry.parse(&mut stream_over(&TWO_BOXES)).unwrap();
        assert_eq!(
            decoded.contents,
            BoxContents::ProfileAndLevel(ProfileAndLevel {
                profile: 7,
                level: 7
            })
        );
        assert_eq!(CALLS.with(Cell::get), 1);
    }

    #[test]
    fn resync_after_partial_read() {
        let mut registry = ParserRegistry::<Source>::new();
        registry.register(BoxType(*b"test"), lazy_parser).unwrap();

        let mut stream = stream_over(&TWO_BOXES);
        registry.parse(&mut stream).unwrap();

        // The parser read nothing, but the stream is at the next box.
        assert_eq!(stream.tell(), 12);
        assert_eq!(
            registry.parse(&mut stream).unwrap().tbox(),
            BoxType(*b"free")
        );
    }

    #[test]
    fn parse_optional() {
        let registry = ParserRegistry::<Source>::new();
        let mut stream = stream_over(&TWO_BOXES);

        assert!(registry
            .parse_optional(&mut stream, BoxType(*b"free"))
            .unwrap()
            .is_none());
        assert_eq!(stream.tell(), 0);

        let decoded = registry
            .parse_optional(&mut stream, BoxType(*b"test"))
            .unwrap()
            .unwrap();
        assert_eq!(decoded.tbox(), BoxType(*b"test"));
        assert_eq!(stream.tell(), 12);
    }

    #[test]
    fn parse_optional_at_end_of_stream() {
        let registry = ParserRegistry::<Source>::new();
        let mut stream = stream_over(&TWO_BOXES);

        registry.parse(&mut stream).unwrap();
        registry.parse(&mut stream).unwrap();
        assert!(!stream.is_valid());

        assert!(registry
            .parse_optional(&mut stream, BoxType(*b"free"))
            .unwrap()
            .is_none());
        assert_eq!(stream.tell(), 22);
    }

    #[test]
    fn parse_as_requires_a_parser() {
        let registry = ParserRegistry::<Source>::new();

        assert_eq!(
            registry
                .parse_as::<ProfileAndLevel>(&mut stream_over(&TWO_BOXES))
                .unwrap_err(),
            Error::NoParserRegistered(BoxType::PROFILE_AND_LEVEL)
        );
    }

    #[test]
    fn parse_as_foreign_contents() {
        let mut registry = ParserRegistry::<Source>::new();
        registry.register(BoxType::XML, lazy_parser).unwrap();

        let boxes = hex!(
            "0000000c" // box size
            "786d6c20" // box type = 'xml '
            "3c612f3e" // '<a/>'
        );

        assert_eq!(
            registry.parse_as::<Xml>(&mut stream_over(&boxes)).unwrap_err(),
            Error::WrongTypeCode {
                found: BoxType::XML,
                expected: BoxType::XML,
            }
        );
    }

    #[test]
    fn known_parsers() {
        let registry = ParserRegistry::<Source>::with_known_parsers();

        for tbox in [
            BoxType::SIGNATURE,
            BoxType::JPL_SIGNATURE,
            BoxType::FILE_TYPE,
            BoxType::THUMBNAIL,
            BoxType::XML,
            BoxType::LIGHT_FIELD,
            BoxType::CONTIGUOUS_CODESTREAM,
        ] {
            assert!(registry.is_registered(tbox), "no parser for {tbox}");
        }

        assert!(!registry.is_registered(BoxType::POINT_CLOUD));
        assert!(!registry.is_registered(BoxType::HOLOGRAM));
    }

    #[test]
    fn debug() {
        let mut registry = ParserRegistry::<Source>::default();
        registry.register(BoxType(*b"test"), lazy_parser).unwrap();
        registry.register(BoxType::XML, lazy_parser).unwrap();

        assert_eq!(
            format!("{registry:?}"),
            "ParserRegistry { parsers: [b\"test\", b\"xml \"] }"
        );
    }
}
