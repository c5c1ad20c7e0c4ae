use chrono::{DateTime, FixedOffset};
use num_bigint::BigInt;

use crate::decoder::{self, time::check_utc_pivot};
use crate::error::{Error, Result};
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber};

/// Default upper bound of the century window UTCTime years resolve into.
pub const DEFAULT_UTC_TIME_TWO_DIGIT_YEAR_MAX: u16 = 2049;

/// Options controlling how a [`Reader`] interprets values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// The latest year a two digit UTCTime year may resolve to.
    pub utc_time_two_digit_year_max: u16,
    /// Accepts CER and DER SET OF values whose members are out of order.
    pub skip_set_sort_order_verification: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            utc_time_two_digit_year_max: DEFAULT_UTC_TIME_TWO_DIGIT_YEAR_MAX,
            skip_set_sort_order_verification: false,
        }
    }
}

impl ReaderOptions {
    pub fn with_utc_pivot(mut self, two_digit_year_max: u16) -> Result<Self> {
        check_utc_pivot(two_digit_year_max)?;
        self.utc_time_two_digit_year_max = two_digit_year_max;
        Ok(self)
    }

    pub fn skip_set_sort_order_verification(mut self, skip: bool) -> Self {
        self.skip_set_sort_order_verification = skip;
        self
    }
}

/// A cursor over a sequence of encoded values.
///
/// Each read checks the next value against the expected tag and the encoding
/// rules, then moves past it. A failed read leaves the position unchanged.
/// Constructed values are entered with [`Reader::read_sequence`] and
/// [`Reader::read_set_of`], which return a reader over the content.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    rules: EncodingRules,
    options: ReaderOptions,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8], rules: EncodingRules) -> Self {
        Reader::with_options(data, rules, ReaderOptions::default())
    }

    pub fn with_options(data: &'a [u8], rules: EncodingRules, options: ReaderOptions) -> Self {
        Reader {
            data,
            rules,
            options,
        }
    }

    pub fn rules(&self) -> EncodingRules {
        self.rules
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// The bytes not yet read.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }

    fn advance<T>(&mut self, (value, consumed): (T, usize)) -> T {
        self.data = &self.data[consumed..];
        value
    }

    fn child(&self, content: &'a [u8]) -> Reader<'a> {
        Reader::with_options(content, self.rules, self.options)
    }

    pub fn peek_tag(&self) -> Result<Tag> {
        Tag::decode(self.data).map(|(tag, _)| tag)
    }

    /// Returns the complete encoding of the next value without reading it.
    pub fn peek_encoded_value(&self) -> Result<&'a [u8]> {
        let value = decoder::read_encoded_value(self.data, self.rules)?;
        Ok(value.encoding(self.data))
    }

    /// Returns the content octets of the next value without reading it.
    pub fn peek_content_bytes(&self) -> Result<&'a [u8]> {
        let value = decoder::read_encoded_value(self.data, self.rules)?;
        Ok(value.content(self.data))
    }

    /// Reads the next value of any type and returns its complete encoding.
    pub fn read_encoded_value(&mut self) -> Result<&'a [u8]> {
        let value = decoder::read_encoded_value(self.data, self.rules)?;
        let encoding = value.encoding(self.data);
        self.data = &self.data[value.consumed..];
        Ok(encoding)
    }

    /// Fails if any bytes remain.
    pub fn ensure_finished(&self) -> Result<()> {
        if self.has_data() {
            return Err(Error::TrailingData(self.data.len()));
        }
        Ok(())
    }

    pub fn read_boolean(&mut self, tag: Option<Tag>) -> Result<bool> {
        let read = decoder::read_boolean(self.data, self.rules, tag)?;
        Ok(self.advance(read))
    }

    pub fn read_integer(&mut self, tag: Option<Tag>) -> Result<BigInt> {
        let read = decoder::read_integer(self.data, self.rules, tag)?;
        Ok(self.advance(read))
    }

    /// Reads an INTEGER and returns its two's complement content octets.
    pub fn read_integer_bytes(&mut self, tag: Option<Tag>) -> Result<&'a [u8]> {
        let read = decoder::read_integer_bytes(self.data, self.rules, tag)?;
        Ok(self.advance(read))
    }

    /// `Ok(None)` means the INTEGER does not fit and nothing was read.
    pub fn try_read_i32(&mut self, tag: Option<Tag>) -> Result<Option<i32>> {
        let read = decoder::try_read_i32(self.data, self.rules, tag)?;
        Ok(read.map(|read| self.advance(read)))
    }

    pub fn try_read_u32(&mut self, tag: Option<Tag>) -> Result<Option<u32>> {
        let read = decoder::try_read_u32(self.data, self.rules, tag)?;
        Ok(read.map(|read| self.advance(read)))
    }

    pub fn try_read_i64(&mut self, tag: Option<Tag>) -> Result<Option<i64>> {
        let read = decoder::try_read_i64(self.data, self.rules, tag)?;
        Ok(read.map(|read| self.advance(read)))
    }

    pub fn try_read_u64(&mut self, tag: Option<Tag>) -> Result<Option<u64>> {
        let read = decoder::try_read_u64(self.data, self.rules, tag)?;
        Ok(read.map(|read| self.advance(read)))
    }

    pub fn read_enumerated_bytes(&mut self, tag: Option<Tag>) -> Result<&'a [u8]> {
        let read = decoder::read_enumerated_bytes(self.data, self.rules, tag)?;
        Ok(self.advance(read))
    }

    pub fn read_enumerated_value<T: TryFrom<i64>>(&mut self, tag: Option<Tag>) -> Result<T> {
        let read = decoder::read_enumerated_value(self.data, self.rules, tag)?;
        Ok(self.advance(read))
    }

    pub fn read_null(&mut self, tag: Option<Tag>) -> Result<()> {
        let consumed = decoder::read_null(self.data, self.rules, tag)?;
        self.advance(((), consumed));
        Ok(())
    }

    /// Returns the data and the unused bit count of a BIT STRING.
    pub fn read_bit_string(&mut self, tag: Option<Tag>) -> Result<(Vec<u8>, u8)> {
        let (data, unused_bits, consumed) = decoder::read_bit_string(self.data, self.rules, tag)?;
        Ok(self.advance(((data, unused_bits), consumed)))
    }

    /// `Ok(None)` means the BIT STRING must be copied and nothing was read.
    pub fn try_read_primitive_bit_string(
        &mut self,
        tag: Option<Tag>,
    ) -> Result<Option<(&'a [u8], u8)>> {
        let read = decoder::try_read_primitive_bit_string(self.data, self.rules, tag)?;
        Ok(read.map(|(data, unused_bits, consumed)| self.advance(((data, unused_bits), consumed))))
    }

    pub fn read_named_bit_list(&mut self, tag: Option<Tag>) -> Result<u64> {
        let read = decoder::read_named_bit_list(self.data, self.rules, tag)?;
        Ok(self.advance(read))
    }

    pub fn read_octet_string(&mut self, tag: Option<Tag>) -> Result<Vec<u8>> {
        let read = decoder::read_octet_string(self.data, self.rules, tag)?;
        Ok(self.advance(read))
    }

    pub fn try_read_primitive_octet_string(&mut self, tag: Option<Tag>) -> Result<Option<&'a [u8]>> {
        let read = decoder::try_read_primitive_octet_string(self.data, self.rules, tag)?;
        Ok(read.map(|read| self.advance(read)))
    }

    pub fn read_object_identifier(&mut self, tag: Option<Tag>) -> Result<String> {
        let read = decoder::read_object_identifier(self.data, self.rules, tag)?;
        Ok(self.advance(read))
    }

    pub fn read_character_string(
        &mut self,
        universal: UniversalTagNumber,
        tag: Option<Tag>,
    ) -> Result<String> {
        let read = decoder::read_character_string(self.data, self.rules, universal, tag)?;
        Ok(self.advance(read))
    }

    pub fn try_read_primitive_character_string_bytes(
        &mut self,
        universal: UniversalTagNumber,
        tag: Option<Tag>,
    ) -> Result<Option<&'a [u8]>> {
        let read = decoder::try_read_primitive_character_string_bytes(
            self.data, self.rules, universal, tag,
        )?;
        Ok(read.map(|read| self.advance(read)))
    }

    pub fn read_generalized_time(&mut self, tag: Option<Tag>) -> Result<DateTime<FixedOffset>> {
        let read = decoder::read_generalized_time(self.data, self.rules, tag)?;
        Ok(self.advance(read))
    }

    /// Reads a UTCTime using the two digit year maximum from the options.
    pub fn read_utc_time(&mut self, tag: Option<Tag>) -> Result<DateTime<FixedOffset>> {
        self.read_utc_time_with_pivot(self.options.utc_time_two_digit_year_max, tag)
    }

    pub fn read_utc_time_with_pivot(
        &mut self,
        two_digit_year_max: u16,
        tag: Option<Tag>,
    ) -> Result<DateTime<FixedOffset>> {
        let read = decoder::read_utc_time(self.data, self.rules, two_digit_year_max, tag)?;
        Ok(self.advance(read))
    }

    /// Reads a SEQUENCE and returns a reader over its members.
    pub fn read_sequence(&mut self, tag: Option<Tag>) -> Result<Reader<'a>> {
        let read = decoder::read_sequence(self.data, self.rules, tag)?;
        let content = self.advance(read);
        Ok(self.child(content))
    }

    /// Reads a constructed value carrying `tag` and returns a reader over its
    /// members.
    pub fn read_constructed(&mut self, tag: Tag) -> Result<Reader<'a>> {
        let read = decoder::read_constructed(self.data, self.rules, tag)?;
        let content = self.advance(read);
        Ok(self.child(content))
    }

    /// Reads a SET OF and returns a reader over its members.
    pub fn read_set_of(&mut self, tag: Option<Tag>) -> Result<Reader<'a>> {
        let read = decoder::read_set_of(
            self.data,
            self.rules,
            self.options.skip_set_sort_order_verification,
            tag,
        )?;
        let content = self.advance(read);
        Ok(self.child(content))
    }

    /// Reads a SEQUENCE and runs `f` over its members, which must consume
    /// every member.
    pub fn sequence<T, F>(&mut self, tag: Option<Tag>, f: F) -> Result<T>
    where
        F: FnOnce(&mut Reader<'a>) -> Result<T>,
    {
        let read = decoder::read_sequence(self.data, self.rules, tag)?;
        let mut child = self.child(read.0);
        let value = f(&mut child)?;
        child.ensure_finished()?;
        self.advance(((), read.1));
        Ok(value)
    }
}
