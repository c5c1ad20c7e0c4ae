//! A generic ASN.1 value tree.
//!
//! [`ASN1Object`] holds every top-level value of an input as an [`Element`].
//! Decoding goes through [`ber::Reader`] and encoding through [`ber::Writer`],
//! so a tree read under one rule set can be written back under another.

use std::{fmt::Display, str::FromStr};

use ber::{
    DEFAULT_UTC_TIME_TWO_DIGIT_YEAR_MAX, EncodingRules, Reader, ReaderOptions, Tag,
    UniversalTagNumber, Writer,
};
use chrono::{DateTime, FixedOffset};
use error::{Error, Result};
use log::trace;
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    /// Decodes every top-level value in `bytes`.
    ///
    /// Nesting is walked with an explicit frame stack, so the depth of the
    /// input is bounded by memory rather than by the call stack.
    pub fn decode(bytes: &[u8], rules: EncodingRules, options: ReaderOptions) -> Result<Self> {
        let mut root = Reader::with_options(bytes, rules, options);
        let mut elements = Vec::new();
        let mut open: Vec<Frame<'_>> = Vec::new();

        loop {
            let (reader, siblings) = match open.last_mut() {
                Some(frame) => (&mut frame.reader, &mut frame.elements),
                None => (&mut root, &mut elements),
            };

            if !reader.has_data() {
                let Some(done) = open.pop() else {
                    break;
                };
                let element = done.into_element();
                match open.last_mut() {
                    Some(parent) => parent.elements.push(element),
                    None => elements.push(element),
                }
                continue;
            }

            match read_next(reader)? {
                Step::Value(element) => siblings.push(element),
                Step::Open(frame) => open.push(frame),
            }
        }

        Ok(ASN1Object { elements })
    }

    /// Encodes the tree under `rules`, writing UTCTime values for the
    /// default two digit year window.
    pub fn encode(&self, rules: EncodingRules) -> Result<Vec<u8>> {
        self.encode_with_utc_pivot(rules, DEFAULT_UTC_TIME_TWO_DIGIT_YEAR_MAX)
    }

    /// Encodes the tree under `rules`. UTCTime values must fall within the
    /// hundred years ending at `two_digit_year_max`.
    pub fn encode_with_utc_pivot(
        &self,
        rules: EncodingRules,
        two_digit_year_max: u16,
    ) -> Result<Vec<u8>> {
        let mut writer = Writer::new(rules);
        let mut tasks: Vec<Task<'_>> = self.elements.iter().rev().map(Task::Write).collect();

        while let Some(task) = tasks.pop() {
            let element = match task {
                Task::Close(Close::Sequence) => {
                    writer.pop_sequence(None)?;
                    continue;
                }
                Task::Close(Close::Set) => {
                    writer.pop_set_of(None)?;
                    continue;
                }
                Task::Close(Close::Tagged(tag)) => {
                    writer.pop_constructed(tag)?;
                    continue;
                }
                Task::Write(element) => element,
            };

            if let Some((close, children)) = element.write(&mut writer, two_digit_year_max)? {
                tasks.push(Task::Close(close));
                tasks.extend(children.iter().rev().map(Task::Write));
            }
        }

        Ok(writer.encode()?)
    }
}

/// A constructed value whose members are still being read.
struct Frame<'a> {
    reader: Reader<'a>,
    kind: FrameKind,
    elements: Vec<Element>,
}

#[derive(Clone, Copy)]
enum FrameKind {
    Sequence,
    Set,
    Tagged(Tag),
}

impl<'a> Frame<'a> {
    fn new(reader: Reader<'a>, kind: FrameKind) -> Self {
        Frame {
            reader,
            kind,
            elements: Vec::new(),
        }
    }

    fn into_element(self) -> Element {
        match self.kind {
            FrameKind::Sequence => Element::Sequence(self.elements),
            FrameKind::Set => Element::Set(self.elements),
            FrameKind::Tagged(tag) => Element::Tagged {
                tag,
                elements: self.elements,
            },
        }
    }
}

enum Step<'a> {
    Value(Element),
    Open(Frame<'a>),
}

enum Task<'e> {
    Write(&'e Element),
    Close(Close),
}

enum Close {
    Sequence,
    Set,
    Tagged(Tag),
}

fn read_next<'a>(reader: &mut Reader<'a>) -> Result<Step<'a>> {
    let tag = reader.peek_tag()?;
    trace!("element {}", tag);

    let Some(universal) = tag.universal_number() else {
        return read_opaque(reader, tag);
    };

    let element = match universal {
        UniversalTagNumber::EndOfContents => {
            return Err(ber::Error::EndOfContentsUnexpected.into());
        }
        UniversalTagNumber::Sequence => {
            let child = reader.read_sequence(None)?;
            return Ok(Step::Open(Frame::new(child, FrameKind::Sequence)));
        }
        UniversalTagNumber::Set => {
            let child = reader.read_set_of(None)?;
            return Ok(Step::Open(Frame::new(child, FrameKind::Set)));
        }
        UniversalTagNumber::Boolean => Element::Boolean(reader.read_boolean(None)?),
        UniversalTagNumber::Integer => Element::Integer(reader.read_integer(None)?.into()),
        UniversalTagNumber::Enumerated => {
            Element::Enumerated(Integer::from(reader.read_enumerated_bytes(None)?))
        }
        UniversalTagNumber::BitString => {
            let (data, unused) = reader.read_bit_string(None)?;
            Element::BitString(BitString::new(unused, data)?)
        }
        UniversalTagNumber::OctetString => {
            Element::OctetString(reader.read_octet_string(None)?.into())
        }
        UniversalTagNumber::Null => {
            reader.read_null(None)?;
            Element::Null
        }
        UniversalTagNumber::ObjectIdentifier => {
            Element::ObjectIdentifier(reader.read_object_identifier(None)?.parse()?)
        }
        UniversalTagNumber::UtcTime => Element::UTCTime(reader.read_utc_time(None)?),
        UniversalTagNumber::GeneralizedTime => {
            Element::GeneralizedTime(reader.read_generalized_time(None)?)
        }
        number if ber::encoding_for_tag(number).is_ok() => {
            let value = reader.read_character_string(number, None)?;
            Element::character_string(number, value)?
        }
        _ => return read_opaque(reader, tag),
    };
    Ok(Step::Value(element))
}

/// Reads a value without a dedicated variant. Constructed values keep their
/// tag and have their members decoded, primitive ones keep their content.
fn read_opaque<'a>(reader: &mut Reader<'a>, tag: Tag) -> Result<Step<'a>> {
    if tag.is_constructed() {
        let child = reader.read_constructed(tag)?;
        return Ok(Step::Open(Frame::new(child, FrameKind::Tagged(tag))));
    }
    Ok(Step::Value(read_raw(reader, tag)?))
}

fn read_raw(reader: &mut Reader<'_>, tag: Tag) -> Result<Element> {
    let content = reader.peek_content_bytes()?;
    reader.read_encoded_value()?;
    Ok(Element::Raw {
        tag,
        content: content.into(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    Enumerated(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    #[serde(rename = "utf8_string")]
    UTF8String(String),
    NumericString(String),
    PrintableString(String),
    #[serde(rename = "t61_string")]
    T61String(String),
    #[serde(rename = "ia5_string")]
    IA5String(String),
    VisibleString(String),
    #[serde(rename = "bmp_string")]
    BMPString(String),
    UniversalString(String),
    #[serde(rename = "utc_time")]
    UTCTime(DateTime<FixedOffset>),
    GeneralizedTime(DateTime<FixedOffset>),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    /// A constructed value without a dedicated variant, such as an explicit
    /// context-specific tag or a universal EXTERNAL.
    Tagged {
        #[serde(with = "tag_repr")]
        tag: Tag,
        elements: Vec<Element>,
    },
    /// A primitive value kept as its content octets: one outside the
    /// universal class or a universal type without a dedicated variant.
    ///
    /// A constructed tag is only accepted under BER, since the content is
    /// copied without being checked.
    Raw {
        #[serde(with = "tag_repr")]
        tag: Tag,
        content: OctetString,
    },
}

impl Element {
    /// Builds the character string variant for `universal`.
    pub fn character_string(universal: UniversalTagNumber, value: String) -> Result<Self> {
        let element = match universal {
            UniversalTagNumber::UTF8String => Element::UTF8String(value),
            UniversalTagNumber::NumericString => Element::NumericString(value),
            UniversalTagNumber::PrintableString => Element::PrintableString(value),
            UniversalTagNumber::T61String => Element::T61String(value),
            UniversalTagNumber::IA5String => Element::IA5String(value),
            UniversalTagNumber::VisibleString => Element::VisibleString(value),
            UniversalTagNumber::BMPString => Element::BMPString(value),
            UniversalTagNumber::UniversalString => Element::UniversalString(value),
            other => return Err(Error::ElementNotCharacterString(format!("{:?}", other))),
        };
        Ok(element)
    }

    /// Returns the string type and text of a character string element.
    pub fn as_character_string(&self) -> Option<(UniversalTagNumber, &str)> {
        let (universal, value) = match self {
            Element::UTF8String(s) => (UniversalTagNumber::UTF8String, s),
            Element::NumericString(s) => (UniversalTagNumber::NumericString, s),
            Element::PrintableString(s) => (UniversalTagNumber::PrintableString, s),
            Element::T61String(s) => (UniversalTagNumber::T61String, s),
            Element::IA5String(s) => (UniversalTagNumber::IA5String, s),
            Element::VisibleString(s) => (UniversalTagNumber::VisibleString, s),
            Element::BMPString(s) => (UniversalTagNumber::BMPString, s),
            Element::UniversalString(s) => (UniversalTagNumber::UniversalString, s),
            _ => return None,
        };
        Some((universal, value.as_str()))
    }

    /// The tag this element is written with.
    pub fn tag(&self) -> Tag {
        match self {
            Element::Boolean(_) => Tag::BOOLEAN,
            Element::Integer(_) => Tag::INTEGER,
            Element::Enumerated(_) => Tag::ENUMERATED,
            Element::BitString(_) => Tag::BIT_STRING,
            Element::OctetString(_) => Tag::OCTET_STRING,
            Element::Null => Tag::NULL,
            Element::ObjectIdentifier(_) => Tag::OBJECT_IDENTIFIER,
            Element::UTCTime(_) => Tag::UTC_TIME,
            Element::GeneralizedTime(_) => Tag::GENERALIZED_TIME,
            Element::Sequence(_) => Tag::SEQUENCE,
            Element::Set(_) => Tag::SET_OF,
            Element::Tagged { tag, .. } => tag.as_constructed(),
            Element::Raw { tag, .. } => *tag,
            string => match string.as_character_string() {
                Some((universal, _)) => Tag::universal(universal, false),
                None => Tag::NULL,
            },
        }
    }

    /// Writes a value, or opens the scope of a constructed element and
    /// returns the members still to be written.
    fn write(&self, writer: &mut Writer, two_digit_year_max: u16) -> Result<Option<(Close, &[Element])>> {
        match self {
            Element::Sequence(children) => {
                writer.push_sequence(None)?;
                return Ok(Some((Close::Sequence, children.as_slice())));
            }
            Element::Set(children) => {
                writer.push_set_of(None)?;
                return Ok(Some((Close::Set, children.as_slice())));
            }
            Element::Tagged { tag, elements } => {
                writer.push_constructed(*tag)?;
                return Ok(Some((Close::Tagged(*tag), elements.as_slice())));
            }
            Element::Boolean(b) => writer.write_boolean(*b, None)?,
            Element::Integer(i) => writer.write_big_integer(i.as_bigint(), None)?,
            Element::Enumerated(i) => writer.write_enumerated(i64::try_from(i)?, None)?,
            Element::BitString(bs) => writer.write_bit_string(bs.as_bytes(), bs.unused_bits(), None)?,
            Element::OctetString(os) => writer.write_octet_string(os.as_bytes(), None)?,
            Element::Null => writer.write_null(None)?,
            Element::ObjectIdentifier(oid) => writer.write_object_identifier(&oid.to_string(), None)?,
            Element::UTCTime(dt) => writer.write_utc_time_with_pivot(dt, two_digit_year_max, None)?,
            Element::GeneralizedTime(dt) => writer.write_generalized_time(dt, false, None)?,
            Element::Raw { tag, content } => {
                if tag.is_constructed() && writer.rules().is_canonical() {
                    return Err(ber::Error::InvalidArgument(
                        "raw constructed content cannot be written under CER or DER",
                    )
                    .into());
                }
                writer.write_encoded_value(&raw_encoding(*tag, content.as_bytes()))?
            }
            string => {
                if let Some((universal, value)) = string.as_character_string() {
                    writer.write_character_string(universal, value, None)?;
                }
            }
        }
        Ok(None)
    }
}

/// Re-wraps the content of a raw element with a definite length.
fn raw_encoding(tag: Tag, content: &[u8]) -> Vec<u8> {
    let mut out = tag.to_bytes();
    ber::length::encode_into(Some(content.len()), &mut out);
    out.extend_from_slice(content);
    out
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Boolean(b) => write!(f, "Boolean({})", b),
            Element::Integer(i) => write!(f, "Integer({})", i),
            Element::Enumerated(i) => write!(f, "Enumerated({})", i),
            Element::BitString(bs) => write!(f, "BitString({})", bs),
            Element::OctetString(os) => write!(f, "OctetString({})", os),
            Element::Null => write!(f, "Null"),
            Element::ObjectIdentifier(oid) => write!(f, "ObjectIdentifier({})", oid),
            Element::UTF8String(s) => write!(f, "UTF8String({})", s),
            Element::NumericString(s) => write!(f, "NumericString({})", s),
            Element::PrintableString(s) => write!(f, "PrintableString({})", s),
            Element::T61String(s) => write!(f, "T61String({})", s),
            Element::IA5String(s) => write!(f, "IA5String({})", s),
            Element::VisibleString(s) => write!(f, "VisibleString({})", s),
            Element::BMPString(s) => write!(f, "BMPString({})", s),
            Element::UniversalString(s) => write!(f, "UniversalString({})", s),
            Element::UTCTime(dt) => write!(f, "UTCTime({})", dt),
            Element::GeneralizedTime(dt) => write!(f, "GeneralizedTime({})", dt),
            Element::Sequence(seq) => write!(f, "Sequence({} elements)", seq.len()),
            Element::Set(set) => write!(f, "Set({} elements)", set.len()),
            Element::Tagged { tag, elements } => {
                write!(f, "Tagged({}, {} elements)", tag, elements.len())
            }
            Element::Raw { tag, content } => write!(f, "Raw({}, {})", tag, content),
        }
    }
}

/// Serde shape of a [`Tag`]: `{ "class": .., "number": .., "constructed": .. }`.
mod tag_repr {
    use ber::{Tag, TagClass};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Class {
        Universal,
        Application,
        ContextSpecific,
        Private,
    }

    #[derive(Serialize, Deserialize)]
    struct Repr {
        class: Class,
        number: u64,
        constructed: bool,
    }

    pub(crate) fn serialize<S: Serializer>(tag: &Tag, serializer: S) -> Result<S::Ok, S::Error> {
        let class = match tag.class() {
            TagClass::Universal => Class::Universal,
            TagClass::Application => Class::Application,
            TagClass::ContextSpecific => Class::ContextSpecific,
            TagClass::Private => Class::Private,
        };
        Repr {
            class,
            number: tag.number(),
            constructed: tag.is_constructed(),
        }
        .serialize(serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tag, D::Error> {
        let repr = Repr::deserialize(deserializer)?;
        let class = match repr.class {
            Class::Universal => TagClass::Universal,
            Class::Application => TagClass::Application,
            Class::ContextSpecific => TagClass::ContextSpecific,
            Class::Private => TagClass::Private,
        };
        Ok(Tag::new(class, repr.constructed, repr.number))
    }
}

// ASN1 integer is possible to be a positive and negative value.
// This can be arbitrary sized values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    /// Returns a reference to the inner BigInt
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    pub fn to_u32(&self) -> Option<u32> {
        self.inner.to_u32()
    }

    pub fn to_i32(&self) -> Option<i32> {
        self.inner.to_i32()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.inner.to_i64()
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }

    /// Returns the minimal two's complement big-endian encoding.
    pub fn to_signed_bytes_be(&self) -> Vec<u8> {
        self.inner.to_signed_bytes_be()
    }
}

impl Serialize for Integer {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.inner.to_string())
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let inner = s.parse::<BigInt>().map_err(serde::de::Error::custom)?;
        Ok(Integer { inner })
    }
}

impl From<BigInt> for Integer {
    fn from(inner: BigInt) -> Self {
        Integer { inner }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

/// Interprets two's complement big-endian content octets.
impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl TryFrom<&Integer> for i64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self> {
        value.inner.to_i64().ok_or(Error::IntegerOutOfRangeI64)
    }
}

impl TryFrom<Integer> for i64 {
    type Error = Error;

    fn try_from(value: Integer) -> Result<Self> {
        i64::try_from(&value)
    }
}

impl TryFrom<&Integer> for u64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self> {
        value.inner.to_u64().ok_or(Error::IntegerOutOfRangeU64)
    }
}

impl TryFrom<Integer> for u64 {
    type Error = Error;

    fn try_from(value: Integer) -> Result<Self> {
        u64::try_from(&value)
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// An OBJECT IDENTIFIER. Arcs are unbounded, so values such as UUID based
/// identifiers under `2.25` are represented exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<BigUint>,
}

impl ObjectIdentifier {
    pub fn arcs(&self) -> &[BigUint] {
        &self.inner
    }
}

impl Serialize for ObjectIdentifier {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectIdentifier {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectIdentifier::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, arc) in self.inner.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::ObjectIdentifierEmptyString);
        }

        let inner = s
            .split('.')
            .map(|component| {
                let well_formed = !component.is_empty()
                    && component.bytes().all(|b| b.is_ascii_digit())
                    && (component == "0" || !component.starts_with('0'));
                if !well_formed {
                    return Err(Error::ObjectIdentifierInvalidComponent(component.to_string()));
                }
                component
                    .parse::<BigUint>()
                    .map_err(|_| Error::ObjectIdentifierInvalidComponent(component.to_string()))
            })
            .collect::<Result<Vec<BigUint>>>()?;

        let [first, second, ..] = inner.as_slice() else {
            return Err(Error::ObjectIdentifierTooFewComponents);
        };
        if *first > BigUint::from(2u8) {
            return Err(Error::ObjectIdentifierInvalidComponent(first.to_string()));
        }
        if *first < BigUint::from(2u8) && *second >= BigUint::from(40u8) {
            return Err(Error::ObjectIdentifierSecondArcOutOfRange(second.to_string()));
        }

        Ok(ObjectIdentifier { inner })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl PartialEq<ObjectIdentifier> for &str {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        *self == other.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

#[derive(Deserialize)]
struct BitStringRepr {
    unused_bits: u8,
    bits: String,
}

impl Serialize for BitString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            use serde::ser::SerializeStruct;
            let mut state = serializer.serialize_struct("BitString", 3)?;
            state.serialize_field("bit_length", &self.bit_len())?;
            state.serialize_field("unused_bits", &self.unused)?;

            // Convert to hex string with colon separators
            let hex_string = self
                .data
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(":");
            state.serialize_field("bits", &hex_string)?;

            state.end()
        } else {
            (self.unused, &self.data).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for BitString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let repr = BitStringRepr::deserialize(deserializer)?;
            let data = parse_hex(&repr.bits).map_err(serde::de::Error::custom)?;
            BitString::new(repr.unused_bits, data).map_err(serde::de::Error::custom)
        } else {
            let (unused, data) = <(u8, Vec<u8>)>::deserialize(deserializer)?;
            BitString::new(unused, data).map_err(serde::de::Error::custom)
        }
    }
}

impl BitString {
    /// Creates a new BitString with the specified number of unused bits and data.
    /// At most 7 bits of the last byte may be unused.
    pub fn new(unused: u8, data: Vec<u8>) -> Result<Self> {
        if unused > 7 {
            return Err(Error::BitStringUnusedBitsOutOfRange(unused));
        }
        Ok(BitString { unused, data })
    }

    /// Returns the number of unused bits in the last byte
    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the total number of bits (excluding unused bits)
    pub fn bit_len(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.data.len() * 8 - self.unused as usize
        }
    }
}

impl AsRef<[u8]> for BitString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Display for BitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last = self.data.len().saturating_sub(1);
        for (i, byte) in self.data.iter().enumerate() {
            if i == last && self.unused > 0 {
                let bit_count = 8 - self.unused as usize;
                write!(f, "{:0bit_count$b}", byte >> self.unused, bit_count = bit_count)?;
            } else {
                write!(f, "{:08b}", byte)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl Serialize for OctetString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.inner.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for OctetString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let hex_string = String::deserialize(deserializer)?;
            let inner = parse_hex(&hex_string).map_err(serde::de::Error::custom)?;
            Ok(OctetString { inner })
        } else {
            let inner = Vec::<u8>::deserialize(deserializer)?;
            Ok(OctetString { inner })
        }
    }
}

/// Parses hex text, ignoring whitespace and `:` or `-` separators.
fn parse_hex(text: &str) -> std::result::Result<Vec<u8>, String> {
    let cleaned: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':' && *b != b'-')
        .collect();
    if cleaned.len() % 2 != 0 {
        return Err("hex string must have even length".to_string());
    }
    cleaned
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(|| format!("invalid hex digits '{}'", String::from_utf8_lossy(pair)))
        })
        .collect()
}

impl OctetString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(inner: Vec<u8>) -> Self {
        OctetString { inner }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.inner {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use ber::{EncodingRules, ReaderOptions, Tag, TagClass};
    use chrono::DateTime;
    use hex_literal::hex;
    use num_bigint::BigInt;
    use rstest::rstest;

    use super::{ASN1Object, BitString, Element, Integer, ObjectIdentifier, OctetString};
    use crate::error::Error;

    fn decode(input: &[u8], rules: EncodingRules) -> ASN1Object {
        ASN1Object::decode(input, rules, ReaderOptions::default()).unwrap()
    }

    #[test]
    fn test_decode_nested_structure() {
        let input = hex!("300d 020105 0c03616263 a003 0101ff");
        let obj = decode(&input, EncodingRules::Der);
        assert_eq!(
            obj.elements(),
            &[Element::Sequence(vec![
                Element::Integer(Integer::from(5)),
                Element::UTF8String("abc".to_string()),
                Element::Tagged {
                    tag: Tag::context_specific(0, true),
                    elements: vec![Element::Boolean(true)],
                },
            ])]
        );
        assert_eq!(obj.encode(EncodingRules::Der).unwrap(), input);
    }

    #[test]
    fn test_decode_multiple_top_level_values() {
        let input = hex!("0500 020101 0101ff");
        let obj = decode(&input, EncodingRules::Der);
        assert_eq!(
            obj.elements(),
            &[
                Element::Null,
                Element::Integer(Integer::from(1)),
                Element::Boolean(true)
            ]
        );
    }

    #[rstest]
    #[case(EncodingRules::Der, &hex!("300c 04020102 3106 0401aa 0401bb"))]
    #[case(EncodingRules::Cer, &hex!("3080 04020102 3180 0401aa 0401bb 0000 0000"))]
    #[case(EncodingRules::Ber, &hex!("300c 04020102 3106 0401bb 0401aa"))]
    fn test_transcode_from_ber(#[case] rules: EncodingRules, #[case] expected: &[u8]) {
        let input = hex!("3080 2480 040101 040102 0000 3180 0401bb 0401aa 0000 0000");
        let obj = decode(&input, EncodingRules::Ber);
        assert_eq!(obj.encode(rules).unwrap(), expected);

        // the canonical forms read back under their own rules
        if rules.is_canonical() {
            let again = decode(expected, rules);
            assert_eq!(again.encode(rules).unwrap(), expected);
        }
    }

    #[rstest]
    // primitive context-specific value
    #[case(&hex!("8003 010203"), Tag::context_specific(0, false), &hex!("010203"))]
    // application class
    #[case(&hex!("4101 ff"), Tag::application(1, false), &hex!("ff"))]
    // universal type without a dedicated variant (REAL)
    #[case(&hex!("0901 40"), Tag::new(TagClass::Universal, false, 9), &hex!("40"))]
    fn test_decode_raw(#[case] input: &[u8], #[case] tag: Tag, #[case] content: &[u8]) {
        let obj = decode(input, EncodingRules::Der);
        assert_eq!(
            obj.elements(),
            &[Element::Raw {
                tag,
                content: OctetString::from(content),
            }]
        );
        assert_eq!(obj.encode(EncodingRules::Der).unwrap(), input);
    }

    #[rstest]
    // EXTERNAL holding an indefinite SEQUENCE
    #[case(
        &hex!("2880 3080 0000 0000"),
        Tag::new(TagClass::Universal, true, 8),
        EncodingRules::Der,
        &hex!("2802 3000")
    )]
    #[case(
        &hex!("2880 3080 0000 0000"),
        Tag::new(TagClass::Universal, true, 8),
        EncodingRules::Cer,
        &hex!("2880 3080 0000 0000")
    )]
    #[case(
        &hex!("a080 3080 0000 0000"),
        Tag::context_specific(0, true),
        EncodingRules::Der,
        &hex!("a002 3000")
    )]
    // undefined universal number
    #[case(
        &hex!("3f2a80 0101ff 0000"),
        Tag::new(TagClass::Universal, true, 42),
        EncodingRules::Der,
        &hex!("3f2a03 0101ff")
    )]
    fn test_transcode_constructed_without_variant(
        #[case] input: &[u8],
        #[case] tag: Tag,
        #[case] rules: EncodingRules,
        #[case] expected: &[u8],
    ) {
        let obj = decode(input, EncodingRules::Ber);
        match &obj.elements()[0] {
            Element::Tagged { tag: decoded, .. } => assert_eq!(*decoded, tag),
            other => panic!("expected a tagged element, got {:?}", other),
        }
        assert_eq!(obj.encode(rules).unwrap(), expected);
    }

    #[test]
    fn test_encode_raw_constructed_requires_ber() {
        let obj = ASN1Object::new(vec![Element::Raw {
            tag: Tag::new(TagClass::Universal, true, 8),
            content: OctetString::from(hex!("3080 0000").as_slice()),
        }]);
        assert_eq!(obj.encode(EncodingRules::Ber).unwrap(), hex!("2804 3080 0000"));
        for rules in [EncodingRules::Cer, EncodingRules::Der] {
            assert!(matches!(
                obj.encode(rules).unwrap_err(),
                Error::Ber(ber::Error::InvalidArgument(_))
            ));
        }
    }

    #[rstest]
    #[case(&hex!("1303 414243"), Element::PrintableString("ABC".to_string()))]
    #[case(&hex!("1e04 00680069"), Element::BMPString("hi".to_string()))]
    #[case(&hex!("1a02 6869"), Element::VisibleString("hi".to_string()))]
    #[case(&hex!("1603 614062"), Element::IA5String("a@b".to_string()))]
    #[case(&hex!("1203 313233"), Element::NumericString("123".to_string()))]
    #[case(&hex!("1c08 0000006800000069"), Element::UniversalString("hi".to_string()))]
    #[case(&hex!("1402 6869"), Element::T61String("hi".to_string()))]
    #[case(&hex!("0a0102"), Element::Enumerated(Integer::from(2)))]
    #[case(&hex!("0302 04f0"), Element::BitString(BitString::new(4, vec![0xf0]).unwrap()))]
    #[case(&hex!("0609 2a864886f70d010101"), Element::ObjectIdentifier(ObjectIdentifier::from_str("1.2.840.113549.1.1.1").unwrap()))]
    #[case(
        &hex!("170d 3139313231363033303231305a"),
        Element::UTCTime(DateTime::parse_from_rfc3339("2019-12-16T03:02:10Z").unwrap())
    )]
    #[case(
        &hex!("1811 32303139313231363033303231302e355a"),
        Element::GeneralizedTime(DateTime::parse_from_rfc3339("2019-12-16T03:02:10.5Z").unwrap())
    )]
    fn test_decode_value(#[case] input: &[u8], #[case] expected: Element) {
        let obj = decode(input, EncodingRules::Der);
        assert_eq!(obj.elements(), &[expected]);
        assert_eq!(obj.encode(EncodingRules::Der).unwrap(), input);
    }

    #[rstest]
    #[case(&hex!("0000"), EncodingRules::Ber, Error::Ber(ber::Error::EndOfContentsUnexpected))]
    #[case(&hex!("3003 020101 ff"), EncodingRules::Der, Error::Ber(ber::Error::Incomplete))]
    #[case(&hex!("3105 0500 0101ff"), EncodingRules::Der, Error::Ber(ber::Error::SetOfUnsorted))]
    #[case(&hex!("0202 007f"), EncodingRules::Ber, Error::Ber(ber::Error::IntegerNonMinimal))]
    fn test_decode_error(
        #[case] input: &[u8],
        #[case] rules: EncodingRules,
        #[case] expected: Error,
    ) {
        let err = ASN1Object::decode(input, rules, ReaderOptions::default()).unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn test_decode_skips_set_order_verification() {
        let input = hex!("3106 0401bb 0401aa");
        let options = ReaderOptions::default().skip_set_sort_order_verification(true);
        let obj = ASN1Object::decode(&input, EncodingRules::Der, options).unwrap();
        assert_eq!(
            obj.encode(EncodingRules::Der).unwrap(),
            hex!("3106 0401aa 0401bb")
        );
    }

    #[test]
    fn test_decode_deeply_nested_indefinite() {
        const DEPTH: usize = 500;
        let mut input = Vec::new();
        for _ in 0..DEPTH {
            input.extend_from_slice(&[0x30, 0x80]);
        }
        input.extend_from_slice(&[0x05, 0x00]);
        for _ in 0..DEPTH {
            input.extend_from_slice(&[0x00, 0x00]);
        }

        let obj = decode(&input, EncodingRules::Ber);
        let mut depth = 0;
        let mut current = &obj.elements()[0];
        while let Element::Sequence(children) = current {
            depth += 1;
            current = &children[0];
        }
        assert_eq!(depth, DEPTH);
        assert_eq!(current, &Element::Null);

        let der = obj.encode(EncodingRules::Der).unwrap();
        assert_eq!(decode(&der, EncodingRules::Der), obj);
        assert_eq!(obj.encode(EncodingRules::Cer).unwrap(), input);
    }

    #[test]
    fn test_utc_time_pivot() {
        let input = hex!("170d 3530303130313030303030305a");

        let obj = decode(&input, EncodingRules::Der);
        assert_eq!(
            obj.elements(),
            &[Element::UTCTime(
                DateTime::parse_from_rfc3339("1950-01-01T00:00:00Z").unwrap()
            )]
        );

        let options = ReaderOptions::default().with_utc_pivot(2060).unwrap();
        let obj = ASN1Object::decode(&input, EncodingRules::Der, options).unwrap();
        assert_eq!(
            obj.elements(),
            &[Element::UTCTime(
                DateTime::parse_from_rfc3339("2050-01-01T00:00:00Z").unwrap()
            )]
        );
        assert_eq!(
            obj.encode_with_utc_pivot(EncodingRules::Der, 2060).unwrap(),
            input
        );
        assert!(matches!(
            obj.encode(EncodingRules::Der).unwrap_err(),
            Error::Ber(ber::Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_encode_enumerated_out_of_range() {
        let obj = decode(&hex!("0a09 010000000000000000"), EncodingRules::Der);
        assert_eq!(
            obj.encode(EncodingRules::Der).unwrap_err(),
            Error::IntegerOutOfRangeI64
        );
    }

    #[test]
    fn test_encode_rejects_unrepresentable_string() {
        let obj = ASN1Object::new(vec![Element::PrintableString("a@b".to_string())]);
        assert!(matches!(
            obj.encode(EncodingRules::Der).unwrap_err(),
            Error::Ber(ber::Error::InvalidArgument(_))
        ));
    }

    #[rstest]
    #[case(Element::Integer(Integer::from(5)), r#"{"type":"integer","value":"5"}"#)]
    #[case(Element::Null, r#"{"type":"null"}"#)]
    #[case(Element::OctetString(OctetString::from(vec![0x01, 0x02])), r#"{"type":"octet_string","value":"0102"}"#)]
    #[case(Element::UTF8String("abc".to_string()), r#"{"type":"utf8_string","value":"abc"}"#)]
    #[case(
        Element::ObjectIdentifier(ObjectIdentifier::from_str("2.5.4.3").unwrap()),
        r#"{"type":"object_identifier","value":"2.5.4.3"}"#
    )]
    #[case(
        Element::BitString(BitString::new(4, vec![0xa0, 0xf0]).unwrap()),
        r#"{"type":"bit_string","value":{"bit_length":12,"unused_bits":4,"bits":"a0:f0"}}"#
    )]
    #[case(
        Element::Tagged { tag: Tag::context_specific(0, true), elements: vec![Element::Boolean(true)] },
        r#"{"type":"tagged","value":{"tag":{"class":"context_specific","number":0,"constructed":true},"elements":[{"type":"boolean","value":true}]}}"#
    )]
    fn test_element_serialize(#[case] input: Element, #[case] expected_json: &str) {
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(json, expected_json);
    }

    #[test]
    fn test_object_serialize_deserialize_roundtrip() {
        let input = hex!("3023 020105 0c03616263 a003 0101ff 8001 aa 0302 04f0 170d 3139313231363033303231305a");
        let obj = decode(&input, EncodingRules::Der);
        let json = serde_json::to_string(&obj).unwrap();
        let deserialized: ASN1Object = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, obj);
        assert_eq!(deserialized.encode(EncodingRules::Der).unwrap(), input);
    }

    #[rstest]
    #[case("1.2.840.113549")]
    #[case("2.999")]
    #[case("0.39")]
    #[case("2.25.329800735698586629295641978511506172918")]
    fn test_object_identifier_from_string(#[case] input: &str) {
        let oid = ObjectIdentifier::from_str(input).unwrap();
        assert_eq!(oid.to_string(), input);
        assert_eq!(oid, input);
    }

    #[rstest]
    #[case("", Error::ObjectIdentifierEmptyString)]
    #[case("1", Error::ObjectIdentifierTooFewComponents)]
    #[case("1.a", Error::ObjectIdentifierInvalidComponent("a".to_string()))]
    #[case("1..2", Error::ObjectIdentifierInvalidComponent("".to_string()))]
    #[case("1.02", Error::ObjectIdentifierInvalidComponent("02".to_string()))]
    #[case("3.1", Error::ObjectIdentifierInvalidComponent("3".to_string()))]
    #[case("1.40", Error::ObjectIdentifierSecondArcOutOfRange("40".to_string()))]
    fn test_object_identifier_from_string_error(#[case] input: &str, #[case] expected: Error) {
        assert_eq!(ObjectIdentifier::from_str(input).unwrap_err(), expected);
    }

    #[test]
    fn test_object_identifier_large_arc_roundtrip() {
        let oid = "2.25.329800735698586629295641978511506172918";
        let obj = ASN1Object::new(vec![Element::ObjectIdentifier(
            ObjectIdentifier::from_str(oid).unwrap(),
        )]);
        let der = obj.encode(EncodingRules::Der).unwrap();
        assert_eq!(decode(&der, EncodingRules::Der), obj);
    }

    #[rstest(input, expected,
        case(Integer::from(0), Some(0)),
        case(Integer::from(-1), Some(-1)),
        case(Integer::from(i64::MAX), Some(i64::MAX)),
        case(Integer::from(BigInt::from(i64::MAX) + 1), None),
    )]
    fn test_integer_to_i64(input: Integer, expected: Option<i64>) {
        assert_eq!(i64::try_from(&input).ok(), expected);
    }

    #[test]
    fn test_integer_to_u64() {
        assert_eq!(u64::try_from(Integer::from(7)).unwrap(), 7);
        assert_eq!(
            u64::try_from(Integer::from(-7)).unwrap_err(),
            Error::IntegerOutOfRangeU64
        );
    }

    #[rstest(input, expected,
        // Test case: No unused bits, single byte
        case(BitString { unused: 0, data: vec![0b10101010] }, "10101010"),
        // Test case: No unused bits, multiple bytes
        case(BitString { unused: 0, data: vec![0b10101010, 0b11001100] }, "1010101011001100"),
        // Test case: Unused bits in the last byte
        case(BitString { unused: 2, data: vec![0b10101010, 0b11001100] }, "10101010110011"),
        // Test case: Empty data
        case(BitString { unused: 0, data: vec![] }, ""),
        // Test case: Single byte with unused bits
        case(BitString { unused: 4, data: vec![0b10100000] }, "1010"),
    )]
    fn test_bitstring_to_string(input: BitString, expected: &str) {
        assert_eq!(input.to_string(), expected);
    }

    #[test]
    fn test_bitstring_bit_len() {
        assert_eq!(BitString::new(4, vec![0xa0, 0xf0]).unwrap().bit_len(), 12);
        assert_eq!(BitString::new(0, vec![]).unwrap().bit_len(), 0);
    }

    #[test]
    fn test_bitstring_unused_bits_out_of_range() {
        assert_eq!(
            BitString::new(8, vec![0xff]).unwrap_err(),
            Error::BitStringUnusedBitsOutOfRange(8)
        );
        let json = r#"{"bit_length":0,"unused_bits":9,"bits":"ff"}"#;
        assert!(serde_json::from_str::<BitString>(json).is_err());
    }

    #[rstest(input, expected,
        case(OctetString { inner: vec![] }, ""),
        case(OctetString { inner: vec![0x01, 0x02, 0x03] }, "010203"),
        case(OctetString { inner: vec![0x00, 0x7f, 0x80, 0xff] }, "007f80ff")
    )]
    fn test_octetstring_to_string(input: OctetString, expected: &str) {
        assert_eq!(input.to_string(), expected);
    }

    #[rstest(json_input, expected,
        case(r#""""#, OctetString { inner: vec![] }),
        case(r#""010203""#, OctetString { inner: vec![0x01, 0x02, 0x03] }),
        // Test case: Uppercase hex
        case(r#""FFABCD""#, OctetString { inner: vec![0xff, 0xab, 0xcd] }),
        // Test case: Separators are ignored
        case(r#""ff:ab-cd 01""#, OctetString { inner: vec![0xff, 0xab, 0xcd, 0x01] }),
    )]
    fn test_octetstring_deserialize(json_input: &str, expected: OctetString) {
        let octet_string: OctetString = serde_json::from_str(json_input).unwrap();
        assert_eq!(octet_string, expected);
    }

    #[rstest(json_input,
        case(r#""abc""#),
        case(r#""zz""#),
    )]
    fn test_octetstring_deserialize_error(json_input: &str) {
        assert!(serde_json::from_str::<OctetString>(json_input).is_err());
    }
}
