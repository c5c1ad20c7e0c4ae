use std::fmt;

use crate::error::{Error, Result};

const CLASS_SHIFT: u8 = 6;
const CONSTRUCTED_FLAG: u8 = 0x20;
const HIGH_TAG_NUMBER: u8 = 0x1F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagClass {
    Universal = 0,
    Application = 1,
    ContextSpecific = 2,
    Private = 3,
}

impl TagClass {
    fn from_identifier(octet: u8) -> Self {
        match octet >> CLASS_SHIFT {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }
}

/// Tag numbers assigned to the universal class by X.680.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UniversalTagNumber {
    EndOfContents = 0,
    Boolean = 1,
    Integer = 2,
    BitString = 3,
    OctetString = 4,
    Null = 5,
    ObjectIdentifier = 6,
    ObjectDescriptor = 7,
    External = 8,
    Real = 9,
    Enumerated = 10,
    Embedded = 11,
    UTF8String = 12,
    RelativeObjectIdentifier = 13,
    Time = 14,
    Sequence = 16,
    Set = 17,
    NumericString = 18,
    PrintableString = 19,
    T61String = 20,
    VideotexString = 21,
    IA5String = 22,
    UtcTime = 23,
    GeneralizedTime = 24,
    GraphicString = 25,
    VisibleString = 26,
    GeneralString = 27,
    UniversalString = 28,
    UnrestrictedCharacterString = 29,
    BMPString = 30,
    Date = 31,
    TimeOfDay = 32,
    DateTime = 33,
    Duration = 34,
    ObjectIdentifierIRI = 35,
    RelativeObjectIdentifierIRI = 36,
}

impl UniversalTagNumber {
    pub fn from_number(number: u64) -> Option<Self> {
        use UniversalTagNumber::*;
        let value = match number {
            0 => EndOfContents,
            1 => Boolean,
            2 => Integer,
            3 => BitString,
            4 => OctetString,
            5 => Null,
            6 => ObjectIdentifier,
            7 => ObjectDescriptor,
            8 => External,
            9 => Real,
            10 => Enumerated,
            11 => Embedded,
            12 => UTF8String,
            13 => RelativeObjectIdentifier,
            14 => Time,
            16 => Sequence,
            17 => Set,
            18 => NumericString,
            19 => PrintableString,
            20 => T61String,
            21 => VideotexString,
            22 => IA5String,
            23 => UtcTime,
            24 => GeneralizedTime,
            25 => GraphicString,
            26 => VisibleString,
            27 => GeneralString,
            28 => UniversalString,
            29 => UnrestrictedCharacterString,
            30 => BMPString,
            31 => Date,
            32 => TimeOfDay,
            33 => DateTime,
            34 => Duration,
            35 => ObjectIdentifierIRI,
            36 => RelativeObjectIdentifierIRI,
            _ => return None,
        };
        Some(value)
    }

    pub fn number(self) -> u64 {
        self as u64
    }

    fn name(self) -> &'static str {
        use UniversalTagNumber::*;
        match self {
            EndOfContents => "END-OF-CONTENTS",
            Boolean => "BOOLEAN",
            Integer => "INTEGER",
            BitString => "BIT STRING",
            OctetString => "OCTET STRING",
            Null => "NULL",
            ObjectIdentifier => "OBJECT IDENTIFIER",
            ObjectDescriptor => "ObjectDescriptor",
            External => "EXTERNAL",
            Real => "REAL",
            Enumerated => "ENUMERATED",
            Embedded => "EMBEDDED PDV",
            UTF8String => "UTF8String",
            RelativeObjectIdentifier => "RELATIVE-OID",
            Time => "TIME",
            Sequence => "SEQUENCE",
            Set => "SET",
            NumericString => "NumericString",
            PrintableString => "PrintableString",
            T61String => "T61String",
            VideotexString => "VideotexString",
            IA5String => "IA5String",
            UtcTime => "UTCTime",
            GeneralizedTime => "GeneralizedTime",
            GraphicString => "GraphicString",
            VisibleString => "VisibleString",
            GeneralString => "GeneralString",
            UniversalString => "UniversalString",
            UnrestrictedCharacterString => "CHARACTER STRING",
            BMPString => "BMPString",
            Date => "DATE",
            TimeOfDay => "TIME-OF-DAY",
            DateTime => "DATE-TIME",
            Duration => "DURATION",
            ObjectIdentifierIRI => "OID-IRI",
            RelativeObjectIdentifierIRI => "RELATIVE-OID-IRI",
        }
    }
}

/// An ASN.1 identifier: class, primitive/constructed flag and tag number.
///
/// Tags are plain values. [`Tag::as_constructed`] and [`Tag::as_primitive`]
/// return a copy with the flag changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    class: TagClass,
    constructed: bool,
    number: u64,
}

impl Tag {
    pub const END_OF_CONTENTS: Tag = Tag::universal_primitive(UniversalTagNumber::EndOfContents);
    pub const BOOLEAN: Tag = Tag::universal_primitive(UniversalTagNumber::Boolean);
    pub const INTEGER: Tag = Tag::universal_primitive(UniversalTagNumber::Integer);
    pub const BIT_STRING: Tag = Tag::universal_primitive(UniversalTagNumber::BitString);
    pub const CONSTRUCTED_BIT_STRING: Tag = Tag::BIT_STRING.as_constructed();
    pub const OCTET_STRING: Tag = Tag::universal_primitive(UniversalTagNumber::OctetString);
    pub const CONSTRUCTED_OCTET_STRING: Tag = Tag::OCTET_STRING.as_constructed();
    pub const NULL: Tag = Tag::universal_primitive(UniversalTagNumber::Null);
    pub const OBJECT_IDENTIFIER: Tag =
        Tag::universal_primitive(UniversalTagNumber::ObjectIdentifier);
    pub const ENUMERATED: Tag = Tag::universal_primitive(UniversalTagNumber::Enumerated);
    pub const UTF8_STRING: Tag = Tag::universal_primitive(UniversalTagNumber::UTF8String);
    pub const SEQUENCE: Tag = Tag::universal_primitive(UniversalTagNumber::Sequence).as_constructed();
    pub const SET_OF: Tag = Tag::universal_primitive(UniversalTagNumber::Set).as_constructed();
    pub const NUMERIC_STRING: Tag = Tag::universal_primitive(UniversalTagNumber::NumericString);
    pub const PRINTABLE_STRING: Tag =
        Tag::universal_primitive(UniversalTagNumber::PrintableString);
    pub const T61_STRING: Tag = Tag::universal_primitive(UniversalTagNumber::T61String);
    pub const IA5_STRING: Tag = Tag::universal_primitive(UniversalTagNumber::IA5String);
    pub const UTC_TIME: Tag = Tag::universal_primitive(UniversalTagNumber::UtcTime);
    pub const GENERALIZED_TIME: Tag =
        Tag::universal_primitive(UniversalTagNumber::GeneralizedTime);
    pub const VISIBLE_STRING: Tag = Tag::universal_primitive(UniversalTagNumber::VisibleString);
    pub const UNIVERSAL_STRING: Tag =
        Tag::universal_primitive(UniversalTagNumber::UniversalString);
    pub const BMP_STRING: Tag = Tag::universal_primitive(UniversalTagNumber::BMPString);

    pub const fn new(class: TagClass, constructed: bool, number: u64) -> Self {
        Tag {
            class,
            constructed,
            number,
        }
    }

    const fn universal_primitive(number: UniversalTagNumber) -> Self {
        Tag::new(TagClass::Universal, false, number as u64)
    }

    pub const fn universal(number: UniversalTagNumber, constructed: bool) -> Self {
        Tag::new(TagClass::Universal, constructed, number as u64)
    }

    pub const fn application(number: u64, constructed: bool) -> Self {
        Tag::new(TagClass::Application, constructed, number)
    }

    pub const fn context_specific(number: u64, constructed: bool) -> Self {
        Tag::new(TagClass::ContextSpecific, constructed, number)
    }

    pub const fn private(number: u64, constructed: bool) -> Self {
        Tag::new(TagClass::Private, constructed, number)
    }

    pub fn class(&self) -> TagClass {
        self.class
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    pub const fn as_constructed(self) -> Self {
        Tag::new(self.class, true, self.number)
    }

    pub const fn as_primitive(self) -> Self {
        Tag::new(self.class, false, self.number)
    }

    /// The universal type named by this tag, if it is in the universal class.
    pub fn universal_number(&self) -> Option<UniversalTagNumber> {
        match self.class {
            TagClass::Universal => UniversalTagNumber::from_number(self.number),
            _ => None,
        }
    }

    /// Compares class and number, ignoring the constructed flag.
    pub fn has_same_class_and_number(&self, other: &Tag) -> bool {
        self.class == other.class && self.number == other.number
    }

    pub fn is_end_of_contents(&self) -> bool {
        *self == Tag::END_OF_CONTENTS
    }

    /// Reads an identifier from the front of `input`, returning the tag and
    /// the number of identifier octets.
    pub fn decode(input: &[u8]) -> Result<(Tag, usize)> {
        let first = *input.first().ok_or(Error::Incomplete)?;
        let class = TagClass::from_identifier(first);
        let constructed = first & CONSTRUCTED_FLAG != 0;
        let low = first & HIGH_TAG_NUMBER;

        if low != HIGH_TAG_NUMBER {
            return Ok((Tag::new(class, constructed, u64::from(low)), 1));
        }

        let mut number: u64 = 0;
        for (i, &octet) in input[1..].iter().enumerate() {
            if i == 0 && octet == 0x80 {
                return Err(Error::TagNonMinimal);
            }
            if number > u64::MAX >> 7 {
                return Err(Error::TagOverflow);
            }
            number = (number << 7) | u64::from(octet & 0x7F);

            if octet & 0x80 == 0 {
                if number < u64::from(HIGH_TAG_NUMBER) {
                    return Err(Error::TagLowFormRequired(number));
                }
                return Ok((Tag::new(class, constructed, number), i + 2));
            }
        }

        Err(Error::Incomplete)
    }

    pub fn encoded_len(&self) -> usize {
        if self.number < u64::from(HIGH_TAG_NUMBER) {
            return 1;
        }
        let bits = 64 - self.number.leading_zeros() as usize;
        1 + bits.div_ceil(7)
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let leading = ((self.class as u8) << CLASS_SHIFT)
            | if self.constructed { CONSTRUCTED_FLAG } else { 0 };

        if self.number < u64::from(HIGH_TAG_NUMBER) {
            out.push(leading | self.number as u8);
            return;
        }

        out.push(leading | HIGH_TAG_NUMBER);
        let groups = self.encoded_len() - 1;
        for i in (0..groups).rev() {
            let septet = ((self.number >> (7 * i)) & 0x7F) as u8;
            out.push(if i == 0 { septet } else { septet | 0x80 });
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }
}

/// Fails when `tag` is universal but names a type other than `expected`.
pub(crate) fn ensure_universal_matches(tag: Tag, expected: UniversalTagNumber) -> Result<()> {
    if tag.class == TagClass::Universal && tag.number != expected.number() {
        return Err(Error::UniversalTagMismatch {
            expected,
            actual: tag,
        });
    }
    Ok(())
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            TagClass::Universal => match self.universal_number() {
                Some(universal) => write!(f, "{}", universal.name()),
                None => write!(f, "[UNIVERSAL {}]", self.number),
            },
            TagClass::Application => write!(f, "[APPLICATION {}]", self.number),
            TagClass::ContextSpecific => write!(f, "[{}]", self.number),
            TagClass::Private => write!(f, "[PRIVATE {}]", self.number),
        }
    }
}
