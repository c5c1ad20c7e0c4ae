//! Encoding of values into a growable buffer.
//!
//! Constructed values are written between a `push_*` and the matching `pop_*`
//! call. The length of an open scope is unknown until it is popped, so a
//! single placeholder octet is reserved and the content is moved once the
//! final length encoding is known.

use log::trace;

use crate::compare::canonical_cmp;
use crate::decoder::{END_OF_CONTENTS_LEN, read_encoded_value};
use crate::error::{Error, Result};
use crate::length;
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber, ensure_universal_matches};

mod bit_string;
mod boolean;
mod integer;
mod null;
mod octet_string;
mod oid;
mod string;
mod time;

/// The kind of constructed value a scope encloses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Sequence,
    SetOf,
    OctetString,
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    tag: Tag,
    kind: ScopeKind,
    tag_offset: usize,
    /// Offset of the placeholder length octet.
    length_offset: usize,
}

/// Writes values under one set of [`EncodingRules`].
///
/// Values are appended in call order. Once [`Writer::encode`] or a
/// successful [`Writer::try_encode`] has produced the output, the writer is
/// finished and rejects further writes until [`Writer::reset`].
#[derive(Debug, Clone)]
pub struct Writer {
    rules: EncodingRules,
    buffer: Vec<u8>,
    scopes: Vec<Scope>,
    finished: bool,
}

impl Writer {
    pub fn new(rules: EncodingRules) -> Self {
        Writer::with_capacity(rules, 0)
    }

    pub fn with_capacity(rules: EncodingRules, capacity: usize) -> Self {
        Writer {
            rules,
            buffer: Vec::with_capacity(capacity),
            scopes: Vec::new(),
            finished: false,
        }
    }

    pub fn rules(&self) -> EncodingRules {
        self.rules
    }

    /// Clears all written data and open scopes.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.scopes.clear();
        self.finished = false;
    }

    fn check_writable(&self) -> Result<()> {
        if self.finished {
            return Err(Error::WriterFinished);
        }
        Ok(())
    }

    /// Resolves the tag of a write, falling back to the universal tag of the
    /// written type.
    fn resolve_tag(tag: Option<Tag>, universal: UniversalTagNumber) -> Result<Tag> {
        let tag = tag.unwrap_or(Tag::universal(universal, false));
        ensure_universal_matches(tag, universal)?;
        Ok(tag)
    }

    fn write_tag(&mut self, tag: Tag) {
        tag.encode_into(&mut self.buffer);
    }

    fn write_length(&mut self, length: Option<usize>) {
        length::encode_into(length, &mut self.buffer);
    }

    fn write_end_of_contents(&mut self) {
        self.buffer.extend_from_slice(&[0x00; END_OF_CONTENTS_LEN]);
    }

    /// Writes a complete primitive value.
    fn write_primitive(&mut self, tag: Tag, content: &[u8]) {
        self.write_tag(tag.as_primitive());
        self.write_length(Some(content.len()));
        self.buffer.extend_from_slice(content);
    }

    /// Appends an existing encoding, which must be exactly one value that is
    /// valid under this writer's rules.
    pub fn write_encoded_value(&mut self, value: &[u8]) -> Result<()> {
        self.check_writable()?;
        match read_encoded_value(value, self.rules) {
            Ok(encoded) if encoded.consumed == value.len() => {
                self.buffer.extend_from_slice(value);
                Ok(())
            }
            _ => Err(Error::EncodedValueInvalid(self.rules)),
        }
    }

    fn push(&mut self, tag: Tag, kind: ScopeKind) -> Result<()> {
        self.check_writable()?;
        let tag = tag.as_constructed();
        let tag_offset = self.buffer.len();
        self.write_tag(tag);
        let length_offset = self.buffer.len();
        self.write_length(None);
        trace!("push {:?} {} at {}", kind, tag, tag_offset);
        self.scopes.push(Scope {
            tag,
            kind,
            tag_offset,
            length_offset,
        });
        Ok(())
    }

    fn pop(&mut self, tag: Tag, kind: ScopeKind) -> Result<()> {
        self.check_writable()?;
        let open = *self.scopes.last().ok_or(Error::NoOpenScope)?;
        if open.kind != kind || !open.tag.has_same_class_and_number(&tag) {
            return Err(Error::ScopeMismatch {
                open: open.tag,
                open_kind: open.kind,
                popped: tag,
                popped_kind: kind,
            });
        }

        let content_offset = open.length_offset + 1;
        if kind == ScopeKind::SetOf && self.rules.is_canonical() {
            self.sort_set_members(content_offset)?;
        }
        self.scopes.pop();
        trace!(
            "pop {:?} {} with {} content octets",
            kind,
            open.tag,
            self.buffer.len() - content_offset
        );

        match kind {
            ScopeKind::OctetString => {
                let content = self.buffer.split_off(content_offset);
                self.buffer.truncate(open.tag_offset);
                self.write_octets(open.tag, &content);
            }
            ScopeKind::Sequence | ScopeKind::SetOf if self.rules.is_cer() => {
                self.write_end_of_contents();
            }
            ScopeKind::Sequence | ScopeKind::SetOf => self.finish_definite(open.length_offset),
        }
        Ok(())
    }

    /// Replaces the placeholder at `length_offset` with the definite length
    /// of everything after it, moving the content right as needed.
    fn finish_definite(&mut self, length_offset: usize) {
        let content_offset = length_offset + 1;
        let end = self.buffer.len();
        let content_len = end - content_offset;
        let length_len = length::encoded_len(content_len);
        let shift = length_len - 1;

        if shift > 0 {
            self.buffer.resize(end + shift, 0);
            self.buffer
                .copy_within(content_offset..end, content_offset + shift);
        }
        length::encode_to_slice(
            content_len,
            &mut self.buffer[length_offset..length_offset + length_len],
        );
    }

    /// Reorders the members written after `content_offset` canonically.
    fn sort_set_members(&mut self, content_offset: usize) -> Result<()> {
        let content = &self.buffer[content_offset..];
        let mut members = Vec::new();
        let mut pos = 0;
        while pos < content.len() {
            let member = read_encoded_value(&content[pos..], self.rules)?;
            members.push(&content[pos..pos + member.consumed]);
            pos += member.consumed;
        }
        members.sort_by(|a, b| canonical_cmp(a, b));

        let sorted = members.concat();
        self.buffer[content_offset..].copy_from_slice(&sorted);
        Ok(())
    }

    pub fn push_sequence(&mut self, tag: Option<Tag>) -> Result<()> {
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::Sequence)?;
        self.push(tag, ScopeKind::Sequence)
    }

    pub fn pop_sequence(&mut self, tag: Option<Tag>) -> Result<()> {
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::Sequence)?;
        self.pop(tag, ScopeKind::Sequence)
    }

    pub fn push_set_of(&mut self, tag: Option<Tag>) -> Result<()> {
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::Set)?;
        self.push(tag, ScopeKind::SetOf)
    }

    /// Closes a SET OF. Under CER and DER the members are sorted first.
    pub fn pop_set_of(&mut self, tag: Option<Tag>) -> Result<()> {
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::Set)?;
        self.pop(tag, ScopeKind::SetOf)
    }

    /// Opens a constructed value carrying `tag`, such as an explicit tag or
    /// a universal type without a dedicated writer.
    pub fn push_constructed(&mut self, tag: Tag) -> Result<()> {
        self.push(tag, ScopeKind::Sequence)
    }

    pub fn pop_constructed(&mut self, tag: Tag) -> Result<()> {
        self.pop(tag, ScopeKind::Sequence)
    }

    /// Opens an OCTET STRING whose content is the encoding of the values
    /// written until [`Writer::pop_octet_string`].
    pub fn push_octet_string(&mut self, tag: Option<Tag>) -> Result<()> {
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::OctetString)?;
        self.push(tag, ScopeKind::OctetString)
    }

    pub fn pop_octet_string(&mut self, tag: Option<Tag>) -> Result<()> {
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::OctetString)?;
        self.pop(tag, ScopeKind::OctetString)
    }

    /// Writes a SEQUENCE whose members are written by `f`.
    pub fn write_sequence<F>(&mut self, tag: Option<Tag>, f: F) -> Result<()>
    where
        F: FnOnce(&mut Writer) -> Result<()>,
    {
        self.push_sequence(tag)?;
        f(self)?;
        self.pop_sequence(tag)
    }

    pub fn write_set_of<F>(&mut self, tag: Option<Tag>, f: F) -> Result<()>
    where
        F: FnOnce(&mut Writer) -> Result<()>,
    {
        self.push_set_of(tag)?;
        f(self)?;
        self.pop_set_of(tag)
    }

    fn ensure_balanced(&self) -> Result<()> {
        if !self.scopes.is_empty() {
            return Err(Error::UnbalancedScope(self.scopes.len()));
        }
        Ok(())
    }

    /// Length of the output [`Writer::encode`] would return.
    pub fn encoded_len(&self) -> Result<usize> {
        self.ensure_balanced()?;
        Ok(self.buffer.len())
    }

    /// Returns `true` if the output equals `other`.
    pub fn encoded_value_equals(&self, other: &[u8]) -> Result<bool> {
        self.ensure_balanced()?;
        Ok(self.buffer == other)
    }

    /// Returns the output and finishes the writer.
    pub fn encode(&mut self) -> Result<Vec<u8>> {
        self.ensure_balanced()?;
        self.finished = true;
        Ok(self.buffer.clone())
    }

    /// Copies the output into `dest` and returns its length, or `Ok(None)`
    /// without finishing the writer when `dest` is too small.
    pub fn try_encode(&mut self, dest: &mut [u8]) -> Result<Option<usize>> {
        self.ensure_balanced()?;
        let len = self.buffer.len();
        let Some(dest) = dest.get_mut(..len) else {
            return Ok(None);
        };
        dest.copy_from_slice(&self.buffer);
        self.finished = true;
        Ok(Some(len))
    }

    /// Appends the output of this writer to `destination`. Each value must be
    /// valid under the destination's rules.
    pub fn copy_to(&self, destination: &mut Writer) -> Result<()> {
        self.ensure_balanced()?;
        let mut pos = 0;
        while pos < self.buffer.len() {
            let value = read_encoded_value(&self.buffer[pos..], destination.rules)
                .map_err(|_| Error::EncodedValueInvalid(destination.rules))?;
            destination.write_encoded_value(&self.buffer[pos..pos + value.consumed])?;
            pos += value.consumed;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use rstest::rstest;

    use super::{ScopeKind, Writer};
    use crate::error::Error;
    use crate::rules::EncodingRules;
    use crate::tag::{Tag, TagClass};

    #[rstest]
    #[case(EncodingRules::Der, &hex!("3006 020101 020102"))]
    #[case(EncodingRules::Ber, &hex!("3006 020101 020102"))]
    #[case(EncodingRules::Cer, &hex!("3080 020101 020102 0000"))]
    fn test_write_sequence(#[case] rules: EncodingRules, #[case] expected: &[u8]) {
        let mut writer = Writer::new(rules);
        writer.push_sequence(None).unwrap();
        writer.write_integer(1, None).unwrap();
        writer.write_integer(2, None).unwrap();
        writer.pop_sequence(None).unwrap();
        assert_eq!(writer.encode().unwrap(), expected);
    }

    #[rstest]
    #[case(EncodingRules::Der, &hex!("2802 3000"))]
    #[case(EncodingRules::Cer, &hex!("2880 3080 0000 0000"))]
    fn test_write_constructed_universal(#[case] rules: EncodingRules, #[case] expected: &[u8]) {
        let external = Tag::new(TagClass::Universal, true, 8);
        let mut writer = Writer::new(rules);
        writer.push_constructed(external).unwrap();
        writer.push_sequence(None).unwrap();
        writer.pop_sequence(None).unwrap();
        writer.pop_constructed(external).unwrap();
        assert_eq!(writer.encode().unwrap(), expected);
    }

    #[test]
    fn test_write_nested_sequence_long_length() {
        let mut writer = Writer::new(EncodingRules::Der);
        writer
            .write_sequence(None, |outer| {
                outer.write_sequence(Some(Tag::context_specific(0, true)), |inner| {
                    inner.write_octet_string(&[0xab; 200], None)
                })
            })
            .unwrap();
        let encoded = writer.encode().unwrap();
        assert_eq!(&encoded[..9], &hex!("3081ce a081cb 0481c8"));
        assert_eq!(encoded.len(), 3 + 3 + 3 + 200);
    }

    #[rstest]
    #[case(EncodingRules::Der, &hex!("3109 020101 020102 020103"))]
    #[case(EncodingRules::Cer, &hex!("3180 020101 020102 020103 0000"))]
    #[case(EncodingRules::Ber, &hex!("3109 020103 020101 020102"))]
    fn test_write_set_of_sorts(#[case] rules: EncodingRules, #[case] expected: &[u8]) {
        let mut writer = Writer::new(rules);
        writer
            .write_set_of(None, |set| {
                set.write_integer(3, None)?;
                set.write_integer(1, None)?;
                set.write_integer(2, None)
            })
            .unwrap();
        assert_eq!(writer.encode().unwrap(), expected);
    }

    #[test]
    fn test_write_set_of_sorts_mixed_members() {
        let mut writer = Writer::new(EncodingRules::Der);
        writer
            .write_set_of(None, |set| {
                set.write_octet_string(&[0xaa, 0x00], None)?;
                set.write_octet_string(&[0xaa], None)?;
                set.write_null(None)
            })
            .unwrap();
        assert_eq!(writer.encode().unwrap(), &hex!("3109 0401aa 0402aa00 0500"));
    }

    #[rstest]
    #[case(EncodingRules::Der)]
    #[case(EncodingRules::Cer)]
    fn test_push_octet_string(#[case] rules: EncodingRules) {
        let mut writer = Writer::new(rules);
        writer.push_octet_string(None).unwrap();
        writer.write_boolean(true, None).unwrap();
        writer.pop_octet_string(None).unwrap();
        assert_eq!(writer.encode().unwrap(), &hex!("0403 0101ff"));
    }

    #[test]
    fn test_push_octet_string_cer_chunks() {
        let mut writer = Writer::new(EncodingRules::Cer);
        writer.push_octet_string(None).unwrap();
        writer.write_octet_string(&[0x11; 1500], None).unwrap();
        writer.pop_octet_string(None).unwrap();
        let encoded = writer.encode().unwrap();

        // the wrapped value is itself chunked and takes 1512 octets
        assert_eq!(&encoded[..8], &hex!("2480 048203e8 2480"));
        assert_eq!(encoded.len(), 2 + (4 + 1000) + (4 + 512) + 2);
        let rest = &encoded[2 + 4 + 1000..];
        assert_eq!(&rest[..4], &hex!("04820200"));
        assert_eq!(&encoded[encoded.len() - 4..], &hex!("0000 0000"));
    }

    #[test]
    fn test_scope_errors() {
        let mut writer = Writer::new(EncodingRules::Der);
        assert_eq!(writer.pop_sequence(None).unwrap_err(), Error::NoOpenScope);

        writer.push_sequence(None).unwrap();
        let err = writer.pop_set_of(None).unwrap_err();
        assert_eq!(
            err,
            Error::ScopeMismatch {
                open: Tag::SEQUENCE,
                open_kind: ScopeKind::Sequence,
                popped: Tag::SET_OF,
                popped_kind: ScopeKind::SetOf,
            }
        );
        assert!(err.is_usage_error());

        let err = writer
            .pop_sequence(Some(Tag::context_specific(0, true)))
            .unwrap_err();
        assert!(matches!(err, Error::ScopeMismatch { .. }));

        assert_eq!(writer.encode().unwrap_err(), Error::UnbalancedScope(1));
        assert_eq!(writer.encoded_len().unwrap_err(), Error::UnbalancedScope(1));
        writer.pop_sequence(None).unwrap();
        assert_eq!(writer.encode().unwrap(), &hex!("3000"));
    }

    #[test]
    fn test_writer_finished() {
        let mut writer = Writer::new(EncodingRules::Der);
        writer.write_null(None).unwrap();
        assert_eq!(writer.encode().unwrap(), &hex!("0500"));

        assert_eq!(writer.write_null(None).unwrap_err(), Error::WriterFinished);
        assert_eq!(writer.push_sequence(None).unwrap_err(), Error::WriterFinished);
        assert_eq!(writer.pop_sequence(None).unwrap_err(), Error::WriterFinished);

        writer.reset();
        writer.write_boolean(false, None).unwrap();
        assert_eq!(writer.encode().unwrap(), &hex!("010100"));
    }

    #[test]
    fn test_try_encode() {
        let mut writer = Writer::new(EncodingRules::Der);
        writer.write_integer(0x1234, None).unwrap();

        let mut small = [0u8; 3];
        assert_eq!(writer.try_encode(&mut small).unwrap(), None);
        // a failed attempt leaves the writer open
        writer.write_null(None).unwrap();

        let mut dest = [0u8; 8];
        assert_eq!(writer.try_encode(&mut dest).unwrap(), Some(6));
        assert_eq!(&dest[..6], &hex!("02021234 0500"));
        assert_eq!(writer.write_null(None).unwrap_err(), Error::WriterFinished);
    }

    #[test]
    fn test_write_encoded_value() {
        let mut writer = Writer::new(EncodingRules::Der);
        writer.write_encoded_value(&hex!("020105")).unwrap();
        assert_eq!(
            writer.write_encoded_value(&hex!("020105 0500")).unwrap_err(),
            Error::EncodedValueInvalid(EncodingRules::Der)
        );
        assert_eq!(
            writer.write_encoded_value(&hex!("3080 0000")).unwrap_err(),
            Error::EncodedValueInvalid(EncodingRules::Der)
        );
        assert!(writer.encoded_value_equals(&hex!("020105")).unwrap());
        assert_eq!(writer.encoded_len().unwrap(), 3);
    }

    #[test]
    fn test_copy_to() {
        let mut source = Writer::new(EncodingRules::Der);
        source.write_integer(7, None).unwrap();
        source.write_null(None).unwrap();

        let mut destination = Writer::new(EncodingRules::Der);
        destination
            .write_sequence(None, |seq| source.copy_to(seq))
            .unwrap();
        assert_eq!(destination.encode().unwrap(), &hex!("3005 020107 0500"));

        let mut cer = Writer::new(EncodingRules::Cer);
        let mut definite = Writer::new(EncodingRules::Der);
        definite.write_sequence(None, |_| Ok(())).unwrap();
        assert_eq!(
            definite.copy_to(&mut cer).unwrap_err(),
            Error::EncodedValueInvalid(EncodingRules::Cer)
        );
    }
}
