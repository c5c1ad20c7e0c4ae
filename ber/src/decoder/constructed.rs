//! Reassembly of constructed BIT STRING, OCTET STRING and character string
//! encodings.
//!
//! Segments nest arbitrarily under BER. The walk keeps its own frame stack so
//! that deeply nested input cannot exhaust the call stack.

use log::{debug, trace};

use super::{bit_string, check_segment_len, read_header, validate_end_of_contents};
use crate::error::{Error, Result};
use crate::rules::{CER_SEGMENT_LEN, EncodingRules};
use crate::tag::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    Octets,
    Bits,
}

impl SegmentKind {
    fn primitive(self) -> Tag {
        match self {
            SegmentKind::Octets => Tag::OCTET_STRING,
            SegmentKind::Bits => Tag::BIT_STRING,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Reassembled {
    pub data: Vec<u8>,
    pub unused_bits: u8,
    /// Bytes consumed after the outer header.
    pub consumed: usize,
}

/// Concatenates the segments of a constructed string whose content starts at
/// `content`. `length` is the outer length, `None` for indefinite.
pub(crate) fn reassemble(
    content: &[u8],
    length: Option<usize>,
    rules: EncodingRules,
    kind: SegmentKind,
    outer: Tag,
) -> Result<Reassembled> {
    let source = match length {
        Some(len) => content.get(..len).ok_or(Error::LengthExceedsInput {
            length: len,
            remaining: content.len(),
        })?,
        None => content,
    };

    // Each frame holds the end offset of a definite wrapper, or `None` for
    // one closed by an end-of-contents marker.
    let mut frames: Vec<Option<usize>> = vec![length];
    let mut out = Reassembled::default();
    let mut previous_segment: Option<usize> = None;
    let mut pos = 0;

    while let Some(&frame) = frames.last() {
        if frame == Some(pos) {
            frames.pop();
            continue;
        }

        let limit = frames
            .iter()
            .rev()
            .find_map(|end| *end)
            .unwrap_or(source.len());
        if pos >= limit {
            return Err(Error::EndOfContentsMissing);
        }

        let header = read_header(&source[pos..limit], rules)?;
        let tag = header.tag;

        if tag.has_same_class_and_number(&Tag::END_OF_CONTENTS) {
            if frame.is_some() {
                return Err(Error::EndOfContentsUnexpected);
            }
            validate_end_of_contents(&header)?;
            pos += header.header_len;
            frames.pop();
            continue;
        }

        if !tag.has_same_class_and_number(&kind.primitive()) {
            debug!("{} segment has tag {}", outer, tag);
            return Err(Error::SegmentInvalid(outer, tag));
        }

        if tag.is_constructed() {
            if rules.is_cer() {
                return Err(Error::CerNestedSegment);
            }
            let start = pos + header.header_len;
            let end = match header.length {
                Some(len) if start + len > limit => {
                    return Err(Error::LengthExceedsInput {
                        length: len,
                        remaining: limit - start,
                    });
                }
                Some(len) => Some(start + len),
                None => None,
            };
            frames.push(end);
            pos = start;
            continue;
        }

        let len = header.length.ok_or(Error::IndefinitePrimitive)?;
        let start = pos + header.header_len;
        if start + len > limit {
            return Err(Error::LengthExceedsInput {
                length: len,
                remaining: limit - start,
            });
        }
        let segment = &source[start..start + len];

        check_segment_len(len, rules)?;
        if rules.is_cer() {
            if let Some(previous) = previous_segment {
                if previous != CER_SEGMENT_LEN {
                    return Err(Error::CerSegmentSize(previous));
                }
            }
        }

        match kind {
            SegmentKind::Octets => out.data.extend_from_slice(segment),
            SegmentKind::Bits => {
                if out.unused_bits != 0 {
                    return Err(Error::BitStringUnusedBitsInSegment);
                }
                let parsed = bit_string::parse_primitive(segment, rules)?;
                out.unused_bits = parsed.unused_bits;
                out.data.extend_from_slice(parsed.data);
                if let Some(last) = parsed.normalized_last {
                    if let Some(slot) = out.data.last_mut() {
                        *slot = last;
                    }
                }
            }
        }

        trace!("{} segment of {} octets", outer, len);
        previous_segment = Some(len);
        pos = start + len;
    }

    out.consumed = pos;
    Ok(out)
}
