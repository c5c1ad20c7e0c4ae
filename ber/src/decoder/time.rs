//! UTCTime and GeneralizedTime.
//!
//! Both types carry positional ASCII digit fields. The grammar is parsed with
//! `nom` into [`Fields`] and then checked against the encoding rules before a
//! `chrono` timestamp is built.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use log::debug;
use nom::branch::alt;
use nom::bytes::complete::{tag as literal, take_while_m_n};
use nom::character::complete::{digit1, one_of};
use nom::combinator::{eof, map, opt};
use nom::{IResult, Parser};

use super::octet_string::read_string_bytes;
use crate::error::{Error, Result};
use crate::rules::EncodingRules;
use crate::tag::{Tag, UniversalTagNumber};

/// Fraction digits beyond this carry no information at nanosecond precision.
const MAX_FRACTION_DIGITS: usize = 18;
const NANOS_PER_SECOND: u128 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Utc,
    Offset { negative: bool, hours: u32, minutes: u32 },
}

#[derive(Debug)]
struct Fields<'a> {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: Option<u32>,
    second: Option<u32>,
    fraction: Option<(char, &'a [u8])>,
    zone: Option<Zone>,
}

fn digits<'a>(
    count: usize,
) -> impl Parser<&'a [u8], Output = u32, Error = nom::error::Error<&'a [u8]>> {
    map(
        take_while_m_n(count, count, |byte: u8| byte.is_ascii_digit()),
        |field: &[u8]| {
            field
                .iter()
                .fold(0u32, |value, byte| value * 10 + u32::from(byte - b'0'))
        },
    )
}

fn zone_designator<'a>(input: &'a [u8], minutes_required: bool) -> IResult<&'a [u8], Zone> {
    let offset_minutes = move |input: &'a [u8]| {
        if minutes_required {
            map(digits(2), Some).parse(input)
        } else {
            opt(digits(2)).parse(input)
        }
    };
    alt((
        map(literal("Z"), |_| Zone::Utc),
        map(
            (one_of("+-"), digits(2), offset_minutes),
            |(sign, hours, minutes)| Zone::Offset {
                negative: sign == '-',
                hours,
                minutes: minutes.unwrap_or(0),
            },
        ),
    ))
    .parse(input)
}

fn generalized_fields<'a>(input: &'a [u8]) -> IResult<&'a [u8], Fields<'a>> {
    let (input, (year, month, day, hour)) =
        (digits(4), digits(2), digits(2), digits(2)).parse(input)?;
    let (input, minute) = opt(digits(2)).parse(input)?;
    let (input, second) = match minute {
        Some(_) => opt(digits(2)).parse(input)?,
        None => (input, None),
    };
    let (input, fraction) = opt((one_of(".,"), digit1)).parse(input)?;
    let (input, zone) = opt(|input: &'a [u8]| zone_designator(input, false)).parse(input)?;
    let (input, _) = eof(input)?;

    Ok((
        input,
        Fields {
            year: year as i32,
            month,
            day,
            hour,
            minute,
            second,
            fraction,
            zone,
        },
    ))
}

fn utc_fields(input: &[u8]) -> IResult<&[u8], Fields<'_>> {
    let (input, (year, month, day, hour, minute)) =
        (digits(2), digits(2), digits(2), digits(2), digits(2)).parse(input)?;
    let (input, second) = opt(digits(2)).parse(input)?;
    let (input, zone) = zone_designator(input, true)?;
    let (input, _) = eof(input)?;

    Ok((
        input,
        Fields {
            year: year as i32,
            month,
            day,
            hour,
            minute: Some(minute),
            second,
            fraction: None,
            zone: Some(zone),
        },
    ))
}

/// Nanoseconds represented by `digits` as a fraction of a unit that is
/// `unit_seconds` long.
fn fraction_nanos(digits: &[u8], unit_seconds: u128) -> u128 {
    let used = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
    let numerator = used
        .iter()
        .fold(0u128, |value, byte| value * 10 + u128::from(byte - b'0'));
    let scale = 10u128.pow(used.len() as u32);
    numerator * unit_seconds * NANOS_PER_SECOND / scale
}

fn build(fields: &Fields<'_>) -> Option<DateTime<FixedOffset>> {
    let date = NaiveDate::from_ymd_opt(fields.year, fields.month, fields.day)?;
    let time = NaiveTime::from_hms_opt(
        fields.hour,
        fields.minute.unwrap_or(0),
        fields.second.unwrap_or(0),
    )?;
    let mut naive = NaiveDateTime::new(date, time);

    if let Some((_, digits)) = fields.fraction {
        let unit_seconds = match (fields.minute, fields.second) {
            (_, Some(_)) => 1,
            (Some(_), None) => 60,
            (None, None) => 3600,
        };
        let nanos = i64::try_from(fraction_nanos(digits, unit_seconds)).ok()?;
        naive = naive.checked_add_signed(TimeDelta::nanoseconds(nanos))?;
    }

    let offset = match fields.zone {
        None | Some(Zone::Utc) => FixedOffset::east_opt(0)?,
        Some(Zone::Offset {
            negative,
            hours,
            minutes,
        }) => {
            if hours > 23 || minutes > 59 {
                return None;
            }
            let seconds = (hours * 3600 + minutes * 60) as i32;
            FixedOffset::east_opt(if negative { -seconds } else { seconds })?
        }
    };
    offset.from_local_datetime(&naive).single()
}

/// CER and DER fix the form to seconds precision or finer, a `Z` suffix, a
/// `.` separator and no trailing zero in the fraction.
fn is_canonical(fields: &Fields<'_>) -> bool {
    if fields.second.is_none() || fields.zone != Some(Zone::Utc) {
        return false;
    }
    match fields.fraction {
        Some((separator, digits)) => separator == '.' && digits.last() != Some(&b'0'),
        None => true,
    }
}

/// Parses GeneralizedTime content octets.
pub(crate) fn parse_generalized_time(
    content: &[u8],
    rules: EncodingRules,
) -> Result<DateTime<FixedOffset>> {
    let parsed = generalized_fields(content)
        .ok()
        .map(|(_, fields)| fields)
        .filter(|fields| !rules.is_canonical() || is_canonical(fields));
    parsed.as_ref().and_then(build).ok_or_else(|| {
        debug!(
            "GeneralizedTime {:?} rejected under {}",
            String::from_utf8_lossy(content),
            rules
        );
        Error::GeneralizedTimeInvalidFormat
    })
}

pub(crate) fn check_utc_pivot(two_digit_year_max: u16) -> Result<()> {
    if !(1..=9999).contains(&two_digit_year_max) {
        return Err(Error::UtcPivotOutOfRange(two_digit_year_max));
    }
    Ok(())
}

/// Maps a two digit year onto the century window ending at `two_digit_year_max`.
pub(crate) fn resolve_two_digit_year(year: i32, two_digit_year_max: u16) -> i32 {
    let max = i32::from(two_digit_year_max);
    let candidate = max / 100 * 100 + year;
    if candidate > max { candidate - 100 } else { candidate }
}

/// Parses UTCTime content octets.
pub(crate) fn parse_utc_time(
    content: &[u8],
    rules: EncodingRules,
    two_digit_year_max: u16,
) -> Result<DateTime<FixedOffset>> {
    check_utc_pivot(two_digit_year_max)?;
    let parsed = utc_fields(content)
        .ok()
        .map(|(_, mut fields)| {
            fields.year = resolve_two_digit_year(fields.year, two_digit_year_max);
            fields
        })
        .filter(|fields| !rules.is_canonical() || is_canonical(fields));
    parsed.as_ref().and_then(build).ok_or_else(|| {
        debug!(
            "UTCTime {:?} rejected under {}",
            String::from_utf8_lossy(content),
            rules
        );
        Error::UtcTimeInvalidFormat
    })
}

pub fn read_generalized_time(
    input: &[u8],
    rules: EncodingRules,
    tag: Option<Tag>,
) -> Result<(DateTime<FixedOffset>, usize)> {
    let (content, consumed) = read_string_bytes(
        input,
        rules,
        tag.unwrap_or(Tag::GENERALIZED_TIME),
        UniversalTagNumber::GeneralizedTime,
    )?;
    Ok((parse_generalized_time(&content, rules)?, consumed))
}

/// Reads a UTCTime. Two digit years resolve to the latest year not after
/// `two_digit_year_max`.
pub fn read_utc_time(
    input: &[u8],
    rules: EncodingRules,
    two_digit_year_max: u16,
    tag: Option<Tag>,
) -> Result<(DateTime<FixedOffset>, usize)> {
    check_utc_pivot(two_digit_year_max)?;
    let (content, consumed) = read_string_bytes(
        input,
        rules,
        tag.unwrap_or(Tag::UTC_TIME),
        UniversalTagNumber::UtcTime,
    )?;
    Ok((parse_utc_time(&content, rules, two_digit_year_max)?, consumed))
}
