use chrono::{DateTime, Datelike, TimeZone, Utc};

use super::Writer;
use crate::decoder::time::check_utc_pivot;
use crate::error::{Error, Result};
use crate::reader::DEFAULT_UTC_TIME_TWO_DIGIT_YEAR_MAX;
use crate::tag::{Tag, UniversalTagNumber};

impl Writer {
    /// Writes a GeneralizedTime in UTC. The fraction is written without
    /// trailing zeros, or dropped entirely when `omit_fractional_seconds`.
    pub fn write_generalized_time<Tz: TimeZone>(
        &mut self,
        value: &DateTime<Tz>,
        omit_fractional_seconds: bool,
        tag: Option<Tag>,
    ) -> Result<()> {
        self.check_writable()?;
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::GeneralizedTime)?;
        let value = value.with_timezone(&Utc);
        if !(0..=9999).contains(&value.year()) {
            return Err(Error::InvalidArgument("GeneralizedTime year must be 0-9999"));
        }

        let mut text = value.format("%Y%m%d%H%M%S").to_string();
        let nanos = value.timestamp_subsec_nanos() % 1_000_000_000;
        if nanos != 0 && !omit_fractional_seconds {
            let fraction = format!("{:09}", nanos);
            text.push('.');
            text.push_str(fraction.trim_end_matches('0'));
        }
        text.push('Z');

        self.write_octets(tag, text.as_bytes());
        Ok(())
    }

    /// Writes a UTCTime whose year must lie in the default century window.
    pub fn write_utc_time<Tz: TimeZone>(&mut self, value: &DateTime<Tz>, tag: Option<Tag>) -> Result<()> {
        self.write_utc_time_with_pivot(value, DEFAULT_UTC_TIME_TWO_DIGIT_YEAR_MAX, tag)
    }

    /// Writes a UTCTime whose year must lie in the hundred years ending at
    /// `two_digit_year_max`, so that readers using the same maximum recover it.
    pub fn write_utc_time_with_pivot<Tz: TimeZone>(
        &mut self,
        value: &DateTime<Tz>,
        two_digit_year_max: u16,
        tag: Option<Tag>,
    ) -> Result<()> {
        self.check_writable()?;
        check_utc_pivot(two_digit_year_max)?;
        let tag = Writer::resolve_tag(tag, UniversalTagNumber::UtcTime)?;
        let value = value.with_timezone(&Utc);

        let max = i32::from(two_digit_year_max);
        if value.year() > max || value.year() <= max - 100 {
            return Err(Error::InvalidArgument("UTCTime year is outside the century window"));
        }

        let text = value.format("%y%m%d%H%M%SZ").to_string();
        self.write_octets(tag, text.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Timelike, Utc};
    use hex_literal::hex;
    use rstest::rstest;

    use crate::decoder::{read_generalized_time, read_utc_time};
    use crate::error::Error;
    use crate::rules::EncodingRules;
    use crate::writer::Writer;

    fn encode_generalized(nanos: u32, omit: bool) -> Vec<u8> {
        let value = Utc
            .with_ymd_and_hms(2024, 2, 29, 12, 34, 56)
            .unwrap()
            .with_nanosecond(nanos)
            .unwrap();
        let mut writer = Writer::new(EncodingRules::Der);
        writer.write_generalized_time(&value, omit, None).unwrap();
        writer.encode().unwrap()
    }

    #[rstest]
    #[case(0, false, "20240229123456Z")]
    #[case(500_000_000, false, "20240229123456.5Z")]
    #[case(123_456_789, false, "20240229123456.123456789Z")]
    #[case(120_000_000, false, "20240229123456.12Z")]
    #[case(123_456_789, true, "20240229123456Z")]
    fn test_write_generalized_time(#[case] nanos: u32, #[case] omit: bool, #[case] expected: &str) {
        let encoded = encode_generalized(nanos, omit);
        assert_eq!(encoded[0], 0x18);
        assert_eq!(usize::from(encoded[1]), expected.len());
        assert_eq!(&encoded[2..], expected.as_bytes());

        let (decoded, _) = read_generalized_time(&encoded, EncodingRules::Der, None).unwrap();
        let expected_nanos = if omit { 0 } else { nanos };
        assert_eq!(decoded.timestamp_subsec_nanos(), expected_nanos);
    }

    #[test]
    fn test_write_generalized_time_converts_to_utc() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let value = offset.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let mut writer = Writer::new(EncodingRules::Der);
        writer.write_generalized_time(&value, false, None).unwrap();
        assert_eq!(writer.encode().unwrap(), b"\x18\x0f20240229230000Z");
    }

    #[rstest]
    #[case(1950, 2049, Some("500101000000Z"))]
    #[case(2049, 2049, Some("490101000000Z"))]
    #[case(1949, 2049, None)]
    #[case(2050, 2049, None)]
    #[case(2050, 2099, Some("500101000000Z"))]
    fn test_write_utc_time_window(
        #[case] year: i32,
        #[case] max: u16,
        #[case] expected: Option<&str>,
    ) {
        let value = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
        let mut writer = Writer::new(EncodingRules::Der);
        let result = writer.write_utc_time_with_pivot(&value, max, None);
        match expected {
            Some(text) => {
                result.unwrap();
                let encoded = writer.encode().unwrap();
                assert_eq!(&encoded[2..], text.as_bytes());
                let (decoded, _) =
                    read_utc_time(&encoded, EncodingRules::Der, max, None).unwrap();
                assert_eq!(decoded, value);
            }
            None => assert!(result.unwrap_err().is_usage_error()),
        }
    }

    #[test]
    fn test_write_utc_time_default_pivot() {
        let value = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        let mut writer = Writer::new(EncodingRules::Cer);
        writer.write_utc_time(&value, None).unwrap();
        assert_eq!(writer.encode().unwrap(), hex!("170d 3939313233313233353935395a"));
    }

    #[test]
    fn test_write_utc_time_pivot_out_of_range() {
        let value = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let mut writer = Writer::new(EncodingRules::Der);
        assert_eq!(
            writer.write_utc_time_with_pivot(&value, 0, None).unwrap_err(),
            Error::UtcPivotOutOfRange(0)
        );
    }
}
