//! Canonical ordering of SET OF members.

use std::cmp::Ordering;

/// Compares two complete encodings octet by octet. A shorter encoding that is
/// a prefix of the other sorts first.
pub fn canonical_cmp(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use rstest::rstest;

    use super::canonical_cmp;

    #[rstest]
    #[case(&[0x02, 0x01, 0x01], &[0x02, 0x01, 0x02], Ordering::Less)]
    #[case(&[0x04, 0x00], &[0x02, 0x01, 0x00], Ordering::Greater)]
    #[case(&[0x30, 0x00], &[0x30, 0x00], Ordering::Equal)]
    // a prefix sorts first
    #[case(&[0x04, 0x01], &[0x04, 0x01, 0x00], Ordering::Less)]
    #[case(&[], &[0x00], Ordering::Less)]
    fn test_canonical_cmp(#[case] a: &[u8], #[case] b: &[u8], #[case] expected: Ordering) {
        assert_eq!(canonical_cmp(a, b), expected);
        assert_eq!(canonical_cmp(b, a), expected.reverse());
    }
}
