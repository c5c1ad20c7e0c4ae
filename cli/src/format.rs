use asn1::{ASN1Object, Element};

/// Byte strings longer than this are summarized by their length.
const MAX_INLINE_BYTES: usize = 32;

/// Format ASN.1 structure in a tree-like style similar to lapo.it/asn1js
pub(crate) fn format_asn1(obj: &ASN1Object) -> String {
    let mut output = String::new();
    let mut pending: Vec<(&Element, usize)> =
        obj.elements().iter().rev().map(|e| (e, 0)).collect();

    while let Some((element, depth)) = pending.pop() {
        output.push_str(&format!("{}{}\n", "  ".repeat(depth), describe(element)));

        let children = match element {
            Element::Sequence(children) | Element::Set(children) => children,
            Element::Tagged { elements, .. } => elements,
            _ => continue,
        };
        pending.extend(children.iter().rev().map(|child| (child, depth + 1)));
    }

    output
}

fn describe(element: &Element) -> String {
    match element {
        Element::Boolean(b) => format!("BOOLEAN {}", b),
        Element::Integer(int) => format!("INTEGER {}", int),
        Element::Enumerated(int) => format!("ENUMERATED {}", int),
        Element::BitString(bits) => {
            format!("BIT STRING ({} bits) {}", bits.bit_len(), inline_bytes(bits.as_bytes()))
        }
        Element::OctetString(octets) => format!("OCTET STRING {}", inline_bytes(octets.as_bytes())),
        Element::Null => "NULL".to_string(),
        Element::ObjectIdentifier(oid) => format!("OBJECT IDENTIFIER {}", oid),
        Element::UTCTime(dt) => format!("UTCTime {}", dt.to_rfc3339()),
        Element::GeneralizedTime(dt) => format!("GeneralizedTime {}", dt.to_rfc3339()),
        Element::Sequence(elements) => format!("SEQUENCE ({} elem)", elements.len()),
        Element::Set(elements) => format!("SET ({} elem)", elements.len()),
        Element::Tagged { tag, elements } => format!("{} ({} elem)", tag, elements.len()),
        Element::Raw { tag, content } => format!("{} {}", tag, inline_bytes(content.as_bytes())),
        string => match string.as_character_string() {
            Some((_, value)) => format!("{} '{}'", string.tag(), value),
            None => string.to_string(),
        },
    }
}

fn inline_bytes(bytes: &[u8]) -> String {
    if bytes.is_empty() || bytes.len() > MAX_INLINE_BYTES {
        return format!("({} bytes)", bytes.len());
    }
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use asn1::ASN1Object;
    use ber::{EncodingRules, ReaderOptions};

    use super::format_asn1;

    fn format(input: &[u8]) -> String {
        let obj = ASN1Object::decode(input, EncodingRules::Ber, ReaderOptions::default()).unwrap();
        format_asn1(&obj)
    }

    #[test]
    fn test_format_nested() {
        let input = [
            0x30, 0x0d, 0x02, 0x01, 0x05, 0x0c, 0x03, 0x61, 0x62, 0x63, 0xa0, 0x03, 0x01, 0x01,
            0xff,
        ];
        assert_eq!(
            format(&input),
            "SEQUENCE (3 elem)\n  INTEGER 5\n  UTF8String 'abc'\n  [0] (1 elem)\n    BOOLEAN true\n"
        );
    }

    #[test]
    fn test_format_values() {
        let input = [
            0x04, 0x02, 0xca, 0xfe, 0x04, 0x00, 0x03, 0x02, 0x04, 0xf0, 0x06, 0x03, 0x55, 0x04,
            0x03, 0x05, 0x00, 0x81, 0x01, 0x07,
        ];
        assert_eq!(
            format(&input),
            "OCTET STRING cafe\nOCTET STRING (0 bytes)\nBIT STRING (4 bits) f0\nOBJECT IDENTIFIER 2.5.4.3\nNULL\n[1] 07\n"
        );
    }

    #[test]
    fn test_format_long_octet_string() {
        let mut input = vec![0x04, 0x21];
        input.extend_from_slice(&[0xab; 33]);
        assert_eq!(format(&input), "OCTET STRING (33 bytes)\n");
    }
}
