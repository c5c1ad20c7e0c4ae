use std::fmt;
use std::str::FromStr;

/// Content octets carried by each CER string segment except the last.
pub(crate) const CER_SEGMENT_LEN: usize = 1000;

/// The X.690 encoding rule set an operation is bound by.
///
/// BER is permissive. CER and DER are canonical: each value has exactly one
/// valid encoding, CER favouring indefinite lengths and DER definite ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodingRules {
    Ber,
    Cer,
    #[default]
    Der,
}

impl EncodingRules {
    pub fn is_ber(self) -> bool {
        self == EncodingRules::Ber
    }

    pub fn is_cer(self) -> bool {
        self == EncodingRules::Cer
    }

    pub fn is_der(self) -> bool {
        self == EncodingRules::Der
    }

    /// CER and DER both restrict encodings to a canonical form.
    pub fn is_canonical(self) -> bool {
        !self.is_ber()
    }

    pub fn allows_indefinite_length(self) -> bool {
        !self.is_der()
    }

    pub fn allows_definite_constructed(self) -> bool {
        !self.is_cer()
    }

    pub fn allows_constructed_strings(self) -> bool {
        !self.is_der()
    }
}

impl fmt::Display for EncodingRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncodingRules::Ber => "BER",
            EncodingRules::Cer => "CER",
            EncodingRules::Der => "DER",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EncodingRules {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ber" => Ok(EncodingRules::Ber),
            "cer" => Ok(EncodingRules::Cer),
            "der" => Ok(EncodingRules::Der),
            other => Err(format!("unknown encoding rules '{}'", other)),
        }
    }
}
