//! Airport lookup codes.

use std::fmt;

use super::DomainError;

/// Which airport code field a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeKind {
    /// 3-letter commercial code (e.g. `LAX`).
    Iata,
    /// ICAO code or other ident (e.g. `KLAX`, `US-0042`).
    Icao,
}

impl CodeKind {
    /// Short uppercase label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            CodeKind::Iata => "IATA",
            CodeKind::Icao => "ICAO",
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maximum length of an ident, matching the widest ident in the source data.
const MAX_IDENT_LEN: usize = 10;

/// A normalized airport lookup code.
///
/// Codes are trimmed and uppercased on construction, so `lax`, ` LAX ` and
/// `LAX` all produce the same value. The kind is part of the value: an IATA
/// `ABC` and an ident `ABC` are different lookups.
///
/// # Examples
///
/// ```
/// use airfield_server::domain::{CodeKind, LookupCode};
///
/// let lax = LookupCode::parse(CodeKind::Iata, " lax ").unwrap();
/// assert_eq!(lax.as_str(), "LAX");
///
/// // Empty input is a caller error
/// assert!(LookupCode::parse(CodeKind::Iata, "  ").is_err());
///
/// // IATA codes are exactly 3 letters
/// assert!(LookupCode::parse(CodeKind::Iata, "KLAX").is_err());
/// assert!(LookupCode::parse(CodeKind::Icao, "KLAX").is_ok());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LookupCode {
    kind: CodeKind,
    code: String,
}

impl LookupCode {
    /// Parse and normalize a raw code for the given kind.
    pub fn parse(kind: CodeKind, raw: &str) -> Result<Self, DomainError> {
        let code = raw.trim().to_ascii_uppercase();

        if code.is_empty() {
            return Err(DomainError::EmptyCode(kind));
        }

        let invalid = |reason| DomainError::InvalidCode {
            kind,
            code: code.clone(),
            reason,
        };

        match kind {
            CodeKind::Iata => {
                if code.len() != 3 {
                    return Err(invalid("must be exactly 3 characters"));
                }
                if !code.bytes().all(|b| b.is_ascii_uppercase()) {
                    return Err(invalid("must be ASCII letters A-Z"));
                }
            }
            CodeKind::Icao => {
                if code.len() > MAX_IDENT_LEN {
                    return Err(invalid("must be at most 10 characters"));
                }
                if !code
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-')
                {
                    return Err(invalid("must be ASCII letters, digits or '-'"));
                }
            }
        }

        Ok(Self { kind, code })
    }

    /// Which field this code is matched against.
    pub fn kind(&self) -> CodeKind {
        self.kind
    }

    /// The normalized (uppercase) code.
    pub fn as_str(&self) -> &str {
        &self.code
    }
}

impl fmt::Debug for LookupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.label(), self.code)
    }
}

impl fmt::Display for LookupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any casing of a 3-letter code normalizes to the uppercase form
        #[test]
        fn iata_case_insensitive(s in "[a-zA-Z]{3}") {
            let code = LookupCode::parse(CodeKind::Iata, &s).unwrap();
            prop_assert_eq!(code.as_str(), s.to_ascii_uppercase());
        }

        /// Wrong-length IATA codes are always rejected
        #[test]
        fn iata_wrong_length_rejected(s in "[A-Z]{1,2}|[A-Z]{4,8}") {
            prop_assert!(LookupCode::parse(CodeKind::Iata, &s).is_err());
        }
    }
}
