//! Storage key derivation for note names.
//!
//! Keys are standard base64 of the UTF-8 name bytes with `=` padding swapped
//! for `_`, so they fit in a URL path segment and decode back to the name.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PADDING: char = '=';
const PADDING_SUBSTITUTE: char = '_';

/// Error returned when a storage key cannot be decoded into a note name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Key is not valid (substituted) base64.
    InvalidEncoding(String),
    /// Decoded bytes are not UTF-8.
    InvalidUtf8(String),
}

impl Display for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEncoding(key) => write!(f, "invalid note key encoding: `{key}`"),
            Self::InvalidUtf8(key) => write!(f, "note key `{key}` does not decode to UTF-8"),
        }
    }
}

impl Error for KeyError {}

/// Derives the deterministic storage key for `name`.
pub fn derive_key(name: &str) -> String {
    STANDARD
        .encode(name.as_bytes())
        .replace(PADDING, &PADDING_SUBSTITUTE.to_string())
}

/// Decodes a key produced by [`derive_key`] back into the note name.
pub fn decode_key(key: &str) -> Result<String, KeyError> {
    let padded = key.replace(PADDING_SUBSTITUTE, &PADDING.to_string());
    let bytes = STANDARD
        .decode(padded.as_bytes())
        .map_err(|_| KeyError::InvalidEncoding(key.to_string()))?;
    String::from_utf8(bytes).map_err(|_| KeyError::InvalidUtf8(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{decode_key, derive_key, KeyError};

    #[test]
    fn padding_is_replaced_with_underscore() {
        assert_eq!(derive_key("a"), "YQ__");
        assert_eq!(derive_key("ab"), "YWI_");
        assert_eq!(derive_key("abc"), "YWJj");
    }

    #[test]
    fn keys_round_trip_for_assorted_names() {
        for name in ["index", "2024-01-31", "with space", "a/b?c=d", "naïve café", "🦀"] {
            let key = derive_key(name);
            assert!(!key.contains('='), "key `{key}` still carries padding");
            assert_eq!(decode_key(&key).unwrap(), name);
        }
    }

    #[test]
    fn distinct_names_get_distinct_keys() {
        assert_ne!(derive_key("Note"), derive_key("note"));
        assert_ne!(derive_key("a"), derive_key("a "));
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_key("***").unwrap_err();
        assert!(matches!(err, KeyError::InvalidEncoding(_)));
    }
}
