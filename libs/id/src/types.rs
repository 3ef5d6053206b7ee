//! Typed ID definitions.

use crate::{define_handle, define_remote_id};

// =============================================================================
// Arena handles (assigned while resolving the operations tree)
// =============================================================================

define_handle!(LimitId, "limit");
define_handle!(OperationId, "op");

// =============================================================================
// Remote identifiers
// =============================================================================

define_remote_id!(PlayerId);
define_remote_id!(TableId);
define_remote_id!(GameId);

#[doc(hidden)]
pub mod __private {
    use std::fmt;

    use serde::de::{self, Visitor};

    use crate::IdError;

    pub fn parse_decimal(s: &str) -> Result<u64, IdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        s.parse::<u64>()
            .map_err(|_| IdError::InvalidNumber(s.to_string()))
    }

    /// Accepts `123` and `"123"` alike.
    pub struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an unsigned integer or a string of digits")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::custom(IdError::InvalidNumber(v.to_string())))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            parse_decimal(v).map_err(E::custom)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
