//! Macros for defining typed ID types.

/// Macro to define a locally assigned arena handle with a specific prefix.
///
/// This generates a newtype wrapper around `u32` with:
/// - A `PREFIX` constant
/// - `from_index()` / `index()` for arena access
/// - `parse()` accepting `{prefix}_{index}`
/// - `Display` and `FromStr` implementations
/// - `Serialize` and `Deserialize` implementations (canonical string form)
/// - `Ord`, `Hash`, and other standard traits
///
/// # Example
///
/// ```ignore
/// define_handle!(LimitId, "limit");
///
/// let id = LimitId::from_index(2);
/// assert_eq!(id.to_string(), "limit_2");
/// ```
#[macro_export]
macro_rules! define_handle {
    ($name:ident, $prefix:literal) => {
        /// A locally assigned handle for this arena.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// The prefix for this handle type.
            pub const PREFIX: &'static str = $prefix;

            /// Creates a handle from its arena index.
            #[must_use]
            pub const fn from_index(index: u32) -> Self {
                Self(index)
            }

            /// Returns the arena index of this handle.
            #[must_use]
            pub const fn index(&self) -> u32 {
                self.0
            }

            /// Returns the arena index as a `usize`, for slice access.
            #[must_use]
            pub const fn slot(&self) -> usize {
                self.0 as usize
            }

            /// Parses a handle from a string.
            ///
            /// The string must be in the format `{prefix}_{index}`.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                if s.is_empty() {
                    return Err($crate::IdError::Empty);
                }

                let Some((prefix, index)) = s.split_once('_') else {
                    return Err($crate::IdError::MissingSeparator);
                };

                if prefix != Self::PREFIX {
                    return Err($crate::IdError::InvalidPrefix {
                        expected: Self::PREFIX,
                        actual: prefix.to_string(),
                    });
                }

                index
                    .parse::<u32>()
                    .map(Self)
                    .map_err(|_| $crate::IdError::InvalidNumber(index.to_string()))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", Self::PREFIX, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Macro to define an identifier assigned by the remote service.
///
/// The generated newtype wraps a `u64`, displays as the bare number, and
/// deserializes from either a JSON number or a JSON string holding digits.
#[macro_export]
macro_rules! define_remote_id {
    ($name:ident) => {
        /// An identifier assigned by the remote service.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw remote identifier.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw remote identifier.
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }

            /// Parses an identifier from its decimal form.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                $crate::__private::parse_decimal(s).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_u64(self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                deserializer
                    .deserialize_any($crate::__private::DecimalVisitor)
                    .map(Self)
            }
        }
    };
}
