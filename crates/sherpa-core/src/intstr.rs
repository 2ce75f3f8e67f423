//! 64-bit integers carried as JSON strings.
//!
//! JavaScript numbers lose precision above 2^53, so APIs exchanging full
//! 64-bit values use [`Int64s`] and [`Uint64s`]. They always serialize as a
//! quoted decimal string and accept either a quoted string or a plain JSON
//! integer when decoding. `null` is rejected; use `Option<Int64s>` for a
//! nullable slot.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! quoted_int {
    ($name:ident, $inner:ty, $expecting:literal) => {
        #[doc = concat!("`", stringify!($inner), "` encoded as a JSON string.")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub $inner);

        impl $name {
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<$inner>().map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct QuotedVisitor;

                impl<'de> Visitor<'de> for QuotedVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        f.write_str($expecting)
                    }

                    fn visit_str<E: de::Error>(self, v: &str) -> Result<$name, E> {
                        v.parse::<$inner>().map($name).map_err(|e| {
                            E::custom(format!("invalid {} {:?}: {}", stringify!($inner), v, e))
                        })
                    }

                    fn visit_i64<E: de::Error>(self, v: i64) -> Result<$name, E> {
                        <$inner>::try_from(v)
                            .map($name)
                            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
                    }

                    fn visit_u64<E: de::Error>(self, v: u64) -> Result<$name, E> {
                        <$inner>::try_from(v)
                            .map($name)
                            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
                    }
                }

                deserializer.deserialize_any(QuotedVisitor)
            }
        }
    };
}

quoted_int!(Int64s, i64, "a signed 64-bit integer, quoted or unquoted");
quoted_int!(Uint64s, u64, "an unsigned 64-bit integer, quoted or unquoted");
