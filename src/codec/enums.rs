//! Serde adapters for protobuf scalar encodings
//!
//! Protobuf enums travel as `i32` on the wire but are edited by name, and
//! `bytes` fields are edited as base64.

use serde::{Deserialize, Deserializer, Serializer};

/// A protobuf enum with a fixed name/number table
pub trait NamedEnum: Copy + Sized + 'static {
    /// Fully qualified protobuf type name
    const TYPE_NAME: &'static str;
    /// Every variant, in declaration order
    const ALL: &'static [Self];

    fn number(self) -> i32;
    fn name(self) -> &'static str;

    fn from_number(number: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.number() == number)
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.name() == name)
    }
}

/// `Option<i32>` enum field rendered by name
///
/// Numbers without a name are rendered as numbers so nothing is lost.
pub mod named {
    use serde::de::Error as _;

    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Name(String),
        Number(i64),
    }

    pub fn serialize<E: NamedEnum, S: Serializer>(
        value: &Option<i32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            None => serializer.serialize_none(),
            Some(number) => match E::from_number(*number) {
                Some(variant) => serializer.serialize_str(variant.name()),
                None => serializer.serialize_i32(*number),
            },
        }
    }

    pub fn deserialize<'de, E: NamedEnum, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i32>, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Name(name)) => E::from_name(&name)
                .map(|v| Some(v.number()))
                .ok_or_else(|| {
                    D::Error::custom(format!("unknown {} value '{}'", E::TYPE_NAME, name))
                }),
            Some(Repr::Number(number)) => i32::try_from(number)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("{} value out of range", E::TYPE_NAME))),
        }
    }
}

/// `Option<Vec<u8>>` field rendered as standard base64
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::de::Error as _;

    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            None => serializer.serialize_none(),
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| STANDARD.decode(text.as_bytes()).map_err(D::Error::custom))
            .transpose()
    }
}
