//! Serde plumbing that turns INI strings into typed configuration structs.

use serde::de::value::{Error, MapDeserializer, StringDeserializer};
use serde::de::{self, DeserializeOwned, IntoDeserializer, Unexpected, Visitor};
use serde::{forward_to_deserialize_any, Deserialize, Deserializer};

/// Name and field names of a struct, as its `Deserialize` impl declares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StructShape {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// Asks `D` which fields it expects without deserializing anything.
///
/// Returns `None` when `D` is not a struct with named fields (including structs
/// using `#[serde(flatten)]`, which deserialize as maps).
pub(crate) fn struct_shape<D: DeserializeOwned>() -> Option<StructShape> {
    let mut shape = None;
    // The probe always errors; only the captured shape matters
    let _ = D::deserialize(ShapeProbe { shape: &mut shape });
    shape
}

struct ShapeProbe<'a> {
    shape: &'a mut Option<StructShape>,
}

impl<'de, 'a> Deserializer<'de> for ShapeProbe<'a> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.shape = Some(StructShape { name, fields });
        Err(de::Error::custom("struct shape captured"))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// Deserializes `D` from field name/value pairs.
pub(crate) fn from_pairs<D: DeserializeOwned>(pairs: Vec<(String, String)>) -> Result<D, Error> {
    let map = MapDeserializer::new(pairs.into_iter().map(|(k, v)| (k, IniValue(v))));
    D::deserialize(map)
}

/// A single INI value. Values are strings, but they parse into numbers and
/// booleans on request and are always "present" when asked for an `Option`.
pub(crate) struct IniValue(pub String);

impl<'de> IntoDeserializer<'de, Error> for IniValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

/// Boolean spellings accepted in INI files.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($ty:ty),)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            match self.0.trim().parse::<$ty>() {
                Ok(n) => visitor.$visit(n),
                Err(_) => Err(de::Error::invalid_value(
                    Unexpected::Str(&self.0),
                    &stringify!($ty),
                )),
            }
        }
    )*};
}

impl<'de> Deserializer<'de> for IniValue {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_string(self.0)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_some(self)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match parse_bool(&self.0) {
            Some(b) => visitor.visit_bool(b),
            None => Err(de::Error::invalid_value(
                Unexpected::Str(&self.0),
                &"a boolean",
            )),
        }
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(de::Error::invalid_value(
                Unexpected::Str(&self.0),
                &"a single character",
            )),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let variant: StringDeserializer<Error> = self.0.into_deserializer();
        visitor.visit_enum(variant)
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
    }

    forward_to_deserialize_any! {
        i128 u128 str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

/// Wraps a secret so that it never appears in `Debug` output or logs.
///
/// ```
/// use npg::config::Redacted;
///
/// let token = Redacted::new("hunter2".to_string());
/// assert_eq!(format!("{:?}", token), "Redacted(..)");
/// assert_eq!(token.expose(), "hunter2");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Redacted<T>(T);

impl<T> Redacted<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Redacted<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> std::fmt::Debug for Redacted<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Redacted(..)")
    }
}
