//! Deserialization of parameter groups whose values arrive as text.
//!
//! Query strings, path segments, headers, cookies and form bodies only carry
//! strings. [`from_text_value`] lets the model's field types decide how each
//! string is read: `"01234"` stays `"01234"` for a `String` field and becomes
//! `1234` for an integer field.
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Page {
//!     slug: String,
//!     limit: Option<u32>,
//!     draft: bool,
//! }
//!
//! let page: Page = reqguard::from_text_value(serde_json::json!({
//!     "slug": "01234",
//!     "limit": "20",
//!     "draft": "TRUE",
//! }))
//! .unwrap();
//! assert_eq!(page.slug, "01234");
//! assert_eq!(page.limit, Some(20));
//! assert!(page.draft);
//! ```

use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeOwned, IntoDeserializer, Unexpected, Visitor};
use serde::{forward_to_deserialize_any, Deserializer};
use serde_json::{Error, Value};

/// Deserialize `T` from a group of text values.
///
/// Strings are parsed into numbers and booleans where `T` expects them, an
/// empty string is `None` for an `Option`, and a single value is accepted
/// where a sequence is expected. Non-string values deserialize as usual.
pub fn from_text_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    T::deserialize(TextValue(value))
}

struct TextValue(Value);

impl<'de> IntoDeserializer<'de, Error> for TextValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

macro_rules! parse_text {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
                match self.0 {
                    Value::String(s) => match s.parse::<$ty>() {
                        Ok(n) => visitor.$visit(n),
                        Err(_) => Err(de::Error::invalid_value(Unexpected::Str(&s), &visitor)),
                    },
                    other => other.$method(visitor),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for TextValue {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Object(map) => {
                let mut access = MapDeserializer::<_, Error>::new(
                    map.into_iter().map(|(key, value)| (key, TextValue(value))),
                );
                let value = visitor.visit_map(&mut access)?;
                access.end()?;
                Ok(value)
            }
            Value::Array(items) => {
                let mut access = SeqDeserializer::<_, Error>::new(items.into_iter().map(TextValue));
                let value = visitor.visit_seq(&mut access)?;
                access.end()?;
                Ok(value)
            }
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::String(s) if s.eq_ignore_ascii_case("true") => visitor.visit_bool(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => visitor.visit_bool(false),
            other => other.deserialize_bool(visitor),
        }
    }

    parse_text! {
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_f32 => f32, visit_f32;
        deserialize_f64 => f64, visit_f64;
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            Value::String(s) if s.is_empty() => visitor.visit_none(),
            other => visitor.visit_some(TextValue(other)),
        }
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.0 {
            // `?tag=a` for a `Vec` field
            Value::String(s) => TextValue(Value::Array(vec![Value::String(s)])).deserialize_any(visitor),
            other => TextValue(other).deserialize_any(visitor),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.0.deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct tuple tuple_struct
        map struct identifier ignored_any
    }
}
