// Beacon node APIs are inconsistent about integer encoding.
// Some versions quote every `uint64` (as the standard Beacon Node API requires),
// others emit plain JSON numbers. Accept both and always emit strings.

use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    marker::PhantomData,
    str::FromStr,
};

use serde::{
    de::{Error, IntoDeserializer as _, Visitor},
    Deserialize, Deserializer, Serializer,
};

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de> + FromStr<Err: Display>,
    D: Deserializer<'de>,
{
    struct StringOrNativeVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for StringOrNativeVisitor<T>
    where
        T: Deserialize<'de> + FromStr<Err: Display>,
    {
        type Value = T;

        fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
            formatter.write_str("an integer or a string containing one")
        }

        fn visit_str<E: Error>(self, string: &str) -> Result<Self::Value, E> {
            string.parse().map_err(E::custom)
        }

        fn visit_u64<E: Error>(self, value: u64) -> Result<Self::Value, E> {
            T::deserialize(value.into_deserializer())
        }

        fn visit_i64<E: Error>(self, value: i64) -> Result<Self::Value, E> {
            T::deserialize(value.into_deserializer())
        }
    }

    deserializer.deserialize_any(StringOrNativeVisitor(PhantomData))
}

pub fn serialize<S: Serializer>(value: impl Display, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value)
}

pub mod option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Integer(#[serde(with = "crate::string_or_native")] u64);

        Ok(Option::<Integer>::deserialize(deserializer)?.map(|Integer(integer)| integer))
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU64;

    use serde::{Deserialize, Serialize};
    use serde_json::{json, Result};
    use test_case::test_case;

    #[derive(PartialEq, Eq, Debug, Deserialize, Serialize)]
    struct Wrapper {
        #[serde(with = "crate::string_or_native")]
        slot: u64,
    }

    #[test_case(json!({ "slot": 12 }); "native")]
    #[test_case(json!({ "slot": "12" }); "quoted")]
    fn deserializes_both_encodings(value: serde_json::Value) -> Result<()> {
        assert_eq!(serde_json::from_value::<Wrapper>(value)?, Wrapper { slot: 12 });
        Ok(())
    }

    #[test]
    fn optional_integer_may_be_null() -> Result<()> {
        #[derive(Deserialize)]
        struct Optional {
            #[serde(default, with = "crate::string_or_native::option")]
            index: Option<u64>,
        }

        assert_eq!(serde_json::from_value::<Optional>(json!({ "index": null }))?.index, None);
        assert_eq!(serde_json::from_value::<Optional>(json!({ "index": "3" }))?.index, Some(3));
        assert_eq!(serde_json::from_value::<Optional>(json!({}))?.index, None);

        Ok(())
    }

    #[test]
    fn serializes_as_string() -> Result<()> {
        assert_eq!(serde_json::to_value(Wrapper { slot: 7 })?, json!({ "slot": "7" }));
        Ok(())
    }

    #[test]
    fn rejects_zero_for_non_zero_types() {
        #[derive(Debug, Deserialize)]
        struct NonZero {
            #[serde(with = "crate::string_or_native")]
            #[expect(dead_code, reason = "only deserialization is under test")]
            value: NonZeroU64,
        }

        serde_json::from_value::<NonZero>(json!({ "value": "0" }))
            .expect_err("zero should be rejected");
    }
}
