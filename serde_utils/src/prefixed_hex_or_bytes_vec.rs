use serde::{de::Error as _, Deserialize as _, Deserializer, Serializer};

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    if deserializer.is_human_readable() {
        let string = String::deserialize(deserializer)?;

        let digits = string
            .strip_prefix("0x")
            .ok_or_else(|| D::Error::custom(format!("hex string is missing 0x prefix: {string}")))?;

        const_hex::decode(digits).map_err(D::Error::custom)
    } else {
        Vec::deserialize(deserializer)
    }
}

pub fn serialize<S: Serializer>(bytes: impl AsRef<[u8]>, serializer: S) -> Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
        serializer.serialize_str(const_hex::encode_prefixed(bytes).as_str())
    } else {
        serializer.serialize_bytes(bytes.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use test_case::test_case;

    #[derive(PartialEq, Eq, Debug, Deserialize, Serialize)]
    struct Wrapper(#[serde(with = "crate::prefixed_hex_or_bytes_vec")] Vec<u8>);

    #[test_case("0x", &[])]
    #[test_case("0x0f", &[0x0f])]
    #[test_case("0xdeadBEEF", &[0xde, 0xad, 0xbe, 0xef])]
    fn deserializes_prefixed_hex(string: &str, expected: &[u8]) -> serde_json::Result<()> {
        let Wrapper(bytes) = serde_json::from_value(json!(string))?;
        assert_eq!(bytes, expected);
        Ok(())
    }

    #[test_case("0f"; "missing prefix")]
    #[test_case("0x0"; "odd length")]
    #[test_case("0xzz"; "not hex")]
    fn rejects_malformed_hex(string: &str) {
        serde_json::from_value::<Wrapper>(json!(string)).expect_err("input should be rejected");
    }

    #[test]
    fn serializes_with_prefix() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_value(Wrapper(vec![1, 2]))?, json!("0x0102"));
        Ok(())
    }
}
