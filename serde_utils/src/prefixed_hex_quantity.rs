// Quantities in the Ethereum JSON-RPC API are `0x`-prefixed hex strings without leading zeros.
// See <https://ethereum.org/en/developers/docs/apis/json-rpc/#quantities-encoding>.

use serde::{de::Error as _, Deserialize as _, Deserializer, Serializer};

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let string = String::deserialize(deserializer)?;

    let digits = string
        .strip_prefix("0x")
        .ok_or_else(|| D::Error::custom(format!("quantity is missing 0x prefix: {string}")))?;

    u64::from_str_radix(digits, 16).map_err(D::Error::custom)
}

pub fn serialize<S: Serializer>(quantity: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{quantity:#x}"))
}

pub mod option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Quantity(#[serde(with = "crate::prefixed_hex_quantity")] u64);

        Ok(Option::<Quantity>::deserialize(deserializer)?.map(|Quantity(quantity)| quantity))
    }
}
