use core::time::Duration;

use serde::{Deserializer, Serializer};

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    crate::string_or_native::deserialize(deserializer).map(Duration::from_secs)
}

pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    crate::string_or_native::serialize(duration.as_secs(), serializer)
}
