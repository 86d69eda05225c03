use crate::OrderKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serializes the key as its raw string form, the shape sync records carry
/// on the wire and in the device's object store.
impl Serialize for OrderKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Deserializes and re-validates a key from its raw string form.
///
/// Invalid keys are rejected at the deserialization boundary so corrupt
/// stored orders surface as decode errors instead of propagating further.
impl<'de> Deserialize<'de> for OrderKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        OrderKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}
