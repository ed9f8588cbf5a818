//! Broadcast models shared between the upstream client and services

use serde::{Deserialize, Deserializer, Serialize};

/// A live broadcast as listed by the upstream API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastItem {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable")]
    pub country: String,
    #[serde(default, deserialize_with = "nullable")]
    pub sexual_orientation: String,
    #[serde(rename = "profileImageURL", default, deserialize_with = "nullable")]
    pub profile_image_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub preview: Preview,
    /// Current viewer count, 0 when the upstream omits it
    #[serde(default, deserialize_with = "nullable")]
    pub viewers: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub broadcast_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub gender: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<Tag>,
}

/// Preview media of a broadcast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
}

/// Tag attached to a broadcast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub slug: String,
}

/// One page of broadcasts returned by a single upstream call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadcastBatch {
    /// Total number of broadcasts the upstream reports
    #[serde(default, deserialize_with = "nullable")]
    pub total: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<BroadcastItem>,
}

/// Treat an explicit `null` like a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
