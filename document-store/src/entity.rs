//! Entity contract: what every document managed by a repository must expose.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A document stored in a partitioned container.
///
/// The serialized form must carry the identifier in an `id` string field; the store
/// writes the concurrency token back into `_etag`, so entities that take part in
/// optimistic concurrency should deserialize that field and return it from [`Entity::etag`].
///
/// `id` and `partition_key` together address exactly one document in a container.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identifier type. Its `Display` form is the document key and must be stable across round-trips.
    type Id: fmt::Display + Clone + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    fn partition_key(&self) -> PartitionKey;

    /// Concurrency token read with this entity. `Some` makes a save conditional on it; `None` saves unconditionally.
    fn etag(&self) -> Option<&str>;
}

/// Value of the container's partitioning attribute for one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PartitionKey {
    /// The document has no partition key value (the attribute is absent).
    #[default]
    None,
    /// The attribute is present and set to JSON `null`.
    Null,
    Bool(bool),
    Number(i64),
    String(String),
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionKey::None => f.write_str("<none>"),
            PartitionKey::Null => f.write_str("null"),
            PartitionKey::Bool(value) => write!(f, "{}", value),
            PartitionKey::Number(value) => write!(f, "{}", value),
            PartitionKey::String(value) => f.write_str(value),
        }
    }
}

impl From<&str> for PartitionKey {
    fn from(value: &str) -> Self {
        PartitionKey::String(value.to_string())
    }
}

impl From<String> for PartitionKey {
    fn from(value: String) -> Self {
        PartitionKey::String(value)
    }
}

impl From<i64> for PartitionKey {
    fn from(value: i64) -> Self {
        PartitionKey::Number(value)
    }
}

impl From<bool> for PartitionKey {
    fn from(value: bool) -> Self {
        PartitionKey::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_key_conversions() {
        assert_eq!(PartitionKey::from("p1"), PartitionKey::String("p1".to_string()));
        assert_eq!(PartitionKey::from(7), PartitionKey::Number(7));
        assert_eq!(PartitionKey::from(true), PartitionKey::Bool(true));
        assert_eq!(PartitionKey::default(), PartitionKey::None);
    }

    #[test]
    fn test_partition_key_display() {
        assert_eq!(PartitionKey::from("tenant-a").to_string(), "tenant-a");
        assert_eq!(PartitionKey::Number(42).to_string(), "42");
        assert_eq!(PartitionKey::Null.to_string(), "null");
    }
}
