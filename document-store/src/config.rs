//! Document store configuration: validated identifiers and the repository configuration.

use std::fmt;
use std::sync::Arc;

use crate::client::DocumentClient;

pub const ENDPOINT_KEY: &str = "DOCUMENT_STORE_ENDPOINT";
pub const DATABASE_ID_KEY: &str = "DOCUMENT_STORE_DATABASE_ID";
pub const CONTAINER_ID_KEY: &str = "DOCUMENT_STORE_CONTAINER_ID";

cloud_core::config_value! {
    /// Identifier of a database within the store account.
    DatabaseId
}

cloud_core::config_value! {
    /// Identifier of a container (collection) within a database.
    ContainerId
}

cloud_core::config_value! {
    /// Address of the store account, used when building a client.
    Endpoint
}

/// Everything a repository needs to bind to its container.
///
/// The client is shared with every other holder; the repository only resolves a container from it.
#[derive(Clone)]
pub struct StoreConfiguration {
    client: Arc<dyn DocumentClient>,
    database_id: DatabaseId,
    container_id: ContainerId,
}

impl StoreConfiguration {
    pub fn new(
        client: Arc<dyn DocumentClient>,
        database_id: DatabaseId,
        container_id: ContainerId,
    ) -> Self {
        Self {
            client,
            database_id,
            container_id,
        }
    }

    pub fn client(&self) -> &Arc<dyn DocumentClient> {
        &self.client
    }

    pub fn database_id(&self) -> &DatabaseId {
        &self.database_id
    }

    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }
}

impl fmt::Debug for StoreConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfiguration")
            .field("database_id", &self.database_id)
            .field("container_id", &self.container_id)
            .finish_non_exhaustive()
    }
}

/// Store settings loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// DOCUMENT_STORE_ENDPOINT
    pub endpoint: Endpoint,
    /// DOCUMENT_STORE_DATABASE_ID
    pub database_id: DatabaseId,
    /// DOCUMENT_STORE_CONTAINER_ID
    pub container_id: ContainerId,
}

impl StoreSettings {
    /// Loads all three values; fails on the first missing or blank one.
    pub fn from_env() -> cloud_core::Result<Self> {
        Ok(Self {
            endpoint: Endpoint::from_env(ENDPOINT_KEY)?,
            database_id: DatabaseId::from_env(DATABASE_ID_KEY)?,
            container_id: ContainerId::from_env(CONTAINER_ID_KEY)?,
        })
    }

    /// Pairs these identifiers with a client built for [`StoreSettings::endpoint`].
    pub fn into_configuration(self, client: Arc<dyn DocumentClient>) -> StoreConfiguration {
        StoreConfiguration::new(client, self.database_id, self.container_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_core::ConfigurationError;
    use serial_test::serial;
    use std::env;

    fn set_all() {
        env::set_var(ENDPOINT_KEY, "https://localhost:8081");
        env::set_var(DATABASE_ID_KEY, "shop");
        env::set_var(CONTAINER_ID_KEY, "orders");
    }

    fn clear_all() {
        env::remove_var(ENDPOINT_KEY);
        env::remove_var(DATABASE_ID_KEY);
        env::remove_var(CONTAINER_ID_KEY);
    }

    #[test]
    #[serial]
    fn test_settings_from_env() {
        set_all();
        let settings = StoreSettings::from_env().unwrap();
        assert_eq!(settings.endpoint.value(), "https://localhost:8081");
        assert_eq!(settings.database_id.value(), "shop");
        assert_eq!(settings.container_id.value(), "orders");
        clear_all();
    }

    #[test]
    #[serial]
    fn test_settings_from_env_rejects_blank_container() {
        set_all();
        env::set_var(CONTAINER_ID_KEY, " ");
        let err = StoreSettings::from_env().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::Invalid {
                value: " ".to_string()
            }
        );
        clear_all();
    }

    #[test]
    #[serial]
    fn test_settings_from_env_missing_database() {
        set_all();
        env::remove_var(DATABASE_ID_KEY);
        let err = StoreSettings::from_env().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::Missing {
                key: DATABASE_ID_KEY.to_string()
            }
        );
        clear_all();
    }

    #[test]
    fn test_identifiers_reject_blank() {
        assert!(DatabaseId::new("").is_err());
        assert!(ContainerId::new("\t").is_err());
        assert!(Endpoint::new("https://example.documents.local").is_ok());
    }
}
