//! Message-bus configuration.

use std::fmt;
use std::sync::Arc;

use crate::client::BusClient;

pub const FULLY_QUALIFIED_NAMESPACE_KEY: &str = "SERVICE_BUS_FULLY_QUALIFIED_NAMESPACE";
pub const QUEUE_OR_TOPIC_NAME_KEY: &str = "SERVICE_BUS_QUEUE_OR_TOPIC_NAME";

cloud_core::config_value! {
    /// Host name of the bus namespace, used when building a client.
    FullyQualifiedNamespace
}

cloud_core::config_value! {
    /// Name of the queue or topic a handler publishes to.
    QueueOrTopicName
}

/// Shared bus client plus the queue or topic to publish to.
#[derive(Clone)]
pub struct BusConfiguration {
    client: Arc<dyn BusClient>,
    queue_or_topic_name: QueueOrTopicName,
}

impl BusConfiguration {
    pub fn new(client: Arc<dyn BusClient>, queue_or_topic_name: QueueOrTopicName) -> Self {
        Self {
            client,
            queue_or_topic_name,
        }
    }

    pub fn client(&self) -> &Arc<dyn BusClient> {
        &self.client
    }

    pub fn queue_or_topic_name(&self) -> &QueueOrTopicName {
        &self.queue_or_topic_name
    }
}

impl fmt::Debug for BusConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusConfiguration")
            .field("queue_or_topic_name", &self.queue_or_topic_name)
            .finish_non_exhaustive()
    }
}

/// Bus settings loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct BusSettings {
    /// SERVICE_BUS_FULLY_QUALIFIED_NAMESPACE
    pub fully_qualified_namespace: FullyQualifiedNamespace,
    /// SERVICE_BUS_QUEUE_OR_TOPIC_NAME
    pub queue_or_topic_name: QueueOrTopicName,
}

impl BusSettings {
    pub fn from_env() -> cloud_core::Result<Self> {
        Ok(Self {
            fully_qualified_namespace: FullyQualifiedNamespace::from_env(FULLY_QUALIFIED_NAMESPACE_KEY)?,
            queue_or_topic_name: QueueOrTopicName::from_env(QUEUE_OR_TOPIC_NAME_KEY)?,
        })
    }

    /// Pairs the queue or topic name with a client built for the namespace.
    pub fn into_configuration(self, client: Arc<dyn BusClient>) -> BusConfiguration {
        BusConfiguration::new(client, self.queue_or_topic_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_core::ConfigurationError;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_bus_settings_from_env() {
        env::set_var(FULLY_QUALIFIED_NAMESPACE_KEY, "shop.servicebus.local");
        env::set_var(QUEUE_OR_TOPIC_NAME_KEY, "order-events");

        let settings = BusSettings::from_env().unwrap();
        assert_eq!(settings.fully_qualified_namespace.value(), "shop.servicebus.local");
        assert_eq!(settings.queue_or_topic_name.value(), "order-events");

        env::remove_var(FULLY_QUALIFIED_NAMESPACE_KEY);
        env::remove_var(QUEUE_OR_TOPIC_NAME_KEY);
    }

    #[test]
    #[serial]
    fn test_bus_settings_missing_queue() {
        env::set_var(FULLY_QUALIFIED_NAMESPACE_KEY, "shop.servicebus.local");
        env::remove_var(QUEUE_OR_TOPIC_NAME_KEY);

        let err = BusSettings::from_env().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::Missing {
                key: QUEUE_OR_TOPIC_NAME_KEY.to_string()
            }
        );

        env::remove_var(FULLY_QUALIFIED_NAMESPACE_KEY);
    }

    #[test]
    fn test_queue_name_rejects_whitespace() {
        let err = QueueOrTopicName::new("   ").unwrap_err();
        assert_eq!(err.to_string(), "The value '   ' is not valid.");
    }
}
