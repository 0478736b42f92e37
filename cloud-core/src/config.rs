//! Validated configuration value objects.
//!
//! Every identifier handed to a repository or message handler (database id,
//! container id, endpoint, namespace, queue name) is a non-blank string wrapped
//! in its own newtype. [`config_value!`](crate::config_value) generates those
//! newtypes; [`require_non_blank`] and [`env_value`] hold the shared rules.

use std::env;

use crate::error::{ConfigurationError, Result};

/// Returns `value` unchanged, or [`ConfigurationError::Invalid`] when it is empty or whitespace.
pub fn require_non_blank(value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(ConfigurationError::Invalid { value });
    }
    Ok(value)
}

/// Reads `key` from the process environment.
pub fn env_value(key: &str) -> Result<String> {
    env::var(key).map_err(|_| ConfigurationError::Missing {
        key: key.to_string(),
    })
}

/// Declares a validated, immutable string value object.
///
/// ```
/// cloud_core::config_value! {
///     /// Name of the tenant.
///     TenantName
/// }
///
/// let tenant = TenantName::new("contoso").unwrap();
/// assert_eq!(tenant.value(), "contoso");
/// assert!(TenantName::new("  ").is_err());
/// ```
#[macro_export]
macro_rules! config_value {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Validates and wraps `value`; blank values are rejected.
            pub fn new(value: impl Into<String>) -> ::std::result::Result<Self, $crate::ConfigurationError> {
                $crate::config::require_non_blank(value.into()).map(Self)
            }

            /// Reads and validates the value stored under the environment variable `key`.
            pub fn from_env(key: &str) -> ::std::result::Result<Self, $crate::ConfigurationError> {
                $crate::config::env_value(key).and_then(Self::new)
            }

            pub fn value(&self) -> &str {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::std::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::ConfigurationError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}
