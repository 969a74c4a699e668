//! Conversions from external infrastructure errors into domain errors.

use interconnect_common::CommonError;
use interconnect_domain::InterconnectError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub InterconnectError);

impl From<InfraError> for InterconnectError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<InterconnectError> for InfraError {
    fn from(value: InterconnectError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoInterconnectError {
    fn into_interconnect(self) -> InterconnectError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → InterconnectError */
/* -------------------------------------------------------------------------- */

impl IntoInterconnectError for HttpError {
    fn into_interconnect(self) -> InterconnectError {
        if self.is_timeout() {
            return InterconnectError::Timeout("HTTP request timed out".into());
        }

        if self.is_connect() {
            return InterconnectError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => InterconnectError::NotFound(message),
                429 | 500..=599 => InterconnectError::Network(message),
                400..=499 => InterconnectError::Gateway(message),
                _ => InterconnectError::Network(message),
            };
        }

        if self.is_decode() {
            return InterconnectError::Gateway(format!("undecodable HTTP body: {self}"));
        }

        InterconnectError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_interconnect())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → InterconnectError */
/* -------------------------------------------------------------------------- */

impl IntoInterconnectError for JsonError {
    fn into_interconnect(self) -> InterconnectError {
        InterconnectError::Gateway(format!("invalid JSON payload: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_interconnect())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → InterconnectError */
/* -------------------------------------------------------------------------- */

impl IntoInterconnectError for toml::de::Error {
    fn into_interconnect(self) -> InterconnectError {
        InterconnectError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_interconnect())
    }
}

/* -------------------------------------------------------------------------- */
/* CommonError → InterconnectError */
/* -------------------------------------------------------------------------- */

impl IntoInterconnectError for CommonError {
    fn into_interconnect(self) -> InterconnectError {
        let message = self.to_string();
        match self {
            CommonError::Timeout { .. } => InterconnectError::Timeout(message),
        }
    }
}

impl From<CommonError> for InfraError {
    fn from(value: CommonError) -> Self {
        InfraError(value.into_interconnect())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
