//! Fire-and-forget configuration pushes to the datastore service.
//!
//! After a configuration is applied to a device, the controller-side
//! datastore is told about the new state. These notifications are advisory:
//! a datastore that is down or refuses the push costs a warning and an
//! [`NotifyStatus::Unavailable`] outcome, never a failed call.

use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::config::{resolve_datastore_endpoint, ConfigError, ConfigPaths, DatastoreEndpoint};
use crate::target::{resolve_target_id, MissingTarget, TargetParams};
use crate::translate::DEFAULT_TIMEOUT;

/// Datastore operations the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOperation {
    /// Store a full controller-side configuration.
    SetControllerConfig,
    /// Store a full device-side configuration.
    SetDeviceConfig,
    /// Merge a partial controller-side update.
    UpdateControllerConfig,
    /// Merge a partial device-side update.
    UpdateDeviceConfig,
}

impl NotifyOperation {
    /// URL path segment of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyOperation::SetControllerConfig => "set_controller_config",
            NotifyOperation::SetDeviceConfig => "set_device_config",
            NotifyOperation::UpdateControllerConfig => "update_controller_config",
            NotifyOperation::UpdateDeviceConfig => "update_device_config",
        }
    }
}

impl Display for NotifyOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyStatus {
    /// Datastore accepted the push.
    Accepted,
    /// Datastore was unreachable or refused the push; the notification is
    /// dropped after a warning.
    Unavailable,
}

/// Errors that end a notification call before it reaches the wire.
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// Datastore endpoint could not be resolved.
    #[error("failed to resolve datastore endpoint: {0}")]
    Config(#[from] ConfigError),
    /// Module parameters carry no target element.
    #[error("failed to resolve target element: {0}")]
    MissingTarget(#[from] MissingTarget),
    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// JSON body of a datastore push.
#[derive(Debug, Serialize)]
struct NotifyRequest<'a> {
    neid: &'a str,
    source: &'a str,
    module: &'a str,
    data: &'a str,
}

/// Blocking client for the datastore service.
#[derive(Debug)]
pub struct DatastoreClient {
    http: Client,
    endpoint: DatastoreEndpoint,
}

static SHARED: OnceLock<DatastoreClient> = OnceLock::new();

impl DatastoreClient {
    /// Build a client for an already resolved endpoint.
    pub fn new(endpoint: DatastoreEndpoint, timeout: Duration) -> Result<Self, DatastoreError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    /// Resolve the endpoint from configuration, then build a client.
    pub fn from_paths(paths: &ConfigPaths, timeout: Duration) -> Result<Self, DatastoreError> {
        Self::new(resolve_datastore_endpoint(paths)?, timeout)
    }

    /// Endpoint the client pushes to.
    pub fn endpoint(&self) -> &DatastoreEndpoint {
        &self.endpoint
    }

    /// Push one configuration state notification.
    ///
    /// HTTP 200 means accepted; every other outcome is reported as
    /// [`NotifyStatus::Unavailable`] after a warning, never as an error.
    pub fn notify(
        &self,
        operation: NotifyOperation,
        params: &TargetParams,
        module: &str,
        data: &str,
    ) -> Result<NotifyStatus, DatastoreError> {
        let neid = resolve_target_id(params)?;
        let request = NotifyRequest {
            neid,
            source: "running",
            module,
            data,
        };
        let url = self.endpoint.operation_url(operation.as_str());

        match self.http.post(url).json(&request).send() {
            Ok(response) if response.status() == StatusCode::OK => Ok(NotifyStatus::Accepted),
            Ok(response) => {
                warn!(
                    neid,
                    operation = operation.as_str(),
                    status = %response.status(),
                    "datastore refused notification"
                );
                Ok(NotifyStatus::Unavailable)
            }
            Err(err) => {
                warn!(
                    neid,
                    operation = operation.as_str(),
                    "datastore unreachable: {err}"
                );
                Ok(NotifyStatus::Unavailable)
            }
        }
    }

    /// Store a full controller-side configuration.
    pub fn set_controller_config(
        &self,
        params: &TargetParams,
        module: &str,
        data: &str,
    ) -> Result<NotifyStatus, DatastoreError> {
        self.notify(NotifyOperation::SetControllerConfig, params, module, data)
    }

    /// Store a full device-side configuration.
    pub fn set_device_config(
        &self,
        params: &TargetParams,
        module: &str,
        data: &str,
    ) -> Result<NotifyStatus, DatastoreError> {
        self.notify(NotifyOperation::SetDeviceConfig, params, module, data)
    }

    /// Merge a partial controller-side update.
    pub fn update_controller_config(
        &self,
        params: &TargetParams,
        module: &str,
        data: &str,
    ) -> Result<NotifyStatus, DatastoreError> {
        self.notify(NotifyOperation::UpdateControllerConfig, params, module, data)
    }

    /// Merge a partial device-side update.
    pub fn update_device_config(
        &self,
        params: &TargetParams,
        module: &str,
        data: &str,
    ) -> Result<NotifyStatus, DatastoreError> {
        self.notify(NotifyOperation::UpdateDeviceConfig, params, module, data)
    }
}

/// Process-wide client, resolved from `paths` on first use.
///
/// Later calls reuse the first instance and never touch the configuration
/// again, even when called with different candidates.
pub fn shared(paths: &ConfigPaths) -> Result<&'static DatastoreClient, DatastoreError> {
    if let Some(client) = SHARED.get() {
        return Ok(client);
    }
    let client = DatastoreClient::from_paths(paths, DEFAULT_TIMEOUT)?;
    Ok(SHARED.get_or_init(|| client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::SocketAddr;

    use mockito::Matcher;
    use tempfile::{tempdir, TempDir};

    fn endpoint_for(addr: &SocketAddr) -> DatastoreEndpoint {
        DatastoreEndpoint {
            host: addr.ip().to_string(),
            port: addr.port(),
        }
    }

    fn controller_config(addr: &SocketAddr) -> (TempDir, ConfigPaths) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("plugin.yaml");
        fs::write(
            &path,
            format!(
                "mediator_controller_host: {}\nmediator_controller_port: {}\n",
                addr.ip(),
                addr.port()
            ),
        )
        .expect("config file should be writable");
        (dir, ConfigPaths::single(path))
    }

    fn device_params() -> TargetParams {
        TargetParams::from_host("device-1")
    }

    #[test]
    fn accepted_notification_posts_expected_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/datastore/set_device_config")
            .match_body(Matcher::Json(serde_json::json!({
                "neid": "device-1",
                "source": "running",
                "module": "interfaces",
                "data": "<config/>",
            })))
            .with_status(200)
            .create();

        let client = DatastoreClient::new(endpoint_for(&server.socket_address()), DEFAULT_TIMEOUT)
            .expect("client should build");
        let status = client
            .set_device_config(&device_params(), "interfaces", "<config/>")
            .expect("notification should not error");

        mock.assert();
        assert_eq!(status, NotifyStatus::Accepted);
    }

    #[test]
    fn each_operation_has_its_own_path() {
        let operations = [
            NotifyOperation::SetControllerConfig,
            NotifyOperation::SetDeviceConfig,
            NotifyOperation::UpdateControllerConfig,
            NotifyOperation::UpdateDeviceConfig,
        ];
        let mut server = mockito::Server::new();
        let client = DatastoreClient::new(endpoint_for(&server.socket_address()), DEFAULT_TIMEOUT)
            .expect("client should build");

        for operation in operations {
            let path = format!("/v1/datastore/{}", operation.as_str());
            let mock = server.mock("POST", path.as_str()).with_status(200).create();
            let status = client
                .notify(operation, &device_params(), "interfaces", "<config/>")
                .expect("notification should not error");
            mock.assert();
            assert_eq!(status, NotifyStatus::Accepted);
        }
    }

    #[test]
    fn refused_notification_reports_unavailable() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/datastore/update_device_config")
            .with_status(503)
            .create();

        let client = DatastoreClient::new(endpoint_for(&server.socket_address()), DEFAULT_TIMEOUT)
            .expect("client should build");
        let status = client
            .update_device_config(&device_params(), "interfaces", "<config/>")
            .expect("notification should not error");

        mock.assert();
        assert_eq!(status, NotifyStatus::Unavailable);
    }

    #[test]
    fn unreachable_datastore_reports_unavailable() {
        // nothing listens on port 1
        let endpoint = DatastoreEndpoint {
            host: "127.0.0.1".to_string(),
            port: 1,
        };
        let client =
            DatastoreClient::new(endpoint, DEFAULT_TIMEOUT).expect("client should build");
        let status = client
            .set_controller_config(&device_params(), "interfaces", "<config/>")
            .expect("notification should not error");
        assert_eq!(status, NotifyStatus::Unavailable);
    }

    #[test]
    fn missing_target_is_fatal() {
        let endpoint = DatastoreEndpoint {
            host: "127.0.0.1".to_string(),
            port: 1,
        };
        let client =
            DatastoreClient::new(endpoint, DEFAULT_TIMEOUT).expect("client should build");
        let err = client
            .notify(
                NotifyOperation::SetDeviceConfig,
                &TargetParams::default(),
                "interfaces",
                "<config/>",
            )
            .expect_err("notification should fail");
        assert!(matches!(err, DatastoreError::MissingTarget(_)));
    }

    #[test]
    fn from_paths_resolves_controller_endpoint() {
        let server = mockito::Server::new();
        let (_config_dir, paths) = controller_config(&server.socket_address());
        let client = DatastoreClient::from_paths(&paths, DEFAULT_TIMEOUT)
            .expect("client should build");
        assert_eq!(client.endpoint().port, server.socket_address().port());
    }

    #[test]
    fn shared_factory_reuses_one_instance() {
        let server = mockito::Server::new();
        let (_config_dir, paths) = controller_config(&server.socket_address());

        let first = shared(&paths).expect("shared client should build");
        let second = shared(&paths).expect("shared client should build");
        assert!(std::ptr::eq(first, second));
    }
}
