//! Client for the monitoring hub's REST API.
//!
//! The hub owns device/register persistence and the field-protocol polling;
//! this client only consumes its read/write surface:
//!
//! - device and register listings
//! - starting/stopping a monitoring session for a device
//! - updating a register's monitored flag and writing register values
//!
//! ## Example
//!
//! ```rust,no_run
//! use plcwatch_client::HubClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HubClient::builder()
//!         .endpoint("http://localhost:5000")
//!         .credentials("operator", "secret")
//!         .build();
//!
//!     for device in client.list_devices().await? {
//!         println!("{} ({})", device.name, device.address());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;

use plcwatch_types::{Device, DeviceId, Register, RegisterId};

use crate::ClientError;

/// REST client for the monitoring hub.
#[derive(Debug, Clone)]
pub struct HubClient {
    client: Client,
    endpoint: String,
    credentials: Option<(String, String)>,
}

#[derive(Serialize)]
struct MonitoredPatch {
    is_monitored: bool,
}

#[derive(Serialize)]
struct ValuePatch {
    value: f64,
}

impl HubClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HubClientBuilder {
        HubClientBuilder::default()
    }

    /// List all devices known to the hub.
    pub async fn list_devices(&self) -> Result<Vec<Device>, ClientError> {
        let response = self
            .request(Method::GET, &self.url("/api/plcs"))
            .send()
            .await?;
        let response = check(response, "device list").await?;
        decode(response).await
    }

    /// Fetch a single device.
    pub async fn device(&self, device: DeviceId) -> Result<Device, ClientError> {
        let url = self.url(&format!("/api/plcs/{device}"));
        let response = self.request(Method::GET, &url).send().await?;
        let response = check(response, &format!("device {device}")).await?;
        decode(response).await
    }

    /// List the registers configured on a device.
    ///
    /// An empty list means the device genuinely has no registers; fetch
    /// failures are returned as errors, never as an empty list.
    pub async fn list_registers(&self, device: DeviceId) -> Result<Vec<Register>, ClientError> {
        let url = self.url(&format!("/api/plcs/{device}/registers"));
        let response = self.request(Method::GET, &url).send().await?;
        let response = check(response, &format!("device {device}")).await?;
        decode(response).await
    }

    /// Ask the hub to start polling the device and pushing register updates.
    ///
    /// Idempotent on the hub side: starting an already-monitored device is
    /// acknowledged without error.
    pub async fn start_monitoring(&self, device: DeviceId) -> Result<(), ClientError> {
        let url = self.url(&format!("/api/plcs/{device}/start-monitoring"));
        let response = self.request(Method::POST, &url).send().await?;
        check(response, &format!("device {device}")).await?;
        Ok(())
    }

    /// Ask the hub to stop polling the device.
    pub async fn stop_monitoring(&self, device: DeviceId) -> Result<(), ClientError> {
        let url = self.url(&format!("/api/plcs/{device}/stop-monitoring"));
        let response = self.request(Method::POST, &url).send().await?;
        check(response, &format!("device {device}")).await?;
        Ok(())
    }

    /// Update a register's monitored flag, returning the updated register.
    pub async fn set_monitored(
        &self,
        device: DeviceId,
        register: RegisterId,
        monitored: bool,
    ) -> Result<Register, ClientError> {
        let url = self.url(&format!("/api/plcs/{device}/registers/{register}"));
        let response = self
            .request(Method::PUT, &url)
            .json(&MonitoredPatch { is_monitored: monitored })
            .send()
            .await?;
        let response = check(response, &format!("register {register}")).await?;
        decode(response).await
    }

    /// Write a value to a register on the device.
    pub async fn write_register(
        &self,
        device: DeviceId,
        register: RegisterId,
        value: f64,
    ) -> Result<(), ClientError> {
        let url = self.url(&format!("/api/plcs/{device}/registers/{register}/value"));
        let response = self
            .request(Method::PUT, &url)
            .json(&ValuePatch { value })
            .send()
            .await?;
        check(response, &format!("register {register}")).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }
        request
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}

/// Map a non-success status to the matching error.
async fn check(response: Response, context: &str) -> Result<Response, ClientError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Auth("Invalid credentials".to_string()));
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(context.to_string()));
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::Http {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}

/// Builder for [`HubClient`].
#[derive(Debug, Default)]
pub struct HubClientBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
}

impl HubClientBuilder {
    /// Set the hub base URL (e.g. "http://localhost:5000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the username and password for authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> HubClient {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        let credentials = match (self.username, self.password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        };

        HubClient {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| "http://localhost:5000".to_string()),
            credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = HubClient::builder().build();
        assert_eq!(client.endpoint, "http://localhost:5000");
        assert!(client.credentials.is_none());
    }

    #[test]
    fn test_builder_custom() {
        let client = HubClient::builder()
            .endpoint("http://hub.local:5000")
            .credentials("operator", "secret")
            .build();

        assert_eq!(client.endpoint, "http://hub.local:5000");
        assert_eq!(
            client.credentials,
            Some(("operator".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn test_url_joining() {
        let client = HubClient::builder()
            .endpoint("http://hub.local:5000/")
            .build();
        assert_eq!(
            client.url("/api/plcs/3/registers"),
            "http://hub.local:5000/api/plcs/3/registers"
        );
    }
}
