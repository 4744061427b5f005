//! HTTP store-locator provider.
//!
//! Issues one `GET` per anchor:
//!
//! ```text
//! GET <endpoint>?lon=<lon>&lat=<lat>&dist=<max_distance>&top=<max_results>
//! ```
//!
//! and expects a JSON array of records (see
//! [`LocationRecord`] for the accepted field names). The service caps
//! both the search radius and the result count, which is why the
//! pipeline queries several anchors and deduplicates.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::Agent;

use looptour_pipeline::{Anchor, LocationProvider, LocationRecord, ProviderError};

/// Settings for [`HttpLocationProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpProviderConfig {
    /// Store-locator URL, without query string.
    pub endpoint: String,
    /// Search radius sent as `dist`. The service rejects values above 1000.
    pub max_distance: u32,
    /// Result cap sent as `top`. The service never returns more than 250.
    pub max_results: u32,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpProviderConfig {
    /// Default store-locator endpoint.
    pub const DEFAULT_ENDPOINT: &str =
        "http://www.kfc.com/storelocator/Services/SpatialData.svc/findNearbyStoresFiltered";
    /// Default `dist` parameter.
    pub const DEFAULT_MAX_DISTANCE: u32 = 1000;
    /// Default `top` parameter.
    pub const DEFAULT_MAX_RESULTS: u32 = 250;
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_owned(),
            max_distance: Self::DEFAULT_MAX_DISTANCE,
            max_results: Self::DEFAULT_MAX_RESULTS,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// [`LocationProvider`] backed by a store-locator web service.
#[derive(Debug, Clone)]
pub struct HttpLocationProvider {
    agent: Agent,
    config: HttpProviderConfig,
}

impl HttpLocationProvider {
    /// Create a provider with its own HTTP agent.
    #[must_use]
    pub fn new(config: HttpProviderConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();
        Self { agent, config }
    }

    /// The provider's settings.
    #[must_use]
    pub const fn config(&self) -> &HttpProviderConfig {
        &self.config
    }
}

impl LocationProvider for HttpLocationProvider {
    fn query(&self, anchor: &Anchor) -> Result<Vec<LocationRecord>, ProviderError> {
        debug!(endpoint = %self.config.endpoint, %anchor, "querying store locator");

        let body = self
            .agent
            .get(self.config.endpoint.as_str())
            .query("lon", anchor.lon.to_string())
            .query("lat", anchor.lat.to_string())
            .query("dist", self.config.max_distance.to_string())
            .query("top", self.config.max_results.to_string())
            .call()
            .and_then(|mut response| response.body_mut().read_to_string())
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let records = parse_records(&body)?;
        debug!(%anchor, records = records.len(), "store locator answered");
        Ok(records)
    }
}

/// Decode a store-locator response body.
///
/// # Errors
///
/// Returns [`ProviderError::Malformed`] if `body` is not a JSON array of
/// records.
pub fn parse_records(body: &str) -> Result<Vec<LocationRecord>, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use looptour_pipeline::PointId;

    use super::*;

    /// Serve exactly one HTTP response on a loopback port. The handle
    /// yields the request line.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/stores", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header.trim().is_empty() {
                    break;
                }
            }
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            request_line
        });
        (endpoint, handle)
    }

    /// Provider talking to `endpoint` directly, ignoring proxy settings
    /// from the environment.
    fn provider(endpoint: String) -> HttpLocationProvider {
        HttpLocationProvider {
            agent: Agent::config_builder()
                .proxy(None)
                .timeout_global(Some(Duration::from_secs(5)))
                .build()
                .into(),
            config: HttpProviderConfig {
                endpoint,
                ..HttpProviderConfig::default()
            },
        }
    }

    #[test]
    fn query_sends_anchor_and_limits() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"[{"entityID": 5, "longitude": -121.8, "latitude": 39.7, "state": "CA"}]"#,
        );

        let records = provider(endpoint)
            .query(&Anchor::new(-121.832_886, 39.702_961))
            .unwrap();

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /stores?"), "{request_line}");
        assert!(request_line.contains("lon=-121.832886"), "{request_line}");
        assert!(request_line.contains("lat=39.702961"), "{request_line}");
        assert!(request_line.contains("dist=1000"), "{request_line}");
        assert!(request_line.contains("top=250"), "{request_line}");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, PointId::Integer(5));
        assert_eq!(records[0].region.as_deref(), Some("CA"));
    }

    #[test]
    fn server_error_is_a_request_error() {
        let (endpoint, server) = serve_once("500 Internal Server Error", "{}");
        let err = provider(endpoint).query(&Anchor::new(0.0, 0.0)).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, ProviderError::Request(_)), "{err:?}");
    }

    #[test]
    fn non_array_body_is_malformed() {
        let (endpoint, server) = serve_once("200 OK", r#"{"error": "too far"}"#);
        let err = provider(endpoint).query(&Anchor::new(0.0, 0.0)).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, ProviderError::Malformed(_)), "{err:?}");
    }

    #[test]
    fn unreachable_endpoint_is_a_request_error() {
        // Bind then drop to get a port nobody listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = provider(format!("http://127.0.0.1:{port}/stores"))
            .query(&Anchor::new(0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)), "{err:?}");
    }

    #[test]
    fn parse_records_accepts_plain_field_names() {
        let body = r#"[
            {"id": "s-1", "lon": 1.5, "lat": 2.5},
            {"id": 9, "lon": 0, "lat": 0, "region": "NV"}
        ]"#;
        let records = parse_records(body).unwrap();
        assert_eq!(records[0].id, PointId::Text("s-1".into()));
        assert!(records[0].region.is_none());
        assert_eq!(records[1].region.as_deref(), Some("NV"));
    }

    #[test]
    fn parse_records_rejects_missing_coordinates() {
        let err = parse_records(r#"[{"id": 1, "lon": 1.5}]"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn default_config_matches_service_limits() {
        let config = HttpProviderConfig::default();
        assert_eq!(config.max_distance, 1000);
        assert_eq!(config.max_results, 250);
        assert_eq!(config.timeout_secs, 10);

        let partial: HttpProviderConfig =
            serde_json::from_str(r#"{"endpoint": "http://localhost/x"}"#).unwrap();
        assert_eq!(partial.endpoint, "http://localhost/x");
        assert_eq!(partial.max_results, 250);
    }
}
