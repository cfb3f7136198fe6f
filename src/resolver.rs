//! Location resolution against the config backend.
//!
//! One bounded request per collection run; any failure falls back to
//! the static defaults. Fields present in the response override the
//! defaults individually, so a partial response is still useful.

use serde::Deserialize;

use crate::config::{LocationConfig, CONFIG_TIMEOUT};

/// A coordinate the backend may send as a number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn into_string(self) -> String {
        match self {
            Coordinate::Number(n) => n.to_string(),
            Coordinate::Text(s) => s,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigResponse {
    city: Option<String>,
    latitude: Option<Coordinate>,
    longitude: Option<Coordinate>,
}

/// Resolves the active location from the config backend.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    client: reqwest::Client,
    base_url: String,
}

impl ConfigResolver {
    /// Create a resolver against the given backend base URL.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(CONFIG_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the active location, falling back to `defaults`.
    ///
    /// Never fails: a transport error, non-200 status, or malformed
    /// body logs a warning and returns the defaults in full. No retry;
    /// the next collection run re-resolves.
    pub async fn resolve(&self, defaults: &LocationConfig) -> LocationConfig {
        let url = format!("{}/config", self.base_url);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("[Resolver] failed to fetch config from backend: {}", e);
                return defaults.clone();
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            log::warn!(
                "[Resolver] backend returned status {}, using defaults",
                response.status()
            );
            return defaults.clone();
        }

        let body: ConfigResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                log::warn!("[Resolver] malformed config response: {}", e);
                return defaults.clone();
            }
        };

        LocationConfig {
            city: body.city.unwrap_or_else(|| defaults.city.clone()),
            latitude: body
                .latitude
                .map(Coordinate::into_string)
                .unwrap_or_else(|| defaults.latitude.clone()),
            longitude: body
                .longitude
                .map(Coordinate::into_string)
                .unwrap_or_else(|| defaults.longitude.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn defaults() -> LocationConfig {
        LocationConfig {
            city: "Sao Paulo".to_string(),
            latitude: "-23.5505".to_string(),
            longitude: "-46.6333".to_string(),
        }
    }

    async fn mock_backend(response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(response)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn partial_response_falls_back_per_field() {
        let server = mock_backend(ResponseTemplate::new(200).set_body_json(json!({
            "city": "X"
        })))
        .await;
        let resolver = ConfigResolver::new(&server.uri()).unwrap();

        let location = resolver.resolve(&defaults()).await;
        assert_eq!(location.city, "X");
        assert_eq!(location.latitude, "-23.5505");
        assert_eq!(location.longitude, "-46.6333");
    }

    #[tokio::test]
    async fn full_response_overrides_everything() {
        let server = mock_backend(ResponseTemplate::new(200).set_body_json(json!({
            "city": "Berlin",
            "latitude": "52.52",
            "longitude": "13.405"
        })))
        .await;
        let resolver = ConfigResolver::new(&server.uri()).unwrap();

        let location = resolver.resolve(&defaults()).await;
        assert_eq!(location.city, "Berlin");
        assert_eq!(location.latitude, "52.52");
        assert_eq!(location.longitude, "13.405");
    }

    #[tokio::test]
    async fn numeric_coordinates_are_accepted() {
        let server = mock_backend(ResponseTemplate::new(200).set_body_json(json!({
            "city": "Berlin",
            "latitude": 52.52,
            "longitude": 13.405
        })))
        .await;
        let resolver = ConfigResolver::new(&server.uri()).unwrap();

        let location = resolver.resolve(&defaults()).await;
        assert_eq!(location.latitude, "52.52");
        assert_eq!(location.longitude, "13.405");
    }

    #[tokio::test]
    async fn error_status_returns_full_defaults() {
        let server = mock_backend(ResponseTemplate::new(500)).await;
        let resolver = ConfigResolver::new(&server.uri()).unwrap();

        assert_eq!(resolver.resolve(&defaults()).await, defaults());
    }

    #[tokio::test]
    async fn malformed_body_returns_full_defaults() {
        let server = mock_backend(ResponseTemplate::new(200).set_body_string("not json")).await;
        let resolver = ConfigResolver::new(&server.uri()).unwrap();

        assert_eq!(resolver.resolve(&defaults()).await, defaults());
    }

    #[tokio::test]
    async fn unreachable_backend_returns_full_defaults() {
        // Reserve a port, then drop the server so connections are refused.
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);
        let resolver = ConfigResolver::new(&uri).unwrap();

        assert_eq!(resolver.resolve(&defaults()).await, defaults());
    }
}
