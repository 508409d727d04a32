use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, error, instrument};

use crate::core::rates::{FetchError, RateProvider, RateTable};

// ErApiProvider implementation for RateProvider, backed by the open
// ExchangeRate-API endpoint.
pub struct ErApiProvider {
    base_url: String,
}

impl ErApiProvider {
    pub fn new(base_url: &str) -> Self {
        ErApiProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErApiResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    time_last_update_utc: Option<String>,
    rates: Option<BTreeMap<String, f64>>,
}

/// The API reports update times in RFC 2822; the table only needs the date.
fn format_update_time(raw: &str) -> String {
    match DateTime::parse_from_rfc2822(raw) {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn network_error(base: &str, e: impl std::fmt::Display) -> FetchError {
    FetchError::Network {
        base: base.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl RateProvider for ErApiProvider {
    #[instrument(
        name = "ErApiRatesFetch",
        skip(self),
        fields(base = %base)
    )]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError> {
        let url = format!("{}/v6/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("apidex/1.0")
            .build()
            .map_err(|e| network_error(base, e))?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(base, e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| network_error(base, e))?;

        let data: ErApiResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                error!(status = %status, response = %text, "Failed to parse rate response");
                let reason = if status.is_success() {
                    format!("invalid JSON: {e}")
                } else {
                    format!("HTTP {status}")
                };
                return Err(FetchError::Malformed {
                    base: base.to_string(),
                    reason,
                });
            }
        };

        if data.result != "success" {
            let error_type = data.error_type.unwrap_or_else(|| format!("HTTP {status}"));
            return match error_type.as_str() {
                "unsupported-code" => Err(FetchError::UnknownCurrency {
                    code: base.to_string(),
                }),
                _ => Err(FetchError::Malformed {
                    base: base.to_string(),
                    reason: format!("provider reported {error_type}"),
                }),
            };
        }

        let rates = data.rates.ok_or_else(|| FetchError::Malformed {
            base: base.to_string(),
            reason: "missing rates table".to_string(),
        })?;
        let as_of = data
            .time_last_update_utc
            .as_deref()
            .map(format_update_time)
            .unwrap_or_default();

        let table = RateTable::new(base, rates, &as_of)?;
        debug!(rates = table.len(), as_of = %table.as_of(), "Fetched rate table");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USD_RESPONSE: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "time_last_update_utc": "Tue, 19 Aug 2025 00:02:31 +0000",
        "rates": {
            "USD": 1.0,
            "EUR": 0.9,
            "INR": 87.52
        }
    }"#;

    pub async fn create_mock_server(base: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v6/latest/{base}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_server = create_mock_server("USD", USD_RESPONSE).await;

        let provider = ErApiProvider::new(&mock_server.uri());
        let table = provider.fetch_rates("USD").await.unwrap();

        assert_eq!(table.base(), "USD");
        assert_eq!(table.as_of(), "2025-08-19");
        assert_eq!(table.rate("EUR"), Some(0.9));
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.len(), 3);
    }

    #[tokio::test]
    async fn test_unsupported_base_code() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "result": "error",
            "error-type": "unsupported-code"
        }"#;

        Mock::given(method("GET"))
            .and(path("/v6/latest/XXX"))
            .respond_with(ResponseTemplate::new(404).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let provider = ErApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("XXX").await;
        assert_eq!(
            result.unwrap_err(),
            FetchError::UnknownCurrency {
                code: "XXX".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_success_response_missing_rates() {
        let mock_response = r#"{
            "result": "success",
            "base_code": "USD",
            "time_last_update_utc": "Tue, 19 Aug 2025 00:02:31 +0000"
        }"#;
        let mock_server = create_mock_server("USD", mock_response).await;

        let provider = ErApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "malformed rate response for USD: missing rates table"
        );
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let mock_server = create_mock_server("USD", "not json at all").await;

        let provider = ErApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;
        let err = result.unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[tokio::test]
    async fn test_server_error_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v6/latest/USD"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let provider = ErApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "malformed rate response for USD: HTTP 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Nothing listens on port 1, so the connection is refused.
        let provider = ErApiProvider::new("http://127.0.0.1:1");
        let result = provider.fetch_rates("USD").await;
        assert!(matches!(
            result.unwrap_err(),
            FetchError::Network { base, .. } if base == "USD"
        ));
    }

    #[tokio::test]
    async fn test_non_positive_rate_is_rejected() {
        let mock_response = r#"{
            "result": "success",
            "base_code": "USD",
            "time_last_update_utc": "Tue, 19 Aug 2025 00:02:31 +0000",
            "rates": {
                "EUR": -0.9
            }
        }"#;
        let mock_server = create_mock_server("USD", mock_response).await;

        let provider = ErApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;
        let err = result.unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
        assert!(err.to_string().contains("EUR"));
    }

    #[test]
    fn test_format_update_time() {
        assert_eq!(
            format_update_time("Tue, 19 Aug 2025 00:02:31 +0000"),
            "2025-08-19"
        );
        assert_eq!(format_update_time("garbled"), "garbled");
    }
}
