//! Blocking HTTP fetcher for built-in template resources.

use super::{ExportError, ExportResult, TemplateFetcher};
use crate::config::TemplateConfig;
use log::info;
use reqwest::blocking::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Fetches built-in templates relative to the configured asset base URL.
///
/// Performs a single request per call; retry policy belongs to callers.
#[derive(Debug, Clone)]
pub struct HttpTemplateFetcher {
    base_url: Url,
    client: Client,
}

impl HttpTemplateFetcher {
    pub fn new(config: &TemplateConfig) -> ExportResult<Self> {
        // The blocking client otherwise applies its own 30s default.
        let client = Client::builder()
            .timeout(config.fetch_timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|err| ExportError::Fetch {
                url: config.asset_base_url.to_string(),
                status: None,
                message: format!("failed to create HTTP client: {err}"),
            })?;

        Ok(Self {
            base_url: config.asset_base_url.clone(),
            client,
        })
    }

    /// Joins a locator onto the base URL.
    ///
    /// Root-relative paths land under the base path; absolute and
    /// protocol-relative (`//host/...`) locators keep their own host.
    pub fn resolve_url(&self, locator: &str) -> ExportResult<Url> {
        let relative = if locator.starts_with("//") {
            locator
        } else {
            locator.strip_prefix('/').unwrap_or(locator)
        };
        self.base_url
            .join(relative)
            .map_err(|err| ExportError::Fetch {
                url: locator.to_string(),
                status: None,
                message: format!("invalid template locator: {err}"),
            })
    }
}

impl TemplateFetcher for HttpTemplateFetcher {
    fn fetch(&self, locator: &str) -> ExportResult<Vec<u8>> {
        let url = self.resolve_url(locator)?;
        let started_at = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|err| ExportError::Fetch {
                url: url.to_string(),
                status: None,
                message: format!("HTTP request failed: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: "Failed to fetch template file".to_string(),
            });
        }

        let bytes = response.bytes().map_err(|err| ExportError::Fetch {
            url: url.to_string(),
            status: Some(status.as_u16()),
            message: format!("failed to read response body: {err}"),
        })?;

        info!(
            "event=template_fetch module=export status=ok http_status={} bytes={} duration_ms={}",
            status.as_u16(),
            bytes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::HttpTemplateFetcher;
    use crate::config::{parse_base_url, TemplateConfig, ENV_BASE_URL};
    use crate::export::{ExportError, TemplateFetcher};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    fn fetcher_for(base: &str) -> HttpTemplateFetcher {
        let config = TemplateConfig {
            asset_base_url: parse_base_url(ENV_BASE_URL, base).unwrap(),
            fetch_timeout_secs: Some(5),
            ..TemplateConfig::default()
        };
        HttpTemplateFetcher::new(&config).unwrap()
    }

    #[test]
    fn relative_locators_join_under_base_path() {
        let fetcher = fetcher_for("https://school.example/app");
        let url = fetcher.resolve_url("/templates/a.xlsx").unwrap();
        assert_eq!(url.as_str(), "https://school.example/app/templates/a.xlsx");
    }

    #[test]
    fn absolute_and_protocol_relative_locators_keep_their_host() {
        let fetcher = fetcher_for("https://school.example/app");
        let url = fetcher.resolve_url("//cdn.example/x.xlsx").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example/x.xlsx");
        let url = fetcher.resolve_url("http://mirror.example/t/y.xlsx").unwrap();
        assert_eq!(url.as_str(), "http://mirror.example/t/y.xlsx");
    }

    #[test]
    fn non_ascii_locators_are_percent_encoded() {
        let fetcher = fetcher_for("https://school.example/");
        let url = fetcher.resolve_url("/templates/قالب_1.xlsx").unwrap();
        assert!(url.as_str().starts_with("https://school.example/templates/%D9%82"));
    }

    #[test]
    fn fetch_returns_body_bytes() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/templates/a.xlsx")
            .with_status(200)
            .with_body([0u8, 159, 146, 150])
            .expect(1)
            .create();

        let bytes = fetcher_for(&server.url()).fetch("/templates/a.xlsx").unwrap();
        assert_eq!(bytes, vec![0u8, 159, 146, 150]);
        mock.assert();
    }

    #[test]
    fn unconfigured_timeout_outlasts_client_default() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request).unwrap();
            thread::sleep(Duration::from_secs(35));
            let response = b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\nConnection: close\r\n\r\nabc";
            stream.write_all(response).unwrap();
        });

        let config = TemplateConfig {
            asset_base_url: parse_base_url(ENV_BASE_URL, &format!("http://{addr}")).unwrap(),
            fetch_timeout_secs: None,
            ..TemplateConfig::default()
        };
        let bytes = HttpTemplateFetcher::new(&config)
            .unwrap()
            .fetch("/templates/slow.xlsx")
            .unwrap();

        assert_eq!(bytes, b"abc");
        server.join().unwrap();
    }

    #[test]
    fn fetch_fails_once_without_retry_on_error_status() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/templates/missing.xlsx")
            .with_status(404)
            .expect(1)
            .create();

        let err = fetcher_for(&server.url())
            .fetch("/templates/missing.xlsx")
            .unwrap_err();
        assert!(matches!(err, ExportError::Fetch { status: Some(404), .. }));
        mock.assert();
    }
}
