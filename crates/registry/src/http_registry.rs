use crate::{RegistryDocument, RegistryError, RegistryFetcher};
use async_trait::async_trait;
use deptree_network::ThrottledClient;

/// [`RegistryFetcher`] backed by an npm-compatible HTTP registry.
#[derive(Debug, Clone, Copy)]
pub struct HttpRegistry<'a> {
    pub http_client: &'a ThrottledClient,
    /// Base URL of the registry. A trailing slash is expected.
    pub registry: &'a str,
}

impl<'a> HttpRegistry<'a> {
    /// URL of the packument of `name`.
    pub fn package_url(&self, name: &str) -> String {
        format!("{0}{name}", self.registry)
    }
}

#[async_trait]
impl<'a> RegistryFetcher for HttpRegistry<'a> {
    async fn fetch_package(&self, name: &str) -> Result<RegistryDocument, RegistryError> {
        let url = self.package_url(name);
        tracing::info!(target: "deptree::registry", ?url, "Fetch package document");

        let network_error = |error| RegistryError::Network { url: url.clone(), error };
        let response = self
            .http_client
            .run_with_permit(|client| {
                client.get(&url).header("accept", "application/json").send()
            })
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::info!(target: "deptree::registry", ?url, ?status, "Unsuccessful response");
            return Err(RegistryError::Status { url: url.clone(), status });
        }

        let body = response.bytes().await.map_err(network_error)?;
        serde_json::from_slice(&body)
            .map_err(|error| RegistryError::InvalidDocument { url: url.clone(), error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = r#"{
        "name": "my-package",
        "dist-tags": { "latest": "1.1.1" },
        "versions": {
            "0.0.1": { "dependencies": { "dependency-a": "^1.0.0" } },
            "1.1.1": {}
        }
    }"#;

    #[test]
    fn package_url_appends_name() {
        let http_client = ThrottledClient::new_with_permits(1);
        let registry = HttpRegistry { http_client: &http_client, registry: "https://example.com/" };
        assert_eq!(registry.package_url("@scope/pkg"), "https://example.com/@scope/pkg");
    }

    #[tokio::test]
    async fn fetches_and_decodes_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/my-package")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(DOCUMENT)
            .create_async()
            .await;

        let http_client = ThrottledClient::new_with_permits(1);
        let registry = format!("{}/", server.url());
        let document = HttpRegistry { http_client: &http_client, registry: &registry }
            .fetch_package("my-package")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(document.versions.keys().collect::<Vec<_>>(), ["0.0.1", "1.1.1"]);
        assert_eq!(document.dist_tags["latest"], "1.1.1");
    }

    #[tokio::test]
    async fn not_found_is_reported_as_status() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server.mock("GET", "/missing").with_status(404).create_async().await;

        let http_client = ThrottledClient::new_with_permits(1);
        let registry = format!("{}/", server.url());
        let error = HttpRegistry { http_client: &http_client, registry: &registry }
            .fetch_package("missing")
            .await
            .expect_err("package doesn't exist");

        assert!(error.is_not_found(), "unexpected error: {error:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _broken =
            server.mock("GET", "/broken").with_status(200).with_body("<html>").create_async().await;

        let http_client = ThrottledClient::new_with_permits(1);
        let registry = format!("{}/", server.url());
        let error = HttpRegistry { http_client: &http_client, registry: &registry }
            .fetch_package("broken")
            .await
            .expect_err("body is not JSON");

        assert!(matches!(error, RegistryError::InvalidDocument { .. }), "unexpected error: {error:?}");
    }
}
