use reqwest::StatusCode;
use tracing::info;
use url::Url;

use crate::config::API_BASE_URL;
use crate::error::SetupError;
use crate::models::{Dataset, ErrorResponse, Table};

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// The warehouse operations the provisioning flow depends on. Lookups report
/// absence as `Ok(None)` instead of an error, so callers branch on presence
/// explicitly.
#[allow(async_fn_in_trait)]
pub trait WarehouseApi {
    async fn get_dataset(
        &self,
        project_id: &str,
        dataset_name: &str,
    ) -> Result<Option<Dataset>, SetupError>;

    async fn create_dataset(&self, project_id: &str, dataset: &Dataset)
        -> Result<(), SetupError>;

    async fn get_table(
        &self,
        project_id: &str,
        dataset_name: &str,
        table_name: &str,
    ) -> Result<Option<Table>, SetupError>;

    async fn delete_table(
        &self,
        project_id: &str,
        dataset_name: &str,
        table_name: &str,
    ) -> Result<(), SetupError>;

    async fn create_table(
        &self,
        project_id: &str,
        dataset_name: &str,
        table: &Table,
    ) -> Result<(), SetupError>;
}

/// Thin typed client over the BigQuery v2 REST surface. One instance is
/// shared across every provisioning call; credentials are resolved once at
/// construction.
pub struct BigQueryClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl BigQueryClient {
    pub async fn new() -> Result<Self, SetupError> {
        let http = reqwest::Client::new();
        let token = resolve_access_token(&http).await?;
        let base_url = Url::parse(API_BASE_URL)?;

        info!("Warehouse client initialized for {}", base_url);

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn dataset_url(&self, project_id: &str, dataset_name: &str) -> Result<Url, SetupError> {
        Ok(self
            .base_url
            .join(&format!("projects/{}/datasets/{}", project_id, dataset_name))?)
    }

    fn datasets_url(&self, project_id: &str) -> Result<Url, SetupError> {
        Ok(self.base_url.join(&format!("projects/{}/datasets", project_id))?)
    }

    fn table_url(
        &self,
        project_id: &str,
        dataset_name: &str,
        table_name: &str,
    ) -> Result<Url, SetupError> {
        Ok(self.base_url.join(&format!(
            "projects/{}/datasets/{}/tables/{}",
            project_id, dataset_name, table_name
        ))?)
    }

    fn tables_url(&self, project_id: &str, dataset_name: &str) -> Result<Url, SetupError> {
        Ok(self.base_url.join(&format!(
            "projects/{}/datasets/{}/tables",
            project_id, dataset_name
        ))?)
    }
}

impl WarehouseApi for BigQueryClient {
    async fn get_dataset(
        &self,
        project_id: &str,
        dataset_name: &str,
    ) -> Result<Option<Dataset>, SetupError> {
        let url = self.dataset_url(project_id, dataset_name)?;
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let dataset: Dataset = response.json().await?;
        Ok(Some(dataset))
    }

    async fn create_dataset(
        &self,
        project_id: &str,
        dataset: &Dataset,
    ) -> Result<(), SetupError> {
        let url = self.datasets_url(project_id)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(dataset)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    async fn get_table(
        &self,
        project_id: &str,
        dataset_name: &str,
        table_name: &str,
    ) -> Result<Option<Table>, SetupError> {
        let url = self.table_url(project_id, dataset_name, table_name)?;
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let table: Table = response.json().await?;
        Ok(Some(table))
    }

    async fn delete_table(
        &self,
        project_id: &str,
        dataset_name: &str,
        table_name: &str,
    ) -> Result<(), SetupError> {
        let url = self.table_url(project_id, dataset_name, table_name)?;
        let response = self.http.delete(url).bearer_auth(&self.token).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SetupError::NotFound {
                resource: format!("table {}.{}.{}", project_id, dataset_name, table_name),
            });
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    async fn create_table(
        &self,
        project_id: &str,
        dataset_name: &str,
        table: &Table,
    ) -> Result<(), SetupError> {
        let url = self.tables_url(project_id, dataset_name)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(table)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

async fn api_error(response: reqwest::Response) -> SetupError {
    let status = response.status().as_u16();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error.message,
        Err(_) => "unreadable error body".to_string(),
    };
    SetupError::Api { status, message }
}

async fn resolve_access_token(http: &reqwest::Client) -> Result<String, SetupError> {
    if let Ok(token) = std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN") {
        if !token.is_empty() {
            info!("Using access token from environment");
            return Ok(token);
        }
    }

    // Outside GCE the metadata host does not resolve; surface that as a
    // credential problem rather than a generic HTTP failure.
    let response = http
        .get(METADATA_TOKEN_URL)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| SetupError::Auth {
            message: format!("Failed to reach metadata server: {}", e),
        })?;

    if !response.status().is_success() {
        return Err(SetupError::Auth {
            message: format!(
                "Metadata server returned status {} for token request",
                response.status()
            ),
        });
    }

    #[derive(serde::Deserialize)]
    struct TokenResponse {
        access_token: String,
    }

    let token: TokenResponse = response.json().await.map_err(|e| SetupError::Auth {
        message: format!("Failed to parse metadata token response: {}", e),
    })?;

    info!("Using access token from metadata server");
    Ok(token.access_token)
}
