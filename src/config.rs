/// Provisioning targets are fixed: this binary always sets up the same
/// dataset for the daily SPX trading pipeline.
pub const PROJECT_ID: &str = "galvanic-ripsaw-381707";
pub const DATASET_NAME: &str = "spx_trading";
pub const DATASET_LOCATION: &str = "US";

pub const API_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2/";

#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub project_id: String,
    pub dataset_name: String,
    pub location: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            project_id: PROJECT_ID.to_string(),
            dataset_name: DATASET_NAME.to_string(),
            location: DATASET_LOCATION.to_string(),
        }
    }
}
