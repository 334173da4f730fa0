use tracing::info;

use crate::client::WarehouseApi;
use crate::config::SetupConfig;
use crate::error::SetupError;
use crate::models::{
    Clustering, Dataset, DatasetReference, Table, TableReference, TableSchema, TimePartitioning,
    ViewDefinition,
};
use crate::schema::TableSpec;
use crate::tables;
use crate::views::{self, ViewSpec};

/// Drives the full provisioning flow: ensure the dataset, then drop and
/// recreate each table and view. Rerunning converges to the same end state,
/// but recreation empties the tables along the way.
pub struct Provisioner<'a, W> {
    api: &'a W,
    config: SetupConfig,
}

impl<'a, W: WarehouseApi> Provisioner<'a, W> {
    pub fn new(api: &'a W, config: SetupConfig) -> Self {
        Self { api, config }
    }

    /// Runs every provisioning step in order. The first failure aborts the
    /// remaining steps; objects already provisioned are left in place.
    pub async fn run(&self) -> Result<(), SetupError> {
        self.ensure_dataset().await?;

        for spec in tables::all_tables() {
            self.create_table(&spec).await?;
        }

        for spec in views::all_views(&self.config.project_id, &self.config.dataset_name) {
            self.create_view(&spec).await?;
        }

        info!("Warehouse setup complete");
        Ok(())
    }

    pub async fn ensure_dataset(&self) -> Result<(), SetupError> {
        let existing = self
            .api
            .get_dataset(&self.config.project_id, &self.config.dataset_name)
            .await?;

        if existing.is_some() {
            info!("Dataset '{}' already exists", self.config.dataset_name);
            return Ok(());
        }

        info!("Creating dataset '{}'", self.config.dataset_name);

        let dataset = Dataset {
            dataset_reference: DatasetReference {
                project_id: self.config.project_id.clone(),
                dataset_id: self.config.dataset_name.clone(),
            },
            location: Some(self.config.location.clone()),
        };

        self.api
            .create_dataset(&self.config.project_id, &dataset)
            .await?;

        info!("Dataset '{}' created", self.config.dataset_name);
        Ok(())
    }

    pub async fn create_table(&self, spec: &TableSpec) -> Result<(), SetupError> {
        self.drop_if_exists(&spec.name, "table").await?;

        info!("Creating table: {}", spec.name);

        let table = Table {
            table_reference: self.table_reference(&spec.name),
            schema: Some(TableSchema {
                fields: spec.fields.clone(),
            }),
            time_partitioning: spec
                .partition_field
                .as_deref()
                .map(TimePartitioning::daily),
            clustering: if spec.cluster_fields.is_empty() {
                None
            } else {
                Some(Clustering {
                    fields: spec.cluster_fields.clone(),
                })
            },
            view: None,
        };

        self.api
            .create_table(&self.config.project_id, &self.config.dataset_name, &table)
            .await?;

        info!("Table '{}' created", spec.name);
        Ok(())
    }

    pub async fn create_view(&self, spec: &ViewSpec) -> Result<(), SetupError> {
        self.drop_if_exists(&spec.name, "view").await?;

        info!("Creating view: {}", spec.name);

        let table = Table {
            table_reference: self.table_reference(&spec.name),
            schema: None,
            time_partitioning: None,
            clustering: None,
            view: Some(ViewDefinition {
                query: spec.query.clone(),
                use_legacy_sql: false,
            }),
        };

        self.api
            .create_table(&self.config.project_id, &self.config.dataset_name, &table)
            .await?;

        info!("View '{}' created", spec.name);
        Ok(())
    }

    async fn drop_if_exists(&self, name: &str, kind: &str) -> Result<(), SetupError> {
        let existing = self
            .api
            .get_table(&self.config.project_id, &self.config.dataset_name, name)
            .await?;

        if existing.is_some() {
            self.api
                .delete_table(&self.config.project_id, &self.config.dataset_name, name)
                .await?;
            info!("Deleted existing {} '{}'", kind, name);
        }

        Ok(())
    }

    fn table_reference(&self, table_name: &str) -> TableReference {
        TableReference {
            project_id: self.config.project_id.clone(),
            dataset_id: self.config.dataset_name.clone(),
            table_id: table_name.to_string(),
        }
    }
}
