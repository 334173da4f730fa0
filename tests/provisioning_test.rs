use std::collections::BTreeMap;
use std::sync::Mutex;

use trading_warehouse_setup::client::WarehouseApi;
use trading_warehouse_setup::config::SetupConfig;
use trading_warehouse_setup::error::SetupError;
use trading_warehouse_setup::models::{
    Dataset, DatasetReference, Table, TableReference, TableSchema, ViewDefinition,
};
use trading_warehouse_setup::provisioner::Provisioner;
use trading_warehouse_setup::schema::{FieldType, SchemaField};
use trading_warehouse_setup::tables;

/// In-memory stand-in for the warehouse API, recording every call so tests
/// can assert on ordering and end state.
#[derive(Default)]
struct FakeWarehouse {
    state: Mutex<FakeState>,
    fail_on_create: Option<String>,
}

#[derive(Default)]
struct FakeState {
    dataset: Option<Dataset>,
    tables: BTreeMap<String, Table>,
    create_dataset_calls: usize,
    create_attempts: Vec<String>,
    deleted: Vec<String>,
}

impl WarehouseApi for FakeWarehouse {
    async fn get_dataset(
        &self,
        _project_id: &str,
        _dataset_name: &str,
    ) -> Result<Option<Dataset>, SetupError> {
        Ok(self.state.lock().unwrap().dataset.clone())
    }

    async fn create_dataset(
        &self,
        _project_id: &str,
        dataset: &Dataset,
    ) -> Result<(), SetupError> {
        let mut state = self.state.lock().unwrap();
        state.create_dataset_calls += 1;
        state.dataset = Some(dataset.clone());
        Ok(())
    }

    async fn get_table(
        &self,
        _project_id: &str,
        _dataset_name: &str,
        table_name: &str,
    ) -> Result<Option<Table>, SetupError> {
        Ok(self.state.lock().unwrap().tables.get(table_name).cloned())
    }

    async fn delete_table(
        &self,
        project_id: &str,
        dataset_name: &str,
        table_name: &str,
    ) -> Result<(), SetupError> {
        let mut state = self.state.lock().unwrap();
        state.deleted.push(table_name.to_string());
        state
            .tables
            .remove(table_name)
            .map(|_| ())
            .ok_or_else(|| SetupError::NotFound {
                resource: format!("table {}.{}.{}", project_id, dataset_name, table_name),
            })
    }

    async fn create_table(
        &self,
        _project_id: &str,
        _dataset_name: &str,
        table: &Table,
    ) -> Result<(), SetupError> {
        let name = table.table_reference.table_id.clone();
        let mut state = self.state.lock().unwrap();
        state.create_attempts.push(name.clone());

        if self.fail_on_create.as_deref() == Some(name.as_str()) {
            return Err(SetupError::Api {
                status: 500,
                message: format!("injected failure creating '{}'", name),
            });
        }

        state.tables.insert(name, table.clone());
        Ok(())
    }
}

fn seeded_dataset(config: &SetupConfig) -> Dataset {
    Dataset {
        dataset_reference: DatasetReference {
            project_id: config.project_id.clone(),
            dataset_id: config.dataset_name.clone(),
        },
        location: Some(config.location.clone()),
    }
}

/// A table shape the provisioner never produces, so tests can tell a stale
/// object from a recreated one.
fn stale_table(config: &SetupConfig, name: &str) -> Table {
    Table {
        table_reference: TableReference {
            project_id: config.project_id.clone(),
            dataset_id: config.dataset_name.clone(),
            table_id: name.to_string(),
        },
        schema: Some(TableSchema {
            fields: vec![SchemaField::required("stale_column", FieldType::String)],
        }),
        time_partitioning: None,
        clustering: None,
        view: None,
    }
}

fn stale_view(config: &SetupConfig, name: &str) -> Table {
    Table {
        table_reference: TableReference {
            project_id: config.project_id.clone(),
            dataset_id: config.dataset_name.clone(),
            table_id: name.to_string(),
        },
        schema: None,
        time_partitioning: None,
        clustering: None,
        view: Some(ViewDefinition {
            query: "SELECT 1".to_string(),
            use_legacy_sql: false,
        }),
    }
}

#[tokio::test]
async fn test_dataset_already_present_skips_creation() {
    // Given: the dataset already exists
    let config = SetupConfig::default();
    let fake = FakeWarehouse::default();
    fake.state.lock().unwrap().dataset = Some(seeded_dataset(&config));

    // When: ensuring the dataset
    let provisioner = Provisioner::new(&fake, config);
    provisioner.ensure_dataset().await.expect("ensure failed");

    // Then: no create call was made
    assert_eq!(fake.state.lock().unwrap().create_dataset_calls, 0);
}

#[tokio::test]
async fn test_absent_dataset_created_exactly_once() {
    // Given: no dataset
    let config = SetupConfig::default();
    let fake = FakeWarehouse::default();

    // When
    let provisioner = Provisioner::new(&fake, config.clone());
    provisioner.ensure_dataset().await.expect("ensure failed");

    // Then: created once, at the fixed location
    let state = fake.state.lock().unwrap();
    assert_eq!(state.create_dataset_calls, 1);
    let dataset = state.dataset.as_ref().expect("dataset should exist");
    assert_eq!(dataset.location.as_deref(), Some("US"));
    assert_eq!(dataset.dataset_reference.dataset_id, config.dataset_name);
}

#[tokio::test]
async fn test_full_run_provisions_three_tables_and_three_views() {
    // Given: an empty project
    let config = SetupConfig::default();
    let fake = FakeWarehouse::default();

    // When: running the complete setup
    let provisioner = Provisioner::new(&fake, config.clone());
    provisioner.run().await.expect("setup run failed");

    // Then: the dataset plus six objects exist
    let state = fake.state.lock().unwrap();
    assert!(state.dataset.is_some());
    assert_eq!(state.tables.len(), 6);

    let daily = &state.tables["daily_summary"];
    assert_eq!(daily.schema.as_ref().unwrap().fields.len(), 24);
    assert_eq!(
        daily.time_partitioning.as_ref().unwrap().field.as_deref(),
        Some("date")
    );
    assert_eq!(
        daily.clustering.as_ref().unwrap().fields,
        vec!["date", "strategy"]
    );

    assert_eq!(
        state.tables["trades"].schema.as_ref().unwrap().fields.len(),
        25
    );
    assert_eq!(
        state.tables["market_data_archive"]
            .schema
            .as_ref()
            .unwrap()
            .fields
            .len(),
        8
    );

    // Views carry a query and no schema
    for view_name in ["daily_performance", "monthly_summary", "strike_performance"] {
        let view = &state.tables[view_name];
        assert!(view.schema.is_none(), "{} should have no schema", view_name);
        let definition = view.view.as_ref().expect("view definition missing");
        assert!(!definition.use_legacy_sql);
    }

    let strike = state.tables["strike_performance"].view.as_ref().unwrap();
    assert!(strike.query.contains(&format!(
        "`{}.{}.trades`",
        config.project_id, config.dataset_name
    )));
}

#[tokio::test]
async fn test_existing_table_is_dropped_before_recreation() {
    // Given: a stale 'trades' table with a shape the provisioner never writes
    let config = SetupConfig::default();
    let fake = FakeWarehouse::default();
    fake.state
        .lock()
        .unwrap()
        .tables
        .insert("trades".to_string(), stale_table(&config, "trades"));

    // When
    let provisioner = Provisioner::new(&fake, config);
    provisioner
        .create_table(&tables::trades())
        .await
        .expect("create_table failed");

    // Then: the old object was deleted and the stale shape is gone
    let state = fake.state.lock().unwrap();
    assert_eq!(state.deleted, vec!["trades"]);
    let fields = &state.tables["trades"].schema.as_ref().unwrap().fields;
    assert_eq!(fields.len(), 25);
    assert!(fields.iter().all(|f| f.name != "stale_column"));
}

#[tokio::test]
async fn test_existing_view_query_is_replaced() {
    // Given: a pre-existing view with stale query text
    let config = SetupConfig::default();
    let fake = FakeWarehouse::default();
    fake.state.lock().unwrap().tables.insert(
        "daily_performance".to_string(),
        stale_view(&config, "daily_performance"),
    );

    // When
    let provisioner = Provisioner::new(&fake, config.clone());
    let spec = trading_warehouse_setup::views::daily_performance(
        &config.project_id,
        &config.dataset_name,
    );
    provisioner.create_view(&spec).await.expect("create_view failed");

    // Then
    let state = fake.state.lock().unwrap();
    assert_eq!(state.deleted, vec!["daily_performance"]);
    let query = &state.tables["daily_performance"]
        .view
        .as_ref()
        .unwrap()
        .query;
    assert_ne!(query, "SELECT 1");
    assert!(query.contains("day_result"));
}

#[tokio::test]
async fn test_rerunning_setup_converges_to_identical_end_state() {
    // Given: a completed first run
    let config = SetupConfig::default();
    let fake = FakeWarehouse::default();
    let provisioner = Provisioner::new(&fake, config);
    provisioner.run().await.expect("first run failed");
    let first = fake.state.lock().unwrap().tables.clone();

    // When: running again over the populated project
    provisioner.run().await.expect("second run failed");

    // Then: every object was dropped and recreated into the same shape
    let state = fake.state.lock().unwrap();
    assert_eq!(state.tables, first);
    assert_eq!(state.deleted.len(), 6);
}

#[tokio::test]
async fn test_failure_aborts_remaining_steps() {
    // Given: creating the second table fails
    let config = SetupConfig::default();
    let fake = FakeWarehouse {
        fail_on_create: Some("trades".to_string()),
        ..FakeWarehouse::default()
    };

    // When
    let provisioner = Provisioner::new(&fake, config);
    let result = provisioner.run().await;

    // Then: the error propagates and nothing after the failure was attempted
    assert!(matches!(result, Err(SetupError::Api { status: 500, .. })));
    let state = fake.state.lock().unwrap();
    assert_eq!(state.create_attempts, vec!["daily_summary", "trades"]);
    assert!(!state.tables.contains_key("market_data_archive"));
    assert!(!state.tables.contains_key("daily_performance"));
}
