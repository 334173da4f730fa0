use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Date,
    String,
    Integer,
    Float,
    Timestamp,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Required,
    Nullable,
}

/// One column of a table schema. Serializes directly to the warehouse's
/// wire representation of a schema field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mode: FieldMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value_expression: Option<String>,
}

impl SchemaField {
    pub fn required(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            mode: FieldMode::Required,
            default_value_expression: None,
        }
    }

    pub fn nullable(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            mode: FieldMode::Nullable,
            default_value_expression: None,
        }
    }

    pub fn with_default(mut self, expression: &str) -> Self {
        self.default_value_expression = Some(expression.to_string());
        self
    }
}

/// Full shape of one physical table: columns plus the partition column and
/// clustering columns applied at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub name: String,
    pub fields: Vec<SchemaField>,
    pub partition_field: Option<String>,
    pub cluster_fields: Vec<String>,
}
