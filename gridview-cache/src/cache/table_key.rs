//! Identity of a table cache.

use gridview_core::{DatabaseConfig, LoadRequest, OrderBy};
use serde_json::{json, Value};

use super::stable_key::StableStringify;

/// The fields of a [`LoadRequest`] that identify one logical table query.
///
/// `data_columns` and `binding_values` are not part of the identity: every
/// column subset and every group of the same query shares one table cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableKey {
    schema_name: Option<String>,
    pure_name: String,
    binding_columns: Option<Vec<String>>,
    database_config: DatabaseConfig,
    order_by: Vec<OrderBy>,
}

impl TableKey {
    /// Pick the identity fields out of a request.
    pub fn from_request(request: &LoadRequest) -> Self {
        Self {
            schema_name: request.schema_name.clone(),
            pure_name: request.pure_name.clone(),
            binding_columns: request.binding_columns.clone(),
            database_config: request.database_config.clone(),
            order_by: request.order_by.clone(),
        }
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    pub fn pure_name(&self) -> &str {
        &self.pure_name
    }

    /// Structured form handed to the serializer.
    pub fn to_json(&self) -> Value {
        let order_by: Vec<Value> = self
            .order_by
            .iter()
            .map(|o| json!({ "columnName": o.column_name, "direction": o.direction.as_str() }))
            .collect();
        json!({
            "schemaName": self.schema_name,
            "pureName": self.pure_name,
            "bindingColumns": self.binding_columns,
            "databaseConfig": {
                "conid": self.database_config.conid,
                "database": self.database_config.database,
            },
            "orderBy": order_by,
        })
    }

    /// Render the key through a stable serializer.
    pub fn render(&self, serializer: &dyn StableStringify) -> String {
        serializer.stringify(&self.to_json())
    }
}
