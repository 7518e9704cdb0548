//! Load requests produced by the surrounding grid component.

use crate::BindingTuple;
use serde::{Deserialize, Serialize};

/// Sort direction of one ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One ordering term of a table query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub column_name: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Backend connection the query runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection identifier
    pub conid: String,
    /// Database name on that connection
    pub database: String,
}

impl DatabaseConfig {
    pub fn new(conid: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            conid: conid.into(),
            database: database.into(),
        }
    }
}

/// Request for up to `top_count` rows of `data_columns` from one table,
/// optionally scoped to the groups named in `binding_values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub schema_name: Option<String>,
    pub pure_name: String,
    /// Grouping key columns (e.g. a parent table's primary key)
    pub binding_columns: Option<Vec<String>>,
    pub data_columns: Vec<String>,
    pub database_config: DatabaseConfig,
    pub order_by: Vec<OrderBy>,
    /// One tuple per requested group, aligned with `binding_columns`
    pub binding_values: Option<Vec<BindingTuple>>,
    pub top_count: usize,
}

impl LoadRequest {
    /// Create an ungrouped request with no columns, no ordering and `top_count = 0`.
    pub fn new(database_config: DatabaseConfig, pure_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            pure_name: pure_name.into(),
            binding_columns: None,
            data_columns: Vec::new(),
            database_config,
            order_by: Vec::new(),
            binding_values: None,
            top_count: 0,
        }
    }

    pub fn with_schema(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = Some(schema_name.into());
        self
    }

    pub fn with_data_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_binding_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.binding_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_binding_values(mut self, values: Vec<BindingTuple>) -> Self {
        self.binding_values = Some(values);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderBy>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_top_count(mut self, top_count: usize) -> Self {
        self.top_count = top_count;
        self
    }

    /// Requested group tuples, empty for ungrouped requests.
    pub fn binding_values(&self) -> &[BindingTuple] {
        self.binding_values.as_deref().unwrap_or(&[])
    }

    /// Binding column names, empty for ungrouped requests.
    pub fn binding_columns(&self) -> &[String] {
        self.binding_columns.as_deref().unwrap_or(&[])
    }

    /// True when the request is scoped by binding columns.
    pub fn is_grouped(&self) -> bool {
        !self.binding_columns().is_empty()
    }
}
