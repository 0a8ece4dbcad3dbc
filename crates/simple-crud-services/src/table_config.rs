//! Table configuration
//!
//! A [`TableConfig`] is built once per request and handed to a
//! [`TableFacade`](crate::TableFacade). The same type describes a top-level
//! table and a child table: the child simply carries a [`ParentTable`].

use crate::error::{ServiceError, ServiceResult};

pub const DEFAULT_ID_COLUMN: &str = "id";
pub const DEFAULT_VALUE_COLUMN: &str = "name";

/// The table a child table's rows belong to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentTable {
    /// Parent table name
    pub table_name: String,
    /// Primary key column of the parent table
    pub id_column: String,
    /// Column of the child table referencing the parent id
    pub foreign_key_column: String,
}

/// Immutable description of the table a facade operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    table_name: String,
    id_column: String,
    value_column: String,
    parent: Option<ParentTable>,
    foreign_key_value: Option<i64>,
}

impl TableConfig {
    pub fn builder(table_name: impl Into<String>) -> TableConfigBuilder {
        TableConfigBuilder::new(table_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    pub fn parent(&self) -> Option<&ParentTable> {
        self.parent.as_ref()
    }

    pub fn foreign_key_value(&self) -> Option<i64> {
        self.foreign_key_value
    }

    /// Whether this table is the top of a parent/child pair
    pub fn is_parent_table(&self) -> bool {
        self.parent.is_none()
    }

    /// Parent table and foreign key value, when rows must be scoped.
    ///
    /// Fails if a parent is configured but no foreign key value was given.
    pub(crate) fn scope(&self) -> ServiceResult<Option<(&ParentTable, i64)>> {
        match (&self.parent, self.foreign_key_value) {
            (None, _) => Ok(None),
            (Some(parent), Some(value)) => Ok(Some((parent, value))),
            (Some(parent), None) => Err(ServiceError::InvalidArgument(format!(
                "foreign key value for '{}' is not set",
                parent.foreign_key_column
            ))),
        }
    }
}

/// Builder for [`TableConfig`]
#[derive(Debug, Clone)]
pub struct TableConfigBuilder {
    table_name: String,
    id_column: String,
    value_column: String,
    parent: Option<ParentTable>,
    foreign_key_value: Option<i64>,
}

impl TableConfigBuilder {
    fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            parent: None,
            foreign_key_value: None,
        }
    }

    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    pub fn value_column(mut self, column: impl Into<String>) -> Self {
        self.value_column = column.into();
        self
    }

    /// Scope rows to a parent table through `foreign_key_column`.
    ///
    /// The parent's id column defaults to `"id"`.
    pub fn parent(
        mut self,
        table_name: impl Into<String>,
        foreign_key_column: impl Into<String>,
    ) -> Self {
        self.parent = Some(ParentTable {
            table_name: table_name.into(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            foreign_key_column: foreign_key_column.into(),
        });
        self
    }

    /// Override the parent table's id column. No effect without a parent.
    pub fn parent_id_column(mut self, column: impl Into<String>) -> Self {
        if let Some(parent) = self.parent.as_mut() {
            parent.id_column = column.into();
        }
        self
    }

    pub fn foreign_key_value(mut self, value: Option<i64>) -> Self {
        self.foreign_key_value = value;
        self
    }

    pub fn build(self) -> ServiceResult<TableConfig> {
        let mut names = vec![
            ("table name", &self.table_name),
            ("id column", &self.id_column),
            ("value column", &self.value_column),
        ];
        if let Some(parent) = &self.parent {
            names.push(("parent table name", &parent.table_name));
            names.push(("parent id column", &parent.id_column));
            names.push(("foreign key column", &parent.foreign_key_column));
        }
        if let Some((what, _)) = names.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(ServiceError::InvalidArgument(format!("{what} must not be empty")));
        }

        Ok(TableConfig {
            table_name: self.table_name,
            id_column: self.id_column,
            value_column: self.value_column,
            parent: self.parent,
            foreign_key_value: self.foreign_key_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_list_table() {
        let config = TableConfig::builder("list").build().unwrap();
        assert_eq!(config.id_column(), "id");
        assert_eq!(config.value_column(), "name");
        assert!(config.is_parent_table());
        assert!(config.scope().unwrap().is_none());
    }

    #[test]
    fn child_table_requires_foreign_key_value_for_scope() {
        let config = TableConfig::builder("item")
            .parent("list", "list_id")
            .build()
            .unwrap();
        assert!(!config.is_parent_table());
        assert!(matches!(config.scope(), Err(ServiceError::InvalidArgument(_))));

        let scoped = TableConfig::builder("item")
            .parent("list", "list_id")
            .parent_id_column("list_pk")
            .foreign_key_value(Some(4))
            .build()
            .unwrap();
        let (parent, value) = scoped.scope().unwrap().unwrap();
        assert_eq!(parent.id_column, "list_pk");
        assert_eq!(parent.foreign_key_column, "list_id");
        assert_eq!(value, 4);
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(TableConfig::builder("").build().is_err());
        assert!(TableConfig::builder("item").value_column(" ").build().is_err());
        assert!(TableConfig::builder("item").parent("list", "").build().is_err());
    }
}
