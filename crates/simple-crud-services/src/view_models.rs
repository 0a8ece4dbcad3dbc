use serde::{Deserialize, Serialize};
use simple_crud_core::{Row, Value};
use std::fmt;

use crate::paginator::Paginator;
use crate::sort::SortSpec;

/// Everything a host needs to draw one widget
#[derive(Debug, Clone)]
pub struct CrudView {
    /// Rows of the current page
    pub items: Vec<Row>,
    /// True for a top-level table (items can be opened as a child listing)
    pub is_parent_table: bool,
    pub paginator: Paginator,
    /// Sort actually applied to `items`
    pub sort: SortSpec,
    /// Prefilled edit form, set after an edit or add action
    pub edit_form: Option<EditForm>,
    /// Item staged for delete confirmation
    pub confirm_item: Option<Row>,
    pub flashes: Vec<FlashMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl fmt::Display for FlashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashKind::Success => f.write_str("success"),
            FlashKind::Error => f.write_str("error"),
        }
    }
}

/// One-shot message shown after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub message: String,
    pub kind: FlashKind,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FlashKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FlashKind::Error,
        }
    }
}

/// Parts of the widget that must be redrawn after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    Flash,
    EditForm,
    ConfirmForm,
    ItemTable,
    Paginator,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Flash => "flash",
            Region::EditForm => "edit-form",
            Region::ConfirmForm => "confirm-form",
            Region::ItemTable => "item-table",
            Region::Paginator => "paginator",
        };
        f.write_str(name)
    }
}

/// Navigation requested by an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Redirect {
    /// Show the child items of the given parent row
    Items(i64),
}

/// Values of the edit form. `id` is `None` for a new item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditForm {
    pub id: Option<i64>,
    pub name: String,
}

impl EditForm {
    /// Prefill the form from a stored row
    pub fn from_row(row: &Row, id_column: &str, value_column: &str) -> Self {
        Self {
            id: row.get_by_name(id_column).and_then(Value::as_i64),
            name: row
                .get_by_name(value_column)
                .filter(|value| !value.is_null())
                .map(|value| value.to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_form_from_row() {
        let row = Row::new(
            vec!["id".into(), "name".into(), "list_id".into()],
            vec![Value::Int64(3), Value::from("milk"), Value::Int64(1)],
        );
        assert_eq!(
            EditForm::from_row(&row, "id", "name"),
            EditForm {
                id: Some(3),
                name: "milk".into()
            }
        );

        let blank = Row::new(vec!["id".into(), "name".into()], vec![Value::Int64(4), Value::Null]);
        assert_eq!(EditForm::from_row(&blank, "id", "name").name, "");
    }
}
