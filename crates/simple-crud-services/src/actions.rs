//! Parsing of untyped host signals into widget actions

use std::collections::HashMap;

use crate::error::{ServiceError, ServiceResult};

/// Largest page size a host may request
pub const MAX_ITEMS_PER_PAGE: usize = 1000;

/// A user action on a [`SimpleCrud`](crate::SimpleCrud) widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrudAction {
    Edit(i64),
    Confirm(i64),
    Delete(i64),
    Add,
    Sort(String),
    ItemsPerPage(usize),
    Page(usize),
    Show(i64),
}

impl CrudAction {
    /// Build an action from a signal name and its string parameters.
    ///
    /// Recognised signals are `edit`, `confirm`, `delete`, `show` (taking
    /// `itemId`), `add`, `sort` (taking `column`), `itemsPerPage` and `page`.
    pub fn from_signal(signal: &str, params: &HashMap<String, String>) -> ServiceResult<Self> {
        let action = match signal {
            "edit" => CrudAction::Edit(item_id(params)?),
            "confirm" => CrudAction::Confirm(item_id(params)?),
            "delete" => CrudAction::Delete(item_id(params)?),
            "show" => CrudAction::Show(item_id(params)?),
            "add" => CrudAction::Add,
            "sort" => {
                let column = required(params, "column")?.trim();
                if column.is_empty() {
                    return Err(ServiceError::InvalidArgument("column must not be empty".into()));
                }
                CrudAction::Sort(column.to_string())
            }
            "itemsPerPage" => {
                let raw = required(params, "itemsPerPage")?;
                match raw.trim().parse::<usize>() {
                    Ok(n) if (1..=MAX_ITEMS_PER_PAGE).contains(&n) => CrudAction::ItemsPerPage(n),
                    _ => {
                        return Err(ServiceError::InvalidArgument(format!(
                            "itemsPerPage must be between 1 and {MAX_ITEMS_PER_PAGE}, got '{raw}'"
                        )));
                    }
                }
            }
            "page" => {
                let raw = required(params, "page")?;
                let page = raw.trim().parse::<usize>().map_err(|_| {
                    ServiceError::InvalidArgument(format!(
                        "page must be a non-negative integer, got '{raw}'"
                    ))
                })?;
                CrudAction::Page(page)
            }
            other => {
                return Err(ServiceError::InvalidArgument(format!("unknown signal '{other}'")));
            }
        };

        tracing::debug!(signal, ?action, "parsed signal");
        Ok(action)
    }

    /// Signal name this action is sent as
    pub fn signal_name(&self) -> &'static str {
        match self {
            CrudAction::Edit(_) => "edit",
            CrudAction::Confirm(_) => "confirm",
            CrudAction::Delete(_) => "delete",
            CrudAction::Add => "add",
            CrudAction::Sort(_) => "sort",
            CrudAction::ItemsPerPage(_) => "itemsPerPage",
            CrudAction::Page(_) => "page",
            CrudAction::Show(_) => "show",
        }
    }
}

fn required<'a>(params: &'a HashMap<String, String>, key: &str) -> ServiceResult<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ServiceError::InvalidArgument(format!("missing parameter '{key}'")))
}

fn item_id(params: &HashMap<String, String>) -> ServiceResult<i64> {
    let raw = required(params, "itemId")?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ServiceError::InvalidArgument(format!("itemId must be an integer, got '{raw}'")))
}
