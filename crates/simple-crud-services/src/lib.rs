//! simple-crud services layer
//!
//! This crate provides the pieces between a host (page controller, CLI)
//! and the storage layer.
//!
//! # Architecture
//!
//! ```text
//! Host (simple-crud-app)
//!     ↓
//! Widget (SimpleCrud) ← session state, flashes, redraw regions
//!     ↓
//! Service Layer (TableFacade, Paginator)
//!     ↓
//! Infrastructure Layer (simple-crud-core, simple-crud-driver-sqlite)
//! ```
//!
//! # Components
//!
//! - [`TableConfig`] - Immutable description of a table and its optional parent
//! - [`TableFacade`] - Sorted, paged and parent-scoped access to one table
//! - [`Paginator`] - Page bookkeeping and the window of direct page links
//! - [`SimpleCrud`] - CRUD widget driven by [`CrudAction`]s

mod actions;
mod error;
mod paginator;
mod simple_crud;
mod sort;
mod table_config;
mod table_facade;
mod view_models;

pub use actions::{CrudAction, MAX_ITEMS_PER_PAGE};
pub use error::{ServiceError, ServiceResult};
pub use paginator::{DEFAULT_DIRECT_LINKS_COUNT, Paginator};
pub use simple_crud::{CrudOptions, SimpleCrud};
pub use sort::{SortDirection, SortSpec};
pub use table_config::{
    DEFAULT_ID_COLUMN, DEFAULT_VALUE_COLUMN, ParentTable, TableConfig, TableConfigBuilder,
};
pub use table_facade::{
    DEFAULT_PAGE_SIZE, ItemData, ItemSelection, TableFacade, escape_identifier_for,
};
pub use view_models::{CrudView, EditForm, FlashKind, FlashMessage, Redirect, Region};
