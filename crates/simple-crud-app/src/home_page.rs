//! Page controller wiring the list and item widgets
//!
//! The list widget shows all lists. The item widget shows the items of one
//! list, scoped through `item.list_id`.

use simple_crud_core::{Connection, Row, SessionStore};
use simple_crud_services::{
    CrudOptions, CrudView, ServiceError, ServiceResult, SimpleCrud, TableConfig, TableFacade,
};
use std::sync::Arc;

pub const LIST_WIDGET: &str = "CrudList";
pub const ITEM_WIDGET: &str = "CrudItem";

/// Items of one list together with the list row itself
#[derive(Debug, Clone)]
pub struct ItemsPage {
    pub list: Row,
    pub view: CrudView,
}

pub struct HomePage {
    connection: Arc<dyn Connection>,
    session: Arc<dyn SessionStore>,
    options: CrudOptions,
}

impl HomePage {
    pub fn new(
        connection: Arc<dyn Connection>,
        session: Arc<dyn SessionStore>,
        options: CrudOptions,
    ) -> Self {
        Self {
            connection,
            session,
            options,
        }
    }

    pub fn list_facade(&self) -> ServiceResult<TableFacade> {
        let config = TableConfig::builder("list")
            .id_column("id")
            .value_column("name")
            .build()?;
        Ok(TableFacade::new(self.connection.clone(), config))
    }

    pub fn item_facade(&self, list_id: i64) -> ServiceResult<TableFacade> {
        let config = TableConfig::builder("item")
            .id_column("id")
            .value_column("name")
            .parent("list", "list_id")
            .parent_id_column("id")
            .foreign_key_value(Some(list_id))
            .build()?;
        Ok(TableFacade::new(self.connection.clone(), config))
    }

    pub fn crud_list(&self) -> ServiceResult<SimpleCrud> {
        Ok(SimpleCrud::new(
            LIST_WIDGET,
            self.list_facade()?,
            self.session.clone(),
            self.options,
        ))
    }

    pub fn crud_item(&self, list_id: i64) -> ServiceResult<SimpleCrud> {
        Ok(SimpleCrud::new(
            ITEM_WIDGET,
            self.item_facade(list_id)?,
            self.session.clone(),
            self.options,
        ))
    }

    /// All lists
    pub async fn render_default(&self) -> ServiceResult<CrudView> {
        self.crud_list()?.render().await
    }

    /// The list row, `NotFound` if there is none
    pub async fn list(&self, list_id: i64) -> ServiceResult<Row> {
        self.list_facade()?
            .get_item(list_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("List {list_id} does not exist!")))
    }

    /// Items of `list_id`. Fails with `NotFound` for an unknown list.
    #[tracing::instrument(skip(self))]
    pub async fn render_items(&self, list_id: i64) -> ServiceResult<ItemsPage> {
        let list = self.list(list_id).await?;
        let view = self.crud_item(list_id)?.render().await?;
        Ok(ItemsPage { list, view })
    }
}
