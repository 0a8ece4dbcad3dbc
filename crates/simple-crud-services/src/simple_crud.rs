//! CRUD widget bound to one table
//!
//! A [`SimpleCrud`] lives for a single request. Sort, page and page size
//! survive between requests in the injected [`SessionStore`], under a
//! section keyed by widget name, table and foreign key value.

use simple_crud_core::{Row, SessionSection, SessionStore};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::actions::{CrudAction, MAX_ITEMS_PER_PAGE};
use crate::error::{ServiceError, ServiceResult};
use crate::paginator::{DEFAULT_DIRECT_LINKS_COUNT, Paginator};
use crate::sort::SortSpec;
use crate::table_facade::{ItemData, TableFacade};
use crate::view_models::{CrudView, EditForm, FlashMessage, Redirect, Region};

const SORT_KEY: &str = "sort";
const PAGE_KEY: &str = "page";
const ITEMS_PER_PAGE_KEY: &str = "itemsPerPage";

const ITEM_NOT_FOUND: &str = "Item does not exist!";
const DELETE_BLOCKED: &str = "The list cannot be deleted because it contains data!";

/// Paging defaults of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrudOptions {
    pub first_page: usize,
    pub items_per_page: usize,
    pub direct_links_count: usize,
}

impl Default for CrudOptions {
    fn default() -> Self {
        Self {
            first_page: 0,
            items_per_page: 10,
            direct_links_count: DEFAULT_DIRECT_LINKS_COUNT,
        }
    }
}

pub struct SimpleCrud {
    name: String,
    facade: TableFacade,
    session: Arc<dyn SessionStore>,
    options: CrudOptions,
    flashes: Vec<FlashMessage>,
    redraw: BTreeSet<Region>,
    edit_form: Option<EditForm>,
    confirm_item: Option<Row>,
    saved: bool,
}

impl SimpleCrud {
    pub fn new(
        name: impl Into<String>,
        facade: TableFacade,
        session: Arc<dyn SessionStore>,
        options: CrudOptions,
    ) -> Self {
        Self {
            name: name.into(),
            facade,
            session,
            options,
            flashes: Vec::new(),
            redraw: BTreeSet::new(),
            edit_form: None,
            confirm_item: None,
            saved: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn facade(&self) -> &TableFacade {
        &self.facade
    }

    pub fn options(&self) -> CrudOptions {
        self.options
    }

    /// Session section holding this widget's state
    pub fn session_key(&self) -> String {
        let config = self.facade.config();
        format!(
            "{}-{}-{}",
            self.name,
            config.table_name(),
            config
                .foreign_key_value()
                .map(|value| value.to_string())
                .unwrap_or_default()
        )
    }

    fn section(&self) -> SessionSection<'_> {
        SessionSection::new(self.session.as_ref(), self.session_key())
    }

    pub fn flashes(&self) -> &[FlashMessage] {
        &self.flashes
    }

    /// Regions invalidated by the actions handled so far
    pub fn redraw_regions(&self) -> Vec<Region> {
        self.redraw.iter().copied().collect()
    }

    pub fn edit_form(&self) -> Option<&EditForm> {
        self.edit_form.as_ref()
    }

    pub fn confirm_item(&self) -> Option<&Row> {
        self.confirm_item.as_ref()
    }

    /// Whether the edit form was saved during this request
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    fn default_sort(&self) -> SortSpec {
        SortSpec::ascending(self.facade.config().value_column())
    }

    /// Sort stored in the session, or the value column ascending
    pub fn current_sort(&self) -> SortSpec {
        self.section()
            .get::<SortSpec>(SORT_KEY)
            .unwrap_or_else(|| self.default_sort())
    }

    /// Page stored in the session, or the first page
    pub fn current_page(&self) -> usize {
        self.section()
            .get::<usize>(PAGE_KEY)
            .filter(|page| *page > 0)
            .unwrap_or(self.options.first_page)
    }

    /// Page size stored in the session, or the configured default
    pub fn current_items_per_page(&self) -> usize {
        self.section()
            .get::<usize>(ITEMS_PER_PAGE_KEY)
            .filter(|n| (1..=MAX_ITEMS_PER_PAGE).contains(n))
            .unwrap_or(self.options.items_per_page.max(1))
    }

    /// Load the current page and assemble the view
    #[tracing::instrument(skip(self), fields(widget = %self.name))]
    pub async fn render(&self) -> ServiceResult<CrudView> {
        let sort = self.current_sort();
        let page = self.current_page();
        let items_per_page = self.current_items_per_page();
        let base = self.options.first_page;

        let count = self
            .facade
            .list_items(Some(sort.column.as_str()), sort.direction.as_sql(), 0, items_per_page)?
            .count()
            .await?;

        // A stored page may point past the end after deletes
        let paginator = Paginator::new(page, items_per_page, count as usize)
            .with_base(base)
            .with_direct_links_count(self.options.direct_links_count);
        if paginator.page() != page {
            tracing::debug!(requested = page, clamped = paginator.page(), "page out of range");
        }

        let selection = self.facade.list_items(
            Some(sort.column.as_str()),
            sort.direction.as_sql(),
            paginator.page() - base,
            items_per_page,
        )?;
        let items = selection.fetch().await?;
        tracing::debug!(rows = items.len(), total = count, "item page loaded");

        Ok(CrudView {
            items,
            is_parent_table: self.facade.config().is_parent_table(),
            paginator,
            sort: selection.sort().clone(),
            edit_form: self.edit_form.clone(),
            confirm_item: self.confirm_item.clone(),
            flashes: self.flashes.clone(),
        })
    }

    /// Apply a user action. Only [`CrudAction::Show`] yields a redirect.
    #[tracing::instrument(skip(self), fields(widget = %self.name))]
    pub async fn handle(&mut self, action: CrudAction) -> ServiceResult<Option<Redirect>> {
        match action {
            CrudAction::Edit(id) => self.edit(id).await?,
            CrudAction::Confirm(id) => self.confirm(id).await?,
            CrudAction::Delete(id) => self.delete(id).await?,
            CrudAction::Add => self.add(),
            CrudAction::Sort(column) => self.sort(&column),
            CrudAction::ItemsPerPage(n) => self.items_per_page(n),
            CrudAction::Page(page) => self.page(page),
            CrudAction::Show(id) => return Ok(Some(Redirect::Items(id))),
        }
        Ok(None)
    }

    pub async fn edit(&mut self, id: i64) -> ServiceResult<()> {
        let row = self.require_item(id).await?;
        let config = self.facade.config();
        self.edit_form = Some(EditForm::from_row(
            &row,
            config.id_column(),
            config.value_column(),
        ));
        self.redraw.insert(Region::EditForm);
        Ok(())
    }

    pub async fn confirm(&mut self, id: i64) -> ServiceResult<()> {
        let row = self.require_item(id).await?;
        self.confirm_item = Some(row);
        self.redraw.insert(Region::ConfirmForm);
        Ok(())
    }

    /// Delete an item. Rows still referenced elsewhere stay and are
    /// reported as an error flash.
    pub async fn delete(&mut self, id: i64) -> ServiceResult<()> {
        self.require_item(id).await?;
        match self.facade.delete_item(id).await {
            Ok(_) => {}
            Err(ServiceError::ConstraintViolation(reason)) => {
                tracing::warn!(id, %reason, "delete blocked by referencing rows");
                self.flashes.push(FlashMessage::error(DELETE_BLOCKED));
            }
            Err(e) => return Err(e),
        }
        self.redraw
            .extend([Region::Flash, Region::ItemTable, Region::Paginator]);
        Ok(())
    }

    pub fn add(&mut self) {
        self.edit_form = Some(EditForm::default());
        self.redraw.insert(Region::EditForm);
    }

    pub fn sort(&mut self, column: &str) {
        let sort = self.current_sort().clicked(column);
        tracing::debug!(column = %sort.column, direction = %sort.direction, "sort changed");
        self.section().set(SORT_KEY, &sort);
        self.redraw.insert(Region::ItemTable);
    }

    /// Change the page size. The page count changes, so paging restarts.
    pub fn items_per_page(&mut self, items_per_page: usize) {
        let section = self.section();
        section.set(ITEMS_PER_PAGE_KEY, &items_per_page);
        section.set(PAGE_KEY, &self.options.first_page);
        self.redraw.extend([Region::ItemTable, Region::Paginator]);
    }

    pub fn page(&mut self, page: usize) {
        self.section().set(PAGE_KEY, &page);
        self.redraw.extend([Region::ItemTable, Region::Paginator]);
    }

    /// Save the edit form: update when it names an existing id, insert otherwise
    #[tracing::instrument(skip(self, data), fields(widget = %self.name))]
    pub async fn submit_edit_form(&mut self, data: &ItemData) -> ServiceResult<()> {
        let flash = if data.positive_id().is_some() {
            match self.facade.update_item(data).await? {
                0 => FlashMessage::error("The item has not been updated."),
                _ => FlashMessage::success("The item has been updated successfully."),
            }
        } else {
            match self.facade.add_item(data).await? {
                Some(_) => FlashMessage::success("Item added successfully."),
                None => FlashMessage::error("Failed to add item."),
            }
        };

        self.flashes.push(flash);
        self.saved = true;
        self.edit_form = None;
        self.redraw
            .extend([Region::Flash, Region::EditForm, Region::ItemTable]);
        Ok(())
    }

    async fn require_item(&self, id: i64) -> ServiceResult<Row> {
        self.facade
            .get_item(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(ITEM_NOT_FOUND.to_string()))
    }
}
