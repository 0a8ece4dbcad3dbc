//! Terminal rendering of widget views

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use simple_crud_core::Value;
use simple_crud_services::{CrudView, FlashKind, Paginator, Redirect, Region, SortDirection};
use std::fmt::Write;

/// Item rows as a table. The sorted column is marked in the header.
pub fn item_table(view: &CrudView) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let Some(first) = view.items.first() else {
        table.set_header(vec!["(no items)"]);
        return table;
    };

    let header: Vec<String> = first
        .columns()
        .iter()
        .map(|column| {
            if *column == view.sort.column {
                let arrow = match view.sort.direction {
                    SortDirection::Asc => "↑",
                    SortDirection::Desc => "↓",
                };
                format!("{column} {arrow}")
            } else {
                column.clone()
            }
        })
        .collect();
    table.set_header(header);

    for row in &view.items {
        let cells: Vec<String> = row.values.iter().map(cell_text).collect();
        table.add_row(cells);
    }
    table
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `« 0 [1] 2 »  page 1 of 0..=7, 75 items`
pub fn paginator_line(paginator: &Paginator) -> String {
    let mut line = String::new();
    if !paginator.is_first() {
        line.push_str("« ");
    }
    let links: Vec<String> = paginator
        .direct_links()
        .map(|page| {
            if page == paginator.page() {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect();
    line.push_str(&links.join(" "));
    if !paginator.is_last() {
        line.push_str(" »");
    }
    let _ = write!(
        line,
        "  page {} of {}..={}, {} items",
        paginator.page(),
        paginator.first_page(),
        paginator.last_page(),
        paginator.item_count()
    );
    line
}

/// Full text for one widget: flashes, forms, the item table and paging
pub fn render_view(heading: &str, view: &CrudView, redraw: &[Region]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {heading} ==");

    for flash in &view.flashes {
        let marker = match flash.kind {
            FlashKind::Success => "ok",
            FlashKind::Error => "error",
        };
        let _ = writeln!(out, "[{marker}] {}", flash.message);
    }

    if let Some(form) = &view.edit_form {
        match form.id {
            Some(id) => {
                let _ = writeln!(out, "edit item {id}: name = {:?}", form.name);
            }
            None => {
                let _ = writeln!(out, "new item: name = {:?}", form.name);
            }
        }
    }

    if let Some(item) = &view.confirm_item {
        let label = item
            .values
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>()
            .join(" | ");
        let _ = writeln!(out, "delete {label}? send the `delete` signal to confirm");
    }

    let _ = writeln!(out, "{}", item_table(view));
    let _ = writeln!(out, "{}", paginator_line(&view.paginator));
    if view.is_parent_table && !view.items.is_empty() {
        let _ = writeln!(out, "send `show itemId=<id>` to open a list");
    }

    if !redraw.is_empty() {
        let regions: Vec<String> = redraw.iter().map(Region::to_string).collect();
        let _ = writeln!(out, "redraw: {}", regions.join(", "));
    }
    out
}

pub fn redirect_line(redirect: Redirect) -> String {
    match redirect {
        Redirect::Items(list_id) => format!("-> items of list {list_id}"),
    }
}
