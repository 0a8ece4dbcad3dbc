//! simple-crud - lists and their items from the command line
//!
//! Every invocation is one request against the two CRUD widgets: the
//! action is applied, the widget is rendered, and the sort and paging
//! state is written back to the session file.
//!
//! ```text
//! simple-crud lists
//! simple-crud signal list add
//! simple-crud save list --name groceries
//! simple-crud signal list show itemId=1
//! simple-crud save item --list-id 1 --name milk
//! simple-crud signal item sort column=name --list-id 1
//! ```

mod database;
mod home_page;
mod logging;
mod output;
mod session_file;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use simple_crud_core::{Connection, SessionStore, Value};
use simple_crud_services::{CrudAction, ItemData, Redirect, ServiceError, SimpleCrud};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::home_page::HomePage;
use crate::session_file::FileSessionStore;
use crate::settings::AppSettings;

#[derive(Parser)]
#[command(name = "simple-crud")]
#[command(about = "Manage lists and their items", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file (overrides the settings file)
    #[arg(long, global = true, env = "SIMPLE_CRUD_DATABASE", value_name = "PATH")]
    database: Option<String>,

    /// Session file holding sort and paging state
    #[arg(long, global = true, env = "SIMPLE_CRUD_SESSION", value_name = "PATH")]
    session: Option<PathBuf>,

    /// Settings file
    #[arg(long, global = true, env = "SIMPLE_CRUD_SETTINGS", value_name = "PATH")]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all lists
    Lists,

    /// Show the items of a list
    Items {
        #[arg(value_name = "LIST_ID")]
        list_id: i64,
    },

    /// Send a signal to a widget
    ///
    /// Signals: edit, confirm, delete, show (itemId=N), add, sort (column=C),
    /// itemsPerPage (itemsPerPage=N), page (page=N)
    Signal {
        widget: Widget,

        signal: String,

        /// Signal parameters as key=value
        #[arg(value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Parent list, required for the item widget
        #[arg(long)]
        list_id: Option<i64>,
    },

    /// Submit the edit form: update when --id names an item, add otherwise
    Save {
        widget: Widget,

        #[arg(long)]
        name: String,

        #[arg(long)]
        id: Option<String>,

        /// Parent list, required for the item widget
        #[arg(long)]
        list_id: Option<i64>,
    },

    /// Write the effective settings to the settings file
    InitSettings,

    /// Forget stored sort and paging state
    ResetSession,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Widget {
    List,
    Item,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => AppSettings::load_from(path),
        None => AppSettings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is configured from the settings, so it is not up yet
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // Dropped after run returns so buffered file logs are flushed
    let _log_guard =
        match logging::init(logging::LoggingConfig::from_settings(&settings.logging)) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("error: failed to initialize logging: {e:#}");
                return ExitCode::FAILURE;
            }
        };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting simple-crud");

    match run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "request failed");
            eprintln!("error: {e:#}");
            match e.downcast_ref::<ServiceError>() {
                Some(service_error) if service_error.is_client_error() => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: Cli, mut settings: AppSettings) -> Result<()> {
    if let Some(database) = cli.database {
        settings.database.path = database;
    }
    let session_path = match cli.session {
        Some(path) => path,
        None => FileSessionStore::default_path()?,
    };

    match cli.command {
        Commands::InitSettings => {
            let path = match cli.settings {
                Some(path) => {
                    settings.save_to(&path)?;
                    path
                }
                None => {
                    settings.save()?;
                    AppSettings::settings_path()?
                }
            };
            println!("settings written to {}", path.display());
            return Ok(());
        }
        Commands::ResetSession => {
            FileSessionStore::open(&session_path)?.clear()?;
            println!("session cleared");
            return Ok(());
        }
        _ => {}
    }

    let connection = database::open(&settings.database.resolved_path()).await?;
    let session = Arc::new(FileSessionStore::open(&session_path)?);
    tracing::debug!(session = %session.path().display(), "session loaded");

    let page = HomePage::new(
        connection as Arc<dyn Connection>,
        session.clone() as Arc<dyn SessionStore>,
        settings.crud.options(),
    );

    let result = dispatch(&page, cli.command).await;
    // Widget state changes made before a failure are kept as well
    session.flush()?;
    result
}

async fn dispatch(page: &HomePage, command: Commands) -> Result<()> {
    match command {
        Commands::Lists => {
            let view = page.render_default().await?;
            print!("{}", output::render_view("Lists", &view, &[]));
        }
        Commands::Items { list_id } => show_items(page, list_id).await?,
        Commands::Signal {
            widget,
            signal,
            params,
            list_id,
        } => {
            let params: HashMap<String, String> = params.into_iter().collect();
            let action = CrudAction::from_signal(&signal, &params)?;
            let (mut crud, heading) = open_widget(page, widget, list_id).await?;
            match crud.handle(action).await? {
                Some(redirect) => {
                    println!("{}", output::redirect_line(redirect));
                    let Redirect::Items(list_id) = redirect;
                    show_items(page, list_id).await?;
                }
                None => print_widget(&crud, &heading).await?,
            }
        }
        Commands::Save {
            widget,
            name,
            id,
            list_id,
        } => {
            let mut data = ItemData::new(name);
            if let Some(id) = id {
                data = data.with_id(Value::from(id));
            }
            let (mut crud, heading) = open_widget(page, widget, list_id).await?;
            crud.submit_edit_form(&data).await?;
            print_widget(&crud, &heading).await?;
        }
        Commands::InitSettings | Commands::ResetSession => {}
    }
    Ok(())
}

async fn open_widget(
    page: &HomePage,
    widget: Widget,
    list_id: Option<i64>,
) -> Result<(SimpleCrud, String)> {
    match widget {
        Widget::List => Ok((page.crud_list()?, "Lists".to_string())),
        Widget::Item => {
            let list_id = list_id
                .ok_or_else(|| ServiceError::InvalidArgument("--list-id is required".into()))?;
            let list = page.list(list_id).await?;
            let heading = list_heading(&list);
            Ok((page.crud_item(list_id)?, heading))
        }
    }
}

async fn show_items(page: &HomePage, list_id: i64) -> Result<()> {
    let items = page
        .render_items(list_id)
        .await
        .with_context(|| format!("Failed to show list {list_id}"))?;
    print!(
        "{}",
        output::render_view(&list_heading(&items.list), &items.view, &[])
    );
    Ok(())
}

async fn print_widget(crud: &SimpleCrud, heading: &str) -> Result<()> {
    let view = crud.render().await?;
    print!(
        "{}",
        output::render_view(heading, &view, &crud.redraw_regions())
    );
    Ok(())
}

fn list_heading(list: &simple_crud_core::Row) -> String {
    match list.get_by_name("name") {
        Some(name) => format!("Items of {name}"),
        None => "Items".to_string(),
    }
}
