//! Checklist demo binary.
//!
//! Runs a short scripted session against the configured storage engine and
//! prints the resulting list.
//!
//! ```text
//! CHECKLIST_STORAGE=memory cargo run -p checklist
//! CHECKLIST_DATABASE_URL=sqlite://todos.db?mode=rwc cargo run -p checklist
//! ```

use anyhow::Context;
use checklist::sqlite::SqliteTodoRepository;
use checklist::{
    app_reducer, AppAction, AppState, Config, InMemoryTodoRepository, StorageKind, TodoAction,
    TodoEnvironment, TodoRepository,
};
use checklist_runtime::{Store, StoreConfig};
use chrono::Utc;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    checklist_runtime::metrics::register_metrics();

    tracing::info!(storage = ?config.storage, "Starting checklist");

    match config.storage {
        StorageKind::Memory => run(Arc::new(InMemoryTodoRepository::new()), &config).await,
        StorageKind::Sqlite => {
            let repository =
                SqliteTodoRepository::connect(&config.database_url, config.max_connections)
                    .await
                    .with_context(|| format!("Failed to open {}", config.database_url))?;
            tracing::info!(url = %config.database_url, "Connected to SQLite");

            let result = run(Arc::new(repository.clone()), &config).await;
            repository.close().await;
            result
        },
    }
}

async fn run<R: TodoRepository>(repository: Arc<R>, config: &Config) -> anyhow::Result<()> {
    let store = Store::with_config(
        AppState::default(),
        app_reducer(),
        TodoEnvironment::live(repository),
        StoreConfig::default().with_shutdown_timeout(config.shutdown_timeout()),
    );
    let send = |action: TodoAction| store.send(AppAction::TodoFeature(action));

    send(TodoAction::OnAppear).await?.wait().await;
    let loaded = store.state(|s| s.todo_feature.count()).await;
    println!("Loaded {loaded} todos");

    println!("\n>>> Creating category 'Errands'");
    let saved = store
        .send_and_wait_for(
            AppAction::TodoFeature(TodoAction::CreateCategory {
                name: "Errands".to_string(),
                color_hex: None,
                icon_name: Some("cart".to_string()),
            }),
            |action| {
                matches!(
                    action,
                    AppAction::TodoFeature(TodoAction::CategorySaved(_))
                )
            },
            config.shutdown_timeout(),
        )
        .await
        .context("Category was not saved in time")?;
    let errands = match saved {
        AppAction::TodoFeature(TodoAction::CategorySaved(Ok(category))) => Some(category.id),
        _ => None,
    };
    send(TodoAction::SelectCategory(errands)).await?;

    println!(">>> Adding 'Buy milk'");
    send(TodoAction::NewTodoTextChanged("Buy milk".to_string())).await?;
    send(TodoAction::AddTodoButtonTapped).await?.wait().await;

    let newest = store
        .state(|s| s.todo_feature.todos.iter().next().map(|t| t.id))
        .await;
    if let Some(id) = newest {
        println!(">>> Completing 'Buy milk'");
        send(TodoAction::TodoToggled { id }).await?.wait().await;
    }

    let state = store.state(|s| s.todo_feature.clone()).await;
    println!("\nTodos ({} done / {}):", state.completed_count(), state.count());
    for todo in state.visible_todos(Utc::now()) {
        let mark = if todo.is_completed { "x" } else { " " };
        let category = todo
            .category_id
            .and_then(|id| state.categories.get(id))
            .map(|c| format!(" ({})", c.name))
            .unwrap_or_default();
        println!("  [{mark}] {}{category}", todo.title);
    }
    if let Some(error) = &state.last_error {
        println!("\nLast error: {error}");
    }

    store
        .shutdown_default()
        .await
        .context("Effects did not finish before shutdown")?;
    tracing::info!("Checklist stopped");
    Ok(())
}
