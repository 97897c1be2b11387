//! Web server CLI command

use crate::api::{self, AppState};
use crate::error::Result;
use crate::operations::tasks::TaskService;
use crate::storage::config::Config;
use crate::storage::Database;

/// Execute the web server
pub async fn execute(config: &Config, open_browser: bool) -> Result<()> {
    tracing::info!(
        env = %config.env,
        database = %config.database_url,
        debug = config.debug,
        "starting todolist"
    );

    let db = Database::open_url(&config.database_url)?;
    let state = AppState::new(TaskService::new(db));

    if open_browser {
        let url = format!("http://localhost:{}", config.port);
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            println!("Opening browser: {}", url);
            let _ = open::that(&url);
        });
    }

    api::start_server(&config.host, config.port, state).await?;
    Ok(())
}
