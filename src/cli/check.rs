//! check 子命令：检查数据库连通性

use crate::error::Result;
use crate::operations::tasks::TaskService;
use crate::storage::config::Config;
use crate::storage::Database;

pub fn execute(config: &Config) -> Result<()> {
    let db = Database::open_url(&config.database_url)?;
    let service = TaskService::new(db);
    service.health()?;

    let pending = service.list_pending()?.len();
    let done: usize = service
        .list_completed_grouped()?
        .values()
        .map(Vec::len)
        .sum();
    println!("OK ({}): {} pending, {} done", config.database_url, pending, done);
    Ok(())
}
