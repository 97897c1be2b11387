//! HTML 页面渲染（tera 模板编译进二进制）

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tera::{Context, Tera};

use crate::error::{Result, TodoError};
use crate::operations::tasks::TasksByDate;
use crate::storage::tasks::{Task, TaskView, MAX_NAME_LEN};

static TERA: Lazy<std::result::Result<Tera, tera::Error>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("index.html", include_str!("../../templates/index.html")),
        ("done.html", include_str!("../../templates/done.html")),
    ])?;
    Ok(tera)
});

fn render(name: &str, context: &Context) -> Result<String> {
    let tera = TERA
        .as_ref()
        .map_err(|e| TodoError::Template(format!("load templates: {e}")))?;
    Ok(tera.render(name, context)?)
}

/// 待办列表页
pub fn render_index(tasks: &[Task]) -> Result<String> {
    let views: Vec<TaskView> = tasks.iter().map(Task::to_view).collect();
    let mut context = Context::new();
    context.insert("is_empty", &views.is_empty());
    context.insert("tasks", &views);
    context.insert("max_name_len", &MAX_NAME_LEN);
    render("index.html", &context)
}

/// 已完成页（按日期分组）
pub fn render_done(grouped: &TasksByDate) -> Result<String> {
    let views = grouped_views(grouped);
    let mut context = Context::new();
    context.insert("is_empty", &views.is_empty());
    context.insert("tasks_by_date", &views);
    render("done.html", &context)
}

pub fn grouped_views(grouped: &TasksByDate) -> BTreeMap<String, Vec<TaskView>> {
    grouped
        .iter()
        .map(|(day, tasks)| (day.clone(), tasks.iter().map(Task::to_view).collect()))
        .collect()
}
