/*
[INPUT]:  Projections, snapshots, single tasks, notices
[OUTPUT]: Styled terminal output (stat cards, task table, detail view)
[POS]:    CLI presentation layer
[UPDATE]: When table columns or badge styling change
*/

use chrono::{Local, NaiveDateTime};
use console::{StyledObject, style};
use taskdeck_adapter::{Task, TaskResult, TaskStatus};
use taskdeck_dashboard::{Notice, NoticeLevel, Projection, Snapshot, TaskStats};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn when(time: &NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Padded, colored status label
pub fn status_badge(status: TaskStatus) -> StyledObject<String> {
    let label = style(format!("{:<9}", status.as_str()));
    match status {
        TaskStatus::Pending => label.yellow(),
        TaskStatus::Scheduled => label.cyan(),
        TaskStatus::Running => label.blue().bold(),
        TaskStatus::Success => label.green(),
        TaskStatus::Failed => label.red().bold(),
        TaskStatus::Cancelled => label.dim(),
    }
}

pub fn print_stats(stats: &TaskStats) {
    println!(
        "{} {}   {} {}   {} {}   {} {}",
        style("Total").bold(),
        stats.total,
        style("Success rate").bold(),
        style(stats.success_rate_label()).green(),
        style("Failed").bold(),
        style(stats.failed_count).red(),
        style("Upcoming").bold(),
        style(stats.upcoming_count).cyan(),
    );
}

pub fn print_table(projection: &Projection) {
    if projection.tasks.is_empty() {
        println!("{}", style("No tasks found.").yellow());
        return;
    }

    println!(
        "{}",
        style(format!(
            "{:<38} {:<16} {:<9} {:<16} {:<16} {}",
            "ID", "TYPE", "STATUS", "RUN AT", "CREATED", "RETRIES"
        ))
        .bold()
        .underlined()
    );
    for task in &projection.tasks {
        println!(
            "{:<38} {:<16} {} {:<16} {:<16} {}/{}",
            task.id,
            task.task_type.label(),
            status_badge(task.status),
            when(&task.run_at),
            when(&task.created_at),
            task.retries,
            taskdeck_adapter::MAX_RETRIES,
        );
    }
    println!(
        "{}",
        style(format!(
            "Page {}/{} ({} matching)",
            projection.page,
            projection.total_pages.max(1),
            projection.filtered_count
        ))
        .dim()
    );
}

/// Stat cards, table and freshness line for one installed snapshot
pub fn print_dashboard(projection: &Projection, snapshot: &Snapshot) {
    print_stats(&projection.stats);
    println!();
    print_table(projection);
    if let Some(updated) = snapshot.last_updated() {
        println!(
            "{}",
            style(format!(
                "Last updated {}",
                updated.with_timezone(&Local).format("%H:%M:%S")
            ))
            .dim()
        );
    }
}

pub fn print_task_detail(task: &Task, cancellable: bool) {
    println!("{} {}", style("Task").bold(), style(&task.id).cyan());
    println!("  {:<13} {}", "Type", task.task_type.label());
    println!("  {:<13} {}", "Status", status_badge(task.status));
    println!("  {:<13} {}", "Run at", when(&task.run_at));
    println!("  {:<13} {}", "Created", when(&task.created_at));
    if let Some(completed_at) = task.completed_at {
        println!("  {:<13} {}", "Completed", when(&completed_at));
    }
    println!(
        "  {:<13} {} used, {} left",
        "Retries",
        task.retries,
        task.retries_remaining()
    );
    println!("  {:<13} {}", "Payload", task.payload.summary());

    match &task.result {
        Some(TaskResult::Text(text)) => println!("  {:<13} {}", "Result", text),
        Some(TaskResult::Structured(map)) => println!(
            "  {:<13} {}",
            "Result",
            serde_json::to_string(map).unwrap_or_default()
        ),
        None => {}
    }
    if let Some(error) = &task.error_message {
        println!("  {:<13} {}", "Error", style(error).red());
    }
    if task.report_available() {
        println!(
            "  {}",
            style(format!("Report ready: taskdeck report {}", task.id)).green()
        );
    }
    if cancellable {
        println!(
            "  {}",
            style(format!("Cancellable: taskdeck cancel {}", task.id)).yellow()
        );
    }

    println!("\n{}", style("Logs").bold());
    println!("{}", task.logs_or_placeholder());
}

pub fn print_notice(notice: &Notice) {
    let prefix = match notice.level {
        NoticeLevel::Info => style("info").cyan(),
        NoticeLevel::Success => style("ok").green(),
        NoticeLevel::Error => style("error").red().bold(),
    };
    println!("{} {}", prefix, notice.message);
}
