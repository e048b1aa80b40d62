/*
[INPUT]:  Parsed subcommand, loaded DashboardConfig, process shutdown token
[OUTPUT]: Executed dashboard operation with terminal feedback
[POS]:    CLI command layer - thin caller over the dashboard core
[UPDATE]: When adding subcommands or changing their flags
*/

mod init;
mod prompt;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use console::style;
use taskdeck_adapter::TaskType;
use taskdeck_dashboard::{
    CancelOutcome, Confirmation, Dashboard, DashboardConfig, NoticeLevel, ShellEvent,
    SyncOutcome, TaskForm, ViewState, project,
};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and persist the bearer token
    Login {
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long, short)]
        email: Option<String>,
    },
    /// Forget the persisted token
    Logout,
    /// Print stat cards and one page of tasks
    List(ViewArgs),
    /// Keep polling and reprint on every change until interrupted
    Watch(ViewArgs),
    /// Show one task with its payload, result and logs
    Show { id: String },
    /// Schedule a new task
    Create(CreateArgs),
    /// Request cancellation of a pending or scheduled task
    Cancel {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Download the CSV export of every task
    Export {
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Download the PDF of a finished report task
    Report {
        id: String,
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Write a configuration file
    InitConfig {
        path: PathBuf,
        /// Write defaults without prompting
        #[arg(long)]
        defaults: bool,
        #[arg(long)]
        force: bool,
    },
}

impl Command {
    pub fn is_long_running(&self) -> bool {
        matches!(self, Command::Watch(_))
    }
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    #[arg(long, short, default_value = "")]
    search: String,
    #[arg(long, short, default_value_t = 1)]
    page: usize,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// send_message, send_email or generate_report
    #[arg(long = "type", value_name = "TYPE")]
    task_type: TaskType,
    /// Local wall-clock time, YYYY-MM-DD HH:MM or YYYY-MM-DDTHH:MM
    #[arg(long, value_name = "TIME")]
    run_at: String,
    #[arg(long)]
    message: Option<String>,
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    /// Email body
    #[arg(long)]
    content: Option<String>,
    /// Report title
    #[arg(long)]
    title: Option<String>,
    /// Report body
    #[arg(long)]
    report_content: Option<String>,
}

impl CreateArgs {
    fn into_form(self) -> TaskForm {
        TaskForm {
            task_type: self.task_type,
            run_at: self.run_at,
            message: self.message.unwrap_or_default(),
            to: self.to.unwrap_or_default(),
            subject: self.subject.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            report_title: self.title.unwrap_or_default(),
            report_content: self.report_content.unwrap_or_default(),
        }
    }
}

pub async fn run(command: Command, config: DashboardConfig, interrupt: CancellationToken) -> Result<()> {
    match command {
        Command::InitConfig {
            path,
            defaults,
            force,
        } => init::run_init(&path, defaults, force),
        Command::Login { username } => login(&config, username).await,
        Command::Register { email } => register(&config, email).await,
        Command::Logout => {
            let dashboard = Dashboard::from_config(&config)?;
            dashboard.session().logout()?;
            println!("{}", style("Logged out.").green());
            Ok(())
        }
        Command::List(view) => list(&config, view).await,
        Command::Watch(view) => watch(&config, view, interrupt).await,
        Command::Show { id } => show(&config, &id).await,
        Command::Create(args) => create(&config, args).await,
        Command::Cancel { id, yes } => cancel(&config, &id, yes).await,
        Command::Export { dir } => {
            let mut dashboard = authenticated(&config)?;
            let dir = dir.unwrap_or_else(|| config.download_dir.clone());
            let result = dashboard.gateway().export_csv(&dir).await;
            print_notices(&mut dashboard);
            result?;
            Ok(())
        }
        Command::Report { id, dir } => {
            let mut dashboard = authenticated(&config)?;
            initial_sync(&dashboard, &config).await?;
            let dir = dir.unwrap_or_else(|| config.download_dir.clone());
            let result = dashboard.gateway().download_report(&id, &dir).await;
            print_notices(&mut dashboard);
            result?;
            Ok(())
        }
    }
}

async fn login(config: &DashboardConfig, username: Option<String>) -> Result<()> {
    let dashboard = Dashboard::from_config(config)?;
    let username = match username {
        Some(username) => username,
        None => prompt::prompt_text("Email")?,
    };
    let password = prompt::prompt_password()?;

    dashboard
        .session()
        .auth()
        .login(&username, &password)
        .await
        .context("login failed")?;
    println!("{} {}", style("Logged in as").green(), style(&username).cyan());
    Ok(())
}

async fn register(config: &DashboardConfig, email: Option<String>) -> Result<()> {
    let dashboard = Dashboard::from_config(config)?;
    let email = match email {
        Some(email) => email,
        None => prompt::prompt_text("Email")?,
    };
    let password = prompt::prompt_new_password()?;

    let ack = dashboard
        .session()
        .auth()
        .register(&email, &password)
        .await
        .context("registration failed")?;
    let message = if ack.message.is_empty() {
        "Account created".to_string()
    } else {
        ack.message
    };
    println!("{}", style(message).green());
    println!("Run {} to sign in.", style("taskdeck login").cyan());
    Ok(())
}

/// Dashboard with a usable credential, or a pointer to `login`
fn authenticated(config: &DashboardConfig) -> Result<Dashboard> {
    let dashboard = Dashboard::from_config(config)?;
    if !dashboard.session().is_authenticated() {
        bail!("not logged in; run `taskdeck login` first");
    }
    Ok(dashboard)
}

/// One foreground pull so the store has something to read
async fn initial_sync(dashboard: &Dashboard, config: &DashboardConfig) -> Result<()> {
    match dashboard.engine().sync(false).await {
        SyncOutcome::Installed { task_count, .. } => {
            debug!(task_count, "initial snapshot loaded");
            Ok(())
        }
        SyncOutcome::LoginRequired => bail!("session expired; run `taskdeck login` again"),
        outcome => bail!("could not load tasks from {} ({outcome:?})", config.base_url),
    }
}

async fn list(config: &DashboardConfig, args: ViewArgs) -> Result<()> {
    let dashboard = authenticated(config)?;
    initial_sync(&dashboard, config).await?;

    let view = ViewState::new(args.search, args.page);
    let snapshot = dashboard.reader().snapshot();
    let projection = project(snapshot.tasks(), &view);
    render::print_dashboard(&projection, &snapshot);
    Ok(())
}

async fn watch(config: &DashboardConfig, args: ViewArgs, interrupt: CancellationToken) -> Result<()> {
    let mut dashboard = authenticated(config)?;
    let mut view = ViewState::new(args.search, args.page);
    let mut reader = dashboard.reader();
    let mut events = dashboard.session().subscribe();
    let mut refreshing = dashboard.engine().refreshing();

    dashboard.start();
    info!("watching tasks; press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = interrupt.cancelled() => break,
            changed = reader.changed() => {
                let Ok(snapshot) = changed else { break };
                let projection = project(snapshot.tasks(), &view);
                view.clamp(projection.total_pages);
                println!();
                render::print_dashboard(&projection, &snapshot);
            }
            event = events.recv() => match event {
                Ok(ShellEvent::LoginRequired) => {
                    eprintln!("{}", style("Session expired; run `taskdeck login` again.").red());
                    break;
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            Ok(()) = refreshing.changed() => {
                if *refreshing.borrow_and_update() {
                    debug!("refreshing");
                }
            }
        }
    }

    dashboard.shutdown_and_wait().await?;
    Ok(())
}

async fn show(config: &DashboardConfig, id: &str) -> Result<()> {
    let mut dashboard = authenticated(config)?;
    initial_sync(&dashboard, config).await?;
    let result = dashboard.gateway().task_detail(id).await;
    print_notices(&mut dashboard);
    let task = result?;
    render::print_task_detail(&task, dashboard.gateway().can_cancel(id));
    Ok(())
}

async fn create(config: &DashboardConfig, args: CreateArgs) -> Result<()> {
    let mut dashboard = authenticated(config)?;
    let mut form = args.into_form();
    let result = dashboard.gateway().create(&mut form).await;
    print_notices(&mut dashboard);
    let response = result?;
    println!("{} {}", style("Task id").bold(), style(response.task_id).cyan());
    Ok(())
}

async fn cancel(config: &DashboardConfig, id: &str, yes: bool) -> Result<()> {
    let mut dashboard = authenticated(config)?;
    initial_sync(&dashboard, config).await?;

    let confirmation: Box<dyn Confirmation> = if yes {
        Box::new(|_: &str| true)
    } else {
        Box::new(prompt::confirm)
    };
    let result = dashboard.gateway().cancel(id, confirmation.as_ref()).await;
    print_notices(&mut dashboard);
    if result? == CancelOutcome::Declined {
        return Ok(());
    }

    // The backend is authoritative; show what it reports now
    dashboard.engine().sync(false).await;
    if let Some(task) = dashboard.reader().snapshot().get(id) {
        println!("{} {}", style("Current status").bold(), render::status_badge(task.status));
    }
    Ok(())
}

/// Print queued notices; errors come back through the command result instead
fn print_notices(dashboard: &mut Dashboard) {
    let Some(mut notices) = dashboard.take_notices() else {
        return;
    };
    while let Ok(notice) = notices.try_recv() {
        if notice.level != NoticeLevel::Error {
            render::print_notice(&notice);
        }
    }
}
