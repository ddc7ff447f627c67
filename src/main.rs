use chrono::Utc;
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wedding_planner_sync::{
    config::{database, settings},
    core::{
        assistant::{CannedReplies, ChatLog},
        planner::Planner,
        remote::SeaRemote,
        session::Session,
    },
    errors::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Planner settings
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Connect and make sure the tables exist
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Sign in and load every collection
    let session = Session::new();
    let mut planner = Planner::new(SeaRemote::new(db), &session);
    match settings::get_user_id() {
        Some(identity) => session.sign_in(identity),
        None => warn!("PLANNER_USER_ID not set, running signed out"),
    }
    planner
        .sync_identity()
        .await
        .inspect_err(|e| error!("Failed to load planner: {}", e))?;

    // 6. Dashboard
    let summary = planner.summary(Utc::now().date_naive());
    info!(
        "Tasks {}/{} ({:.0}%), budget {:.2} planned / {:.2} spent / {:.2} remaining, guests {}/{} confirmed",
        summary.completed_tasks,
        summary.total_tasks,
        summary.progress_percent,
        summary.planned_total,
        summary.spent_total,
        summary.remaining,
        summary.confirmed_guests,
        summary.total_guests,
    );
    if let Some(days) = summary.days_until_wedding {
        info!("{} days until the wedding", days);
    }
    for task in planner.upcoming_tasks(settings.dashboard.upcoming_tasks) {
        let due = task
            .due_date
            .map_or_else(|| "no due date".to_string(), |date| date.to_string());
        info!("Upcoming: {} ({})", task.title, due);
    }

    // 7. Assistant, asked whatever was passed on the command line
    let replies = CannedReplies::from_settings(&settings.assistant)?;
    let mut chat = ChatLog::new(settings.assistant.greeting.clone());
    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    chat.ask(&replies, &prompt).await?;
    for message in chat.messages() {
        info!("{:?}: {}", message.role, message.content);
    }

    Ok(())
}
