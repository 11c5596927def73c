use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};

mod app;

use app::App;
use workdesk_auth::ProfileUpdate;
use workdesk_calendar::CalendarView;
use workdesk_core::Config;
use workdesk_i18n::Language;

#[derive(Parser)]
#[command(name = "workdesk")]
#[command(about = "Personal workspace: account, profile and calendar")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show mode, configuration and who is signed in (default)
    Status,
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        /// Must repeat the password
        confirmation: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    Logout,
    /// Change the interface language (en, zh, de, es, fr, ja)
    Language { code: String },
    /// List the events visible in a calendar view
    Events {
        #[arg(short, long, value_enum, default_value_t = ViewArg::Month)]
        view: ViewArg,
    },
    /// Create an event, on `--day` at the default hour or at the next full hour
    New {
        title: String,

        /// Day to create the event on (YYYY-MM-DD)
        #[arg(short, long)]
        day: Option<NaiveDate>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Month,
    Week,
    Day,
    Agenda,
    Year,
}

impl From<ViewArg> for CalendarView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Month => CalendarView::Month,
            ViewArg::Week => CalendarView::Week,
            ViewArg::Day => CalendarView::Day,
            ViewArg::Agenda => CalendarView::Agenda,
            ViewArg::Year => CalendarView::Year,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    workdesk_core::init()?;
    let cli = Cli::parse();

    let (config, validation) = Config::load_validated()?;
    let app = App::build(config)?;
    let signed_in = app.start().await;
    tracing::info!("Workdesk started");

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => {
            println!("Workdesk");
            println!("  Mode: {}", app.mode());
            println!("  Config directory: {}", app.config().config_dir.display());
            if !validation.warnings.is_empty() {
                println!("  Configuration warnings: {}", validation.warnings.len());
            }
            match signed_in {
                Some(profile) => println!(
                    "  Signed in as {} ({}){}",
                    profile.display_name(),
                    app.locale().language(),
                    if app.sessions().is_admin() { ", admin" } else { "" }
                ),
                None => println!("  Not signed in"),
            }
        }
        Command::Login { email, password } => {
            let profile = app
                .login(&email, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Signed in as {}", profile.display_name());
        }
        Command::Register {
            email,
            password,
            confirmation,
            first_name,
            last_name,
        } => {
            let profile = app
                .register(
                    &email,
                    &password,
                    &confirmation,
                    first_name.as_deref(),
                    last_name.as_deref(),
                )
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Registered and signed in as {}", profile.display_name());
        }
        Command::Logout => {
            app.logout().await;
            println!("Signed out");
        }
        Command::Language { code } => {
            let language = Language::from_code(Some(&code));
            app.update_profile(ProfileUpdate::language(language))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Language set to {}", app.locale().language());
        }
        Command::Events { view } => {
            let state = app.view_state(view.into());
            let events = app
                .load_visible(&state)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", state.title(&app.locale().get(), app.week_start()));
            for event in events {
                let start = event.start.with_timezone(&Local);
                println!("  {}  {}", start.format("%Y-%m-%d %H:%M"), event.title);
            }
        }
        Command::New { title, day } => {
            let mut event = match day {
                Some(day) => app.draft_event_on(day),
                None => app.draft_event(),
            };
            event.title = title;
            let saved = app
                .calendar()
                .add(event)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Created {} ({})", saved.title, saved.id);
        }
    }

    Ok(())
}
