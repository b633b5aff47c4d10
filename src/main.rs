use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use radio520::{
    appsettings::AppSettings,
    calendar::{CalendarEvent, ICS_MIME, StationInfo},
    delivery::{LogNotificationChannel, NotificationChannel},
    schedule::{WeeklySchedule, radio520 as station_schedule},
    scheduling::{
        Countdown, ScheduleResolver, ScheduleTicker, SpecialBroadcast, SystemClock, TickSnapshot,
        countdown::weekday_name_pt,
    },
    storage::{FileKeyValueStore, KeyValueStore, LocationStore, ReminderStore, ReminderToggle},
    weather::{
        ConfiguredLocationProvider, FileWeatherSource, LocationProvider, WeatherLocation, WeatherMonitor,
        resolve_location,
    },
};

#[derive(Parser, Debug)]
#[command(name = "radio520", version, about = "Rádio 520 program schedule")]
struct Cli {
    /// Settings file layered over appsettings and appsettings.local
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the schedule until interrupted
    Run,
    /// Show what is on air now
    Now,
    /// Write a calendar reminder for the next program
    RemindNext {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Write a calendar reminder for the special broadcast
    RemindSpecial {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Turn the reminder flag of a program on or off
    ToggleReminder { name: String },
    /// List programs flagged for reminders
    Reminders,
    /// Build a weather report from a saved provider response
    Weather { file: PathBuf },
}

struct Station {
    settings: AppSettings,
    timezone: Tz,
    info: StationInfo,
    resolver: Arc<ScheduleResolver>,
    special: SpecialBroadcast,
    channel: Arc<dyn NotificationChannel>,
}

impl Station {
    async fn build(settings: AppSettings) -> anyhow::Result<Self> {
        let timezone = settings.timezone()?;
        let schedule = match &settings.schedule.file {
            Some(path) => WeeklySchedule::from_json_file(path)
                .await
                .with_context(|| format!("loading schedule {}", path.display()))?,
            None => station_schedule::weekly_schedule()?,
        };
        if schedule.is_empty() {
            log::warn!("Schedule has no programs, {} fills every day", settings.station.filler_program);
        }
        let resolver = ScheduleResolver::new(
            schedule,
            timezone,
            settings.schedule.rollover,
            settings.station.filler_program.clone(),
        );

        Ok(Self {
            timezone,
            info: settings.station_info(),
            resolver: Arc::new(resolver),
            special: settings.special_broadcast()?,
            channel: Arc::new(LogNotificationChannel),
            settings,
        })
    }

    fn ticker(&self) -> ScheduleTicker {
        ScheduleTicker::new(
            self.resolver.clone(),
            Some(self.special.clone()),
            Arc::new(SystemClock),
            self.channel.clone(),
        )
    }

    async fn store(&self) -> anyhow::Result<Arc<dyn KeyValueStore>> {
        let path = self.settings.storage_path();
        let store = FileKeyValueStore::open(&path)
            .await
            .with_context(|| format!("opening store {}", path.display()))?;
        Ok(Arc::new(store))
    }

    async fn reminders(&self) -> anyhow::Result<ReminderStore> {
        Ok(ReminderStore::load(self.store().await?, self.channel.clone()).await?)
    }

    async fn weather_location(&self) -> anyhow::Result<WeatherLocation> {
        let locations = LocationStore::new(self.store().await?);
        let providers: Vec<Box<dyn LocationProvider>> = vec![Box::new(ConfiguredLocationProvider::new(
            self.settings.weather.location.clone(),
        ))];

        resolve_location(&locations, &providers).await
    }

    async fn weather_monitor(&self, response_file: PathBuf) -> anyhow::Result<WeatherMonitor> {
        Ok(WeatherMonitor::new(
            Arc::new(FileWeatherSource::new(response_file)),
            self.weather_location().await?,
            self.settings.alert_policy(),
            self.settings.weather_refresh_interval(),
        ))
    }
}

fn describe(snapshot: &TickSnapshot, special: &SpecialBroadcast) -> String {
    let info = &snapshot.info;
    let mut lines = vec![format!(
        "No ar: {} ({} - {}) {:.0}%",
        info.current.name(),
        info.current.start(),
        info.current.end(),
        info.progress_percent
    )];
    if let Some(subtitle) = info.current.subtitle() {
        lines.push(format!("  {subtitle}"));
    }

    let day = if info.is_next_day_rollover { " (amanhã)" } else { "" };
    match info.until_next {
        Some(until) => lines.push(format!(
            "A seguir: {} às {}{day}, em {}",
            info.next.name(),
            info.next.start(),
            Countdown::from(until)
        )),
        None => lines.push(format!("A seguir: {}", info.next.name())),
    }

    if let Some(countdown) = snapshot.special_countdown {
        lines.push(format!(
            "{}: {countdown} ({} {})",
            special.program.name(),
            weekday_name_pt(special.weekday),
            special.next_airing_date(&snapshot.civil).format("%d/%m")
        ));
    }

    lines.join("\n")
}

async fn run(station: &Station) -> anyhow::Result<()> {
    let ticker = station.ticker();
    let mut snapshots = ticker.subscribe();
    ticker.start().await;

    let monitor = match station.settings.weather.response_file.clone() {
        Some(file) => {
            let monitor = station.weather_monitor(file).await?;
            monitor.start().await;
            Some(monitor)
        }
        None => None,
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutting down");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = snapshot.filter(|s| s.civil.seconds() % 60 == 0) {
                    log::info!("{}", describe(&snapshot, &station.special));
                }
            }
        }
    }

    ticker.shutdown().await;
    if let Some(monitor) = monitor {
        monitor.shutdown().await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();

    let cli = Cli::parse();
    let settings = AppSettings::load(cli.config.as_deref()).context("loading settings")?;
    let station = Station::build(settings).await?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&station).await?,
        Command::Now => {
            let ticker = station.ticker();
            println!("{}", describe(&ticker.snapshot_now(), &station.special));
        }
        Command::RemindNext { out } => {
            let now = Utc::now();
            let info = station.resolver.resolve(now);
            let event = CalendarEvent::for_program(
                &info.next,
                info.is_next_day_rollover,
                now,
                station.timezone,
                &station.info,
            );
            let path = event.save(&out).await?;
            station.reminders().await?.insert(info.next.name()).await?;
            println!("{} ({ICS_MIME})", path.display());
        }
        Command::RemindSpecial { out } => {
            let event = CalendarEvent::for_special(&station.special, Utc::now(), station.timezone, &station.info);
            let path = event.save(&out).await?;
            station
                .reminders()
                .await?
                .insert(&station.special.reminder_key)
                .await?;
            println!("{} ({ICS_MIME})", path.display());
        }
        Command::ToggleReminder { name } => match station.reminders().await?.toggle(&name).await? {
            ReminderToggle::Added => println!("Lembrete ativado para \"{name}\""),
            ReminderToggle::Removed => println!("Lembrete removido para \"{name}\""),
        },
        Command::Reminders => {
            for name in station.reminders().await?.names().await {
                println!("{name}");
            }
        }
        Command::Weather { file } => {
            let state = station.weather_monitor(file).await?.refresh_once().await;
            match (state.report, state.error) {
                (Some(report), _) => println!("{report}"),
                (None, error) => anyhow::bail!(error.unwrap_or_else(|| "Falha ao buscar clima.".to_owned())),
            }
        }
    }

    Ok(())
}
