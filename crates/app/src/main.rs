mod cli;
mod db_url;
mod render;

use std::io::Write as _;

use anyhow::{Context, bail};
use clap::Parser;
use services::{
    AppServices, Clock, PersistEvent, SetOutcome, StoreConfig, WeightService, WorkoutStore,
};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use workout_core::model::format_countdown;
use workout_core::plan_document::plan_file_name;

use crate::cli::{Cli, Command, WeightCommand};
use crate::db_url::{normalize_sqlite_url, prepare_sqlite_file};

fn init_logging() {
    let filter = EnvFilter::try_from_env("WORKOUT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Converts a 1-based command line position to an index.
fn index(position: usize, what: &str) -> anyhow::Result<usize> {
    match position.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("{what} numbers start at 1"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_url = normalize_sqlite_url(&cli.db);
    prepare_sqlite_file(&db_url)?;

    let rest = (cli.rest_seconds > 0).then_some(cli.rest_seconds);
    let config = StoreConfig::default().with_rest_after_set(rest);
    let clock = Clock::system();
    let services = AppServices::new_sqlite(&db_url, clock, config)
        .await
        .with_context(|| format!("opening {db_url}"))?;

    if let Some(email) = cli.user.as_deref() {
        let identity = services.sign_in(email).await?;
        tracing::debug!(user = %identity.user_id, "signed in from command line");
    }

    let store = services.store();
    let mut events = store.persist_events();

    match cli.command {
        Command::Show => println!("{}", render::week(&store.snapshot())),
        Command::Progress => println!("{}", render::summary_line(&store.progress())),
        Command::CompleteSet { day, exercise } => {
            let outcome =
                store.complete_one_set(index(day, "day")?, index(exercise, "exercise")?)?;
            report_set(&store, day, exercise, outcome);
            if store.timer().snapshot().active {
                println!(
                    "rest {} (run `workout timer` to count down)",
                    format_countdown(store.timer().snapshot().remaining_seconds)
                );
            }
        }
        Command::Toggle { day, exercise } => {
            let completed = store
                .toggle_exercise_completion(index(day, "day")?, index(exercise, "exercise")?)?;
            let state = if completed { "done" } else { "not done" };
            println!("day {day} exercise {exercise}: {state}");
        }
        Command::Reset => {
            store.reset_progress();
            println!("progress reset");
        }
        Command::Import { file } => {
            let document = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let plan = store.import_plan(&document)?;
            println!(
                "imported week {} with {} days and {} exercises",
                plan.week,
                plan.days.len(),
                plan.exercise_count()
            );
        }
        Command::Export { out } => {
            let document = store.export_plan()?;
            match out {
                Some(path) if path.as_os_str() == "-" => println!("{document}"),
                out => {
                    let path = out
                        .unwrap_or_else(|| plan_file_name(store.snapshot().week()).into());
                    std::fs::write(&path, document)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("wrote {}", path.display());
                }
            }
        }
        Command::Timer { seconds } => run_timer(&store, seconds).await?,
        Command::Weight(command) => run_weight(&services.weights(), clock, command).await?,
    }

    store.flush().await;
    check_writes(&mut events)?;
    services.shutdown().await;
    Ok(())
}

fn report_set(store: &WorkoutStore, day: usize, exercise: usize, outcome: SetOutcome) {
    let name = store
        .snapshot()
        .exercise(day - 1, exercise - 1)
        .map(|e| e.name().to_owned())
        .unwrap_or_default();
    match outcome {
        SetOutcome::Advanced {
            current_set,
            sets,
            exercise_completed,
            day_completed,
        } => {
            println!("{name}: set {current_set}/{sets}");
            if exercise_completed {
                println!("{name} complete");
            }
            if day_completed {
                println!("day {day} complete");
            }
        }
        SetOutcome::AlreadyComplete => println!("{name}: all sets already done"),
        SetOutcome::Suppressed => println!("{name}: ignored repeated completion"),
    }
}

async fn run_timer(store: &WorkoutStore, seconds: u32) -> anyhow::Result<()> {
    let timer = store.timer();
    let mut updates = timer.subscribe();
    timer.start(seconds);

    let mut stdout = std::io::stdout();
    loop {
        let snapshot = *updates.borrow_and_update();
        write!(stdout, "\rrest {} ", format_countdown(snapshot.remaining_seconds))?;
        stdout.flush()?;
        if !snapshot.active {
            break;
        }
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                timer.pause();
                println!();
                println!("paused at {}", format_countdown(timer.snapshot().remaining_seconds));
                return Ok(());
            }
        }
    }
    println!();
    println!("rest over");
    Ok(())
}

async fn run_weight(
    weights: &WeightService,
    clock: Clock,
    command: WeightCommand,
) -> anyhow::Result<()> {
    match command {
        WeightCommand::Add(args) => {
            let record = weights.add_record(args.into_draft(clock.today())).await?;
            println!("logged {}", render::weight_record(&record));
        }
        WeightCommand::List { exercise, limit } => {
            let records = match exercise {
                Some(name) => weights.recent_records(&name, limit).await?,
                None => weights.records().await?.into_iter().take(limit).collect(),
            };
            if records.is_empty() {
                println!("no lifts logged");
            }
            for record in &records {
                println!("{}", render::weight_record(record));
            }
        }
        WeightCommand::Progress { exercise } => {
            let progress = match exercise {
                Some(name) => weights.exercise_progress(&name).await?.into_iter().collect(),
                None => weights.progress().await?,
            };
            if progress.is_empty() {
                println!("no lifts logged");
            }
            for entry in &progress {
                println!("{}", render::weight_progress(entry));
            }
        }
        WeightCommand::Update { id, record } => {
            weights
                .update_record(id, record.into_draft(clock.today()))
                .await?;
            println!("updated #{id}");
        }
        WeightCommand::Delete { id } => {
            weights.delete_record(id).await?;
            println!("deleted #{id}");
        }
    }
    Ok(())
}

fn check_writes(events: &mut broadcast::Receiver<PersistEvent>) -> anyhow::Result<()> {
    let mut skipped = false;
    while let Ok(event) = events.try_recv() {
        match event {
            PersistEvent::Failed { error, .. } => bail!("change applied but not saved: {error}"),
            PersistEvent::Skipped { .. } => skipped = true,
            PersistEvent::Saved { .. } => {}
        }
    }
    if skipped {
        eprintln!("not signed in; pass --user or set WORKOUT_USER to keep progress");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}
