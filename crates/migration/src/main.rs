//! Applies the coinshop schema.
//!
//! `migration [up|down|fresh|status] [steps]`, against `DATABASE_URL`.

use std::{env, process::ExitCode, str::FromStr};

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DbErr};

const DEFAULT_DATABASE_URL: &str = "sqlite:./coinshop.db?mode=rwc";
const USAGE: &str = "usage: migration [up|down|fresh|status] [steps]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Up(Option<u32>),
    Down(Option<u32>),
    Fresh,
    Status,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "up" => Ok(Self::Up(None)),
            "down" => Ok(Self::Down(Some(1))),
            "fresh" => Ok(Self::Fresh),
            "status" => Ok(Self::Status),
            other => Err(format!("unknown command {other:?}")),
        }
    }
}

fn parse(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let command = match args.next() {
        Some(name) => name.parse()?,
        None => Command::Up(None),
    };
    let Some(steps) = args.next() else {
        return Ok(command);
    };
    let steps: u32 = steps
        .parse()
        .map_err(|_| format!("steps must be a positive number, got {steps:?}"))?;
    match command {
        Command::Up(_) => Ok(Command::Up(Some(steps))),
        Command::Down(_) => Ok(Command::Down(Some(steps))),
        _ => Err("only up and down take a step count".to_string()),
    }
}

async fn apply(url: &str, command: Command) -> Result<(), DbErr> {
    let mut options = ConnectOptions::new(url);
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;

    match command {
        Command::Up(steps) => Migrator::up(&db, steps).await,
        Command::Down(steps) => Migrator::down(&db, steps).await,
        Command::Fresh => Migrator::fresh(&db).await,
        Command::Status => Migrator::status(&db).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let command = match parse(env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    let url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    match apply(&url, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("migration {command:?} failed: {err}");
            ExitCode::FAILURE
        }
    }
}
