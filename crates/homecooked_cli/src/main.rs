//! Command-line front end for a HomeCooked board database.
//!
//! # Responsibility
//! - Open (and migrate) the SQLite file named on the command line.
//! - Expose card listing, moves and column rebalancing for manual checks.
//!
//! Logging is opt-in through `HOMECOOKED_LOG_DIR` (absolute path) and
//! `HOMECOOKED_LOG_LEVEL`.

use clap::{Parser, Subcommand};
use homecooked_core::db::open_db;
use homecooked_core::{
    default_log_level, init_logging, BoardService, ColumnView, OrderingService,
    SqliteCardRepository,
};
use log::info;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(
    name = "homecooked",
    about = "Inspect and reorder cards in a HomeCooked board database",
    version
)]
struct Cli {
    /// SQLite database file; created and migrated when missing.
    db_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core liveness and version.
    Ping,
    /// Create a sample board and print its column.
    Demo,
    /// Print a column in display order.
    List { column: Uuid },
    /// Move a card to a position in a column.
    Move {
        card: Uuid,
        column: Uuid,
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Rebalance a column's sort keys.
    Normalize { column: Uuid },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Demo => "demo",
            Self::List { .. } => "list",
            Self::Move { .. } => "move",
            Self::Normalize { .. } => "normalize",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    match run(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> CliResult<()> {
    if let Command::Ping = cli.command {
        writeln!(out, "homecooked_core ping={}", homecooked_core::ping())?;
        writeln!(out, "homecooked_core version={}", homecooked_core::core_version())?;
        return Ok(());
    }

    start_logging();
    let conn = open_db(&cli.db_path)?;
    let repo = SqliteCardRepository::try_new(&conn)?;
    let boards = BoardService::new(&repo);
    let ordering = OrderingService::new(&repo);

    match &cli.command {
        Command::Ping => {}
        Command::Demo => {
            let board = boards.create_board("Demo kitchen")?;
            let column = boards.add_column(board.id, "This week")?;
            for title in ["Stock", "Bread", "Soup"] {
                boards.add_card(column.id, title)?;
            }
            let mut soup = boards
                .column_view(column.id)?
                .cards()
                .last()
                .cloned()
                .ok_or("demo column is empty")?;
            ordering.move_within_column(&mut soup, 1)?;
            writeln!(out, "board {} column {}", board.id, column.id)?;
            print_view(out, &boards.column_view(column.id)?)?;
        }
        Command::List { column } => {
            print_view(out, &boards.column_view(*column)?)?;
        }
        Command::Move {
            card,
            column,
            index,
        } => {
            let mut card = boards.get_card(*card)?;
            let outcome = ordering.move_to_column(&mut card, *column, *index)?;
            writeln!(
                out,
                "moved {} sort_key={} normalized={} written={}",
                card.id,
                card.sort_key,
                outcome.normalized,
                outcome.saved.len()
            )?;
            print_view(out, &boards.column_view(*column)?)?;
        }
        Command::Normalize { column } => {
            let changed = ordering.normalize_column(*column)?;
            writeln!(out, "normalized {column} written={}", changed.len())?;
            print_view(out, &boards.column_view(*column)?)?;
        }
    }

    info!(
        "event=cli_command module=cli status=ok command={}",
        cli.command.name()
    );
    Ok(())
}

fn start_logging() {
    let Ok(log_dir) = std::env::var("HOMECOOKED_LOG_DIR") else {
        return;
    };
    let level = std::env::var("HOMECOOKED_LOG_LEVEL")
        .unwrap_or_else(|_| default_log_level().as_str().to_string());
    if let Err(err) = init_logging(&level, log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn print_view(out: &mut impl Write, view: &ColumnView) -> std::io::Result<()> {
    for (index, card) in view.cards().iter().enumerate() {
        writeln!(
            out,
            "{index:>3}  {:>12.3}  {}  {}",
            card.sort_key, card.id, card.title
        )?;
    }
    Ok(())
}
