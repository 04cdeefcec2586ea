use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use keel::PersistentQueue;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the queue database file
    #[arg(short, long, default_value = "./queue.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append an item at the tail
    Enqueue { item: String },
    /// Remove and print the head item
    Dequeue,
    /// Print the head item without removing it
    Peek,
    /// Print the item at a 1-based position
    PeekAt { position: i64 },
    /// Insert an item at a 1-based position
    InsertAt { position: i64, item: String },
    /// Remove the item at a 1-based position
    RemoveAt { position: i64 },
    /// Print the number of items
    Size,
    /// Print whether the queue is empty
    IsEmpty,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let queue = PersistentQueue::open(&args.db)
        .with_context(|| format!("failed to open queue at {}", args.db.display()))?;

    match args.command {
        Command::Enqueue { item } => {
            queue.enqueue(&item)?;
            println!("enqueued");
        }
        Command::Dequeue => match queue.dequeue()? {
            Some(item) => println!("{item}"),
            None => println!("(empty)"),
        },
        Command::Peek => match queue.peek()? {
            Some(item) => println!("{item}"),
            None => println!("(empty)"),
        },
        Command::PeekAt { position } => match queue.peek_at(position)? {
            Some(item) => println!("{item}"),
            None => println!("(empty)"),
        },
        Command::InsertAt { position, item } => {
            queue.insert_at(position, &item)?;
            println!("inserted at {position}");
        }
        Command::RemoveAt { position } => {
            queue.remove_at(position)?;
            println!("removed at {position}");
        }
        Command::Size => println!("{}", queue.size()?),
        Command::IsEmpty => println!("{}", queue.is_empty()?),
    }

    Ok(())
}
