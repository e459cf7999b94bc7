//! Guestbook CLI
//!
//! Command-line interface for the guestbook - books, greetings, and tags.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use guestbook_core::Guestbook;

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "guestbook")]
#[command(about = "Guestbook - books of greetings with shared tags")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Manage greetings in a book
    Greeting {
        #[command(subcommand)]
        command: GreetingCommands,
    },
    /// List all tags with usage counts
    Tags,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (storage location, record counts)
    Status,
}

#[derive(Subcommand)]
enum BookCommands {
    /// Create a new book
    #[command(alias = "add")]
    Create {
        /// Book name
        name: String,
        /// Tags to attach
        #[arg(short, long)]
        tag: Vec<String>,
    },
    /// List all books
    #[command(alias = "ls")]
    List,
    /// Show book details (including recent greetings)
    Show {
        /// Book ID
        id: String,
    },
    /// Rename a book
    Rename {
        /// Book ID
        id: String,
        /// New name
        name: String,
    },
    /// Attach a tag to a book
    Tag {
        /// Book ID
        id: String,
        /// Tag name
        name: String,
    },
}

#[derive(Subcommand)]
enum GreetingCommands {
    /// Sign a greeting into a book
    #[command(alias = "add")]
    Create {
        /// Book ID
        book_id: String,
        /// Greeting content
        content: String,
    },
    /// List a book's greetings, newest first
    #[command(alias = "ls")]
    List {
        /// Book ID
        book_id: String,
        /// Maximum number of greetings to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show a single greeting
    Show {
        /// Book ID
        book_id: String,
        /// Greeting ID
        id: String,
    },
    /// Delete a greeting from a book
    #[command(alias = "rm")]
    Delete {
        /// Book ID
        book_id: String,
        /// Greeting ID
        id: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, fetch_limit)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    init_logging();

    // Config commands don't need the guestbook
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let mut guestbook = Guestbook::open()?;
    tracing::debug!(
        "Using database {}",
        guestbook.config().sqlite_path().display()
    );

    match cli.command {
        Commands::Book { command } => handle_book_command(command, &mut guestbook, &output),
        Commands::Greeting { command } => handle_greeting_command(command, &mut guestbook, &output),
        Commands::Tags => commands::tag::list(&guestbook, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Status => commands::status::show(&guestbook, &output),
    }
}

fn handle_book_command(
    command: BookCommands,
    guestbook: &mut Guestbook,
    output: &Output,
) -> Result<()> {
    match command {
        BookCommands::Create { name, tag } => commands::book::create(guestbook, name, tag, output),
        BookCommands::List => commands::book::list(guestbook, output),
        BookCommands::Show { id } => commands::book::show(guestbook, id, output),
        BookCommands::Rename { id, name } => commands::book::rename(guestbook, id, name, output),
        BookCommands::Tag { id, name } => commands::book::tag(guestbook, id, name, output),
    }
}

fn handle_greeting_command(
    command: GreetingCommands,
    guestbook: &mut Guestbook,
    output: &Output,
) -> Result<()> {
    match command {
        GreetingCommands::Create { book_id, content } => {
            commands::greeting::create(guestbook, book_id, content, output)
        }
        GreetingCommands::List { book_id, limit } => {
            commands::greeting::list(guestbook, book_id, limit, output)
        }
        GreetingCommands::Show { book_id, id } => {
            commands::greeting::show(guestbook, book_id, id, output)
        }
        GreetingCommands::Delete { book_id, id } => {
            commands::greeting::delete(guestbook, book_id, id, output)
        }
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

/// Initialize logging to stderr
///
/// Only logs if the GUESTBOOK_LOG environment variable is set.
fn init_logging() {
    let Ok(log_level) = std::env::var("GUESTBOOK_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "guestbook_core={},guestbook_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
