use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use shelfmark_core::model::{Email, FineType, Isbn, MembershipType, Money};
use std::path::PathBuf;

mod commands;
mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "shelfmark", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/shelfmark/shelfmark.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Create the catalog database and apply pending migrations
    Init,
    /// Load demonstration data into an empty catalog
    ///
    /// Adds a small category tree, a handful of publishers and authors,
    /// eight books with their author credits, four members and three
    /// staff. Nothing is written if the catalog already holds books.
    Seed,
    /// Show catalog totals
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage books
    #[command(subcommand)]
    Book(BookCommand),
    /// Browse categories
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Manage members
    #[command(subcommand)]
    Member(MemberCommand),
    /// Lend a book to a member
    ///
    /// Takes one copy off the shelf. Fails when every copy is out; place a
    /// reservation instead.
    Borrow {
        isbn: Isbn,
        /// Membership number, e.g. M-2024-0001
        member: String,
        /// Due date (default: today plus loan_days)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Employee id of the staff member processing the loan
        #[arg(long)]
        staff: Option<String>,
    },
    /// Check a borrowed copy back in
    Return {
        /// Loan id
        loan: i64,
        /// Return date (default: today)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Write off a borrowed copy as lost
    Lost {
        /// Loan id
        loan: i64,
        /// Charge the member a Lost Book fine of this amount
        #[arg(long)]
        charge: Option<Money>,
    },
    /// Extend a loan (at most 5 times)
    Renew {
        /// Loan id
        loan: i64,
        /// New due date (default: loan_days past the later of today and the current due date)
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Flag overdue loans and expire stale reservations
    Overdue,
    /// Reserve a book for a member
    Reserve {
        isbn: Isbn,
        /// Membership number
        member: String,
        /// Days to hold the reservation (default: reservation_days)
        #[arg(long)]
        days: Option<u64>,
    },
    /// Charge and settle fines
    #[command(subcommand)]
    Fine(FineCommand),
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, clap::Subcommand)]
enum BookCommand {
    /// Add a title to the catalog
    Add {
        isbn: Isbn,
        title: String,
        /// Category id (see `shelfmark category tree`)
        #[arg(long)]
        category: i64,
        #[arg(long, default_value_t = 1)]
        copies: u32,
        #[arg(long)]
        subtitle: Option<String>,
        /// Publisher id
        #[arg(long)]
        publisher: Option<i64>,
        /// Publication year
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        pages: Option<u32>,
        /// Shelf location
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        price: Option<Money>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show a book with its authors and availability
    Show {
        isbn: Isbn,
        #[arg(long)]
        json: bool,
    },
    /// Full-text search over titles, subtitles and descriptions
    Search {
        /// Words to look for
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Add copies of a book already in the catalog
    Copies { isbn: Isbn, count: u32 },
}

#[derive(Debug, clap::Subcommand)]
enum CategoryCommand {
    /// Print the category hierarchy
    Tree,
}

#[derive(Debug, clap::Subcommand)]
enum MemberCommand {
    /// Register a member
    Add {
        /// Membership number, e.g. M-2024-0005
        number: String,
        first_name: String,
        last_name: String,
        email: Email,
        /// Student, Faculty, Staff or Public
        #[arg(long = "type", default_value = "Public")]
        membership_type: MembershipType,
        /// Membership start (default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Membership end
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show a member with open loans and unpaid fines
    Show {
        number: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, clap::Subcommand)]
enum FineCommand {
    /// Charge a member
    Add {
        /// Membership number
        member: String,
        amount: Money,
        /// Overdue, "Lost Book", Damage or "Processing Fee"
        #[arg(long = "type", default_value = "Overdue")]
        fine_type: FineType,
        /// Loan the fine relates to
        #[arg(long)]
        loan: Option<i64>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Record a payment against a fine
    Pay {
        fine: i64,
        amount: Money,
        /// Payment date (default: today)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Forgive the unpaid part of a fine
    Waive { fine: i64 },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
    /// Create the config file with defaults
    Init,
    /// Print an example config file
    Example,
}

fn init_logging(config: &Config) -> Result<()> {
    let level = match config.logging.level().to_ascii_lowercase().as_str() {
        "error" => twyg::LogLevel::Error,
        "warn" => twyg::LogLevel::Warn,
        "info" => twyg::LogLevel::Info,
        "debug" => twyg::LogLevel::Debug,
        "trace" => twyg::LogLevel::Trace,
        other => anyhow::bail!("Unknown logging level {other:?} in configuration"),
    };
    let opts = twyg::OptsBuilder::new()
        .coloured(config.logging.coloured())
        .level(level)
        .build()
        .context("Invalid logging options")?;
    twyg::setup(opts).context("Failed to set up logging")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_with_db_path(cli.db)?;
    init_logging(&config)?;
    log::debug!("Using database {}", config.database_path.display());

    match cli.command {
        Commands::Init => commands::setup::run_init(&config)?,
        Commands::Seed => commands::setup::run_seed(&config)?,
        Commands::Status { json } => commands::status::show_status(&config, json)?,
        Commands::Book(cmd) => match cmd {
            BookCommand::Add {
                isbn,
                title,
                category,
                copies,
                subtitle,
                publisher,
                year,
                pages,
                location,
                price,
                description,
            } => commands::book::add_book(
                &config,
                commands::book::AddBook {
                    isbn,
                    title,
                    category,
                    copies,
                    subtitle,
                    publisher,
                    year,
                    pages,
                    location,
                    price,
                    description,
                },
            )?,
            BookCommand::Show { isbn, json } => commands::book::show_book(&config, &isbn, json)?,
            BookCommand::Search { words } => {
                commands::book::search_books(&config, &words.join(" "))?;
            }
            BookCommand::Copies { isbn, count } => {
                commands::book::add_copies(&config, &isbn, count)?;
            }
        },
        Commands::Category(cmd) => match cmd {
            CategoryCommand::Tree => commands::category::show_tree(&config)?,
        },
        Commands::Member(cmd) => match cmd {
            MemberCommand::Add {
                number,
                first_name,
                last_name,
                email,
                membership_type,
                start,
                end,
                phone,
            } => commands::member::add_member(
                &config,
                commands::member::AddMember {
                    number,
                    first_name,
                    last_name,
                    email,
                    membership_type,
                    start,
                    end,
                    phone,
                },
            )?,
            MemberCommand::Show { number, json } => {
                commands::member::show_member(&config, &number, json)?;
            }
        },
        Commands::Borrow {
            isbn,
            member,
            due,
            staff,
        } => commands::circulation::borrow(&config, &isbn, &member, due, staff.as_deref())?,
        Commands::Return { loan, on } => commands::circulation::return_book(&config, loan, on)?,
        Commands::Lost { loan, charge } => commands::circulation::mark_lost(&config, loan, charge)?,
        Commands::Renew { loan, due } => commands::circulation::renew(&config, loan, due)?,
        Commands::Overdue => commands::circulation::sweep_overdue(&config)?,
        Commands::Reserve { isbn, member, days } => {
            commands::circulation::reserve(&config, &isbn, &member, days)?;
        }
        Commands::Fine(cmd) => match cmd {
            FineCommand::Add {
                member,
                amount,
                fine_type,
                loan,
                description,
            } => commands::fine::add_fine(&config, &member, amount, fine_type, loan, description)?,
            FineCommand::Pay { fine, amount, on } => {
                commands::fine::pay_fine(&config, fine, amount, on)?;
            }
            FineCommand::Waive { fine } => commands::fine::waive_fine(&config, fine)?,
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommand::Show => commands::config::show_config(&config)?,
            ConfigCommand::Path => commands::config::show_path()?,
            ConfigCommand::Init => commands::config::init_config()?,
            ConfigCommand::Example => commands::config::show_example()?,
        },
    }

    Ok(())
}
