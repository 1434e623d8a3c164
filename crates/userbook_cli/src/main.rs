//! Command-line front end for the userbook store.
//!
//! # Responsibility
//! - Open a store from flags/environment and run one record operation.
//! - Keep output line-oriented and deterministic for scripting.

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use userbook_core::{
    init_logging_from_config, to_canonical, to_display, NewUser, Page, ReactiveUserStore,
    SortColumn, StoreConfig, StoreUserRepository, UserFilter, UserId, UserPatch, UserRecord,
};

#[derive(Parser, Debug)]
#[command(name = "userbook", version, about = "Local person record manager")]
struct Cli {
    /// SQLite file holding the collection; in-memory when omitted.
    #[arg(long, env = "USERBOOK_DB", global = true)]
    db: Option<PathBuf>,

    /// Storage key of the collection.
    #[arg(long, env = "USERBOOK_STORAGE_KEY", global = true)]
    key: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, env = "USERBOOK_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints core linkage information.
    Ping,
    /// Lists records, optionally filtered.
    List {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        education: Option<String>,
        /// Column to order by; insertion order when omitted.
        #[arg(long, value_enum)]
        sort_by: Option<SortArg>,
        /// Reverses the sort order.
        #[arg(long, requires = "sort_by")]
        desc: bool,
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Records per page.
        #[arg(long, default_value_t = userbook_core::view::DEFAULT_PAGE_SIZE)]
        per_page: usize,
    },
    /// Creates a record.
    Add(RecordFields),
    /// Prints one record as JSON.
    Show { id: UserId },
    /// Updates the given fields of a record.
    Update {
        id: UserId,
        #[command(flatten)]
        fields: PatchFields,
    },
    /// Deletes a record.
    Remove { id: UserId },
}

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
enum SortArg {
    Id,
    FirstName,
    LastName,
    Age,
    Date,
}

impl From<SortArg> for SortColumn {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Id => Self::Id,
            SortArg::FirstName => Self::FirstName,
            SortArg::LastName => Self::LastName,
            SortArg::Age => Self::Age,
            SortArg::Date => Self::Availability,
        }
    }
}

#[derive(Args, Debug)]
struct RecordFields {
    #[arg(long)]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    mobile: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value_t = 18)]
    age: u32,
    #[arg(long, default_value = "")]
    gender: String,
    #[arg(long, default_value = "")]
    education: String,
    /// Repeatable interest tag.
    #[arg(long = "interest")]
    interests: Vec<String>,
    /// Date in `YYYY-MM-DD` or `DD-MM-YYYY` form.
    #[arg(long, default_value = "")]
    availability: String,
}

impl From<RecordFields> for NewUser {
    fn from(value: RecordFields) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            mobile: value.mobile,
            address: value.address,
            age: value.age,
            gender: value.gender,
            education: value.education,
            interests: value.interests,
            availability_date: to_canonical(&value.availability),
        }
    }
}

#[derive(Args, Debug)]
struct PatchFields {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    mobile: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    age: Option<u32>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    education: Option<String>,
    /// Replaces all interests when given at least once.
    #[arg(long = "interest")]
    interests: Vec<String>,
    #[arg(long)]
    availability: Option<String>,
}

impl From<PatchFields> for UserPatch {
    fn from(value: PatchFields) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            mobile: value.mobile,
            address: value.address,
            age: value.age,
            gender: value.gender,
            education: value.education,
            interests: (!value.interests.is_empty()).then_some(value.interests),
            availability_date: value.availability.as_deref().map(to_canonical),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli)?;
    init_logging_from_config(&config)?;

    if let Command::Ping = cli.command {
        println!("userbook_core ping={}", userbook_core::ping());
        println!("userbook_core version={}", userbook_core::core_version());
        return Ok(());
    }

    let store = config.open_user_store().map_err(|err| err.to_string())?;
    info!(
        "event=cli_command module=cli status=start records={}",
        store.len()
    );
    execute(&store, cli.command)
}

fn resolve_config(cli: &Cli) -> Result<StoreConfig, String> {
    let mut config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    if let Some(key) = &cli.key {
        config.storage_key = key.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

fn execute(store: &ReactiveUserStore<StoreUserRepository>, command: Command) -> Result<(), String> {
    match command {
        Command::Ping => Ok(()),
        Command::List {
            query,
            education,
            sort_by,
            desc,
            page,
            per_page,
        } => {
            let filter = UserFilter::new(query, education);
            let mut users = store.filtered(&filter);
            if users.is_empty() {
                println!("{}", filter.empty_message());
                return Ok(());
            }
            if let Some(column) = sort_by {
                SortColumn::from(column).sort(&mut users, desc);
            }
            let page = Page::new(page, per_page);
            for user in page.slice(&users) {
                println!("{}", summary_line(user));
            }
            println!(
                "page {}/{} ({} records)",
                page.number(),
                page.count(users.len()),
                users.len()
            );
            Ok(())
        }
        Command::Add(fields) => {
            let created = store.add(fields.into()).map_err(|err| err.to_string())?;
            println!("created {}", created.id);
            Ok(())
        }
        Command::Show { id } => {
            let user = store.get(id).ok_or_else(|| format!("user {id} not found"))?;
            let json = serde_json_pretty(&user)?;
            println!("{json}");
            Ok(())
        }
        Command::Update { id, fields } => {
            let patch = UserPatch::from(fields);
            match store.update(id, &patch).map_err(|err| err.to_string())? {
                Some(updated) => {
                    println!("updated {}", updated.id);
                    Ok(())
                }
                None => Err(format!("user {id} not found")),
            }
        }
        Command::Remove { id } => {
            if store.remove(id).map_err(|err| err.to_string())? {
                println!("removed {id}");
                Ok(())
            } else {
                Err(format!("user {id} not found"))
            }
        }
    }
}

fn summary_line(user: &UserRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        user.id,
        user.full_name(),
        user.mobile,
        user.education,
        user.interests.join(", "),
        to_display(&user.availability_date)
    )
}

fn serde_json_pretty(user: &UserRecord) -> Result<String, String> {
    serde_json::to_string_pretty(user).map_err(|err| err.to_string())
}
