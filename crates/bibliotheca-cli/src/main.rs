use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use bibliotheca_core::builder::presets;
use bibliotheca_core::{
    AddBookCommand, AppConfig, BookStatus, BorrowBookCommand, CommandHistory, ConsoleObserver,
    Entity, EntityId, EntityKind, ExitCode, ExportFormat, Filters, LibraryFacade, LoadOutcome,
    Light, NumberService, Person, PersonOverrides, Prototype, PrototypeRegistry, Record,
    RemoteControl, ReturnBookCommand, TracingObserver, TurnOffLightCommand, TurnOnLightCommand,
    open_logged_source,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bibliotheca",
    about = "Library catalogue manager: books, readers, librarians and loans",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting BIBLIOTHECA_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Snapshot file to load and save instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book to the catalogue.
    AddBook {
        title: String,
        author: String,
        year: i32,
        isbn: String,
    },

    /// Register a reader.
    AddReader {
        name: String,
        email: String,
        phone: String,
    },

    /// Register a librarian.
    AddLibrarian {
        name: String,
        email: String,
        phone: String,
        position: String,
    },

    /// List every record of one kind.
    List { kind: EntityKind },

    /// Search records by exact field values.
    Search {
        kind: EntityKind,
        /// Condition such as `author="Leo Tolstoy"`; all must hold.
        #[arg(long = "where", value_name = "FIELD=VALUE", value_parser = parse_condition)]
        conditions: Vec<(String, String)>,
    },

    /// Lend a book to a reader.
    Borrow { reader_id: EntityId, book_id: EntityId },

    /// Take a borrowed book back.
    Return { book_id: EntityId },

    /// Delete a record.
    Delete { kind: EntityKind, id: EntityId },

    /// Export one collection.
    Export {
        kind: EntityKind,
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        /// Target file (defaults to `<export_dir>/<kind>_export.<ext>`).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Merge books from a JSON export, keeping their ids.
    ImportBooks { path: PathBuf },

    /// Summarize a file of integers, one per line.
    Numbers { file: PathBuf },

    /// Show a preset computer configuration.
    Computer {
        /// One of: gaming, office, budget.
        preset: String,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Walk through the main library operations in a scratch library.
    Demo,
}

// ─── Config Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective config.
    Show,
    /// Print the config file path.
    Path,
    /// Write the default config file if none exists.
    Init,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    // ── Env var overrides ──────────────────────────────────────────────────
    let json_output = cli.json || std::env::var("BIBLIOTHECA_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load()?;
    if let Ok(state_path) = std::env::var("BIBLIOTHECA_STATE") {
        config.set_state_path(state_path.into());
    }
    if let Some(state_path) = cli.state {
        config.set_state_path(state_path);
    }
    // Console events would corrupt machine output
    if json_output {
        config.logging.console = false;
    }

    setup_tracing(&config.logging.level, cli.verbose);
    tracing::debug!(state = %config.state_path().display(), "config loaded");

    match cli.command {
        // ── Add ────────────────────────────────────────────────────────────

        Commands::AddBook { title, author, year, isbn } => {
            let mut lib = open_library(&config)?;
            let book = lib.add_book(title, author, year, isbn);
            lib.save_state()?;
            report_record(json_output, &book.record(), start)?;
        }

        Commands::AddReader { name, email, phone } => {
            let mut lib = open_library(&config)?;
            let reader = lib.add_reader(name, email, phone);
            lib.save_state()?;
            report_record(json_output, &reader.record(), start)?;
        }

        Commands::AddLibrarian { name, email, phone, position } => {
            let mut lib = open_library(&config)?;
            let librarian = lib.add_librarian(name, email, phone, position);
            lib.save_state()?;
            report_record(json_output, &librarian.record(), start)?;
        }

        // ── Query ──────────────────────────────────────────────────────────

        Commands::List { kind } => {
            let lib = open_library(&config)?;
            let records = lib.records(kind);
            if !json_output && records.is_empty() {
                println!("No {kind} in library.");
            } else {
                print_records(json_output, &records, start)?;
            }
        }

        Commands::Search { kind, conditions } => {
            let lib = open_library(&config)?;
            let records: Vec<Record> = match kind {
                EntityKind::Books => lib
                    .search_books(&Filters::parse_pairs(conditions))
                    .iter()
                    .map(Entity::record)
                    .collect(),
                EntityKind::Librarians => lib
                    .search_librarians(&Filters::parse_pairs(conditions))
                    .iter()
                    .map(Entity::record)
                    .collect(),
                EntityKind::Readers => lib
                    .search_readers(&Filters::parse_pairs(conditions))
                    .iter()
                    .map(Entity::record)
                    .collect(),
            };
            if !json_output && records.is_empty() {
                println!("No matching {kind}.");
            } else {
                print_records(json_output, &records, start)?;
            }
        }

        // ── Loans ──────────────────────────────────────────────────────────

        Commands::Borrow { reader_id, book_id } => {
            let mut lib = open_library(&config)?;
            if !lib.borrow_book(reader_id, book_id) {
                fail(
                    json_output,
                    ExitCode::Rejected,
                    "rejected",
                    &format!("Reader {reader_id} cannot borrow book {book_id}"),
                    start,
                )?;
            }
            lib.save_state()?;
            report_ok(json_output, serde_json::json!({"reader_id":reader_id,"book_id":book_id}), start)?;
        }

        Commands::Return { book_id } => {
            let mut lib = open_library(&config)?;
            if !lib.return_book(book_id) {
                fail(
                    json_output,
                    ExitCode::Rejected,
                    "rejected",
                    &format!("Book {book_id} is not borrowed"),
                    start,
                )?;
            }
            lib.save_state()?;
            report_ok(json_output, serde_json::json!({"book_id":book_id}), start)?;
        }

        Commands::Delete { kind, id } => {
            let mut lib = open_library(&config)?;
            let deleted = match kind {
                EntityKind::Books => lib.delete_book(id),
                EntityKind::Librarians => lib.delete_librarian(id),
                EntityKind::Readers => lib.delete_reader(id),
            };
            if !deleted {
                fail(
                    json_output,
                    ExitCode::NotFound,
                    "not_found",
                    &format!("{} {id} not found", kind.singular()),
                    start,
                )?;
            }
            lib.save_state()?;
            report_ok(json_output, serde_json::json!({"deleted":id,"kind":kind.to_string()}), start)?;
        }

        // ── Export / import ────────────────────────────────────────────────

        Commands::Export { kind, format, out } => {
            let lib = open_library(&config)?;
            let strategy = format.strategy();
            let target = out.unwrap_or_else(|| config.export_path(kind, strategy.extension()));
            lib.export(strategy.as_ref(), &target, kind)?;
            report_ok(
                json_output,
                serde_json::json!({"kind":kind.to_string(),"format":format.to_string(),"path":target}),
                start,
            )?;
        }

        Commands::ImportBooks { path } => {
            let mut lib = open_library(&config)?;
            let count = lib.import_books(&path)?;
            lib.save_state()?;
            report_ok(json_output, serde_json::json!({"imported":count,"path":path}), start)?;
        }

        // ── Extras ─────────────────────────────────────────────────────────

        Commands::Numbers { file } => {
            let stats = if json_output {
                NumberService::new(open_logged_source(&file, TracingObserver)?).summary()?
            } else {
                NumberService::new(open_logged_source(&file, ConsoleObserver)?).summary()?
            };
            if json_output {
                report_ok(json_output, serde_json::to_value(&stats)?, start)?;
            } else {
                println!("Numbers: {:?}", stats.numbers);
                println!("  Count:   {}", stats.count);
                println!("  Sum:     {}", stats.sum);
                println!("  Min:     {}", stats.min);
                println!("  Max:     {}", stats.max);
                println!("  Average: {:.2}", stats.average);
            }
        }

        Commands::Computer { preset } => match presets::by_name(&preset) {
            Ok(computer) if json_output => {
                report_ok(json_output, serde_json::to_value(&computer)?, start)?;
            }
            Ok(computer) => println!("{computer}"),
            Err(e) => fail(json_output, ExitCode::InvalidArgs, "invalid_args", &e.to_string(), start)?,
        },

        // ── Config ─────────────────────────────────────────────────────────

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if json_output {
                    report_ok(json_output, serde_json::to_value(&config)?, start)?;
                } else {
                    println!("state_path     = {}", config.storage.state_path);
                    println!("export_dir     = {}", config.storage.export_dir);
                    println!("level          = {}", config.logging.level);
                    println!("console        = {}", config.logging.console);
                    println!("tracing_events = {}", config.logging.tracing_events);
                    println!(
                        "log_file       = {}",
                        config.logging.log_file.as_deref().unwrap_or("(none)")
                    );
                }
            }
            ConfigAction::Path => {
                let path = AppConfig::config_path();
                if json_output {
                    report_ok(json_output, serde_json::json!({"path":path}), start)?;
                } else {
                    println!("{}", path.display());
                }
            }
            ConfigAction::Init => {
                let path = AppConfig::config_path();
                let created = !path.exists();
                if created {
                    AppConfig::default().save_to(&path)?;
                }
                if json_output {
                    report_ok(json_output, serde_json::json!({"path":path,"created":created}), start)?;
                } else if created {
                    println!("Wrote default config to {}", path.display());
                } else {
                    println!("Config already exists: {}", path.display());
                }
            }
        },

        Commands::Demo => run_demo(&config, json_output, start)?,
    }

    Ok(())
}

// ─── Demo ────────────────────────────────────────────────────────────────────

fn run_demo(config: &AppConfig, json_output: bool, start: Instant) -> Result<()> {
    let export_dir = PathBuf::from(&config.storage.export_dir);
    let mut lib = LibraryFacade::new(export_dir.join("demo_state.json"));
    if !json_output {
        lib.subscribe(ConsoleObserver);
    }

    let war = lib.add_book("War and Peace", "Leo Tolstoy", 1869, "ISBN1");
    lib.add_book("Anna Karenina", "Leo Tolstoy", 1877, "ISBN2");
    lib.add_book("Crime and Punishment", "Fyodor Dostoevsky", 1866, "ISBN3");
    let ivan = lib.add_reader("Ivan Petrov", "ivan@example.com", "+7-900-000-00-01");
    lib.add_librarian("Anna Smirnova", "anna@example.com", "+7-900-000-00-02", "Head Librarian");

    lib.borrow_book(ivan.id, war.id);
    let tolstoy = lib.search_books(&Filters::from_pairs([("author", "Leo Tolstoy")]));
    let borrowed = lib.search_books(&Filters::from_pairs([("status", BookStatus::Borrowed)]));

    let mut history = CommandHistory::new();
    history.execute(&mut lib, Box::new(ReturnBookCommand::new(war.id)));
    history.execute(&mut lib, Box::new(AddBookCommand::new("The Idiot", "Fyodor Dostoevsky", 1869, "ISBN4")));
    history.undo_last(&mut lib);
    history.undo_last(&mut lib);
    history.execute(&mut lib, Box::new(BorrowBookCommand::new(ivan.id, 2)));

    for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Binary] {
        let strategy = format.strategy();
        let target = export_dir.join(format!("demo_books.{}", strategy.extension()));
        lib.export(strategy.as_ref(), &target, EntityKind::Books)?;
    }
    lib.save_state()?;

    let mut light = Light::new();
    let mut remote = RemoteControl::new();
    remote.set_command(Box::new(TurnOnLightCommand));
    remote.press_button(&mut light);
    remote.set_command(Box::new(TurnOffLightCommand));
    remote.press_button(&mut light);
    remote.undo_last(&mut light);

    let mut prototypes = PrototypeRegistry::new();
    let developer = Person::new("Ivan", 30).with_hobbies(["reading", "programming"]);
    developer.update_metadata("team", "catalogue");
    prototypes.register("developer", developer);
    let shallow = prototypes.get("developer")?;
    shallow.add_hobby("chess");
    let deep = prototypes.get_deep("developer")?.clone_with(PersonOverrides {
        name: Some("Petr".to_string()),
        age: Some(25),
    });
    deep.add_hobby("hiking");

    if json_output {
        report_ok(
            json_output,
            serde_json::json!({
                "tolstoy_books": tolstoy.len(),
                "borrowed_books": borrowed.len(),
                "books": lib.records(EntityKind::Books).iter().map(Record::as_object).collect::<Vec<_>>(),
                "readers": lib.records(EntityKind::Readers).iter().map(Record::as_object).collect::<Vec<_>>(),
                "prototype": prototypes.get("developer")?.to_json(),
                "clone": deep.to_json(),
                "light_on": light.is_on(),
            }),
            start,
        )?;
    } else {
        println!();
        println!("Books by Leo Tolstoy: {}", tolstoy.len());
        println!("Borrowed books:       {}", borrowed.len());
        println!("Prototype:            {}", prototypes.get("developer")?);
        println!("Deep clone:           {deep}");
        println!("Light on after undo:  {}", light.is_on());
        println!("Exports written to {}", export_dir.display());
    }
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn setup_tracing(level: &str, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Library wired from config with the saved snapshot applied.
fn open_library(config: &AppConfig) -> Result<LibraryFacade> {
    let mut lib = LibraryFacade::from_config(config)?;
    if lib.load_state()? == LoadOutcome::NoSavedState {
        tracing::info!(path = %lib.state_path().display(), "starting with an empty library");
    }
    Ok(lib)
}

fn parse_condition(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(field, value)| (field.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn report_ok(json_output: bool, data: serde_json::Value, start: Instant) -> Result<()> {
    if json_output {
        let dur = start.elapsed().as_millis();
        print_json(&serde_json::json!({"status":"ok","data":data,"meta":{"duration_ms":dur}}))?;
    }
    Ok(())
}

fn report_record(json_output: bool, record: &Record, start: Instant) -> Result<()> {
    if json_output {
        report_ok(json_output, serde_json::to_value(record.as_object())?, start)
    } else {
        println!("{}", format_record(record));
        Ok(())
    }
}

fn print_records(json_output: bool, records: &[Record], start: Instant) -> Result<()> {
    if json_output {
        let items: Vec<_> = records.iter().map(Record::as_object).collect();
        return report_ok(
            json_output,
            serde_json::json!({"items":items,"total":records.len()}),
            start,
        );
    }
    for record in records {
        println!("{}", format_record(record));
    }
    Ok(())
}

fn format_record(record: &Record) -> String {
    record
        .fields()
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Report a refused operation and exit with `code`.
fn fail(json_output: bool, code: ExitCode, error: &str, message: &str, start: Instant) -> Result<()> {
    if json_output {
        let dur = start.elapsed().as_millis();
        print_json(&serde_json::json!({
            "status":"error","error":error,"message":message,"meta":{"duration_ms":dur}
        }))?;
    } else {
        eprintln!("{message}");
    }
    std::process::exit(code as i32);
}
