//! `handbook` - CLI for the terminal handbook
//!
//! This binary opens handbooks in the terminal reader and manages their
//! saved checklists.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;
use std::time::Instant;

use clap::Parser;

use handbook::checklist::scope_for_path;
use handbook::cli::{ChecklistCommand, Cli, Command, ConfigCommand};
use handbook::platform::Capabilities;
use handbook::{
    init_logging, tui, Checklist, ChecklistStore, Config, Error, Handbook, HandbookController,
    Settings, Storage,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // The reader owns the terminal, so it logs to a file.
    let log_file = matches!(cli.command, Command::Read(_)).then(|| config.log_file_path());
    init_logging(cli.verbosity(), log_file.as_deref())?;

    // Execute the command
    match cli.command {
        Command::Read(args) => handle_read(&config, &args.file),
        Command::Render(args) => handle_render(&config, &args.file),
        Command::Checklist(cmd) => handle_checklist(&config, cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Open a handbook and its checklist store.
fn open_handbook<'a>(
    storage: &'a Storage,
    file: &Path,
) -> Result<(Handbook, ChecklistStore<&'a Storage>), Error> {
    let handbook = Handbook::load(file)?;
    let scope = scope_for_path(file)?;
    Ok((handbook, ChecklistStore::new(storage, scope)))
}

fn handle_read(config: &Config, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::open(config.database_path())?;
    let (handbook, store) = open_handbook(&storage, file)?;
    let mut controller = HandbookController::new(
        handbook,
        store,
        Capabilities::system(config),
        Settings::from_config(config),
        Instant::now(),
    )?;

    tui::run(&mut controller, config.navigation.swipe_threshold)?;
    Ok(())
}

fn handle_render(config: &Config, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::open(config.database_path())?;
    let (handbook, store) = open_handbook(&storage, file)?;
    let saved = store.load().unwrap_or_default();
    let checklist = Checklist::with_saved(handbook.entries().len(), &saved);

    print!("{}", handbook.render_plain(checklist.states()));
    Ok(())
}

fn handle_checklist(
    config: &Config,
    cmd: ChecklistCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::open(config.database_path())?;

    match cmd {
        ChecklistCommand::Show { file, json } => {
            let (handbook, store) = open_handbook(&storage, &file)?;
            let saved = store.load().unwrap_or_default();
            let checklist = Checklist::with_saved(handbook.entries().len(), &saved);

            if json {
                let entries: Vec<_> = handbook
                    .entries()
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| {
                        serde_json::json!({
                            "number": index + 1,
                            "label": entry.label,
                            "page": entry.page + 1,
                            "checked": checklist.is_checked(index),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if handbook.entries().is_empty() {
                println!("No checklist entries in {}", file.display());
            } else {
                for (index, entry) in handbook.entries().iter().enumerate() {
                    let mark = if checklist.is_checked(index) { "x" } else { " " };
                    println!(
                        "{:>3}. [{mark}] {}  (page {})",
                        index + 1,
                        entry.label,
                        entry.page + 1
                    );
                }
                println!();
                println!("{}/{} checked", checklist.checked_count(), checklist.len());
            }
        }
        ChecklistCommand::Check { file, number } => {
            set_entry(config, &storage, &file, number, true)?;
        }
        ChecklistCommand::Uncheck { file, number } => {
            set_entry(config, &storage, &file, number, false)?;
        }
        ChecklistCommand::Reset { file, yes } => {
            let scope = scope_for_path(&file)?;
            if yes {
                let existed = ChecklistStore::new(&storage, scope).reset()?;
                if existed {
                    println!("Saved checklist for {} cleared.", file.display());
                } else {
                    println!("No saved checklist for {}.", file.display());
                }
            } else {
                println!("This will forget every checked entry of {}.", file.display());
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

/// Check or uncheck entry `number` (1-based) through the controller, so it
/// persists exactly like a toggle in the reader.
fn set_entry(
    config: &Config,
    storage: &Storage,
    file: &Path,
    number: usize,
    checked: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (handbook, store) = open_handbook(storage, file)?;
    let total = handbook.entries().len();
    let now = Instant::now();
    let mut controller = HandbookController::new(
        handbook,
        store,
        Capabilities::unavailable(),
        Settings::from_config(config),
        now,
    )?;

    let index = number - 1;
    let changed = controller
        .set_entry(index, checked, now)
        .ok_or(Error::NoSuchEntry { number, total })?;
    let label = &controller.handbook().entries()[index].label;
    let state = if checked { "checked" } else { "unchecked" };
    if changed {
        println!("{number}. {label}: {state}");
    } else {
        println!("{number}. {label}: already {state}");
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::open(config.database_path())?;
    let stats = storage.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "total_records": stats.total_records,
            "total_scopes": stats.total_scopes,
            "last_updated": stats.last_updated,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("handbook status");
        println!("---------------");
        println!("Database:      {}", storage.path().display());
        println!("Handbooks:     {}", stats.total_scopes);
        println!("Records:       {}", stats.total_records);
        match stats.last_updated {
            Some(at) => println!("Last updated:  {}", at.to_rfc3339()),
            None => println!("Last updated:  never"),
        }
        println!("Size:          {} bytes", stats.db_size_bytes);
        for scope in storage.scopes()? {
            let records = storage.records_in_scope(&scope)?;
            match records.iter().map(|record| record.updated_at).max() {
                Some(at) => println!("  {scope}  (updated {})", at.format("%Y-%m-%d %H:%M")),
                None => println!("  {scope}"),
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Navigation]");
                println!("  Settle (ms):        {}", config.navigation.settle_ms);
                println!("  Swipe threshold:    {}", config.navigation.swipe_threshold);
                println!();
                println!("[Feedback]");
                println!("  Sound:              {}", config.feedback.sound_enabled);
                println!("  Copied label:       {}", config.feedback.copied_label);
                println!("  Copied label (ms):  {}", config.feedback.copied_label_ms);
                println!("  Checkmark (ms):     {}", config.feedback.checkmark_ms);
                println!();
                println!("[Print]");
                println!(
                    "  Command:            {} {}",
                    config.print.command,
                    config.print.args.join(" ")
                );
                println!();
                println!("[Logging]");
                println!("  Reader log file:    {}", config.log_file_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
