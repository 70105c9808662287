use std::fs;

use crate::catalog::{ingest, visible, FilterCriteria, NationFilter, UnitCatalog};
use crate::config::AppConfig;
use crate::roster::export::exporter_for;
use crate::roster::{FileStore, RosterManager, RosterStore, StoreError};
use crate::server;
use crate::session::{Session, NO_SAVED_ROSTER};

const USAGE: &str = "usage: muster <serve|catalog|nations|build|show|export>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Catalog,
    Nations,
    Build,
    Show,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("catalog") => Some(Command::Catalog),
        Some("nations") => Some(Command::Nations),
        Some("build") => Some(Command::Build),
        Some("show") => Some(Command::Show),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    match command {
        Command::Serve => handle_serve(&config),
        Command::Catalog => handle_catalog(args, &config),
        Command::Nations => handle_nations(args),
        Command::Build => handle_build(args, &config),
        Command::Show => handle_show(&config),
        Command::Export => handle_export(args, &config),
    }
}

/// Read and ingest a unit table; failures are reported on stderr.
fn load_catalog(path: &str) -> Option<UnitCatalog> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("failed to read unit table '{path}': {err}");
            return None;
        }
    };
    match ingest(&raw) {
        Ok(catalog) => Some(catalog),
        Err(err) => {
            eprintln!("failed to load unit table '{path}': {err}");
            None
        }
    }
}

fn handle_serve(config: &AppConfig) -> i32 {
    let mut session = Session::new(Box::new(FileStore::new(&config.roster_path)), config.budget);
    if let Some(path) = &config.catalog_path {
        match load_catalog(&path.to_string_lossy()) {
            Some(catalog) => session.install_catalog(catalog),
            None => return 1,
        }
    }
    match server::run_server(&config.bind, session) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

/// Value following `flag`, e.g. `--nation USA`.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(String::as_str)
}

/// Positional arguments after the command, skipping flags and flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    const VALUE_FLAGS: &[&str] = &["--nation", "--budget"];
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args.iter().skip(2) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

fn parse_budget(raw: Option<&str>, default: u32) -> Option<u32> {
    match raw {
        None => Some(default),
        Some(value) => match value.trim().parse::<u32>() {
            Ok(budget) => Some(budget),
            Err(_) => {
                eprintln!("invalid budget '{value}'");
                None
            }
        },
    }
}

fn handle_catalog(args: &[String], config: &AppConfig) -> i32 {
    let positional = positionals(args);
    let Some(path) = positional.first() else {
        eprintln!("usage: muster catalog <file> [search] [--nation N] [--budget B] [--table]");
        return 2;
    };
    let Some(budget) = parse_budget(flag_value(args, "--budget"), config.budget) else {
        return 2;
    };
    let Some(catalog) = load_catalog(path) else {
        return 1;
    };

    let criteria = FilterCriteria {
        search: positional.get(1).copied().unwrap_or("").to_string(),
        nation: flag_value(args, "--nation")
            .map(|n| n.parse().unwrap_or_default())
            .unwrap_or(NationFilter::All),
        budget,
        roster_total: 0,
    };
    let units = visible(&catalog, &criteria);

    if args.iter().any(|arg| arg == "--table") {
        println!("id\tname\tnation\tpoints");
        for unit in units {
            println!("{}\t{}\t{}\t{}", unit.id, unit.name, unit.nation, unit.points);
        }
        return 0;
    }
    match serde_json::to_string_pretty(&units) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize catalog: {err}");
            1
        }
    }
}

fn handle_nations(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: muster nations <file>");
        return 2;
    };
    let Some(catalog) = load_catalog(path) else {
        return 1;
    };
    for nation in catalog.nations() {
        println!("{nation}");
    }
    0
}

fn handle_build(args: &[String], config: &AppConfig) -> i32 {
    let positional = positionals(args);
    if positional.len() < 3 {
        eprintln!("usage: muster build <file> <budget> <unit name>... [--save]");
        return 2;
    }
    let Some(budget) = parse_budget(Some(positional[1]), config.budget) else {
        return 2;
    };
    let Some(catalog) = load_catalog(positional[0]) else {
        return 1;
    };

    let mut roster = RosterManager::new();
    for name in &positional[2..] {
        let Some(unit) = catalog.find_by_name(name) else {
            eprintln!("unknown unit '{name}'");
            continue;
        };
        if let Err(err) = roster.add(unit.clone(), budget) {
            eprintln!("rejected: {err}");
        }
    }

    if args.iter().any(|arg| arg == "--save") {
        let mut store = FileStore::new(&config.roster_path);
        if let Err(err) = store.save(roster.selected()) {
            eprintln!("failed to save roster: {err}");
            return 1;
        }
    }

    match serde_json::to_string_pretty(&roster.snapshot()) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize roster: {err}");
            1
        }
    }
}

/// Saved roster from the configured slot; `None` (with a message) when absent or corrupt.
fn load_saved(config: &AppConfig) -> Result<Option<RosterManager>, StoreError> {
    let store = FileStore::new(&config.roster_path);
    match store.load() {
        Ok(Some(units)) => match RosterManager::from_units(units) {
            Ok(roster) => Ok(Some(roster)),
            Err(err) => {
                eprintln!("{NO_SAVED_ROSTER} (saved data is corrupt: {err})");
                Ok(None)
            }
        },
        Ok(None) => {
            eprintln!("{NO_SAVED_ROSTER}");
            Ok(None)
        }
        Err(StoreError::Corrupt(err)) => {
            eprintln!("{NO_SAVED_ROSTER} (saved data is corrupt: {err})");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn handle_show(config: &AppConfig) -> i32 {
    let roster = match load_saved(config) {
        Ok(Some(roster)) => roster,
        Ok(None) => return 0,
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            return 1;
        }
    };
    match serde_json::to_string_pretty(&roster.snapshot()) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize roster: {err}");
            1
        }
    }
}

fn handle_export(args: &[String], config: &AppConfig) -> i32 {
    let format = args.get(2).map(String::as_str).unwrap_or("text");
    let Some(exporter) = exporter_for(format) else {
        eprintln!("usage: muster export [csv|text]");
        return 2;
    };
    let roster = match load_saved(config) {
        Ok(Some(roster)) => roster,
        Ok(None) => RosterManager::new(),
        Err(err) => {
            eprintln!("failed to load roster: {err}");
            return 1;
        }
    };
    match exporter.export(roster.selected(), roster.total()) {
        Ok(document) => {
            print!("{document}");
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}
