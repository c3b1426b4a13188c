use chrono::Local;
use clap::Parser;
use polars::prelude::{AnyValue, DataFrame};
use stair_rota::{
    JsonFileStore, MemoryStateStore, Rota, ScheduleStore, StateDefaults, StateStore, WeekKey,
    save_rota_to_csv,
};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cli", version, about = "Stair cleaning rota")]
struct Cli {
    /// Keep the state in this JSON file
    #[arg(long, conflicts_with = "db")]
    state: Option<PathBuf>,
    /// Keep the state in this SQLite database
    #[arg(long)]
    db: Option<PathBuf>,
    /// JSON file with default year, neighbors and address
    #[arg(long)]
    config: Option<PathBuf>,
}

type Backend = Box<dyn StateStore>;

fn open_backend(cli: &Cli, defaults: &StateDefaults) -> Result<Backend, Box<dyn Error>> {
    if let Some(path) = &cli.state {
        return Ok(Box::new(JsonFileStore::new(path)));
    }
    if let Some(path) = &cli.db {
        #[cfg(feature = "sqlite")]
        {
            let store = stair_rota::SqliteStateStore::new(path, defaults.storage_key.as_str())?;
            return Ok(Box::new(store));
        }
        #[cfg(not(feature = "sqlite"))]
        {
            let _ = defaults;
            return Err(format!(
                "cannot open {}: rebuild with the `sqlite` feature",
                path.display()
            )
            .into());
        }
    }
    Ok(Box::new(MemoryStateStore::new()))
}

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Boolean(true) => "*".to_string(),
        AnyValue::Boolean(false) => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| {
                col.get(row_idx)
                    .map(|av| cell_text(&av))
                    .unwrap_or_default()
            })
            .collect();
        rows.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &rows {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (ci, s) in cells.iter().enumerate() {
            let pad = widths[ci].saturating_sub(s.chars().count());
            line.push(' ');
            line.push_str(s);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                       Show this help\n  show                       Show the rota of the active year\n  neighbors                  List the rotation order\n  year <n>                   Switch to year n\n  prev | next                Switch to the previous/next year\n  add                        Append a neighbor\n  remove <n>                 Remove neighbor at position n\n  rename <n> <name...>       Rename neighbor at position n\n  assign <week> <name...>    Assign a week to a name\n  unassign <week>            Return a week to the rotation\n  address <text...>          Set the address (blank resets it)\n  export <csv_path>          Write the rota to CSV\n  quit|exit                  Exit"
    );
}

fn print_neighbors<S: StateStore>(store: &ScheduleStore<S>) {
    for (idx, name) in store.state().neighbors.iter().enumerate() {
        println!("  {}. {}", idx + 1, name);
    }
}

fn print_rota<S: StateStore>(store: &ScheduleStore<S>) {
    let state = store.state();
    let rota = store.rota(Local::now().date_naive());
    println!("Rota {} - {}", state.year, state.address);
    match rota.banner() {
        Some(banner) => println!("{banner}"),
        None => println!("No current week in {}.", state.year),
    }
    match rota.to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error: {}", e),
    }
}

/// 1-based position from user input.
fn parse_position(input: Option<&str>) -> Option<usize> {
    input
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
}

fn parse_week(input: Option<&str>, rota: &Rota) -> Result<u32, String> {
    let week: u32 = input
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| "Invalid week".to_string())?;
    if rota.cell(week).is_none() {
        return Err(format!("Week {} is not in {}.", week, rota.year));
    }
    Ok(week)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let defaults = match &cli.config {
        Some(path) => match StateDefaults::from_json_file(path) {
            Ok(defaults) => defaults,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => StateDefaults::default(),
    };
    let backend = match open_backend(&cli, &defaults) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let mut store = ScheduleStore::open(backend, defaults);

    println!("Stair rota (CLI) - type 'help' for commands\n");
    print_rota(&store);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        if let Err(err) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", err);
            break;
        }
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_rota(&store),
            "neighbors" => print_neighbors(&store),
            "year" => match parts.next().map(str::parse::<i32>) {
                Some(Ok(year)) => match store.set_year(year) {
                    Ok(()) => print_rota(&store),
                    Err(e) => println!("Error: {}", e),
                },
                Some(Err(_)) => println!("Invalid year"),
                None => println!("Usage: year <n>"),
            },
            "prev" | "next" => {
                let res = if cmd == "prev" {
                    store.previous_year()
                } else {
                    store.next_year()
                };
                match res {
                    Ok(_) => print_rota(&store),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "add" => match store.add_neighbor() {
                Ok(name) => {
                    println!("Added neighbor {name}.");
                    print_neighbors(&store);
                }
                Err(e) => println!("Error: {}", e),
            },
            "remove" => match parse_position(parts.next()) {
                Some(idx) => match store.remove_neighbor(idx) {
                    Ok(name) => {
                        println!("Removed neighbor {name}.");
                        print_neighbors(&store);
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: remove <n>"),
            },
            "rename" => {
                let idx = parse_position(parts.next());
                let name = parts.collect::<Vec<_>>().join(" ");
                match idx {
                    Some(idx) => match store.rename_neighbor(idx, &name) {
                        Ok(()) => print_neighbors(&store),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: rename <n> <name...>"),
                }
            }
            "assign" => {
                let rota = store.rota(Local::now().date_naive());
                let week = match parse_week(parts.next(), &rota) {
                    Ok(week) => week,
                    Err(msg) => {
                        println!("{msg}");
                        continue;
                    }
                };
                let name = parts.collect::<Vec<_>>().join(" ");
                let key = WeekKey::new(rota.year, week);
                match store.set_override(key, &name) {
                    Ok(()) => println!("Week {} assigned to {}.", week, name.trim()),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "unassign" => {
                let rota = store.rota(Local::now().date_naive());
                match parse_week(parts.next(), &rota) {
                    Ok(week) => match store.clear_override(WeekKey::new(rota.year, week)) {
                        Ok(Some(_)) => println!("Week {week} follows the rotation again."),
                        Ok(None) => println!("Week {week} has no assignment."),
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(msg) => println!("{msg}"),
                }
            }
            "address" => {
                let text = parts.collect::<Vec<_>>().join(" ");
                match store.set_address(&text) {
                    Ok(()) => println!("Address: {}", store.state().address),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "export" => match parts.next() {
                Some(path) => {
                    let rota = store.rota(Local::now().date_naive());
                    match save_rota_to_csv(&rota, path) {
                        Ok(()) => println!("Rota written to {path}."),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                None => println!("Usage: export <csv_path>"),
            },
            _ => println!("Unknown command '{cmd}'. Type 'help'."),
        }
    }
}
