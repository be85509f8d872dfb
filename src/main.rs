//! Command-line access to table files: create, inspect and export.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use nltable::config::Settings;
use nltable::io::export::{export, export_file_name, ExportType};
use nltable::io::host::{create_table_file, load_table, FsHost};
use nltable::state::display_name;
use nltable::state::table_state::TableState;
use nltable::state::view::ViewOptions;

#[derive(Parser)]
#[command(name = "nltable", version, about = "Create, view and export table files")]
struct Cli {
    /// Directory table paths are resolved against.
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Settings file (JSON). Missing files fall back to defaults.
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new 1x1 table file in the configured folder.
    New {
        /// Name of the active note, used with timestamped file names.
        #[arg(long)]
        note: Option<String>,
    },
    /// Print the filtered and sorted rows as a markdown table.
    View {
        path: String,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List columns with their type, sort, footer function and filter rules.
    Columns { path: String },
    /// Export the filtered and sorted rows.
    Export {
        path: String,
        #[arg(long, value_enum, default_value = "csv")]
        format: FormatArg,
        /// Write into this directory instead of stdout.
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Markdown,
}

impl From<FormatArg> for ExportType {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => ExportType::Csv,
            FormatArg::Markdown => ExportType::Markdown,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let host = FsHost::new(&cli.vault);

    match cli.command {
        Command::New { note } => {
            let options = settings.create_options(note);
            let path = create_table_file(&host, &options, Local::now().fixed_offset())?;
            println!("{path}");
        }
        Command::View { path, search } => {
            let state = open(&host, &path, &settings)?;
            let rows = state.visible_row_ids(&ViewOptions::with_search(search));
            print!("{}", export(state.model(), &rows, ExportType::Markdown)?);
        }
        Command::Columns { path } => {
            let state = open(&host, &path, &settings)?;
            let model = state.model();
            for column in &model.columns {
                let hidden = if column.is_visible { "" } else { " (hidden)" };
                println!(
                    "{}{hidden}: {}, sort {}, footer {}",
                    model.column_name(&column.id)?,
                    display_name::cell_type(column.cell_type),
                    display_name::sort_dir(column.sort_dir),
                    display_name::function_type(column.function_type),
                );
                for rule in model.filter_rules.iter().filter(|r| r.column_id == column.id) {
                    let disabled = if rule.is_enabled { "" } else { " (disabled)" };
                    println!("  filter {} {:?}{disabled}", display_name::filter_type(rule.filter_type), rule.text);
                }
            }
        }
        Command::Export {
            path,
            format,
            out_dir,
        } => {
            let state = open(&host, &path, &settings)?;
            let rows = state.visible_row_ids(&ViewOptions::default());
            let export_type = ExportType::from(format);
            let content = export(state.model(), &rows, export_type)?;
            match out_dir {
                Some(dir) => {
                    let stem = Path::new(&path)
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("table");
                    let name = format!("{}.{}", export_file_name(stem, &Utc::now()), export_type.extension());
                    let target = dir.join(name);
                    std::fs::write(&target, content)?;
                    tracing::info!(path = %target.display(), "exported table");
                    println!("{}", target.display());
                }
                None => print!("{content}"),
            }
        }
    }
    Ok(())
}

fn open(host: &FsHost, path: &str, settings: &Settings) -> Result<TableState, Box<dyn std::error::Error>> {
    let document = load_table(host, path)?;
    Ok(TableState::new(document, settings.store_context()))
}
