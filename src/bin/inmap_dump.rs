use anyhow::{Context as _, Result, bail, format_err};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use indoc::indoc;
use log::{LevelFilter, debug};
use serde::Serialize;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use inmap::rule::parse_event_code;
use inmap::{Context, EvdevSymbols, Entry, Hwdb, Mapping};

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;

/// Searched when no `--hwdb` is given; later directories override earlier ones.
const DEFAULT_HWDB_DIRS: &[&str] = &["/usr/lib/udev/hwdb.d", "/etc/udev/hwdb.d"];

#[derive(Copy, Clone, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Serialize)]
struct TableOutput<'a> {
    event_type: u16,
    name: Option<&'static str>,
    entries: &'a [Entry],
}

#[derive(Serialize)]
struct TranslationOutput<'a> {
    input: &'a str,
    event_type: u16,
    code: u16,
    translated: u16,
}

#[derive(Serialize)]
struct DumpOutput<'a> {
    modalias: &'a str,
    tables: Option<Vec<TableOutput<'a>>>,
    translations: Vec<TranslationOutput<'a>>,
}

struct InmapDump {
    hwdb_paths: Vec<PathBuf>,
    modalias: String,
    translate: Vec<String>,
    output_format: OutputFormat,
    output: Box<dyn Write>,
    verbosity_level: Option<LevelFilter>,
}

impl InmapDump {
    fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let modalias = matches
            .get_one::<String>("MODALIAS")
            .expect("This is a required argument")
            .clone();

        let hwdb_paths = match matches.get_many::<PathBuf>("hwdb") {
            Some(paths) => paths.cloned().collect(),
            None => DEFAULT_HWDB_DIRS
                .iter()
                .map(PathBuf::from)
                .filter(|p| p.is_dir())
                .collect(),
        };

        let output_format = match matches
            .get_one::<String>("output-format")
            .map(String::as_str)
        {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Table,
        };

        let translate = matches
            .get_many::<String>("translate")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            3 => Some(LevelFilter::Trace),
            _ => {
                eprintln!("using more than -vvv does not affect verbosity level");
                Some(LevelFilter::Trace)
            }
        };

        let output: Box<dyn Write> = match matches.get_one::<String>("output-target") {
            Some(path) => {
                let prompt = !matches.get_flag("no-confirm-overwrite");
                Box::new(Self::create_output_file(path, prompt).with_context(|| {
                    format!("An error occurred while creating output file at `{path}`")
                })?)
            }
            None => Box::new(io::stdout()),
        };

        Ok(InmapDump {
            hwdb_paths,
            modalias,
            translate,
            output_format,
            output,
            verbosity_level,
        })
    }

    /// If `prompt` is passed, will display a confirmation prompt before overwriting files.
    fn create_output_file(path: impl AsRef<Path>, prompt: bool) -> Result<File> {
        let p = path.as_ref();

        if p.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                p.display()
            );
        }

        if p.exists() && prompt {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Are you sure you want to override output file at {}",
                    p.display()
                ))
                .default(false)
                .interact()
                .context("Failed to write confirmation prompt to term")?;

            if !confirmed {
                bail!("Cancelled");
            }
        }

        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(File::create(p)?)
    }

    fn load_hwdb(&self) -> Result<Hwdb> {
        let mut hwdb = Hwdb::new();

        for path in &self.hwdb_paths {
            let loaded = if path.is_dir() {
                Hwdb::from_dir(path)
            } else {
                Hwdb::from_path(path)
            }
            .with_context(|| format!("failed to load hwdb from `{}`", path.display()))?;

            debug!("{} records from `{}`", loaded.len(), path.display());
            hwdb.extend(loaded);
        }

        Ok(hwdb)
    }

    /// Main entry point for `InmapDump`
    fn run(&mut self) -> Result<()> {
        self.try_to_initialize_logging();

        let ctx = Arc::new(Context::new().with_database(self.load_hwdb()?));

        let mapping = ctx
            .lookup_by_modalias(&self.modalias)
            .with_context(|| format!("failed to build mapping for `{}`", self.modalias))?;

        let translations = self
            .translate
            .iter()
            .map(|input| -> Result<TranslationOutput<'_>> {
                let (event_type, code) = parse_event_code(input, ctx.symbols())
                    .map_err(|e| format_err!("invalid code `{input}`: {e}"))?;

                Ok(TranslationOutput {
                    input,
                    event_type,
                    code,
                    translated: inmap::translate(mapping.as_deref(), event_type, code),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let output = DumpOutput {
            modalias: &self.modalias,
            tables: mapping.as_deref().map(tables_of),
            translations,
        };

        match self.output_format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.output, &output)?;
                writeln!(self.output)?;
            }
            OutputFormat::Table => write_table(&mut self.output, &output)?,
        }

        Ok(())
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            if let Err(e) = TermLogger::init(
                level,
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ) {
                eprintln!("Failed to initialize logging: {e}");
            }
        }
    }
}

fn tables_of(mapping: &Mapping) -> Vec<TableOutput<'_>> {
    mapping
        .tables()
        .map(|(event_type, table)| TableOutput {
            event_type,
            name: EvdevSymbols::event_type_name(event_type),
            entries: table.entries(),
        })
        .collect()
}

fn write_table(out: &mut dyn Write, output: &DumpOutput<'_>) -> io::Result<()> {
    writeln!(out, "modalias: {}", output.modalias)?;

    match &output.tables {
        None => writeln!(out, "no mapping")?,
        Some(tables) if tables.is_empty() => writeln!(out, "empty mapping")?,
        Some(tables) => {
            for table in tables {
                writeln!(
                    out,
                    "{} ({:#04x})",
                    table.name.unwrap_or("EV_?"),
                    table.event_type
                )?;
                for entry in table.entries {
                    writeln!(out, "  {:#06x} -> {:#06x}", entry.from, entry.to)?;
                }
            }
        }
    }

    for t in &output.translations {
        writeln!(
            out,
            "{}: {:#06x} -> {:#06x}",
            t.input, t.code, t.translated
        )?;
    }

    Ok(())
}

fn main() {
    let matches = Command::new("inmap_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility to inspect input event mappings from udev hwdb sources")
        .arg(
            Arg::new("MODALIAS")
                .required(true)
                .help("Device modalias to look up, e.g. `evdev:input:b0003v046Dp4024e0111`."),
        )
        .arg(
            Arg::new("hwdb")
                .long("hwdb")
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(PathBuf))
                .value_name("PATH")
                .help("hwdb source file or directory of `*.hwdb` files. Can be passed multiple times.")
                .long_help(indoc!(r#"
                    hwdb source file, or directory whose `*.hwdb` files are loaded in lexical order.
                    Can be passed multiple times; later sources override earlier ones.

                    Defaults to the system hwdb source directories that exist:
                        /usr/lib/udev/hwdb.d
                        /etc/udev/hwdb.d
                "#)),
        )
        .arg(
            Arg::new("output-format")
                .short('o')
                .long("format")
                .value_parser(["table", "json"])
                .default_value("table")
                .help("Sets the output format"),
        )
        .arg(
            Arg::new("translate")
                .short('t')
                .long("translate")
                .action(ArgAction::Append)
                .value_name("TYPE_CODE")
                .help("Translate a code through the mapping, e.g. `KEY_UNKNOWN` or `0x1_0xf0`. Can be passed multiple times."),
        )
        .arg(
            Arg::new("output-target")
                .long("output")
                .short('f')
                .value_name("PATH")
                .help(indoc!("
                    Writes output to the file specified instead of stdout, errors will still be printed to stderr.
                    Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`.
                    Will create parent directories if needed.")),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help("When set, will not ask for confirmation before overwriting files, useful for automation"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("-v - info, -vv - debug, -vvv - trace."),
        )
        .get_matches();

    let result = InmapDump::from_cli_matches(&matches).and_then(|mut app| app.run());

    if let Err(e) = result {
        eprintln!("{e:#}");
        exit(1)
    }
}
