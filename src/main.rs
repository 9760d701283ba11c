//! lcat - command-line tool for Qt Linguist translation catalogs
//!
//! Entry point for the binary. Handles CLI argument parsing, logging
//! initialization and command dispatch.

use anyhow::{Context as _, Result};
use linguist_catalog::catalog::{fill_args, has_errors, validate, CoverageReport};
use linguist_catalog::extract::{self, MergeOptions};
use linguist_catalog::utils::path::{expand_tilde, guess_language};
use linguist_catalog::{ts, AppError, Catalog, Config, Translator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Application name for logging
const APP_NAME: &str = "lcat";

/// What the user asked for
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Version,
    Lookup {
        file: PathBuf,
        context: String,
        source: String,
        comment: Option<String>,
        count: Option<i64>,
        args: Vec<String>,
    },
    Check {
        file: PathBuf,
    },
    Stats {
        file: PathBuf,
    },
    Fmt {
        file: PathBuf,
        output: Option<PathBuf>,
    },
    Update {
        file: PathBuf,
        sources: Vec<PathBuf>,
        no_obsolete: bool,
        language: Option<String>,
    },
}

/// Parsed command line
#[derive(Debug, PartialEq)]
struct Flags {
    config: Option<PathBuf>,
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let flags = match parse_args(&args) {
        Ok(flags) => flags,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Use --help for usage information");
            return ExitCode::from(2);
        }
    };

    match run(flags).await {
        Ok(code) => code,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("Error: {:#}", e);
            if let Some(hint) = user_hint(&e) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

/// Friendly explanation for library errors, when one exists
fn user_hint(error: &anyhow::Error) -> Option<String> {
    match error.downcast_ref::<AppError>()? {
        AppError::FileIO(e) => Some(e.user_message()),
        AppError::Catalog(e) => Some(e.user_message()),
        _ => None,
    }
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn,linguist_catalog=info");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Parse command line arguments (without the program name)
fn parse_args(args: &[String]) -> Result<Flags, String> {
    let mut config = None;
    let mut rest = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                return Ok(Flags {
                    config,
                    command: Command::Help,
                })
            }
            "-v" | "--version" => {
                return Ok(Flags {
                    config,
                    command: Command::Version,
                })
            }
            "--config" if rest.is_empty() => {
                let value = args.get(i + 1).ok_or("--config requires a path argument")?;
                config = Some(expand_tilde(Path::new(value)));
                i += 1;
            }
            _ => rest.push(args[i].clone()),
        }
        i += 1;
    }

    let (name, rest) = rest.split_first().ok_or("No command given")?;
    let command = match name.as_str() {
        "lookup" => parse_lookup(rest)?,
        "check" => Command::Check {
            file: single_file(name, rest)?,
        },
        "stats" => Command::Stats {
            file: single_file(name, rest)?,
        },
        "fmt" => parse_fmt(rest)?,
        "update" => parse_update(rest)?,
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(Flags { config, command })
}

fn parse_lookup(args: &[String]) -> Result<Command, String> {
    let mut positional = Vec::new();
    let mut comment = None;
    let mut count = None;
    let mut values = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--comment" => comment = Some(option_value(args, &mut i)?),
            "-n" => {
                let value = option_value(args, &mut i)?;
                count = Some(
                    value
                        .parse()
                        .map_err(|_| format!("-n expects a number, got {:?}", value))?,
                );
            }
            "--arg" => values.push(option_value(args, &mut i)?),
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("Unknown option: {}", arg))
            }
            _ => positional.push(args[i].clone()),
        }
        i += 1;
    }

    let [file, context, source] = <[String; 3]>::try_from(positional)
        .map_err(|_| "lookup expects FILE CONTEXT SOURCE".to_string())?;
    Ok(Command::Lookup {
        file: expand_tilde(Path::new(&file)),
        context,
        source,
        comment,
        count,
        args: values,
    })
}

fn parse_fmt(args: &[String]) -> Result<Command, String> {
    let mut file = None;
    let mut output = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => output = Some(expand_tilde(Path::new(&option_value(args, &mut i)?))),
            arg if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            arg if file.is_none() => file = Some(expand_tilde(Path::new(arg))),
            arg => return Err(format!("Unexpected argument: {}", arg)),
        }
        i += 1;
    }

    Ok(Command::Fmt {
        file: file.ok_or("fmt expects a FILE")?,
        output,
    })
}

fn parse_update(args: &[String]) -> Result<Command, String> {
    let mut paths = Vec::new();
    let mut no_obsolete = false;
    let mut language = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--no-obsolete" => no_obsolete = true,
            "--language" => language = Some(option_value(args, &mut i)?),
            arg if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            arg => paths.push(expand_tilde(Path::new(arg))),
        }
        i += 1;
    }

    if paths.len() < 2 {
        return Err("update expects FILE SOURCE_DIR...".to_string());
    }
    let file = paths.remove(0);
    Ok(Command::Update {
        file,
        sources: paths,
        no_obsolete,
        language,
    })
}

fn single_file(command: &str, args: &[String]) -> Result<PathBuf, String> {
    match args {
        [file] if !file.starts_with('-') => Ok(expand_tilde(Path::new(file))),
        _ => Err(format!("{} expects a single FILE", command)),
    }
}

/// Value following the option at `i`; advances `i` past it
fn option_value(args: &[String], i: &mut usize) -> Result<String, String> {
    let name = &args[*i];
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} requires a value", name))
}

async fn run(flags: Flags) -> Result<ExitCode> {
    let config = match &flags.command {
        Command::Help => {
            print_help();
            return Ok(ExitCode::SUCCESS);
        }
        Command::Version => {
            print_version();
            return Ok(ExitCode::SUCCESS);
        }
        _ => Config::load(flags.config.as_deref()).context("Failed to load configuration")?,
    };

    match flags.command {
        Command::Help | Command::Version => Ok(ExitCode::SUCCESS),
        Command::Lookup {
            file,
            context,
            source,
            comment,
            count,
            args,
        } => {
            let catalog = load(&file).await?;
            let translator = Translator::with_options(catalog, config.lookup);
            let text = match count {
                Some(n) => translator.translate_n(&context, &source, comment.as_deref(), n),
                None => translator
                    .translate(&context, &source, comment.as_deref())
                    .to_string(),
            };
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            println!("{}", fill_args(&text, &args));
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { file } => {
            let catalog = load(&file).await?;
            let issues = validate(&catalog);
            for issue in &issues {
                println!("{}", issue);
            }
            if has_errors(&issues) {
                return Ok(ExitCode::FAILURE);
            }
            log::info!("{}: {} warnings", file.display(), issues.len());
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats { file } => {
            let catalog = load(&file).await?;
            let report = CoverageReport::new(&catalog);
            let width = report
                .contexts
                .iter()
                .map(|(name, _)| name.chars().count())
                .max()
                .unwrap_or(0)
                .max(5);
            for (name, coverage) in &report.contexts {
                println!("{:<width$}  {}", name, coverage, width = width);
            }
            println!("{:<width$}  {}", "total", report.total, width = width);
            Ok(ExitCode::SUCCESS)
        }
        Command::Fmt { file, output } => {
            let catalog = load(&file).await?;
            let target = output.unwrap_or(file);
            ts::save(&target, &catalog)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Update {
            file,
            sources,
            no_obsolete,
            language,
        } => {
            update(&config, &file, &sources, no_obsolete, language)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn load(file: &Path) -> Result<Catalog> {
    ts::load_async(file)
        .await
        .with_context(|| format!("Failed to load {}", file.display()))
}

/// Re-extract strings from `sources` and merge them into `file`
fn update(
    config: &Config,
    file: &Path,
    sources: &[PathBuf],
    no_obsolete: bool,
    language: Option<String>,
) -> Result<()> {
    let mut existing = if file.exists() {
        ts::load(file).with_context(|| format!("Failed to load {}", file.display()))?
    } else {
        let language = language
            .clone()
            .or_else(|| guess_language(file))
            .context("Cannot tell the target language from the file name, pass --language")?;
        log::info!("Creating {} for {}", file.display(), language);
        let mut catalog = Catalog::new(language);
        catalog.version = config.output.ts_version.clone();
        catalog
    };
    if let Some(language) = language {
        existing.language = Some(language);
    }

    let extracted = extract::extract_dirs(sources, file, &config.extract)
        .context("Failed to extract strings")?;

    let mut options = MergeOptions::from(&config.output);
    if no_obsolete {
        options.keep_obsolete = false;
    }
    let (merged, report) = extract::merge(&existing, &extracted, options);

    ts::save(file, &merged).with_context(|| format!("Failed to write {}", file.display()))?;
    println!("{}: {}", file.display(), report);
    Ok(())
}

/// Print help message
fn print_help() {
    println!(
        r#"lcat - Qt Linguist translation catalog tool

USAGE:
    lcat [--config FILE] <COMMAND> [ARGS...]

COMMANDS:
    lookup FILE CONTEXT SOURCE    Print the translation of SOURCE
        --comment TEXT            Disambiguation comment
        -n COUNT                  Plural count, replaces %n
        --arg VALUE               Fill the next %1..%99 placeholder (repeatable)
    check FILE                    Validate a catalog, exit 1 on errors
    stats FILE                    Show translation coverage per context
    fmt FILE [-o OUT]             Rewrite a catalog in canonical layout
    update FILE SOURCE_DIR...     Extract strings and merge them into FILE
        --no-obsolete             Drop strings no longer in the sources
        --language LANG           Target language for a new catalog

OPTIONS:
    -h, --help          Show this help message
    -v, --version       Show version information
    --config FILE       Read configuration from FILE

EXAMPLES:
    lcat lookup translations/XLSXEditor_zh_CN.ts XLSXEditor Save
    lcat lookup app_zh_CN.ts XLSXEditor "Failed to load image from %1" --arg a.png
    lcat update translations/XLSXEditor_zh_CN.ts src
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_lookup() {
        let flags = parse_args(&args("--config c.json lookup a.ts XLSXEditor Save -n 3 --arg x")).unwrap();
        assert_eq!(flags.config, Some(PathBuf::from("c.json")));
        assert_eq!(
            flags.command,
            Command::Lookup {
                file: PathBuf::from("a.ts"),
                context: "XLSXEditor".to_string(),
                source: "Save".to_string(),
                comment: None,
                count: Some(3),
                args: vec!["x".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_update() {
        let flags = parse_args(&args("update a_de.ts src lib --no-obsolete")).unwrap();
        assert_eq!(
            flags.command,
            Command::Update {
                file: PathBuf::from("a_de.ts"),
                sources: vec![PathBuf::from("src"), PathBuf::from("lib")],
                no_obsolete: true,
                language: None,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&[]).is_err());
        assert!(parse_args(&args("frobnicate")).is_err());
        assert!(parse_args(&args("lookup a.ts XLSXEditor")).is_err());
        assert!(parse_args(&args("lookup a.ts C S -n many")).is_err());
        assert!(parse_args(&args("check")).is_err());
        assert!(parse_args(&args("update a.ts")).is_err());
    }

    #[test]
    fn test_parse_help_and_fmt() {
        assert_eq!(parse_args(&args("stats -h")).unwrap().command, Command::Help);
        assert_eq!(parse_args(&args("-v")).unwrap().command, Command::Version);
        assert_eq!(
            parse_args(&args("fmt a.ts -o b.ts")).unwrap().command,
            Command::Fmt {
                file: PathBuf::from("a.ts"),
                output: Some(PathBuf::from("b.ts")),
            }
        );
    }
}
