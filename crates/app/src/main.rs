use std::fmt;
use std::io::{self, BufRead, Write};

use quest_core::fixtures::demo_courses;
use quest_core::model::{Account, DataMode, LoginDraft, RegistrationDraft};
use quest_core::CurrentQuestion;
use services::{AppServices, ClientConfig, QuizRunner};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_DB_URL: &str = "sqlite:quest.sqlite3?mode=rwc";
const DEFAULT_COURSE: &str = "irrigation_mastery";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [--db <sqlite_url>] [--api <base_url>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  login    --email <email> --password <password>");
    eprintln!("  register --name <name> --email <email> --password <password>");
    eprintln!("           [--phone <phone>] [--location <location>] [--farm-size <size>]");
    eprintln!("  me       show the signed-in profile (demo profile when signed out)");
    eprintln!("  logout   forget the stored session");
    eprintln!("  quiz     [--course <id>]  take a demo quiz (default {DEFAULT_COURSE})");
    eprintln!("  help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUEST_DB_URL, QUEST_API_BASE_URL, RUST_LOG");
}

#[derive(Debug)]
enum Command {
    Login(LoginDraft),
    Register(RegistrationDraft),
    Me,
    Logout,
    Quiz { course_id: String },
    Help,
}

struct Args {
    db_url: String,
    api_base_url: Option<String>,
    command: Command,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        let mut db_url = std::env::var("QUEST_DB_URL").unwrap_or_else(|_| DEFAULT_DB_URL.into());
        let mut api_base_url = None;

        let command = loop {
            let Some(arg) = args.next() else {
                break Command::Help;
            };
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--api" => api_base_url = Some(require_value(&mut args, "--api")?),
                "help" | "--help" | "-h" => break Command::Help,
                "login" => break parse_login(&mut args)?,
                "register" => break parse_register(&mut args)?,
                "me" => break no_flags(&mut args, Command::Me)?,
                "logout" => break no_flags(&mut args, Command::Logout)?,
                "quiz" => break parse_quiz(&mut args)?,
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => return Err(ArgsError::UnknownCommand(arg)),
            }
        };

        Ok(Self {
            db_url: normalize_sqlite_url(db_url),
            api_base_url,
            command,
        })
    }
}

fn no_flags(args: &mut impl Iterator<Item = String>, command: Command) -> Result<Command, ArgsError> {
    match args.next() {
        Some(arg) => Err(ArgsError::UnknownArg(arg)),
        None => Ok(command),
    }
}

fn parse_login(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut email = None;
    let mut password = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--email" => email = Some(require_value(args, "--email")?),
            "--password" => password = Some(require_value(args, "--password")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Login(LoginDraft::new(
        email.ok_or(ArgsError::MissingFlag { flag: "--email" })?,
        password.ok_or(ArgsError::MissingFlag { flag: "--password" })?,
    )))
}

fn parse_register(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut draft = RegistrationDraft::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--name" => draft.name = require_value(args, "--name")?,
            "--email" => draft.email = require_value(args, "--email")?,
            "--password" => draft.password = require_value(args, "--password")?,
            "--phone" => draft.phone = require_value(args, "--phone")?,
            "--location" => draft.location = require_value(args, "--location")?,
            "--farm-size" => draft.farm_size = require_value(args, "--farm-size")?,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Register(draft))
}

fn parse_quiz(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut course_id = DEFAULT_COURSE.to_owned();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--course" => course_id = require_value(args, "--course")?,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Quiz { course_id })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw.starts_with("sqlite::memory:") || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let (path_str, query) = match path_str.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path_str, None),
    };
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url.starts_with("sqlite::memory:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn print_account(account: &Account) -> Result<(), Box<dyn std::error::Error>> {
    let mode = match account.mode() {
        DataMode::Authenticated => "signed in",
        DataMode::Demo => "demo mode",
    };
    println!("{mode}: {}", account.user().name);
    println!("{}", serde_json::to_string_pretty(account.user())?);
    Ok(())
}

/// Walk the demo quiz for `course_id` on stdin/stdout.
fn run_quiz(course_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let courses = demo_courses();
    let mut runner = QuizRunner::start_demo(course_id, &courses)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    loop {
        let (index, prompt, options) = match runner.current()? {
            CurrentQuestion::Active { index, question } => {
                (index, question.prompt.clone(), question.options.clone())
            }
            CurrentQuestion::Completed => break,
        };
        let progress = runner.progress();
        println!();
        println!("Question {}/{}: {prompt}", index + 1, progress.total);
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }

        let choice = loop {
            print!("answer> ");
            stdout.flush()?;
            let Some(line) = lines.next().transpose()? else {
                println!();
                println!("quiz abandoned");
                return Ok(());
            };
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => break n - 1,
                _ => println!("enter a number from 1 to {}", options.len()),
            }
        };

        let feedback = runner.answer(choice)?;
        if feedback.is_correct {
            println!("Correct!");
        } else {
            println!(
                "Not quite. The answer is {}.",
                feedback.correct_index + 1
            );
        }
        if !feedback.explanation.is_empty() {
            println!("{}", feedback.explanation);
        }
        runner.next()?;
    }

    let completion = runner.finish()?;
    let outcome = completion.outcome;
    println!();
    println!(
        "Score: {}/{} ({}%) {}",
        outcome.score,
        outcome.total,
        outcome.percentage,
        if outcome.is_passing() { "passed" } else { "keep practicing" }
    );
    if let Some(course) = completion.course {
        println!(
            "{}: {}% complete, {}/{} lessons",
            course.title, course.progress, course.completed, course.lessons
        );
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).inspect_err(|_| print_usage())?;

    match parsed.command {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Quiz { course_id } => return run_quiz(&course_id),
        _ => {}
    }

    let config = match parsed.api_base_url {
        Some(url) => ClientConfig::new(url)?,
        None => ClientConfig::from_env()?,
    };
    prepare_sqlite_file(&parsed.db_url)?;
    debug!(db_url = %parsed.db_url, api = %config.base_url, "opening services");
    let app = AppServices::new_sqlite(&parsed.db_url, &config).await?;
    let auth = app.auth();

    match parsed.command {
        Command::Login(draft) => {
            let account = auth.login(draft).await?;
            print_account(&account)?;
        }
        Command::Register(draft) => {
            let account = auth.register(draft).await?;
            print_account(&account)?;
        }
        Command::Me => {
            let account = auth.resume().await;
            print_account(&account)?;
        }
        Command::Logout => {
            auth.logout().await;
            println!("signed out");
        }
        Command::Help | Command::Quiz { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn parses_global_flags_before_command() {
        let parsed = Args::parse(args(&[
            "--db",
            "sqlite::memory:",
            "--api",
            "http://api.test",
            "me",
        ]))
        .unwrap();
        assert_eq!(parsed.db_url, "sqlite::memory:");
        assert_eq!(parsed.api_base_url.as_deref(), Some("http://api.test"));
        assert!(matches!(parsed.command, Command::Me));
    }

    #[test]
    fn login_requires_email_and_password() {
        let err = Args::parse(args(&["login", "--email", "a@b.com"])).err().unwrap();
        assert!(matches!(err, ArgsError::MissingFlag { flag: "--password" }));

        let parsed =
            Args::parse(args(&["login", "--email", "a@b.com", "--password", "Secret123"]))
                .unwrap();
        assert!(matches!(parsed.command, Command::Login(_)));
    }

    #[test]
    fn register_collects_optional_fields() {
        let parsed = Args::parse(args(&[
            "register", "--name", "Asha", "--email", "a@b.com", "--password", "Secret123",
            "--farm-size", "5 acres",
        ]))
        .unwrap();
        let Command::Register(draft) = parsed.command else {
            panic!("expected register");
        };
        assert_eq!(draft.name, "Asha");
        assert_eq!(draft.farm_size, "5 acres");
        assert!(draft.phone.is_empty());
    }

    #[test]
    fn quiz_defaults_to_irrigation_course() {
        let parsed = Args::parse(args(&["quiz"])).unwrap();
        assert!(matches!(parsed.command, Command::Quiz { ref course_id } if course_id == DEFAULT_COURSE));
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(matches!(
            Args::parse(args(&["dance"])).err().unwrap(),
            ArgsError::UnknownCommand(_)
        ));
        assert!(matches!(
            Args::parse(args(&["me", "--verbose"])).err().unwrap(),
            ArgsError::UnknownArg(_)
        ));
        assert!(matches!(
            Args::parse(args(&["--db"])).err().unwrap(),
            ArgsError::MissingValue { flag: "--db" }
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:quest.sqlite3?mode=rwc".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("quest.sqlite3?mode=rwc"));
    }
}
