//! Application run modes: logger init, single prompt, interactive chat, subcommands.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::cli::{self, Args, Commands, HistorySubcommand};
use crate::core;
use crate::core::attachments::{self, AttachReport};
use crate::core::config::{Config, LocalSettings};
use crate::core::emit::Emitter;
use crate::core::history::HistoryStore;
use crate::core::llm::{ChatError, ChatSession};
use crate::core::message::Role;
use crate::core::session::SessionContext;
use crate::core::transcribe::Transcriber;
use crate::core::util::human_size;
use crate::repl::ReplOptions;
use crate::repl::term::{FinalOnlySink, TerminalSink};

/// Max chars of the first user message used as a conversation title.
pub const TITLE_PREVIEW_MAX_LEN: usize = 50;

/// Initialize env_logger. In interactive mode, writes to file so the typing effect stays clean.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if !args.is_single_prompt() && args.command.is_none() {
        let log_path = core::paths::cache_dir().and_then(|d| {
            std::fs::create_dir_all(&d).ok()?;
            Some(d.join(format!("{}.log", core::app::NAME)))
        });
        if let Some(path) = log_path
            && let Ok(file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
        {
            logger.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    let _ = logger.try_init();
}

/// Typing pace from flags, falling back to the configured delay.
pub fn emitter_for(args: &Args, configured: std::time::Duration) -> Emitter {
    if args.no_typing {
        return Emitter::instant();
    }
    match args.typing_delay_ms {
        Some(ms) => Emitter::new(std::time::Duration::from_millis(ms)),
        None => Emitter::new(configured),
    }
}

/// Print which files were attached and which were excluded.
pub fn print_attach_report(report: &AttachReport) {
    for a in &report.accepted {
        println!(
            "Attached {} ({}, {})",
            a.name,
            a.mime_type,
            human_size(a.bytes.len() as u64)
        );
    }
    if let Some(warning) = attachments::rejection_warning(&report.rejected) {
        eprintln!("Warning: {}", warning);
    }
    for (name, reason) in &report.unreadable {
        eprintln!("Warning: could not read {}: {}", name, reason);
    }
}

/// Print a failed request with the matching follow-up advice.
pub fn print_chat_error(e: &ChatError) {
    eprintln!("An error occurred: {}", e);
    eprintln!("{}", e.user_hint());
}

/// Read a camera snapshot, enforcing the attachment size ceiling.
pub fn load_camera_image(path: &Path) -> io::Result<Vec<u8>> {
    let size = std::fs::metadata(path)?.len();
    if size > attachments::MAX_ATTACHMENT_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} is {}, over the {} limit",
                attachments::display_name(path),
                human_size(size),
                human_size(attachments::MAX_ATTACHMENT_BYTES)
            ),
        ));
    }
    std::fs::read(path)
}

/// Transcribe a recording into prompt text. Failures are printed and yield None.
pub async fn transcribe_file<T: Transcriber>(transcriber: &mut T, path: &Path) -> Option<String> {
    let audio = match std::fs::read(path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: could not read {}: {}", path.display(), e);
            return None;
        }
    };
    let mime_type = core::mime::detect_mime_type(path);
    match transcriber.transcribe(&audio, &mime_type).await {
        Ok(text) => {
            println!("You said: {}", text);
            Some(text)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

/// Files, camera snapshot, and prebuilt command given on the command line.
#[derive(Debug, Default, Clone)]
pub struct StartupInputs {
    pub attach: Vec<PathBuf>,
    pub camera: Option<PathBuf>,
    pub command: Option<String>,
}

impl StartupInputs {
    pub fn from_args(args: &Args) -> Self {
        Self {
            attach: args.attach.clone(),
            camera: args.camera.clone(),
            command: args.prebuilt.clone(),
        }
    }
}

/// Queue startup inputs for the next turn and print the attach report.
/// Returns one message per input that could not be queued.
pub fn queue_startup_inputs(session: &mut SessionContext, inputs: &StartupInputs) -> Vec<String> {
    let mut problems = Vec::new();
    if !inputs.attach.is_empty() {
        let report = session.attach(inputs.attach.as_slice());
        print_attach_report(&report);
    }
    if let Some(camera) = &inputs.camera {
        match load_camera_image(camera) {
            Ok(bytes) => session.set_camera_image(bytes),
            Err(e) => problems.push(format!("camera snapshot {}: {}", camera.display(), e)),
        }
    }
    if let Some(name) = &inputs.command
        && session.select_command(name).is_none()
    {
        problems.push(format!(
            "unknown command '{}'. Run `{} commands` to list them.",
            name,
            core::app::NAME
        ));
    }
    problems
}

fn read_prompt_arg(prompt_arg: &str) -> io::Result<String> {
    if prompt_arg == "-" {
        io::read_to_string(io::stdin())
    } else {
        Ok(prompt_arg.to_string())
    }
}

/// Run single prompt mode: one turn, typed to stdout, then exit.
pub async fn run_single_prompt(
    args: &Args,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let model_id = args.model.as_deref().unwrap_or(&config.model_id);
    let mut model = ChatSession::new(config, model_id);
    let mut session = SessionContext::new();

    let prompt = match (&args.prompt, &args.voice) {
        (Some(p), _) => read_prompt_arg(p)?,
        (None, Some(voice)) => match transcribe_file(&mut model, voice).await {
            Some(text) => text,
            None => std::process::exit(1),
        },
        (None, None) => String::new(),
    };
    let prompt = prompt.trim();
    if prompt.is_empty() {
        eprintln!("Error: empty prompt");
        std::process::exit(1);
    }

    let problems = queue_startup_inputs(&mut session, &StartupInputs::from_args(args));
    if !problems.is_empty() {
        for p in &problems {
            eprintln!("Error: {}", p);
        }
        std::process::exit(1);
    }

    let emitter = emitter_for(args, config.typing_delay);
    let result = if io::stdout().is_terminal() {
        let mut sink = TerminalSink::new(io::stdout());
        let result = session
            .run_turn(&mut model, prompt, &emitter, &mut sink, None)
            .await;
        if result.is_ok() {
            sink.end_line()?;
        }
        result
    } else {
        let mut sink = FinalOnlySink::new(io::stdout());
        session
            .run_turn(&mut model, prompt, &Emitter::instant(), &mut sink, None)
            .await
    };

    if let Err(e) = result {
        print_chat_error(&e);
        std::process::exit(1);
    }
    Ok(())
}

/// Launch the interactive chat.
pub async fn run_interactive(
    args: &Args,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let emitter = emitter_for(args, config.typing_delay);
    let options = ReplOptions {
        model: args.model.clone(),
        resume: args.resume.clone(),
        emitter,
        startup: StartupInputs::from_args(args),
    };
    crate::repl::run(config, options).await?;
    Ok(())
}

/// Handle a subcommand. None of these need the API key.
pub fn run_subcommand(
    command: Commands,
    local: &LocalSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Prebuilt { query } => {
            let list = core::commands::filter_commands(query.as_deref().unwrap_or(""));
            if list.is_empty() {
                println!("No matching commands.");
            }
            for c in list {
                println!("{:<12} {}", c.full_name(), c.description);
            }
        }
        Commands::History { subcommand } => run_history(subcommand)?,
        Commands::Config => print_config(local),
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Args::command();
            cli::generate(shell, &mut cmd, core::app::NAME, &mut io::stdout());
        }
    }
    Ok(())
}

fn format_timestamp(secs: u64) -> String {
    chrono::DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

fn run_history(subcommand: HistorySubcommand) -> io::Result<()> {
    let store = HistoryStore::open_default()?;
    match subcommand {
        HistorySubcommand::List { limit, query } => {
            let convs = store.list()?;
            let filtered =
                core::history::filter_conversations(&convs, query.as_deref().unwrap_or(""));
            if filtered.is_empty() {
                println!("No conversations.");
            }
            for c in filtered.into_iter().take(limit.unwrap_or(usize::MAX)) {
                println!("{}  {}  {}", c.id, format_timestamp(c.updated_at), c.title);
            }
        }
        HistorySubcommand::Show { id } => {
            let Some(messages) = store.load(&id) else {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("No conversation with id {}", id),
                ));
            };
            let mut out = io::stdout().lock();
            for m in messages {
                let who = match m.role {
                    Role::User => "You",
                    Role::Assistant => core::app::ASSISTANT_NAME,
                };
                writeln!(out, "{}:\n{}\n", who, m.content)?;
            }
        }
        HistorySubcommand::Delete { id } => {
            store.delete(&id)?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

fn print_config(local: &LocalSettings) {
    let show = |p: Option<std::path::PathBuf>| {
        p.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(unavailable)".to_string())
    };
    println!("{} {}", core::app::NAME, core::app::VERSION);
    println!("config dir:    {}", show(core::paths::config_dir()));
    let history_dir = HistoryStore::open_default()
        .ok()
        .map(|s| s.dir().to_path_buf());
    println!("history dir:   {}", show(history_dir));
    println!(
        "log file:      {}",
        show(core::paths::cache_dir().map(|d| d.join(format!("{}.log", core::app::NAME))))
    );
    let key_status = match std::env::var("GEMINI_API_KEY") {
        Ok(k) if !k.trim().is_empty() => "set",
        _ => "not set",
    };
    println!("GEMINI_API_KEY: {}", key_status);
    println!(
        "model:         {}",
        std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash (default)".to_string())
    );
    println!("typing delay:  {} ms", local.typing_delay.as_millis());
    println!("max saved conversations: {}", local.max_conversations);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(attach: Vec<PathBuf>, command: Option<&str>) -> StartupInputs {
        StartupInputs {
            attach,
            camera: None,
            command: command.map(String::from),
        }
    }

    #[test]
    fn startup_inputs_are_queued_for_first_turn() {
        let tmp = tempfile::TempDir::new().unwrap();
        let notes = tmp.path().join("notes.txt");
        std::fs::write(&notes, "cell biology").unwrap();

        let mut session = SessionContext::new();
        let problems = queue_startup_inputs(&mut session, &inputs(vec![notes], Some("quiz")));

        assert!(problems.is_empty(), "{:?}", problems);
        assert_eq!(session.attachments().len(), 1);
        assert_eq!(session.attachments()[0].name, "notes.txt");
        assert_eq!(
            session.active_command().map(|c| c.display_text.as_str()),
            Some("Make a practice quiz")
        );
    }

    #[test]
    fn unknown_command_and_missing_camera_are_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut startup = inputs(Vec::new(), Some("nope"));
        startup.camera = Some(tmp.path().join("missing.jpg"));

        let mut session = SessionContext::new();
        let problems = queue_startup_inputs(&mut session, &startup);

        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("missing.jpg"));
        assert!(problems[1].contains("unknown command 'nope'"));
        assert!(!session.has_camera_image());
        assert!(session.active_command().is_none());
    }

    #[test]
    fn empty_startup_inputs_change_nothing() {
        let mut session = SessionContext::new();
        assert!(queue_startup_inputs(&mut session, &StartupInputs::default()).is_empty());
        assert!(session.attachments().is_empty());
        assert!(session.active_command().is_none());
    }
}
