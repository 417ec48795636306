//! Interactive chat: read a line, run a turn, type the reply, save the transcript.

mod input;
pub mod term;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::core;
use crate::core::config::Config;
use crate::core::emit::Emitter;
use crate::core::history::{self, HistoryStore};
use crate::core::llm::{ChatSession, RemoteModel};
use crate::core::message::Role;
use crate::core::session::SessionContext;
use crate::run;

use input::{HELP, Input, parse_input};
use term::{FinalOnlySink, TerminalSink};

/// Options for starting the interactive chat.
pub struct ReplOptions {
    pub model: Option<String>,
    pub resume: Option<String>,
    pub emitter: Emitter,
    /// Queued into the first turn.
    pub startup: run::StartupInputs,
}

fn print_transcript(session: &SessionContext) {
    for m in session.transcript() {
        match m.role {
            Role::User => println!("You: {}\n", m.content),
            Role::Assistant => println!("{}: {}\n", core::app::ASSISTANT_NAME, m.content),
        }
    }
}

fn save_if_dirty(
    store: Option<&HistoryStore>,
    session: &mut SessionContext,
    max_conversations: u32,
) {
    let Some(store) = store else {
        return;
    };
    if !session.is_dirty() {
        return;
    }
    let title = history::first_message_preview(session.transcript(), run::TITLE_PREVIEW_MAX_LEN);
    match store.save(
        session.conversation_id(),
        &title,
        session.transcript(),
        max_conversations,
    ) {
        Ok(id) => {
            session.set_conversation_id(Some(id));
            session.clear_dirty();
        }
        Err(e) => log::warn!("Failed to save conversation: {}", e),
    }
}

/// Start a session, resuming a saved transcript when asked.
fn open_session(
    store: Option<&HistoryStore>,
    resume: Option<String>,
    model: &mut ChatSession,
) -> SessionContext {
    let Some(id) = resume else {
        return SessionContext::new();
    };
    match store.and_then(|s| s.load(&id)) {
        Some(transcript) => {
            model.seed_history(&transcript);
            SessionContext::resume(id, transcript)
        }
        None => {
            eprintln!("Warning: no saved conversation {}; starting a new one.", id);
            SessionContext::new()
        }
    }
}

/// Run one turn, with Ctrl-C fast-forwarding the typing effect.
async fn chat_turn(
    session: &mut SessionContext,
    model: &mut ChatSession,
    prompt: &str,
    emitter: &Emitter,
) {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    print!("{}: ", core::app::ASSISTANT_NAME);
    let result = if io::stdout().is_terminal() {
        let mut sink = TerminalSink::new(io::stdout());
        let result = session
            .run_turn(model, prompt, emitter, &mut sink, Some(&cancel))
            .await;
        if result.is_ok()
            && let Err(e) = sink.end_line()
        {
            log::debug!("terminal write failed: {}", e);
        }
        result
    } else {
        let mut sink = FinalOnlySink::new(io::stdout());
        session
            .run_turn(model, prompt, emitter, &mut sink, Some(&cancel))
            .await
    };
    watcher.abort();

    match result {
        Ok(_) => println!(),
        Err(e) => {
            println!();
            run::print_chat_error(&e);
        }
    }
}

/// Interactive loop. Returns on /quit, end of input, or Ctrl-C at the prompt.
pub async fn run(config: Config, options: ReplOptions) -> io::Result<()> {
    let model_id = options.model.unwrap_or_else(|| config.model_id.clone());
    let mut model = ChatSession::new(&config, &model_id);
    let store = HistoryStore::open_default()
        .inspect_err(|e| log::warn!("History disabled: {}", e))
        .ok();
    let store = store.as_ref();
    let mut session = open_session(store, options.resume, &mut model);
    log::info!("Interactive chat started with model {}", model.model());
    let emitter = options.emitter;
    log::debug!(
        "Typing delay {:?}, {} messages of remote history",
        emitter.delay(),
        model.history_len()
    );

    print_transcript(&session);
    for problem in run::queue_startup_inputs(&mut session, &options.startup) {
        eprintln!("Warning: {}", problem);
    }
    println!("(Type /help for commands.)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if let Some(cmd) = session.active_command() {
            print!("[{}] ", cmd.display_text);
        }
        print!("> ");
        io::Write::flush(&mut io::stdout())?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Help => println!("{}\n", HELP),
            Input::Quit => break,
            Input::Reset => {
                save_if_dirty(store, &mut session, config.max_conversations);
                session.reset();
                model.reset();
                println!("Logged out. Starting a new conversation.\n");
                print_transcript(&session);
            }
            Input::Files => {
                if session.attachments().is_empty() && !session.has_camera_image() {
                    println!("Nothing queued.");
                }
                for a in session.attachments() {
                    println!("  {} ({})", a.name, a.mime_type);
                }
                if session.has_camera_image() {
                    println!("  camera snapshot (image/jpeg)");
                }
            }
            Input::Clear => {
                session.clear_attachments();
                println!("Cleared queued files.");
            }
            Input::ListCommands => {
                for c in core::commands::builtin_commands() {
                    println!("  {:<12} {}", c.full_name(), c.description);
                }
            }
            Input::Attach(paths) => {
                let paths: Vec<PathBuf> = paths.into_iter().map(PathBuf::from).collect();
                let report = session.attach(paths.as_slice());
                run::print_attach_report(&report);
            }
            Input::Camera(path) => match run::load_camera_image(Path::new(&path)) {
                Ok(bytes) => {
                    session.set_camera_image(bytes);
                    println!("Camera snapshot queued.");
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            Input::Voice(path) => {
                if let Some(prompt) = run::transcribe_file(&mut model, Path::new(&path)).await {
                    chat_turn(&mut session, &mut model, &prompt, &emitter).await;
                    save_if_dirty(store, &mut session, config.max_conversations);
                }
            }
            Input::UseCommand { name, prompt } => {
                let Some(cmd) = session.select_command(&name) else {
                    continue;
                };
                match prompt {
                    Some(prompt) => {
                        chat_turn(&mut session, &mut model, &prompt, &emitter).await;
                        save_if_dirty(store, &mut session, config.max_conversations);
                    }
                    None => println!(
                        "{} selected. Your next message will use it.",
                        cmd.display_text
                    ),
                }
            }
            Input::Unknown(name) => {
                eprintln!("Unknown command /{}. Type /help for the list.", name)
            }
            Input::MissingArgument(usage) => eprintln!("Usage: {}", usage),
            Input::BadArguments(msg) => eprintln!("Error: {}", msg),
            Input::Prompt(prompt) => {
                chat_turn(&mut session, &mut model, &prompt, &emitter).await;
                save_if_dirty(store, &mut session, config.max_conversations);
            }
        }
    }

    save_if_dirty(store, &mut session, config.max_conversations);
    Ok(())
}
