//! Parsing of interactive input lines into prompts and slash commands.

use crate::core::commands;

pub const HELP: &str = "\
Type a message and press Enter to chat.

  /attach <file>...   Queue files for the next message (max 20 MB each).
                      Quote paths that contain spaces: /attach \"lab notes.pdf\"
  /camera <jpeg>      Queue a camera snapshot for the next message
  /voice <audio>      Transcribe a mono WAV or MP3 recording and send it
  /files              Show what is queued
  /clear              Drop queued files and snapshot
  /commands           List prebuilt commands
  /<command> [text]   Use a prebuilt command (e.g. /quiz photosynthesis)
  /reset              Log out: forget this conversation and start over
  /help               Show this help
  /quit               Exit (Ctrl-D also works)

Ctrl-C while a reply is being typed shows the rest at once.";

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Prompt(String),
    Help,
    Quit,
    Reset,
    Files,
    Clear,
    ListCommands,
    Attach(Vec<String>),
    Camera(String),
    Voice(String),
    UseCommand { name: String, prompt: Option<String> },
    /// Slash command that is neither built in nor a prebuilt command.
    Unknown(String),
    /// Known command used without its required argument.
    MissingArgument(&'static str),
    /// Arguments that could not be split, e.g. an unclosed quote.
    BadArguments(String),
}

/// A single path argument. Quotes are removed when the whole argument is one quoted word.
fn single_path(arg: &str) -> String {
    match shell_words::split(arg) {
        Ok(mut words) if words.len() == 1 => words.remove(0),
        _ => arg.to_string(),
    }
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Input::Prompt(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name.to_lowercase().as_str() {
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "reset" | "logout" => Input::Reset,
        "files" => Input::Files,
        "clear" => Input::Clear,
        "commands" => Input::ListCommands,
        "attach" if arg.is_empty() => Input::MissingArgument("/attach <file>..."),
        "attach" => match shell_words::split(arg) {
            Ok(paths) => Input::Attach(paths),
            Err(e) => Input::BadArguments(format!("/attach: {}", e)),
        },
        "camera" if arg.is_empty() => Input::MissingArgument("/camera <jpeg>"),
        "camera" => Input::Camera(single_path(arg)),
        "voice" if arg.is_empty() => Input::MissingArgument("/voice <audio>"),
        "voice" => Input::Voice(single_path(arg)),
        other => match commands::find_command(other) {
            Some(command) => Input::UseCommand {
                name: command.name.clone(),
                prompt: (!arg.is_empty()).then(|| arg.to_string()),
            },
            None => Input::Unknown(name.to_string()),
        },
    }
}
