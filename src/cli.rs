//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  interlink-chat                              Start an interactive chat
  interlink-chat -p \"explain mitosis\"         Single prompt, typed to stdout
  interlink-chat -p - < question.txt          Read prompt from stdin
  interlink-chat -p \"summarize\" -a notes.pdf  Attach files to the prompt
  interlink-chat -c quiz -p \"the cell\"        Use a prebuilt command
  interlink-chat --voice question.wav         Ask by voice recording
  interlink-chat commands                     List prebuilt commands
  interlink-chat history list                 List saved conversations
  interlink-chat --resume <ID>                Continue a saved conversation
  interlink-chat completions bash             Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Interlink AI: a study assistant chat for the terminal",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Send a single prompt then exit (without opening the interactive chat)
    #[arg(
        short = 'p',
        long,
        help = "Provide a prompt to get an immediate response (use '-' to read from stdin)"
    )]
    pub prompt: Option<String>,

    /// Transcribe an audio recording and use it as the prompt
    #[arg(long, value_name = "AUDIO", conflicts_with = "prompt")]
    pub voice: Option<PathBuf>,

    /// Override the model id
    #[arg(short = 'm', long, help = "Model ID (e.g. gemini-1.5-flash)")]
    pub model: Option<String>,

    /// Files to send with the prompt (max 20 MB each)
    #[arg(short = 'a', long = "attach", value_name = "FILE", num_args = 1..)]
    pub attach: Vec<PathBuf>,

    /// Camera snapshot (JPEG) to send with the prompt
    #[arg(long, value_name = "JPEG")]
    pub camera: Option<PathBuf>,

    /// Prebuilt command whose template prefixes the prompt
    #[arg(short = 'c', long = "command", value_name = "NAME")]
    pub prebuilt: Option<String>,

    /// Continue a saved conversation (id from `history list`)
    #[arg(long, value_name = "ID", conflicts_with_all = ["prompt", "voice"])]
    pub resume: Option<String>,

    /// Print the reply at once instead of typing it out
    #[arg(long)]
    pub no_typing: bool,

    /// Delay between typed words in milliseconds
    #[arg(long, value_name = "MS")]
    pub typing_delay_ms: Option<u64>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List prebuilt commands
    #[command(name = "commands")]
    Prebuilt {
        /// Filter commands by name or description
        #[arg(long)]
        query: Option<String>,
    },
    /// Manage saved conversations
    History {
        #[command(subcommand)]
        subcommand: HistorySubcommand,
    },
    /// Show config paths and status
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum HistorySubcommand {
    /// List conversations
    List {
        /// Maximum number of conversations to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Filter by title or id
        #[arg(long)]
        query: Option<String>,
    },
    /// Print a saved conversation
    Show {
        /// Conversation id (from `history list`)
        id: String,
    },
    /// Delete a saved conversation
    Delete {
        /// Conversation id (from `history list`)
        id: String,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }

    /// True when the run is a one-shot prompt rather than the interactive chat.
    pub fn is_single_prompt(&self) -> bool {
        self.prompt.is_some() || self.voice.is_some()
    }
}
