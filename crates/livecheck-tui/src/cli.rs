use clap::Parser;
use livecheck_lsp::DEFAULT_GOAL_METHOD;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "livecheck-tui")]
#[command(about = "Edit a file next to a live goal and diagnostics panel")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
    /// File to edit (opens `scratch.lean` in the current directory if omitted)
    pub file: Option<PathBuf>,

    /// Checker executable, started with `--checker-arg`s and spoken to over stdio
    #[arg(long, env = "LIVECHECK_CHECKER", default_value = "lean")]
    pub checker: String,

    /// Argument passed to the checker (repeatable)
    #[arg(
        long = "checker-arg",
        env = "LIVECHECK_CHECKER_ARGS",
        value_delimiter = ' ',
        allow_hyphen_values = true,
        default_values = ["--server"]
    )]
    pub checker_args: Vec<String>,

    /// Request method used for goal queries
    #[arg(long, env = "LIVECHECK_GOAL_METHOD", default_value = DEFAULT_GOAL_METHOD)]
    pub goal_method: String,

    /// `languageId` sent when opening the document
    #[arg(long, env = "LIVECHECK_LANGUAGE_ID", default_value = "lean")]
    pub language_id: String,

    /// Edit without starting a checker
    #[arg(long)]
    pub no_checker: bool,

    /// Write the file after every edit
    #[arg(long, env = "LIVECHECK_AUTOSAVE")]
    pub autosave: bool,

    /// Append logs to this file (`RUST_LOG` filters; default `livecheck=info`)
    #[arg(long, env = "LIVECHECK_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Height of a terminal cell relative to its width, used to pick the panel orientation
    #[arg(long, env = "LIVECHECK_CELL_ASPECT", default_value_t = 2.0)]
    pub cell_aspect: f32,
}
