//! Shared CLI definitions for scorebar.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Score file format (used to bypass extension-based detection).
/// When `--format` is not specified, format is auto-detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ScoreFormat {
    /// JSON array of scores, or an object with `scores` and optional `magnitudes`
    Json,
    /// Plain text, one score per line (`#` starts a comment)
    Text,
}

impl ScoreFormat {
    /// Detect score format from path extension. Anything that is not JSON is read as text.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Command-line arguments for scorebar
#[derive(Parser, Debug)]
#[command(version, about = "scorebar")]
pub struct Args {
    /// Score file to browse (results are listed best-first)
    #[arg(required_unless_present = "generate_config", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Directory that derived image paths (data/<rank><layout>.png) are resolved against.
    /// Defaults to the directory containing the score file.
    #[arg(long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Specify the score file format explicitly (json, text)
    #[arg(long = "format", value_enum)]
    pub format: Option<ScoreFormat>,

    /// Initial image layout tag, appended to the rank in image file names (e.g. _bin)
    #[arg(long = "layout", value_name = "TAG")]
    pub layout: Option<String>,

    /// Only show the first N results
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Write trace logs to this file
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Generate default configuration file at ~/.config/scorebar/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    out.push_str(&cmd.render_usage().to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_format_from_path() {
        assert_eq!(
            ScoreFormat::from_path(Path::new("scores.json")),
            ScoreFormat::Json
        );
        assert_eq!(
            ScoreFormat::from_path(Path::new("SCORES.JSON")),
            ScoreFormat::Json
        );
        assert_eq!(
            ScoreFormat::from_path(Path::new("scores.txt")),
            ScoreFormat::Text
        );
        assert_eq!(ScoreFormat::from_path(Path::new("scores")), ScoreFormat::Text);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["scorebar", "result.json", "--layout", "_bin", "--top", "10"]);
        assert_eq!(args.path, Some(PathBuf::from("result.json")));
        assert_eq!(args.layout.as_deref(), Some("_bin"));
        assert_eq!(args.top, Some(10));
        assert!(!args.debug);
    }

    #[test]
    fn test_path_optional_with_generate_config() {
        let args = Args::try_parse_from(["scorebar", "--generate-config"]).unwrap();
        assert!(args.path.is_none());
        assert!(Args::try_parse_from(["scorebar"]).is_err());
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["scorebar", "r.json", "--force"]).is_err());
    }

    #[test]
    fn test_render_options_markdown() {
        let md = render_options_markdown();
        assert!(md.contains("# Command Line Options"));
        assert!(md.contains("`--layout <TAG>`"));
        assert!(md.contains("`--generate-config`"));
        assert!(md.contains("[<PATH>]"));
    }
}
