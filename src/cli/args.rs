//! Command-line interface definitions.

use crate::transform::Target;
use crate::unit::HandlerMode;
use clap::{ArgAction, ColorChoice, Parser};
use std::path::PathBuf;

/// Compile inline TypeScript in HTML documents
#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Documents, `.ts` files, directories or glob patterns
    #[arg(required = true, value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<String>,

    /// Remove comments from the output
    #[arg(short = 'c', long)]
    pub remove_comments: bool,

    /// Keep the generated unit files next to their documents
    #[arg(short = 'k', long)]
    pub keep_temp: bool,

    /// Output file name pattern, `{stem}` is the input name without extension
    #[arg(short, long, value_name = "PATTERN")]
    pub output: Option<String>,

    /// Minify markup, scripts and styles (implies --remove-comments)
    #[arg(short, long)]
    pub minify: bool,

    /// Extra argument passed to the TypeScript compiler (repeatable)
    #[arg(short = 't', long = "tsc", value_name = "ARG", allow_hyphen_values = true)]
    pub tsc_args: Vec<String>,

    /// TypeScript compiler executable
    #[arg(short = 'p', long, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub tsc_path: Option<PathBuf>,

    /// ECMAScript target version
    #[arg(long)]
    pub target: Option<Target>,

    /// Library declarations to include (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub lib: Option<Vec<String>>,

    /// Which attributes are compiled as event handlers
    #[arg(long, value_name = "MODE")]
    pub handlers: Option<HandlerMode>,

    /// Worker threads (0 = all CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Config file path (default: nearest tshtml.toml)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["tshtml", "pages/*.tshtml"]);
        assert_eq!(cli.paths, vec!["pages/*.tshtml"]);
        assert!(!cli.minify && !cli.remove_comments && !cli.keep_temp && !cli.verbose);
        assert!(cli.tsc_args.is_empty());
        assert_eq!(cli.config, None);
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_repeated_tsc_args() {
        let cli = Cli::parse_from(["tshtml", "-t", "--strict", "-t", "--noEmitOnError", "a.tshtml"]);
        assert_eq!(cli.tsc_args, vec!["--strict", "--noEmitOnError"]);
        assert_eq!(cli.paths, vec!["a.tshtml"]);
    }

    #[test]
    fn test_verbose_is_not_version() {
        let cli = Cli::parse_from(["tshtml", "-V", "a.tshtml"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_paths_required() {
        assert!(Cli::try_parse_from(["tshtml", "-m"]).is_err());
    }
}
