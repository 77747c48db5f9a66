//! CLI argument definitions using clap derive macros.

use clap::Parser;

use linkscout_core::SearchMode;

/// Discover and rank verified download/purchase links for a named file.
///
/// Linkscout queries web search engines for a title, probes every
/// candidate link for direct-file headers, audits ambiguous pages with
/// a content classifier, and prints the surviving links ranked by trust.
#[derive(Parser, Debug)]
#[command(name = "linkscout")]
#[command(author, version, about)]
pub struct Args {
    /// Title of the file/book to search for
    pub filename: String,

    /// Expected file extension (e.g. pdf, epub)
    #[arg(short = 't', long, default_value = "pdf")]
    pub filetype: String,

    /// Where to search: free repositories or paid retailers
    #[arg(short, long, default_value = "free")]
    pub mode: SearchMode,

    /// Print the result set as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Drop candidates when the content oracle is unavailable
    /// instead of accepting them at reduced confidence
    #[arg(long)]
    pub strict: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["linkscout", "Dune"]).unwrap();
        assert_eq!(args.filename, "Dune");
        assert_eq!(args.filetype, "pdf");
        assert_eq!(args.mode, SearchMode::Free);
        assert!(!args.json);
        assert!(!args.strict);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_missing_filename_returns_error() {
        let result = Args::try_parse_from(["linkscout"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_mode_flag_parses_paid() {
        let args = Args::try_parse_from(["linkscout", "Dune", "--mode", "paid"]).unwrap();
        assert_eq!(args.mode, SearchMode::Paid);
    }

    #[test]
    fn test_cli_mode_flag_rejects_unknown_value() {
        let result = Args::try_parse_from(["linkscout", "Dune", "--mode", "rental"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_filetype_short_flag() {
        let args = Args::try_parse_from(["linkscout", "Dune", "-t", "epub"]).unwrap();
        assert_eq!(args.filetype, "epub");
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["linkscout", "Dune", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["linkscout", "Dune", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["linkscout", "Dune", "-q"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_strict_and_json_flags() {
        let args = Args::try_parse_from(["linkscout", "Dune", "--strict", "--json"]).unwrap();
        assert!(args.strict);
        assert!(args.json);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let result = Args::try_parse_from(["linkscout", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["linkscout", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
