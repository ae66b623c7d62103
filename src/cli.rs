use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "repotally",
    version,
    about = "GitHub repository analytics: commits, stars, forks, downloads and traffic"
)]
pub struct Cli {
    /// Launches the dashboard when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch analytics once and print them
    Fetch {
        /// Repositories as `owner/name` or GitHub URLs
        repos: Vec<String>,

        /// Use this preset's repositories instead of the active one
        #[arg(long, short)]
        preset: Option<String>,

        /// GitHub token (overrides config and GITHUB_TOKEN)
        #[arg(long)]
        token: Option<String>,

        /// Skip the traffic endpoints
        #[arg(long)]
        no_traffic: bool,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Where to write the JSON report
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Manage saved repository lists
    Preset {
        #[command(subcommand)]
        command: PresetCmd,
    },
}

#[derive(Subcommand, Debug)]
pub enum PresetCmd {
    /// List presets, marking the active one
    List,
    /// Print a preset's repositories (default: the active preset)
    Show { name: Option<String> },
    /// Create a new preset and make it active
    Save {
        name: String,
        #[arg(required = true)]
        repos: Vec<String>,
    },
    /// Replace an existing preset's repositories
    Update {
        name: String,
        #[arg(required = true)]
        repos: Vec<String>,
    },
    Rename { old: String, new: String },
    Delete { name: String },
    /// Make a preset active
    Use { name: String },
    /// Replace all presets with the contents of a TOML or JSON file
    Import { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::try_parse_from(["repotally"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_fetch_flags() {
        let cli = Cli::try_parse_from([
            "repotally",
            "fetch",
            "a/one",
            "https://github.com/b/two",
            "--no-traffic",
            "--json",
            "--out",
            "r.json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Fetch {
                repos,
                preset,
                no_traffic,
                json,
                out,
                ..
            }) => {
                assert_eq!(repos, vec!["a/one", "https://github.com/b/two"]);
                assert!(preset.is_none());
                assert!(no_traffic);
                assert!(json);
                assert_eq!(out, Some(PathBuf::from("r.json")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn preset_save_requires_repos() {
        assert!(Cli::try_parse_from(["repotally", "preset", "save", "work"]).is_err());
        let cli = Cli::try_parse_from(["repotally", "preset", "rename", "a", "b"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Preset {
                command: PresetCmd::Rename { .. }
            })
        ));
    }

    #[test]
    fn command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
