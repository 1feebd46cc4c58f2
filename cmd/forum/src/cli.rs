use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "forum", about = "Inspect and edit the forum content store")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Overrides `storage.data_dir`
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// `.env` file to load instead of searching the working directory
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the demo posts if the store is empty
    Seed,

    /// List posts
    List {
        /// recent, popular or trending; anything else keeps storage order
        #[arg(long, default_value = "trending")]
        sort: String,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Show a single post
    Show { id: String },

    /// Publish a new post
    Post {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        community: Option<String>,

        /// Files to attach; repeatable
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
    },

    /// Add a signed delta to a post's vote total
    Vote {
        id: String,

        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },

    /// Comment on a post
    Comment {
        id: String,

        content: String,

        #[arg(long)]
        author: Option<String>,
    },

    /// List a post's comments, newest first
    Comments { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_vote_delta() {
        let cli = Cli::parse_from(["forum", "vote", "1", "-1"]);
        assert!(matches!(cli.command, Command::Vote { delta: -1, .. }));
    }

    #[test]
    fn list_defaults_to_trending() {
        let cli = Cli::parse_from(["forum", "list"]);
        match cli.command {
            Command::List { sort, author, .. } => {
                assert_eq!(sort, "trending");
                assert!(author.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn post_collects_repeated_attachments() {
        let cli = Cli::parse_from([
            "forum", "post", "--title", "T", "--content", "C", "--attach", "a.png", "--attach",
            "b.pdf",
        ]);
        match cli.command {
            Command::Post { attachments, .. } => assert_eq!(attachments.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn env_file_is_a_global_option() {
        let cli = Cli::parse_from(["forum", "--env-file", "local.env", "seed"]);
        assert_eq!(cli.env_file, Some(PathBuf::from("local.env")));
        assert!(matches!(cli.command, Command::Seed));
    }
}
