//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.
//! Every command writes its result as JSON to stdout; logs go to stderr.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Mulu bilingual site toolkit CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: mulu.toml)
    #[arg(short = 'C', long, default_value = "mulu.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared build arguments for Build, Sync and Pull commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Keep the existing publish directory instead of clearing it first
    #[arg(long)]
    pub no_clean: bool,

    /// Skip analytics snippet injection
    #[arg(long)]
    pub skip_analytics: bool,

    /// Skip bilingual field validation
    #[arg(long)]
    pub skip_i18n: bool,

    /// Report what would happen without writing any files
    #[arg(long)]
    pub dry_run: bool,
}

/// Data source restriction for the search command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pulse,
    Project,
    Skill,
    Blog,
    Guide,
}

/// What the pull command should import
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PullKind {
    Pulse,
    Weekly,
    #[default]
    All,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site: copy source to publish dir, inject analytics,
    /// validate translations, generate the api/v1 snapshot
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Search across all published datasets
    Search {
        /// Keyword to look for (case-insensitive)
        keyword: String,

        /// Restrict to a single data source
        #[arg(long, value_enum)]
        kind: Option<SourceKind>,
    },

    /// List pulse items (curated engagement highlights)
    Pulse {
        /// Only items from the last N days
        #[arg(long)]
        days: Option<i64>,

        /// Minimum score (0-1)
        #[arg(long)]
        min_score: Option<f64>,

        /// Filter by author handle
        #[arg(long)]
        author: Option<String>,

        /// Max items to return
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Edit a pulse item (backs up items.json before writing)
    PulseEdit {
        /// Item id to edit
        id: String,

        /// Update score (0-1)
        #[arg(long)]
        score: Option<f64>,

        /// Update comment type
        #[arg(long)]
        comment_type: Option<String>,

        /// Update relevance description
        #[arg(long)]
        relevance: Option<String>,

        /// Update suggested angle
        #[arg(long)]
        suggested_angle: Option<String>,

        /// Update title (English)
        #[arg(long)]
        title_en: Option<String>,

        /// Update title (Chinese)
        #[arg(long)]
        title_zh: Option<String>,

        /// Update summary (English)
        #[arg(long)]
        summary_en: Option<String>,

        /// Update summary (Chinese)
        #[arg(long)]
        summary_zh: Option<String>,

        /// Update editor note (English)
        #[arg(long)]
        note_en: Option<String>,

        /// Update editor note (Chinese)
        #[arg(long)]
        note_zh: Option<String>,
    },

    /// Delete a pulse item (registers it so pull never restores it)
    PulseDelete {
        /// Item id to delete
        id: String,

        /// Optional reason for deletion
        #[arg(long)]
        reason: Option<String>,
    },

    /// Restore a deleted or edited pulse item
    PulseRestore {
        /// Item id to restore
        id: String,
    },

    /// List all item ids excluded from pull (deleted or edited)
    PulseExcluded,

    /// Manage homepage featured/curated content
    Featured {
        #[command(subcommand)]
        action: Option<FeaturedAction>,
    },

    /// Show aggregate site statistics
    Stats,

    /// List the project directory
    Projects {
        /// Filter by category id
        #[arg(long)]
        category: Option<String>,

        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// List skills
    Skills {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },

    /// List blog posts
    Blog {
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,

        /// Only the N most recent posts
        #[arg(long)]
        latest: Option<usize>,
    },

    /// Stage and commit changes with an auto-generated message
    Commit {
        /// Use a custom commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Only stage the source and publish subtrees of one area
        #[arg(long)]
        scope: Option<String>,
    },

    /// Build, commit and push in one step
    Sync {
        /// Skip the build step
        #[arg(long)]
        no_build: bool,

        /// Skip the push step (build + commit only)
        #[arg(long)]
        no_push: bool,

        /// Use a custom commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Show what would happen without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Pull externally-produced data, then build, commit and push
    Pull {
        /// Path to the publisher output directory
        #[arg(long)]
        source: Option<PathBuf>,

        /// What to pull
        #[arg(long, value_enum, default_value_t)]
        kind: PullKind,

        /// Skip the build step after pulling
        #[arg(long)]
        no_build: bool,

        /// Skip the push step
        #[arg(long)]
        no_push: bool,

        /// Use a custom commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Preview what would be pulled without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Create or update DNS records pointing at the Pages host
    SetupDns,

    /// Configure the Pages custom domain and enforce HTTPS
    SetupPages,
}

/// Featured content subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FeaturedAction {
    /// Show current featured selections (default)
    List,

    /// Set featured items for a section
    Set {
        /// Section: projects, guide or blog
        section: String,

        /// Comma-separated names (projects) or slugs (guide/blog)
        ids: String,
    },

    /// Clear all featured items in a section
    Clear {
        /// Section: projects, guide or blog
        section: String,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_sync(&self) -> bool {
        matches!(self.command, Commands::Sync { .. })
    }
    pub const fn is_pull(&self) -> bool {
        matches!(self.command, Commands::Pull { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_flags() {
        let cli = Cli::parse_from(["mulu", "build", "--dry-run", "--no-clean"]);
        match cli.command {
            Commands::Build { build_args } => {
                assert!(build_args.dry_run);
                assert!(build_args.no_clean);
                assert!(!build_args.skip_analytics);
                assert!(!build_args.skip_i18n);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_search_kind() {
        let cli = Cli::parse_from(["mulu", "search", "memory", "--kind", "pulse"]);
        match cli.command {
            Commands::Search { keyword, kind } => {
                assert_eq!(keyword, "memory");
                assert_eq!(kind, Some(SourceKind::Pulse));
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_pulse_edit_bilingual_flags() {
        let cli = Cli::parse_from([
            "mulu",
            "pulse-edit",
            "123",
            "--score",
            "0.9",
            "--note-zh",
            "新点评",
        ]);
        match cli.command {
            Commands::PulseEdit {
                id, score, note_zh, ..
            } => {
                assert_eq!(id, "123");
                assert_eq!(score, Some(0.9));
                assert_eq!(note_zh.as_deref(), Some("新点评"));
            }
            _ => panic!("expected pulse-edit command"),
        }
    }

    #[test]
    fn test_featured_defaults_to_list() {
        let cli = Cli::parse_from(["mulu", "featured"]);
        match cli.command {
            Commands::Featured { action } => assert!(action.is_none()),
            _ => panic!("expected featured command"),
        }
    }

    #[test]
    fn test_pull_kind_default() {
        let cli = Cli::parse_from(["mulu", "pull"]);
        match cli.command {
            Commands::Pull { kind, .. } => assert_eq!(kind, PullKind::All),
            _ => panic!("expected pull command"),
        }
    }
}
