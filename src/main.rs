//! Mulu - build and curation toolkit for a bilingual project-directory site.

mod build;
mod cli;
mod config;
mod data;
mod deploy;
mod logger;
mod net;
mod pull;
mod utils;

use anyhow::{Result, bail};
use build::{BuildOptions, build_site};
use clap::Parser;
use cli::{Cli, Commands, FeaturedAction};
use config::SiteConfig;
use data::{featured, reader, search, writer};
use deploy::SyncOptions;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));
    let paths = config.site_paths();

    match &cli.command {
        Commands::Build { build_args } => {
            let report = build_site(config, &BuildOptions::from_cli(config, build_args))?;
            to_json(&report)
        }

        Commands::Search { keyword, kind } => to_json(&search::search(&paths, keyword, *kind)),

        Commands::Pulse {
            days,
            min_score,
            author,
            limit,
        } => {
            let filter = reader::PulseFilter {
                days: *days,
                min_score: *min_score,
                author: author.clone(),
                limit: *limit,
            };
            to_json(&reader::read_pulse(&paths, &filter))
        }

        Commands::PulseEdit {
            id,
            score,
            comment_type,
            relevance,
            suggested_angle,
            title_en,
            title_zh,
            summary_en,
            summary_zh,
            note_en,
            note_zh,
        } => {
            let patch = writer::ItemPatch {
                score: *score,
                comment_type: comment_type.clone(),
                relevance: relevance.clone(),
                suggested_angle: suggested_angle.clone(),
                title: writer::LocalePatch::from_flags(title_en.clone(), title_zh.clone()),
                summary: writer::LocalePatch::from_flags(summary_en.clone(), summary_zh.clone()),
                note: writer::LocalePatch::from_flags(note_en.clone(), note_zh.clone()),
            };
            if patch.is_empty() {
                bail!("No fields to update. Provide at least one --flag.");
            }
            to_json(&writer::update_item(&paths, id, &patch)?)
        }

        Commands::PulseDelete { id, reason } => to_json(&writer::delete_item(
            &paths,
            id,
            reason.as_deref().unwrap_or(""),
        )?),

        Commands::PulseRestore { id } => {
            let restored = writer::restore_item(&paths, id)?;
            if restored {
                to_json(&json!({"restored": true, "id": id}))
            } else {
                to_json(&json!({
                    "restored": false,
                    "id": id,
                    "reason": "Item not found in edited-items registry",
                }))
            }
        }

        Commands::PulseExcluded => {
            let ids = writer::excluded_ids(&paths);
            to_json(&json!({"count": ids.len(), "ids": ids}))
        }

        Commands::Featured { action } => match action {
            None | Some(FeaturedAction::List) => to_json(&featured::list_featured(&paths)),
            Some(FeaturedAction::Set { section, ids }) => {
                let ids: Vec<String> = ids
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                to_json(&featured::set_featured(&paths, section, &ids)?)
            }
            Some(FeaturedAction::Clear { section }) => {
                to_json(&featured::clear_featured(&paths, section)?)
            }
        },

        Commands::Stats => to_json(&reader::site_stats(&paths)),

        Commands::Projects { category, tag } => {
            let filter = reader::ProjectFilter {
                category: category.clone(),
                tag: tag.clone(),
            };
            to_json(&reader::read_projects(&paths, &filter))
        }

        Commands::Skills { category } => {
            to_json(&reader::read_skills(&paths, category.as_deref()))
        }

        Commands::Blog { tag, latest } => {
            to_json(&reader::read_blog(&paths, tag.as_deref(), *latest))
        }

        Commands::Commit { message, scope } => to_json(&deploy::commit_changes(
            config,
            message.clone(),
            scope.clone(),
        )?),

        Commands::Sync {
            no_build,
            no_push,
            message,
            dry_run,
        } => {
            let opts = SyncOptions {
                no_build: *no_build,
                no_push: *no_push,
                message: message.clone(),
                dry_run: *dry_run,
            };
            to_json(&deploy::sync_site(config, &opts)?)
        }

        Commands::Pull {
            source,
            kind,
            no_build,
            no_push,
            message,
            dry_run,
        } => {
            let opts = SyncOptions {
                no_build: *no_build,
                no_push: *no_push,
                message: message.clone(),
                dry_run: *dry_run,
            };
            to_json(&deploy::pull_and_sync(config, source.clone(), *kind, &opts)?)
        }

        Commands::SetupDns => {
            net::cloudflare::setup_dns(config)?;
            to_json(&json!({"configured": true, "domain": config.deploy.dns.domain}))
        }

        Commands::SetupPages => {
            net::github::setup_pages(config)?;
            to_json(&json!({"configured": true, "repo": config.deploy.pages.repo}))
        }
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file is not an error: the defaults describe the
/// conventional source/publish layout.
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}

/// Print a command result as pretty JSON on stdout.
fn to_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
