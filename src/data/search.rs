//! Cross-source keyword search.
//!
//! Searches pulse, projects, skills, blog and guide data with a unified
//! result format. Matching is case-insensitive substring search over the
//! text a record carries, including both locales of bilingual fields.

use crate::{
    cli::SourceKind,
    config::SitePaths,
    data::{
        reader::{self, ProjectFilter, PulseFilter},
        types::{Bilingual, SearchHit},
    },
};
use serde_json::{Value, json};

/// Search across all (or one) data source.
pub fn search(paths: &SitePaths, keyword: &str, kind: Option<SourceKind>) -> Vec<SearchHit> {
    if keyword.is_empty() {
        return Vec::new();
    }
    let keyword = keyword.to_lowercase();

    match kind {
        Some(SourceKind::Pulse) => search_pulse(paths, &keyword),
        Some(SourceKind::Project) => search_projects(paths, &keyword),
        Some(SourceKind::Skill) => search_skills(paths, &keyword),
        Some(SourceKind::Blog) => search_blog(paths, &keyword),
        Some(SourceKind::Guide) => search_guide(paths, &keyword),
        None => {
            let mut results = search_pulse(paths, &keyword);
            results.extend(search_projects(paths, &keyword));
            results.extend(search_skills(paths, &keyword));
            results.extend(search_blog(paths, &keyword));
            results.extend(search_guide(paths, &keyword));
            results
        }
    }
}

/// Case-insensitive match over any of the given text fields.
fn matches(keyword: &str, fields: &[&str]) -> bool {
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(keyword))
}

fn text_of(field: &Option<Bilingual>) -> String {
    field.as_ref().map(Bilingual::full_text).unwrap_or_default()
}

fn value_of(field: &Option<Bilingual>) -> Value {
    field
        .as_ref()
        .and_then(|b| serde_json::to_value(b).ok())
        .unwrap_or(Value::Null)
}

fn search_pulse(paths: &SitePaths, keyword: &str) -> Vec<SearchHit> {
    reader::read_pulse(paths, &PulseFilter::default())
        .into_iter()
        .filter(|it| {
            matches(
                keyword,
                &[
                    &text_of(&it.title),
                    &text_of(&it.summary),
                    &it.relevance,
                    &it.author,
                ],
            )
        })
        .map(|it| SearchHit {
            kind: "pulse",
            id: it.id.clone(),
            title: value_of(&it.title),
            summary: if it.summary.is_some() {
                value_of(&it.summary)
            } else {
                json!(it.relevance)
            },
            url: it.post_url.clone(),
            score: Some(it.score),
            date: Some(it.date.clone()),
            category: None,
            order: None,
        })
        .collect()
}

fn search_projects(paths: &SitePaths, keyword: &str) -> Vec<SearchHit> {
    reader::read_projects(paths, &ProjectFilter::default())
        .into_iter()
        .filter(|it| {
            matches(
                keyword,
                &[&it.name, &text_of(&it.desc), &it.tags.join(" ")],
            )
        })
        .map(|it| SearchHit {
            kind: "project",
            id: it.name.clone(),
            title: json!(it.name),
            summary: value_of(&it.desc),
            url: it.url.clone(),
            score: None,
            date: None,
            category: Some(it.category.clone()),
            order: None,
        })
        .collect()
}

fn search_skills(paths: &SitePaths, keyword: &str) -> Vec<SearchHit> {
    reader::read_skills(paths, None)
        .into_iter()
        .filter(|it| {
            matches(
                keyword,
                &[
                    &it.name,
                    &text_of(&it.desc),
                    &it.tags.join(" "),
                    &it.category,
                ],
            )
        })
        .map(|it| SearchHit {
            kind: "skill",
            id: it.slug.clone(),
            title: json!(it.name),
            summary: value_of(&it.desc),
            url: it.github.clone().unwrap_or_default(),
            score: None,
            date: None,
            category: Some(it.category.clone()),
            order: None,
        })
        .collect()
}

fn search_blog(paths: &SitePaths, keyword: &str) -> Vec<SearchHit> {
    reader::read_blog(paths, None, None)
        .into_iter()
        .filter(|it| {
            matches(
                keyword,
                &[
                    &text_of(&it.title),
                    &text_of(&it.summary),
                    &it.tags.join(" "),
                ],
            )
        })
        .map(|it| SearchHit {
            kind: "blog",
            id: it.slug.clone(),
            title: value_of(&it.title),
            summary: value_of(&it.summary),
            url: format!("/blog/{}", it.slug),
            score: None,
            date: Some(it.date.clone()),
            category: None,
            order: None,
        })
        .collect()
}

fn search_guide(paths: &SitePaths, keyword: &str) -> Vec<SearchHit> {
    reader::read_guide(paths)
        .into_iter()
        .filter(|it| matches(keyword, &[&text_of(&it.title), &it.slug]))
        .map(|it| SearchHit {
            kind: "guide",
            id: it.slug.clone(),
            title: value_of(&it.title),
            summary: Value::Null,
            url: format!("/guide/{}", it.slug),
            score: None,
            date: None,
            category: None,
            order: Some(it.order),
        })
        .collect()
}
