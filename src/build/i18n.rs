//! Bilingual field validation.
//!
//! Walks a declarative table of dotted field paths per data file and reports
//! which locale keys are missing or empty. The validator is diagnostic, not
//! load-bearing: it never returns an error, and a missing or unparseable
//! data file becomes a warning in the result rather than an `Err`.

use serde::Serialize;
use serde_json::Value;
use std::{fs, path::Path, sync::LazyLock};

/// Field paths holding bilingual values, per source-relative data file.
/// This is fixed configuration, not user data.
const BILINGUAL_FIELDS: &[(&str, &[&str])] = &[
    (
        "data/navigation.json",
        &[
            "featured[].desc",
            "featured[].note",
            "categories[].name",
            "categories[].items[].desc",
            "recommendations[].text",
            "recommendations[].project",
        ],
    ),
    ("blog/posts/index.json", &["[].title", "[].summary"]),
    ("skills/data/index.json", &["[].desc"]),
    ("guide/data/index.json", &["[].title"]),
];

/// Field marker used when a data file cannot be read at all.
pub const FILE_NOT_FOUND: &str = "FILE_NOT_FOUND";

/// Locale placeholder for warnings that are not about one locale.
const NO_LOCALE: &str = "-";

/// Specs parsed once; every validation run reuses the compiled table.
static FIELD_TABLE: LazyLock<Vec<(&'static str, Vec<FieldPath>)>> = LazyLock::new(|| {
    BILINGUAL_FIELDS
        .iter()
        .map(|(file, specs)| (*file, specs.iter().map(|s| FieldPath::parse(s)).collect()))
        .collect()
});

/// One missing or empty translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct I18nWarning {
    pub locale: String,
    pub file: String,
    pub field: String,
}

/// One step of a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Descend one object key.
    Key(String),
    /// The current value (optionally keyed) must be an array to fan out over.
    Array(Option<String>),
}

/// A parsed field-path spec such as `featured[].desc` or `[].title`.
///
/// At most one nested array level (`categories[].items[].desc`) appears in
/// the field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(spec: &str) -> Self {
        let segments = spec
            .split('.')
            .map(|part| match part.strip_suffix("[]") {
                Some("") => Segment::Array(None),
                Some(key) => Segment::Array(Some(key.to_string())),
                None => Segment::Key(part.to_string()),
            })
            .collect();
        Self { segments }
    }
}

/// Validate every configured data file under `source`.
pub fn validate_tree(source: &Path, locales: &[String]) -> Vec<I18nWarning> {
    let mut warnings = Vec::new();

    for (rel, specs) in FIELD_TABLE.iter() {
        let doc = fs::read_to_string(source.join(rel))
            .ok()
            .and_then(|text| serde_json::from_str::<Value>(&text).ok());

        let Some(doc) = doc else {
            warnings.push(I18nWarning {
                locale: NO_LOCALE.into(),
                file: (*rel).into(),
                field: FILE_NOT_FOUND.into(),
            });
            continue;
        };

        for spec in specs {
            walk(&doc, &spec.segments, rel, locales, &mut warnings);
        }
    }

    warnings
}

/// Follow a field path through a document.
///
/// Two cases, mirroring the two segment kinds: plain descent stops silently
/// on an absent key (optional nested structure is not a defect), array
/// fan-out either recurses into each element (another array segment remains)
/// or checks the terminal field on every element.
fn walk(
    value: &Value,
    segments: &[Segment],
    file: &str,
    locales: &[String],
    out: &mut Vec<I18nWarning>,
) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    match head {
        Segment::Key(key) => {
            let Some(next) = value.get(key) else { return };
            walk(next, rest, file, locales, out);
        }
        Segment::Array(key) => {
            let target = match key {
                Some(key) => value.get(key),
                None => Some(value),
            };
            let Some(Value::Array(items)) = target else {
                return;
            };

            if rest.iter().any(|s| matches!(s, Segment::Array(_))) {
                for item in items {
                    walk(item, rest, file, locales, out);
                }
            } else {
                let field = terminal_field(rest);
                check_elements(items, &field, file, locales, out);
            }
        }
    }
}

/// The remaining path after the last array segment is a single field name.
fn terminal_field(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            Segment::Key(key) => key.as_str(),
            Segment::Array(_) => "",
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Check one terminal field on every element of an array.
fn check_elements(
    items: &[Value],
    field: &str,
    file: &str,
    locales: &[String],
    out: &mut Vec<I18nWarning>,
) {
    for (idx, item) in items.iter().enumerate() {
        if let Some(obj) = item.as_object()
            && let Some(value) = obj.get(field)
        {
            check_bilingual(value, &format!("[{idx}].{field}"), file, locales, out);
        }
    }
}

/// Check a single bilingual value.
///
/// Plain strings are language-neutral (e.g. proper names) and never warn.
/// Null values are skipped entirely. Locale maps must carry a non-empty,
/// non-whitespace string for every required locale.
fn check_bilingual(
    value: &Value,
    field: &str,
    file: &str,
    locales: &[String],
    out: &mut Vec<I18nWarning>,
) {
    let Value::Object(map) = value else { return };

    for locale in locales {
        let missing = match map.get(locale) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            out.push(I18nWarning {
                locale: locale.clone(),
                file: file.into(),
                field: field.into(),
            });
        }
    }
}
