//! Placeholder templates rendered against a record's flattened fields.
//!
//! A template such as `"{Index}: {Title} by {ChannelTitle}"` has every
//! `{Name}` replaced with the string form of the field called `Name`.
//! Records describe their fields through [`Fields`]; embedded records are
//! spliced in depth-first, ahead of the fields of the record embedding them.

use crate::core::Video;
use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

pub const DEFAULT_TEMPLATE: &str = "{Index}: {Title}";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Sequences and nested records. Never substituted.
    Composite,
}

impl FieldValue {
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Str(s) => Some(s.clone()),
            FieldValue::Int(n) => Some(n.to_string()),
            FieldValue::Uint(n) => Some(n.to_string()),
            FieldValue::Float(x) => Some(x.to_string()),
            FieldValue::Composite => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub value: FieldValue,
    /// How many embeddings deep the field was promoted from; 0 for own fields.
    pub depth: usize,
}

impl Field {
    pub fn new(name: &'static str, value: FieldValue) -> Self {
        Self { name, value, depth: 0 }
    }

    /// Appends the fields of an embedded record, one level deeper.
    pub fn embed(fields: &mut Vec<Field>, inner: &impl Fields) {
        fields.extend(inner.fields().into_iter().map(|mut field| {
            field.depth += 1;
            field
        }));
    }
}

pub trait Fields {
    fn fields(&self) -> Vec<Field>;
}

/// Resolves shadowed names: the shallowest field wins, then the first seen.
fn resolve(record: &impl Fields) -> Vec<Field> {
    let mut resolved: Vec<Field> = Vec::new();
    let mut by_name: HashMap<&'static str, usize> = HashMap::new();

    for field in record.fields() {
        match by_name.get(field.name) {
            Some(&i) if resolved[i].depth <= field.depth => {}
            Some(&i) => resolved[i] = field,
            None => {
                by_name.insert(field.name, resolved.len());
                resolved.push(field);
            }
        }
    }
    resolved
}

/// Substitutes every scalar field of `record` into `template`.
/// Unknown and composite placeholders are left as written, and substituted
/// values are never scanned for placeholders themselves.
pub fn format(template: &str, record: &impl Fields) -> String {
    let values: HashMap<&'static str, String> = resolve(record)
        .into_iter()
        .filter_map(|field| Some((field.name, field.value.render()?)))
        .collect();

    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| {
            values.get(&caps[1]).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Every placeholder name `record` exposes, in field order.
pub fn field_names(record: &impl Fields) -> Vec<&'static str> {
    resolve(record).into_iter().map(|f| f.name).collect()
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder pattern"))
}

/// Names of the `{Name}` tokens in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    placeholder_pattern()
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

/// Reports placeholders `record` cannot substitute. Rendering does not need
/// this; callers use it to warn about typos.
pub fn check_template(template: &str, record: &impl Fields) -> Result<()> {
    let scalars: Vec<&str> = resolve(record)
        .into_iter()
        .filter(|f| f.value != FieldValue::Composite)
        .map(|f| f.name)
        .collect();

    let mut unknown: Vec<String> = Vec::new();
    for name in placeholders(template) {
        if !scalars.contains(&name.as_str()) && !unknown.contains(&name) {
            unknown.push(name);
        }
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidTemplate(unknown))
    }
}

/// A video as one line of output: the video's own fields plus its position
/// in the result list and derived values.
pub struct VideoRow<'a> {
    pub video: &'a Video,
    /// 1-based.
    pub index: usize,
}

impl<'a> VideoRow<'a> {
    pub fn new(video: &'a Video, index: usize) -> Self {
        Self { video, index }
    }
}

impl Fields for VideoRow<'_> {
    fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        Field::embed(&mut fields, self.video);
        fields.extend([
            Field::new("Index", FieldValue::Uint(self.index as u64)),
            Field::new("DurationString", FieldValue::Str(self.video.duration_string())),
            Field::new("Url", FieldValue::Str(self.video.url())),
            Field::new("ThumbnailUrl", FieldValue::Str(self.video.biggest_thumbnail().url)),
        ]);
        // A video that fails to serialize just leaves {Json} unreplaced.
        if let Ok(json) = serde_json::to_string(self.video) {
            fields.push(Field::new("Json", FieldValue::Str(json)));
        }
        fields
    }
}

/// Renders one line per video, numbering from 1.
pub fn format_videos(template: &str, videos: &[Video]) -> Vec<String> {
    videos
        .iter()
        .enumerate()
        .map(|(i, video)| format(template, &VideoRow::new(video, i + 1)))
        .collect()
}
