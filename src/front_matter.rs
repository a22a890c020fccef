use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text_utils::parse_date_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontMatterFormat {
    Yaml,
    Toml,
}

impl FrontMatterFormat {
    pub fn delimiter(&self) -> &'static str {
        match self {
            FrontMatterFormat::Yaml => "---",
            FrontMatterFormat::Toml => "+++",
        }
    }

    fn from_delimiter(line: &str) -> Option<FrontMatterFormat> {
        match line {
            "---" => Some(FrontMatterFormat::Yaml),
            "+++" => Some(FrontMatterFormat::Toml),
            _ => None,
        }
    }
}

impl Display for FrontMatterFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FrontMatterFormat::Yaml => write!(f, "YAML"),
            FrontMatterFormat::Toml => write!(f, "TOML"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FrontMatterError {
    #[error("front-matter is missing, the file must start with `---` or `+++`")]
    Missing { line: usize },
    #[error("{format} front-matter is not terminated")]
    Unterminated { format: FrontMatterFormat, line: usize },
    #[error("invalid YAML front-matter: {message}")]
    Yaml { message: String, line: Option<usize> },
    #[error("invalid TOML front-matter: {message}")]
    Toml { message: String, line: Option<usize> },
    #[error("front-matter must be a key/value mapping")]
    NotAMapping { line: usize },
}

impl FrontMatterError {
    /// File line the error points at, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            FrontMatterError::Missing { line }
            | FrontMatterError::Unterminated { line, .. }
            | FrontMatterError::NotAMapping { line } => Some(*line),
            FrontMatterError::Yaml { line, .. } | FrontMatterError::Toml { line, .. } => *line,
        }
    }
}

/// The delimited block of a post, not parsed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrontMatter<'a> {
    pub format: FrontMatterFormat,
    pub block: &'a str,
    /// 1-based line of the first line inside the block.
    pub block_line: usize,
    pub body: &'a str,
    /// 1-based line of the first body line.
    pub body_line: usize,
}

/// Metadata of a post.
///
/// Every field is optional here, presence is checked by the linter. Keys not known
/// to this struct are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FrontMatter {
    pub fn published(&self) -> Result<DateTime<FixedOffset>, String> {
        match self.date {
            Some(ref date) => parse_date_time(date),
            None => Err("date is missing".to_string()),
        }
    }

    pub fn is_draft(&self) -> bool {
        self.draft.unwrap_or(false)
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn categories(&self) -> &[String] {
        self.categories.as_deref().unwrap_or_default()
    }

    /// True when `key` is set to something other than blank text, an empty list or null.
    pub fn has_value(&self, key: &str) -> bool {
        fn text(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|s| !s.trim().is_empty())
        }

        fn list(value: &Option<Vec<String>>) -> bool {
            value.as_ref().is_some_and(|items| !items.is_empty())
        }

        match key {
            "title" => text(&self.title),
            "date" => text(&self.date),
            "draft" => self.draft.is_some(),
            "tags" => list(&self.tags),
            "categories" => list(&self.categories),
            "author" => text(&self.author),
            "description" => text(&self.description),
            "more_link" => text(&self.more_link),
            "url" => text(&self.url),
            other => match self.extra.get(other) {
                None | Some(serde_json::Value::Null) => false,
                Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
                Some(serde_json::Value::Array(items)) => !items.is_empty(),
                Some(_) => true,
            },
        }
    }

    /// Serializes the front-matter, delimiters included.
    pub fn render(&self, format: FrontMatterFormat) -> Result<String, FrontMatterError> {
        let block = match format {
            FrontMatterFormat::Yaml => serde_yaml::to_string(self)
                .map_err(|e| FrontMatterError::Yaml { message: e.to_string(), line: None })?,
            FrontMatterFormat::Toml => toml::to_string(self)
                .map_err(|e| FrontMatterError::Toml { message: e.to_string(), line: None })?,
        };
        Ok(format!("{0}\n{1}{0}\n", format.delimiter(), block))
    }
}

/// Finds the front-matter block of a post and the body that follows it.
///
/// A byte order mark and blank lines before the opening delimiter are skipped. The
/// closing delimiter must be the same as the opening one.
pub fn split(raw: &str) -> Result<RawFrontMatter<'_>, FrontMatterError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = raw.split_inclusive('\n');
    let mut offset = 0;
    let mut line_no = 0;

    let format = loop {
        let Some(line) = lines.next() else {
            return Err(FrontMatterError::Missing { line: line_no.max(1) });
        };
        offset += line.len();
        line_no += 1;

        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        match FrontMatterFormat::from_delimiter(line) {
            Some(format) => break format,
            None => return Err(FrontMatterError::Missing { line: line_no }),
        }
    };

    let block_start = offset;
    let block_line = line_no + 1;
    for line in lines {
        let line_start = offset;
        offset += line.len();
        line_no += 1;

        if line.trim_end() == format.delimiter() {
            return Ok(RawFrontMatter {
                format,
                block: &raw[block_start..line_start],
                block_line,
                body: &raw[offset..],
                body_line: line_no + 1,
            });
        }
    }

    Err(FrontMatterError::Unterminated { format, line: block_line - 1 })
}

/// Splits and deserializes the front-matter of a post.
pub fn parse(raw: &str) -> Result<(FrontMatter, RawFrontMatter<'_>), FrontMatterError> {
    let raw = split(raw)?;
    let front_matter = match raw.format {
        FrontMatterFormat::Yaml => parse_yaml(raw.block, raw.block_line)?,
        FrontMatterFormat::Toml => parse_toml(raw.block, raw.block_line)?,
    };
    Ok((front_matter, raw))
}

// Errors without a location point at the first line of the block
fn yaml_error(e: serde_yaml::Error, block_line: usize) -> FrontMatterError {
    let line = match e.location() {
        Some(location) => location.line() + block_line - 1,
        None => block_line,
    };
    FrontMatterError::Yaml { message: e.to_string(), line: Some(line) }
}

fn toml_error(e: toml::de::Error, block: &str, block_line: usize) -> FrontMatterError {
    let line = match e.span() {
        Some(span) => block[..span.start.min(block.len())].matches('\n').count() + block_line,
        None => block_line,
    };
    FrontMatterError::Toml { message: e.message().to_string(), line: Some(line) }
}

fn parse_yaml(block: &str, block_line: usize) -> Result<FrontMatter, FrontMatterError> {
    if block.trim().is_empty() {
        return Ok(FrontMatter::default());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(block)
        .map_err(|e| yaml_error(e, block_line))?;
    match value {
        serde_yaml::Value::Null => Ok(FrontMatter::default()),
        serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value)
            .map_err(|e| yaml_error(e, block_line)),
        _ => Err(FrontMatterError::NotAMapping { line: block_line }),
    }
}

fn parse_toml(block: &str, block_line: usize) -> Result<FrontMatter, FrontMatterError> {
    let table: toml::Table = toml::from_str(block)
        .map_err(|e| toml_error(e, block, block_line))?;
    stringify_datetimes(toml::Value::Table(table))
        .try_into::<FrontMatter>()
        .map_err(|e| toml_error(e, block, block_line))
}

// TOML has native datetimes, dates are kept as text like in YAML.
fn stringify_datetimes(value: toml::Value) -> toml::Value {
    match value {
        toml::Value::Datetime(date_time) => toml::Value::String(date_time.to_string()),
        toml::Value::Array(items) => {
            toml::Value::Array(items.into_iter().map(stringify_datetimes).collect())
        }
        toml::Value::Table(table) => toml::Value::Table(
            table.into_iter().map(|(k, v)| (k, stringify_datetimes(v))).collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use crate::test_data::{POST_DATA_TOML, POST_DATA_YAML};

    use super::*;

    #[test]
    fn test_split_yaml() {
        let raw = split(POST_DATA_YAML).unwrap();
        assert_eq!(raw.format, FrontMatterFormat::Yaml);
        assert_eq!(raw.block_line, 2);
        assert!(raw.block.starts_with("title: \"Kubernetes Backup"));
        assert!(raw.body.starts_with("\nBacking up a cluster"));
        assert_eq!(raw.body_line, 12);
    }

    #[test]
    fn test_split_skips_bom_and_blank_lines() {
        let raw = split("\u{feff}\n\n+++\ntitle = \"x\"\n+++\nbody\n").unwrap();
        assert_eq!(raw.format, FrontMatterFormat::Toml);
        assert_eq!(raw.block, "title = \"x\"\n");
        assert_eq!(raw.block_line, 4);
        assert_eq!(raw.body, "body\n");
        assert_eq!(raw.body_line, 6);
    }

    #[test]
    fn test_split_errors() {
        assert_eq!(split("# Just a title\n"), Err(FrontMatterError::Missing { line: 1 }));
        assert_eq!(split(""), Err(FrontMatterError::Missing { line: 1 }));
        assert_eq!(split("\n\n# Just a title\n"), Err(FrontMatterError::Missing { line: 3 }));
        assert_eq!(
            split("\n---\ntitle: x\n+++\nbody\n"),
            Err(FrontMatterError::Unterminated { format: FrontMatterFormat::Yaml, line: 2 })
        );
    }

    #[test]
    fn test_parse_yaml() {
        let (fm, _) = parse(POST_DATA_YAML).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Kubernetes Backup and Disaster Recovery"));
        assert_eq!(fm.draft, Some(false));
        assert_eq!(fm.tags(), ["kubernetes", "backup", "velero"]);
        assert_eq!(fm.categories(), ["Kubernetes"]);
        assert_eq!(fm.more_link.as_deref(), Some("yes"));
        assert_eq!(fm.url.as_deref(), Some("/kubernetes-backup-dr/"));
        let published = fm.published().unwrap();
        assert_eq!(published.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_parse_toml() {
        let (fm, raw) = parse(POST_DATA_TOML).unwrap();
        assert_eq!(raw.format, FrontMatterFormat::Toml);
        assert_eq!(fm.title.as_deref(), Some("Tracing syscalls with eBPF"));
        // Native TOML datetime
        assert_eq!(fm.date.as_deref(), Some("2023-11-04T09:30:00-03:00"));
        assert!(fm.published().is_ok());
        assert_eq!(fm.tags(), ["linux", "ebpf"]);
        assert_eq!(fm.extra.get("slug"), Some(&serde_json::Value::String("ebpf-syscalls".to_string())));
    }

    #[test]
    fn test_parse_keeps_unknown_keys() {
        let (fm, _) = parse("---\ntitle: x\nlastmod: 2024-01-01\naliases: [/a/, /b/]\n---\n").unwrap();
        assert_eq!(fm.extra.len(), 2);
        assert!(fm.has_value("aliases"));
        assert!(fm.has_value("lastmod"));
        assert!(!fm.has_value("weight"));
    }

    #[test]
    fn test_parse_invalid() {
        let res = parse("---\ntitle: [unclosed\n---\n");
        assert!(matches!(res, Err(FrontMatterError::Yaml { .. })));

        let res = parse("---\n- just\n- a list\n---\n");
        assert_eq!(res.map(|(fm, _)| fm), Err(FrontMatterError::NotAMapping { line: 2 }));

        let res = parse("+++\ntitle = \n+++\n");
        assert!(matches!(res, Err(FrontMatterError::Toml { .. })));

        // tags must be a list
        let res = parse("---\ntitle: x\ntags: kubernetes\n---\n");
        assert!(matches!(res, Err(FrontMatterError::Yaml { .. })));
    }

    #[test]
    fn test_parse_error_lines() {
        let err = parse("\n\n---\ntitle: x\n  bad: y\n---\n").map(|(fm, _)| fm).unwrap_err();
        assert_eq!(err.line(), Some(5));

        let err = parse("+++\ntitle = \"x\"\ntitle = \"y\"\n+++\n").map(|(fm, _)| fm).unwrap_err();
        assert!(matches!(err, FrontMatterError::Toml { .. }));
        assert_eq!(err.line(), Some(3));

        // Type errors carry no location
        let err = parse("+++\ntitle = \"x\"\ntags = \"linux\"\n+++\n").map(|(fm, _)| fm).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_parse_empty_block() {
        let (fm, raw) = parse("---\n---\nbody\n").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(raw.body, "body\n");
    }

    #[test]
    fn test_has_value() {
        let fm = FrontMatter {
            title: Some("  ".to_string()),
            tags: Some(vec![]),
            url: Some("/a/".to_string()),
            ..Default::default()
        };
        assert!(!fm.has_value("title"));
        assert!(!fm.has_value("tags"));
        assert!(!fm.has_value("date"));
        assert!(fm.has_value("url"));
    }

    #[test]
    fn test_render_parses_back() {
        let fm = FrontMatter {
            title: Some("LVM thin pools".to_string()),
            date: Some("2024-02-27T06:20:53+00:00".to_string()),
            draft: Some(true),
            tags: Some(vec![]),
            categories: Some(vec!["Linux".to_string()]),
            more_link: Some("yes".to_string()),
            url: Some("/lvm-thin-pools/".to_string()),
            ..Default::default()
        };

        for format in [FrontMatterFormat::Yaml, FrontMatterFormat::Toml] {
            let rendered = fm.render(format).unwrap();
            assert!(rendered.starts_with(format.delimiter()));
            let (parsed, raw) = parse(&rendered).unwrap();
            assert_eq!(raw.format, format);
            assert_eq!(parsed, fm);
        }
    }
}
