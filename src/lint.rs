use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spdlog::{debug, info};

use crate::code_fence;
use crate::config::LintConfig;
use crate::post::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    FrontMatter,
    RequiredField,
    InvalidDate,
    MoreMarker,
    MoreMarkerSpacing,
    DuplicateUrl,
    UnclosedFence,
    UrlFormat,
    MissingDescription,
    AuthorMismatch,
}

impl Rule {
    pub fn id(&self) -> &'static str {
        match self {
            Rule::FrontMatter => "front-matter",
            Rule::RequiredField => "required-field",
            Rule::InvalidDate => "invalid-date",
            Rule::MoreMarker => "more-marker",
            Rule::MoreMarkerSpacing => "more-marker-spacing",
            Rule::DuplicateUrl => "duplicate-url",
            Rule::UnclosedFence => "unclosed-fence",
            Rule::UrlFormat => "url-format",
            Rule::MissingDescription => "missing-description",
            Rule::AuthorMismatch => "author-mismatch",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Rule::MoreMarkerSpacing
            | Rule::UrlFormat
            | Rule::MissingDescription
            | Rule::AuthorMismatch => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintIssue {
    pub file: PathBuf,
    pub line: Option<usize>,
    pub rule: Rule,
    pub severity: Severity,
    pub message: String,
}

impl Display for LintIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: ", self.file.display(), line)?,
            None => write!(f, "{}: ", self.file.display())?,
        }
        write!(f, "{}[{}]: {}", self.severity, self.rule, self.message)
    }
}

#[derive(Debug, Default, Serialize)]
pub struct LintReport {
    pub files_checked: usize,
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn sort(&mut self) {
        self.issues.sort_by(|a, b| {
            a.file.cmp(&b.file)
                .then_with(|| a.line.cmp(&b.line))
                .then_with(|| b.severity.cmp(&a.severity))
        });
    }
}

impl Display for LintReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for issue in self.issues.iter() {
            writeln!(f, "{}", issue)?;
        }
        write!(f, "{} files checked, {} errors, {} warnings",
               self.files_checked, self.error_count(), self.warning_count())
    }
}

// Urls are compared without surrounding blanks and trailing slashes
fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let trimmed = url.trim_end_matches('/');
    if trimmed.is_empty() {
        url.to_string()
    } else {
        trimmed.to_string()
    }
}

pub struct Linter {
    required_fields: Vec<String>,
    disabled: HashSet<Rule>,
    author: Option<String>,
}

/// First post seen with each normalized url.
pub type SeenUrls = HashMap<String, PathBuf>;

impl Linter {
    pub fn new(config: &LintConfig, author: Option<String>) -> Linter {
        Linter {
            required_fields: config.required_fields.clone(),
            disabled: config.disabled_rules.iter().copied().collect(),
            author,
        }
    }

    fn push(&self, issues: &mut Vec<LintIssue>, file: &Path, line: Option<usize>, rule: Rule, message: String) {
        if self.disabled.contains(&rule) {
            return;
        }
        issues.push(LintIssue {
            file: file.to_path_buf(),
            line,
            rule,
            severity: rule.severity(),
            message,
        });
    }

    /// Lints every file. Files are checked in the given order, which decides
    /// which post keeps a duplicated url.
    pub fn lint_posts(&self, files: &[PathBuf]) -> LintReport {
        let mut report = LintReport::default();
        let mut urls = SeenUrls::new();

        for file in files {
            report.files_checked += 1;
            debug!("Linting {}", file.display());
            match fs::read_to_string(file) {
                Ok(raw) => self.lint_source(file, &raw, &mut urls, &mut report.issues),
                Err(e) => {
                    let message = format!("Unable to read post: {}", e);
                    self.push(&mut report.issues, file, None, Rule::FrontMatter, message);
                }
            }
        }

        report.sort();
        info!("Linted {} posts: {} errors, {} warnings",
              report.files_checked, report.error_count(), report.warning_count());
        report
    }

    /// Lints a single post whose content is already loaded.
    pub fn lint_source(&self, file: &Path, raw: &str, urls: &mut SeenUrls, issues: &mut Vec<LintIssue>) {
        let post = match Post::from_string(file, raw) {
            Ok(post) => post,
            Err(e) => {
                self.push(issues, file, e.line().or(Some(1)), Rule::FrontMatter, e.to_string());
                return;
            }
        };

        self.check_required_fields(&post, issues);
        self.check_date(&post, issues);
        self.check_more_markers(&post, issues);
        self.check_fences(&post, issues);
        self.check_url(&post, urls, issues);
        self.check_description(&post, issues);
        self.check_author(&post, issues);
    }

    fn check_required_fields(&self, post: &Post, issues: &mut Vec<LintIssue>) {
        for field in self.required_fields.iter() {
            if post.front_matter.has_value(field) {
                continue;
            }
            let (line, message) = match post.key_line(field) {
                Some(line) => (line, format!("`{}` is empty", field)),
                None => (post.block_line, format!("`{}` is missing", field)),
            };
            self.push(issues, &post.file_path, Some(line), Rule::RequiredField, message);
        }
    }

    fn check_date(&self, post: &Post, issues: &mut Vec<LintIssue>) {
        if !post.front_matter.has_value("date") {
            return;
        }
        if let Err(e) = post.front_matter.published() {
            self.push(issues, &post.file_path, post.key_line("date"), Rule::InvalidDate, e);
        }
    }

    fn check_more_markers(&self, post: &Post, issues: &mut Vec<LintIssue>) {
        for line in post.spaced_more_markers() {
            let message = "spaced more marker does not split the summary, write `<!--more-->`".to_string();
            self.push(issues, &post.file_path, Some(line), Rule::MoreMarkerSpacing, message);
        }

        let markers = post.more_markers();
        if markers.len() < 2 {
            return;
        }
        for line in markers.iter().skip(1) {
            let message = format!("`<!--more-->` appears {} times, first on line {}", markers.len(), markers[0]);
            self.push(issues, &post.file_path, Some(*line), Rule::MoreMarker, message);
        }
    }

    fn check_fences(&self, post: &Post, issues: &mut Vec<LintIssue>) {
        for fence in code_fence::scan(&post.body).iter().filter(|f| !f.is_closed()) {
            let message = match fence.language() {
                Some(lang) => format!("`{}` code block is never closed", lang),
                None => "code block is never closed".to_string(),
            };
            let line = post.file_line(fence.start_line);
            self.push(issues, &post.file_path, Some(line), Rule::UnclosedFence, message);
        }
    }

    fn check_url(&self, post: &Post, urls: &mut SeenUrls, issues: &mut Vec<LintIssue>) {
        let Some(url) = post.front_matter.url.as_deref() else {
            return;
        };
        if url.trim().is_empty() {
            return;
        }

        let line = post.key_line("url");
        if !url.trim().starts_with('/') {
            let message = format!("url `{}` should start with `/`", url);
            self.push(issues, &post.file_path, line, Rule::UrlFormat, message);
        }

        let key = normalize_url(url);
        match urls.get(&key) {
            Some(first) => {
                let message = format!("url `{}` is already used by {}", url, first.display());
                self.push(issues, &post.file_path, line, Rule::DuplicateUrl, message);
            }
            None => {
                urls.insert(key, post.file_path.clone());
            }
        }
    }

    fn check_description(&self, post: &Post, issues: &mut Vec<LintIssue>) {
        if self.required_fields.iter().any(|f| f == "description") {
            // Already reported as a required field
            return;
        }
        if !post.front_matter.has_value("description") {
            let line = post.key_line("description").unwrap_or(post.block_line);
            let message = "`description` is missing, the generator falls back to the summary".to_string();
            self.push(issues, &post.file_path, Some(line), Rule::MissingDescription, message);
        }
    }

    fn check_author(&self, post: &Post, issues: &mut Vec<LintIssue>) {
        let (Some(expected), Some(author)) = (self.author.as_deref(), post.front_matter.author.as_deref()) else {
            return;
        };
        if author.trim().is_empty() || author.trim() == expected {
            return;
        }
        let message = format!("author `{}` differs from `{}`", author, expected);
        self.push(issues, &post.file_path, post.key_line("author"), Rule::AuthorMismatch, message);
    }
}
