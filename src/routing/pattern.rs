//! URL pattern templates.
//!
//! # Responsibilities
//! - Validate a template (`/{language}/{version}/{filename}`) for its kind
//! - Compile it into an anchored regex with one named group per field
//! - Wrap trailing fields in nested optional groups so incomplete paths
//!   still match and can be redirected to their complete form
//! - Reverse a template into a literal path from field values
//!
//! # Design Decisions
//! - Literal template text is a regex fragment, so authors can write
//!   optional groups such as `/s/{subproject}(/{filename})?`
//! - Field validation scans braces before any substitution, so malformed
//!   braces are reported as unknown fields rather than regex errors
//! - Reversal works on the original template, never on the wrapped regex

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

static FIELD_SCAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("field scan regex is valid"));

const LANGUAGE_GRAMMAR: &str = r"[a-zA-Z]{2,3}(?:[-_][a-zA-Z0-9]{2,8})*";
const VERSION_GRAMMAR: &str = r"[a-zA-Z0-9][a-zA-Z0-9._-]*";
const SUBPROJECT_GRAMMAR: &str = r"[a-zA-Z0-9][a-zA-Z0-9_-]*";
const FILENAME_GRAMMAR: &str = r".*";

/// Errors raised while compiling or reversing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("pattern `{template}` is missing required field `{{{field}}}`")]
    MissingRequiredField { template: String, field: &'static str },

    #[error("pattern `{template}` uses unknown field `{field}`")]
    UnknownField { template: String, field: String },

    #[error("pattern `{template}` is not a valid regex: {message}")]
    InvalidRegex { template: String, message: String },

    #[error("`{{filename}}` must be the last field in pattern `{0}`")]
    MisplacedFilenameField(String),

    #[error("no value for field `{{{field}}}` in pattern `{template}`")]
    MissingValue { template: String, field: &'static str },
}

/// A replacement field of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Language,
    Version,
    Subproject,
    Filename,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Language => "language",
            Field::Version => "version",
            Field::Subproject => "subproject",
            Field::Filename => "filename",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "language" => Some(Field::Language),
            "version" => Some(Field::Version),
            "subproject" => Some(Field::Subproject),
            "filename" => Some(Field::Filename),
            _ => None,
        }
    }

    fn grammar(self) -> &'static str {
        match self {
            Field::Language => LANGUAGE_GRAMMAR,
            Field::Version => VERSION_GRAMMAR,
            Field::Subproject => SUBPROJECT_GRAMMAR,
            Field::Filename => FILENAME_GRAMMAR,
        }
    }

    fn capture_group(self) -> String {
        format!("(?P<{}>{})", self.name(), self.grammar())
    }
}

/// What a template describes, which decides its allowed and required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// Multi-version documents: `{language}` and `{version}` required.
    Document,
    /// Single-version documents: only `{filename}`.
    SingleVersion,
    /// Subproject mounts: `{subproject}` required.
    Subproject,
}

impl PatternKind {
    fn allowed(self) -> &'static [Field] {
        match self {
            PatternKind::Document => &[Field::Language, Field::Version, Field::Filename],
            PatternKind::SingleVersion => &[Field::Filename],
            PatternKind::Subproject => &[Field::Subproject, Field::Filename],
        }
    }

    fn required(self) -> &'static [Field] {
        match self {
            PatternKind::Document => &[Field::Language, Field::Version],
            PatternKind::SingleVersion => &[Field::Filename],
            PatternKind::Subproject => &[Field::Subproject],
        }
    }
}

/// Template node used for reversal.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Field(Field),
    Group { optional: bool, nodes: Vec<Node> },
}

/// Field values captured from a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternMatch<'p> {
    values: HashMap<Field, &'p str>,
}

impl<'p> PatternMatch<'p> {
    pub fn get(&self, field: Field) -> Option<&'p str> {
        self.values.get(&field).copied()
    }
}

/// An immutable, validated template with its matching regex.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    template: String,
    kind: PatternKind,
    regex: Regex,
    fields: Vec<Field>,
    nodes: Vec<Node>,
    static_prefix: String,
}

impl CompiledPattern {
    /// Validate and compile `template`.
    pub fn compile(template: &str, kind: PatternKind) -> Result<Self, PatternError> {
        if !template.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(template.to_string()));
        }

        let fields = scan_fields(template, kind)?;
        if let Some(missing) = kind.required().iter().find(|f| !fields.contains(*f)) {
            return Err(PatternError::MissingRequiredField {
                template: template.to_string(),
                field: missing.name(),
            });
        }
        if let Some(position) = fields.iter().position(|f| *f == Field::Filename) {
            if position + 1 != fields.len() {
                return Err(PatternError::MisplacedFilenameField(template.to_string()));
            }
        }

        let source = regex_source(template, &fields);
        let regex = Regex::new(&source).map_err(|e| PatternError::InvalidRegex {
            template: template.to_string(),
            message: e.to_string(),
        })?;

        let nodes = parse_nodes(template);
        let static_prefix: String = nodes
            .iter()
            .map_while(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();

        Ok(Self {
            template: template.to_string(),
            kind,
            regex,
            fields,
            nodes,
            static_prefix,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Fields in the order they appear in the template.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Literal text before the first field or group, e.g. `/projects/`.
    pub fn static_prefix(&self) -> &str {
        &self.static_prefix
    }

    /// Match `path`, returning the fields that participated.
    pub fn match_path<'p>(&self, path: &'p str) -> Option<PatternMatch<'p>> {
        let caps = self.regex.captures(path)?;
        let values = self
            .fields
            .iter()
            .filter_map(|field| caps.name(field.name()).map(|m| (*field, m.as_str())))
            .collect();
        Some(PatternMatch { values })
    }

    /// Build the literal path for `values`.
    ///
    /// Optional groups whose fields have no value are dropped; a missing
    /// value anywhere else is an error.
    pub fn reverse(&self, values: &HashMap<Field, &str>) -> Result<String, PatternError> {
        let mut out = String::with_capacity(self.template.len() + 32);
        render(&self.nodes, values, &mut out).map_err(|field| PatternError::MissingValue {
            template: self.template.clone(),
            field: field.name(),
        })?;
        Ok(out)
    }
}

/// Collect fields in template order, rejecting anything outside `kind`.
fn scan_fields(template: &str, kind: PatternKind) -> Result<Vec<Field>, PatternError> {
    let mut fields = Vec::new();
    for caps in FIELD_SCAN.captures_iter(template) {
        match Field::from_name(&caps[1]).filter(|f| kind.allowed().contains(f)) {
            Some(field) => fields.push(field),
            None => {
                return Err(PatternError::UnknownField {
                    template: template.to_string(),
                    field: caps[0].to_string(),
                })
            }
        }
    }

    let remainder = FIELD_SCAN.replace_all(template, "");
    if let Some(start) = remainder.find(['{', '}']) {
        let stray: String = remainder[start..].chars().take_while(|c| *c != '/').collect();
        return Err(PatternError::UnknownField {
            template: template.to_string(),
            field: stray,
        });
    }
    Ok(fields)
}

/// Build the anchored regex source: `S1/…/Sk` up to the first field, then
/// every later segment nested as `(/(S(/(…)?)?)?)?`.
fn regex_source(template: &str, fields: &[Field]) -> String {
    let body = &template[1..];
    let segments = split_top_level(body);
    let substitute = |segment: &str| -> String {
        FIELD_SCAN
            .replace_all(segment, |caps: &Captures| {
                Field::from_name(&caps[1])
                    .map(Field::capture_group)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    };

    let mut source = String::from("^/");
    match segments.iter().position(|s| FIELD_SCAN.is_match(s)) {
        None => source.push_str(&substitute(body)),
        Some(first) => {
            let leading: Vec<String> = segments[..=first].iter().map(|s| substitute(*s)).collect();
            source.push_str(&leading.join("/"));

            let trailing = &segments[first + 1..];
            if fields.len() == 1 && first == 0 {
                // `/{filename}`: the lone field is mandatory and greedy.
                for segment in trailing.iter().copied() {
                    source.push('/');
                    source.push_str(&substitute(segment));
                }
            } else {
                source.push_str(&wrap_optional(trailing, &substitute));
            }
        }
    }

    if !fields.contains(&Field::Filename) {
        source.push_str("/?");
    }
    source.push('$');
    source
}

fn wrap_optional(segments: &[&str], substitute: &dyn Fn(&str) -> String) -> String {
    let Some((head, tail)) = segments.split_first() else {
        return String::new();
    };
    let inner = format!("{}{}", substitute(*head), wrap_optional(tail, substitute));
    if *head == "{filename}" {
        // Already matches the empty string.
        format!("(?:/{inner})?")
    } else {
        format!("(?:/(?:{inner})?)?")
    }
}

/// Split on `/` outside of groups, classes and escapes.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                segments.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&body[start..]);
    segments
}

/// Parse a template into text, fields and (optional) groups.
fn parse_nodes(template: &str) -> Vec<Node> {
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];
    let mut text = String::new();
    let mut chars = template.chars().peekable();

    let flush = |text: &mut String, stack: &mut Vec<Vec<Node>>| {
        if !text.is_empty() {
            if let Some(top) = stack.last_mut() {
                top.push(Node::Text(std::mem::take(text)));
            }
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    text.push(escaped);
                }
            }
            '{' => {
                let name: String = chars.by_ref().take_while(|c| *c != '}').collect();
                flush(&mut text, &mut stack);
                let node = match Field::from_name(&name) {
                    Some(field) => Node::Field(field),
                    None => Node::Text(format!("{{{name}}}")),
                };
                if let Some(top) = stack.last_mut() {
                    top.push(node);
                }
            }
            '(' => {
                flush(&mut text, &mut stack);
                if chars.peek() == Some(&'?') {
                    chars.next();
                    if chars.peek() == Some(&':') {
                        chars.next();
                    }
                }
                stack.push(Vec::new());
            }
            ')' if stack.len() > 1 => {
                flush(&mut text, &mut stack);
                let optional = chars.peek() == Some(&'?');
                if optional {
                    chars.next();
                }
                let nodes = stack.pop().unwrap_or_default();
                if let Some(top) = stack.last_mut() {
                    top.push(Node::Group { optional, nodes });
                }
            }
            // Quantifiers and anchors have no literal rendering.
            '?' | '^' | '$' => {}
            _ => text.push(c),
        }
    }
    flush(&mut text, &mut stack);

    while stack.len() > 1 {
        let nodes = stack.pop().unwrap_or_default();
        if let Some(top) = stack.last_mut() {
            top.push(Node::Group { optional: false, nodes });
        }
    }
    stack.pop().unwrap_or_default()
}

fn render(nodes: &[Node], values: &HashMap<Field, &str>, out: &mut String) -> Result<(), Field> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Field(field) => out.push_str(values.get(field).ok_or(*field)?),
            Node::Group { optional, nodes } => {
                let mut group = String::new();
                match render(nodes, values, &mut group) {
                    Ok(()) => out.push_str(&group),
                    Err(_) if *optional => {}
                    Err(field) => return Err(field),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(template: &str) -> CompiledPattern {
        CompiledPattern::compile(template, PatternKind::Document).unwrap()
    }

    fn values<'a>(pairs: &[(Field, &'a str)]) -> HashMap<Field, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_requires_leading_slash() {
        let err = CompiledPattern::compile("{language}/{version}", PatternKind::Document).unwrap_err();
        assert!(matches!(err, PatternError::MissingLeadingSlash(_)));
    }

    #[test]
    fn test_requires_language_and_version() {
        let err = CompiledPattern::compile("/{language}/{filename}", PatternKind::Document).unwrap_err();
        assert_eq!(
            err,
            PatternError::MissingRequiredField {
                template: "/{language}/{filename}".into(),
                field: "version"
            }
        );
        let err = CompiledPattern::compile("/docs/{filename}", PatternKind::Subproject).unwrap_err();
        assert!(matches!(err, PatternError::MissingRequiredField { field: "subproject", .. }));
    }

    #[test]
    fn test_unknown_and_malformed_fields() {
        let err = CompiledPattern::compile("/{lang}/{version}", PatternKind::Document).unwrap_err();
        assert!(matches!(err, PatternError::UnknownField { ref field, .. } if field == "{lang}"));

        let err = CompiledPattern::compile("/{language}/{version", PatternKind::Document).unwrap_err();
        assert!(matches!(err, PatternError::UnknownField { .. }));

        // Subproject is not a document field.
        let err = CompiledPattern::compile("/{subproject}/{language}/{version}", PatternKind::Document)
            .unwrap_err();
        assert!(matches!(err, PatternError::UnknownField { .. }));
    }

    #[test]
    fn test_filename_must_be_last() {
        let err = CompiledPattern::compile("/{filename}/{language}/{version}", PatternKind::Document)
            .unwrap_err();
        assert!(matches!(err, PatternError::MisplacedFilenameField(_)));
    }

    #[test]
    fn test_invalid_regex_literal() {
        let err = CompiledPattern::compile("/docs)/{language}/{version}", PatternKind::Document)
            .unwrap_err();
        assert!(matches!(err, PatternError::InvalidRegex { .. }));
    }

    #[test]
    fn test_default_pattern_matches_complete_path() {
        let pattern = compile("/{language}/{version}/{filename}");
        let m = pattern.match_path("/en/latest/guide/install.html").unwrap();
        assert_eq!(m.get(Field::Language), Some("en"));
        assert_eq!(m.get(Field::Version), Some("latest"));
        assert_eq!(m.get(Field::Filename), Some("guide/install.html"));

        let m = pattern.match_path("/en/latest/").unwrap();
        assert_eq!(m.get(Field::Filename), Some(""));
    }

    #[test]
    fn test_wrapping_accepts_partial_paths() {
        let pattern = compile("/{language}/{version}/{filename}");

        let m = pattern.match_path("/en/latest").unwrap();
        assert_eq!(m.get(Field::Version), Some("latest"));
        assert_eq!(m.get(Field::Filename), None);

        let m = pattern.match_path("/en/").unwrap();
        assert_eq!(m.get(Field::Language), Some("en"));
        assert_eq!(m.get(Field::Version), None);

        let m = pattern.match_path("/en").unwrap();
        assert_eq!(m.get(Field::Version), None);

        assert!(pattern.match_path("/").is_none());
        assert!(pattern.match_path("/projects/sub/").is_none());
    }

    #[test]
    fn test_single_field_is_not_wrapped() {
        let pattern = CompiledPattern::compile("/{filename}", PatternKind::SingleVersion).unwrap();
        assert_eq!(pattern.regex().as_str(), "^/(?P<filename>.*)$");
        assert_eq!(pattern.match_path("/a/b.html").unwrap().get(Field::Filename), Some("a/b.html"));
        assert_eq!(pattern.match_path("/").unwrap().get(Field::Filename), Some(""));
    }

    #[test]
    fn test_pattern_without_filename_allows_trailing_slash() {
        let pattern = compile("/{version}/{language}");
        assert!(pattern.match_path("/latest/en").is_some());
        assert!(pattern.match_path("/latest/en/").is_some());
        assert!(pattern.match_path("/latest/en/page.html").is_none());
    }

    #[test]
    fn test_reverse_builds_literal_paths() {
        let pattern = compile("/{version}/{language}/{filename}");
        let path = pattern
            .reverse(&values(&[
                (Field::Language, "es"),
                (Field::Version, "1.0"),
                (Field::Filename, "index.html"),
            ]))
            .unwrap();
        assert_eq!(path, "/1.0/es/index.html");

        let err = pattern.reverse(&values(&[(Field::Language, "es")])).unwrap_err();
        assert!(matches!(err, PatternError::MissingValue { field: "version", .. }));
    }

    #[test]
    fn test_user_optional_groups() {
        let pattern =
            CompiledPattern::compile("/s/{subproject}(/{filename})?", PatternKind::Subproject).unwrap();
        let m = pattern.match_path("/s/subproject/en/latest/").unwrap();
        assert_eq!(m.get(Field::Subproject), Some("subproject"));
        assert_eq!(m.get(Field::Filename), Some("en/latest/"));
        assert_eq!(pattern.match_path("/s/subproject").unwrap().get(Field::Filename), None);

        let full = pattern
            .reverse(&values(&[(Field::Subproject, "subproject"), (Field::Filename, "en/latest/")]))
            .unwrap();
        assert_eq!(full, "/s/subproject/en/latest/");
        let bare = pattern.reverse(&values(&[(Field::Subproject, "subproject")])).unwrap();
        assert_eq!(bare, "/s/subproject");
    }

    #[test]
    fn test_static_prefix_and_escapes() {
        let pattern = CompiledPattern::compile(
            r"/sub\.docs/{subproject}/{filename}",
            PatternKind::Subproject,
        )
        .unwrap();
        assert_eq!(pattern.static_prefix(), "/sub.docs/");
        assert!(pattern.match_path("/sub.docs/api/").is_some());
        assert!(pattern.match_path("/subXdocs/api/").is_none());
    }
}
