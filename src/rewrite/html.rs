//! Insert a `<base href>` tag into the application shell.

use std::sync::OnceLock;

use regex::Regex;

use crate::base_path::BasePath;

/// What happened to the HTML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlOutcome {
  /// A base tag was inserted after the charset declaration.
  Inserted,
  /// The document already declares a base tag; nothing was changed.
  AlreadyPresent,
  /// No `<meta charset="UTF-8">` anchor exists; nothing was changed.
  MissingCharset,
}

/// Result of rewriting the HTML shell.
#[derive(Debug, Clone)]
pub struct HtmlRewrite {
  /// Possibly updated document text.
  pub text: String,
  /// Outcome of the rewrite.
  pub outcome: HtmlOutcome,
}

impl HtmlRewrite {
  /// Whether the document needs to be written back.
  pub fn changed(&self) -> bool {
    self.outcome == HtmlOutcome::Inserted
  }
}

fn base_tag_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)<base\s+href").expect("invalid base tag regex"))
}

fn charset_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)<meta\s+charset\s*=\s*["']?utf-8["']?\s*/?>"#)
      .expect("invalid charset meta regex")
  })
}

/// Add `<base href="{base}/">` right after the first UTF-8 charset declaration.
///
/// An existing base tag is never touched, so running the tool again is a no-op for the
/// HTML shell even when the base path changed.
pub fn rewrite_index_html(source: &str, base: &BasePath) -> HtmlRewrite {
  if base_tag_pattern().is_match(source) {
    return HtmlRewrite {
      text: source.to_string(),
      outcome: HtmlOutcome::AlreadyPresent,
    };
  }

  let Some(anchor) = charset_pattern().find(source) else {
    tracing::warn!("no <meta charset=\"UTF-8\"> found; base tag not inserted");
    return HtmlRewrite {
      text: source.to_string(),
      outcome: HtmlOutcome::MissingCharset,
    };
  };

  let href = base.with_trailing_slash();
  let tag = format!(
    "\n{}<base href=\"{}\">",
    line_indent(source, anchor.start()),
    html_escape::encode_double_quoted_attribute(&href)
  );

  let mut text = String::with_capacity(source.len() + tag.len());
  text.push_str(&source[..anchor.end()]);
  text.push_str(&tag);
  text.push_str(&source[anchor.end()..]);

  HtmlRewrite {
    text,
    outcome: HtmlOutcome::Inserted,
  }
}

/// Leading whitespace of the line containing byte offset `at`.
fn line_indent(source: &str, at: usize) -> &str {
  let line_start = source[..at].rfind('\n').map_or(0, |index| index + 1);
  let prefix = &source[line_start..at];
  let indent_len = prefix.len() - prefix.trim_start().len();
  &prefix[..indent_len]
}
