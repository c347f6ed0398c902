//! Keep the service worker's cached asset paths in sync with the deployment base path.

use std::sync::OnceLock;

use regex::{NoExpand, Regex};

use crate::base_path::BasePath;
use crate::rewrite::asset_list::{AssetListPattern, BASE_PATH_IDENT};

/// How the `BASE_PATH` declaration was brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationEdit {
  /// No declaration existed, one was inserted after the first line.
  Inserted,
  /// Existing literal declarations (usually exactly one) were given the new value.
  Updated(usize),
  /// A declaration exists but its value is not a plain string literal; it was left alone.
  Computed,
}

/// Result of rewriting a service worker script.
#[derive(Debug, Clone)]
pub struct ServiceWorkerRewrite {
  /// Rewritten script text.
  pub text: String,
  /// Whether `text` differs from the input.
  pub changed: bool,
  /// Edit applied to the `BASE_PATH` declaration.
  pub declaration: DeclarationEdit,
  /// Number of asset literals newly concatenated onto `BASE_PATH`.
  pub rebased_assets: usize,
  /// Whether the asset array was found at all.
  pub asset_list_found: bool,
}

/// Any `const BASE_PATH` declaration, whatever its value.
fn any_declaration_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(&format!(r"\bconst\s+{}\b", BASE_PATH_IDENT))
      .expect("invalid BASE_PATH presence regex")
  })
}

/// A declaration whose whole value is one string literal, with or without a semicolon.
fn literal_declaration_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(&format!(
      r#"(?m)\bconst\s+{}\s*=\s*(?:'(?P<single>(?:[^'\\\n]|\\.)*)'|"(?P<double>(?:[^"\\\n]|\\.)*)")[ \t]*(?:;|$)"#,
      BASE_PATH_IDENT
    ))
    .expect("invalid BASE_PATH declaration regex")
  })
}

/// Base path currently assigned to `BASE_PATH`, when it is declared as a plain literal.
pub fn declared_base_path(source: &str) -> Option<BasePath> {
  let caps = literal_declaration_pattern().captures(source)?;
  let raw = caps.name("single").or_else(|| caps.name("double"))?.as_str();
  Some(BasePath::new(&unescape_js(raw)))
}

/// Update the `BASE_PATH` declaration and rebase the known entries of the asset array.
///
/// Only literals inside the array named `list_name` are touched, and only when their
/// value appears in `known_assets`. Literals already written as `BASE_PATH + '...'` are
/// left as they are, which makes the rewrite idempotent.
pub fn rewrite_service_worker(
  source: &str,
  base: &BasePath,
  list_name: &str,
  known_assets: &[String],
) -> ServiceWorkerRewrite {
  let asset_list = AssetListPattern::new(list_name);
  let declaration_line = format!(
    "const {} = '{}';",
    BASE_PATH_IDENT,
    escape_single_quoted(base.as_str())
  );

  let existing = any_declaration_pattern().find_iter(source).count();
  let literals = literal_declaration_pattern().find_iter(source).count();
  let (mut text, declaration) = if existing == 0 {
    (
      insert_after_first_line(source, &declaration_line),
      DeclarationEdit::Inserted,
    )
  } else if literals == 0 {
    tracing::warn!("{BASE_PATH_IDENT} is not declared as a string literal; leaving its value alone");
    (source.to_string(), DeclarationEdit::Computed)
  } else {
    if literals < existing {
      tracing::warn!(
        "{} of {existing} {BASE_PATH_IDENT} declarations are computed and were left alone",
        existing - literals
      );
    }
    let replaced = literal_declaration_pattern()
      .replace_all(source, NoExpand(&declaration_line))
      .into_owned();
    (replaced, DeclarationEdit::Updated(literals))
  };

  let (rebased_assets, asset_list_found) = match asset_list.find(&text) {
    Some(list) => {
      let mut spans: Vec<usize> = list
        .unprefixed(known_assets)
        .map(|entry| {
          tracing::debug!(asset = %entry.value, "rebased service worker asset");
          entry.span.start
        })
        .collect();
      spans.sort_unstable_by(|a, b| b.cmp(a));
      let prefix = format!("{BASE_PATH_IDENT} + ");
      for start in &spans {
        text.insert_str(*start, &prefix);
      }
      (spans.len(), true)
    }
    None => {
      tracing::warn!("no `{list_name}` array found in service worker; only {BASE_PATH_IDENT} was updated");
      (0, false)
    }
  };

  let changed = text != source;
  ServiceWorkerRewrite {
    text,
    changed,
    declaration,
    rebased_assets,
    asset_list_found,
  }
}

fn insert_after_first_line(source: &str, line: &str) -> String {
  match source.find('\n') {
    Some(index) => format!("{}\n{}{}", &source[..index], line, &source[index..]),
    None => format!("{source}\n{line}"),
  }
}

fn escape_single_quoted(value: &str) -> String {
  value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn unescape_js(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars();
  while let Some(c) = chars.next() {
    match c {
      '\\' => out.extend(chars.next()),
      other => out.push(other),
    }
  }
  out
}
