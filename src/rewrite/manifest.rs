//! Rebase the paths recorded in the web app manifest.

use serde_json::{Map, Value};

use crate::base_path::{BasePath, is_absolute_url};

/// Errors produced while interpreting manifest text.
#[derive(Debug)]
pub enum ManifestError {
  /// The manifest is not valid JSON.
  Parse(serde_json::Error),
  /// The manifest root is not a JSON object.
  Shape(&'static str),
}

/// Result of rebasing a manifest document.
#[derive(Debug, Clone)]
pub struct ManifestRewrite {
  /// Pretty printed manifest with a trailing newline.
  pub text: String,
  /// Whether `text` differs from the input.
  pub changed: bool,
  /// Number of icon `src` and shortcut `url` values that were rewritten.
  pub rebased_paths: usize,
}

/// Point `start_url`, `scope`, icons and shortcuts at `base`.
///
/// Local references are prefixed with `base`. References starting with `http` are left
/// alone. Field order and unknown fields are preserved.
///
/// `previous` is the base an earlier run wrote (read back from the service worker). Its
/// prefix is stripped first, but only when the manifest `scope` still equals that base,
/// so a hand-written scope never causes real path segments to be removed.
pub fn rewrite_manifest(
  source: &str,
  base: &BasePath,
  previous: Option<&BasePath>,
) -> Result<ManifestRewrite, ManifestError> {
  let mut document: Value = serde_json::from_str(source).map_err(ManifestError::Parse)?;
  let root = document
    .as_object_mut()
    .ok_or(ManifestError::Shape("manifest root must be a JSON object"))?;

  let scope = root.get("scope").and_then(Value::as_str);
  let previous = previous.filter(|previous| {
    !previous.is_root() && scope == Some(previous.with_trailing_slash().as_str())
  });
  let rebaser = Rebaser { base, previous };

  root.insert("start_url".into(), Value::String(base.with_trailing_slash()));
  root.insert("scope".into(), Value::String(base.with_trailing_slash()));

  let mut rebased_paths = 0;
  if let Some(icons) = root.get_mut("icons").and_then(Value::as_array_mut) {
    rebased_paths += rebaser.rebase_icons(icons);
  }

  if let Some(shortcuts) = root.get_mut("shortcuts").and_then(Value::as_array_mut) {
    for shortcut in shortcuts.iter_mut().filter_map(Value::as_object_mut) {
      rebased_paths += rebaser.rebase_shortcut(shortcut);
    }
  }

  let mut text = serde_json::to_string_pretty(&document).map_err(ManifestError::Parse)?;
  text.push('\n');
  let changed = text != source;

  Ok(ManifestRewrite {
    text,
    changed,
    rebased_paths,
  })
}

struct Rebaser<'a> {
  base: &'a BasePath,
  previous: Option<&'a BasePath>,
}

impl Rebaser<'_> {
  fn rebase_icons(&self, icons: &mut [Value]) -> usize {
    icons
      .iter_mut()
      .filter_map(|icon| icon.get_mut("src"))
      .map(|src| self.rebase_value(src))
      .filter(|changed| *changed)
      .count()
  }

  fn rebase_shortcut(&self, shortcut: &mut Map<String, Value>) -> usize {
    let mut count = 0;
    if let Some(url) = shortcut.get_mut("url")
      && self.rebase_value(url)
    {
      count += 1;
    }
    if let Some(icons) = shortcut.get_mut("icons").and_then(Value::as_array_mut) {
      count += self.rebase_icons(icons);
    }
    count
  }

  /// Rewrite a string value in place, returning `true` when it changed.
  fn rebase_value(&self, value: &mut Value) -> bool {
    let Value::String(current) = value else {
      return false;
    };
    if is_absolute_url(current) {
      return false;
    }

    let local = match self.previous {
      Some(previous) => previous.strip_from(current),
      None => current.as_str(),
    };
    let rebased = self.base.prefix(local);
    if rebased == *current {
      return false;
    }

    tracing::debug!(from = %current, to = %rebased, "rebased manifest path");
    *current = rebased;
    true
  }
}
