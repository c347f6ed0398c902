//! Structured view of the asset array literal declared in a service worker.
//!
//! The scanner understands just enough JavaScript to find the top-level entries of a
//! `const NAME = [ ... ];` array: string literals, line and block comments, nested
//! brackets. Each entry that is a plain quoted literal (optionally already written as
//! `BASE_PATH + '...'`) is reported with its byte span so callers can splice edits into
//! the original text without disturbing formatting or comments.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Identifier used to build runtime paths in the service worker.
pub const BASE_PATH_IDENT: &str = "BASE_PATH";

/// A quoted string entry of the asset array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLiteral {
  /// Byte span of the quoted literal (quotes included) within the scanned source.
  pub span: Range<usize>,
  /// Literal contents without quotes.
  pub value: String,
  /// Quote character used in the source.
  pub quote: char,
  /// Whether the literal is already concatenated onto `BASE_PATH`.
  pub prefixed: bool,
}

/// Parsed asset array.
#[derive(Debug, Clone)]
pub struct AssetList {
  /// Byte span between the opening and closing brackets.
  pub body: Range<usize>,
  /// Quoted literal entries in source order. Non-literal entries are omitted.
  pub entries: Vec<AssetLiteral>,
}

impl AssetList {
  /// Entries whose value appears in `known` and which are not yet prefixed.
  pub fn unprefixed<'a>(
    &'a self,
    known: &'a [String],
  ) -> impl Iterator<Item = &'a AssetLiteral> + 'a {
    self
      .entries
      .iter()
      .filter(move |entry| !entry.prefixed && known.iter().any(|asset| *asset == entry.value))
  }
}

/// Compiled matcher for the declaration of one named asset array.
#[derive(Debug, Clone)]
pub struct AssetListPattern {
  header: Regex,
}

impl AssetListPattern {
  /// Build the matcher for `const|let|var <name> = [`.
  pub fn new(name: &str) -> Self {
    let header = Regex::new(&format!(
      r"\b(?:const|let|var)\s+{}\s*=\s*\[",
      regex::escape(name)
    ))
    .expect("invalid asset list regex");
    Self { header }
  }

  /// Locate and parse the array literal in `source`.
  ///
  /// Returns `None` when no declaration exists or the array is never closed.
  pub fn find(&self, source: &str) -> Option<AssetList> {
    let start = self.header.find(source)?.end();

    let scan = scan_array_body(source, start)?;
    let masked = scan.masked;
    let entries = scan
      .items
      .into_iter()
      .filter_map(|item| classify_entry(&masked, source, item))
      .collect();

    Some(AssetList {
      body: start..scan.end,
      entries,
    })
  }
}

/// Locate and parse the array literal assigned to `name`.
pub fn find_asset_list(source: &str, name: &str) -> Option<AssetList> {
  AssetListPattern::new(name).find(source)
}

struct ArrayScan {
  end: usize,
  items: Vec<Range<usize>>,
  /// Copy of the source with comment bytes blanked so byte offsets stay aligned.
  masked: String,
}

fn scan_array_body(source: &str, start: usize) -> Option<ArrayScan> {
  let bytes = source.as_bytes();
  let mut masked = bytes.to_vec();
  let mut items = Vec::new();
  let mut item_start = start;
  let mut depth = 0usize;
  let mut i = start;

  while i < bytes.len() {
    match bytes[i] {
      b'/' if bytes.get(i + 1) == Some(&b'/') => {
        let end = source[i..].find('\n').map_or(bytes.len(), |offset| i + offset);
        masked[i..end].fill(b' ');
        i = end;
        continue;
      }
      b'/' if bytes.get(i + 1) == Some(&b'*') => {
        let end = source[i + 2..].find("*/").map_or(bytes.len(), |offset| i + 2 + offset + 2);
        masked[i..end].fill(b' ');
        i = end;
        continue;
      }
      quote @ (b'\'' | b'"' | b'`') => {
        i = skip_string(bytes, i, quote);
        continue;
      }
      b'[' | b'(' | b'{' => depth += 1,
      b']' if depth == 0 => {
        items.push(item_start..i);
        let masked = String::from_utf8(masked).ok()?;
        return Some(ArrayScan {
          end: i,
          items,
          masked,
        });
      }
      b']' | b')' | b'}' => depth = depth.saturating_sub(1),
      b',' if depth == 0 => {
        items.push(item_start..i);
        item_start = i + 1;
      }
      _ => {}
    }
    i += 1;
  }

  None
}

/// Return the index just past the closing quote of the string starting at `open`.
fn skip_string(bytes: &[u8], open: usize, quote: u8) -> usize {
  let mut i = open + 1;
  while i < bytes.len() {
    match bytes[i] {
      b'\\' => i += 2,
      b if b == quote => return i + 1,
      _ => i += 1,
    }
  }
  bytes.len()
}

fn entry_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(&format!(
      r#"^(?P<prefix>{}\s*\+\s*)?(?P<literal>'(?:[^'\\\n]|\\.)*'|"(?:[^"\\\n]|\\.)*")$"#,
      BASE_PATH_IDENT
    ))
    .expect("invalid asset entry regex")
  })
}

fn classify_entry(masked: &str, source: &str, item: Range<usize>) -> Option<AssetLiteral> {
  let raw = &masked[item.clone()];
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  let caps = entry_pattern().captures(trimmed)?;
  let literal = caps.name("literal")?;
  let offset = item.start + (raw.len() - raw.trim_start().len());
  let span = offset + literal.start()..offset + literal.end();
  let quoted = &source[span.clone()];
  let quote = quoted.chars().next()?;

  Some(AssetLiteral {
    value: quoted[1..quoted.len() - 1].to_string(),
    quote,
    prefixed: caps.name("prefix").is_some(),
    span,
  })
}
