//! HTML directory listings for folders without an `index.html`.

use std::io;
use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

const PATH_SEGMENT: &AsciiSet = &CONTROLS
  .add(b' ')
  .add(b'"')
  .add(b'#')
  .add(b'%')
  .add(b'<')
  .add(b'>')
  .add(b'?')
  .add(b'`')
  .add(b'{')
  .add(b'}');

/// Render a listing of `dir`, titled with the decoded request path.
pub async fn render_listing(request_path: &str, dir: &Path) -> io::Result<String> {
  let mut names = Vec::new();
  let mut entries = tokio::fs::read_dir(dir).await?;
  while let Some(entry) = entries.next_entry().await? {
    let mut name = entry.file_name().to_string_lossy().into_owned();
    if entry.file_type().await?.is_dir() {
      name.push('/');
    }
    names.push(name);
  }
  names.sort_by_key(|name| name.to_lowercase());

  let title = html_escape::encode_text(request_path);
  let mut html = format!(
    "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>Directory listing for {title}</title>\n</head>\n<body>\n\
<h1>Directory listing for {title}</h1>\n<hr>\n<ul>\n"
  );
  for name in &names {
    html.push_str(&format!(
      "<li><a href=\"{}\">{}</a></li>\n",
      utf8_percent_encode(name, PATH_SEGMENT),
      html_escape::encode_text(name)
    ));
  }
  html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
  Ok(html)
}
