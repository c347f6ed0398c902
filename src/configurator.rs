//! Stage the manifest, service worker and HTML rewrites, then commit them together.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::base_path::BasePath;
use crate::project::PwaProjectLayout;
use crate::rewrite::{
  ConfigureError, DeclarationEdit, HtmlOutcome, declared_base_path, rewrite_index_html,
  rewrite_manifest, rewrite_service_worker,
};

/// A rewritten file held in memory until the plan is committed.
#[derive(Debug, Clone)]
pub struct StagedFile {
  /// Destination path.
  pub path: PathBuf,
  /// New file contents.
  pub contents: String,
  /// Whether `contents` differs from what is on disk.
  pub changed: bool,
}

/// Per-file details surfaced to the user after planning.
#[derive(Debug, Clone)]
pub struct PlanReport {
  /// Icon and shortcut references rebased in the manifest.
  pub manifest_rebased: usize,
  /// Edit applied to the `BASE_PATH` declaration.
  pub declaration: DeclarationEdit,
  /// Asset literals newly concatenated onto `BASE_PATH`.
  pub worker_rebased: usize,
  /// Whether the service worker asset array was found.
  pub asset_list_found: bool,
  /// Outcome of the HTML rewrite.
  pub html: HtmlOutcome,
}

/// Fully computed rewrite of all three assets. Nothing is on disk until [`commit`].
///
/// [`commit`]: RewritePlan::commit
#[derive(Debug, Clone)]
pub struct RewritePlan {
  /// Base path the plan was computed for.
  pub base: BasePath,
  /// Staged manifest.
  pub manifest: StagedFile,
  /// Staged service worker.
  pub service_worker: StagedFile,
  /// Staged HTML shell.
  pub index_html: StagedFile,
  /// Details of what each rewrite did.
  pub report: PlanReport,
}

/// Plans sub-path rewrites for a project layout.
pub struct Configurator<'a> {
  layout: &'a PwaProjectLayout,
}

impl<'a> Configurator<'a> {
  /// Create a configurator for the provided layout.
  pub fn new(layout: &'a PwaProjectLayout) -> Self {
    Self { layout }
  }

  /// Read every asset and compute its rewrite without touching the filesystem.
  ///
  /// Any read or parse failure aborts the plan, so either all three files can be
  /// rewritten or none are.
  pub fn plan(&self, base: &BasePath) -> Result<RewritePlan, ConfigureError> {
    let layout = self.layout;

    let manifest_source = read_source(&layout.manifest_path)?;
    let worker_source = read_source(&layout.service_worker_path)?;

    // The worker's literal BASE_PATH is the only trusted record of an earlier run.
    let previous = declared_base_path(&worker_source);
    let manifest = rewrite_manifest(&manifest_source, base, previous.as_ref())
      .map_err(|err| ConfigureError::manifest(&layout.manifest_path, err))?;

    let worker = rewrite_service_worker(
      &worker_source,
      base,
      &layout.asset_list_name,
      &layout.static_assets,
    );

    let html_source = read_source(&layout.index_html_path)?;
    let html = rewrite_index_html(&html_source, base);

    Ok(RewritePlan {
      base: base.clone(),
      report: PlanReport {
        manifest_rebased: manifest.rebased_paths,
        declaration: worker.declaration,
        worker_rebased: worker.rebased_assets,
        asset_list_found: worker.asset_list_found,
        html: html.outcome,
      },
      manifest: StagedFile {
        path: layout.manifest_path.clone(),
        contents: manifest.text,
        changed: manifest.changed,
      },
      service_worker: StagedFile {
        path: layout.service_worker_path.clone(),
        changed: worker.changed,
        contents: worker.text,
      },
      index_html: StagedFile {
        path: layout.index_html_path.clone(),
        changed: html.changed(),
        contents: html.text,
      },
    })
  }
}

impl RewritePlan {
  /// Staged files in commit order: manifest, service worker, HTML.
  pub fn files(&self) -> [&StagedFile; 3] {
    [&self.manifest, &self.service_worker, &self.index_html]
  }

  /// Write every changed file, returning the paths that were written.
  ///
  /// Each file is replaced atomically through a temporary sibling; unchanged files are
  /// not rewritten.
  pub fn commit(&self) -> Result<Vec<PathBuf>, ConfigureError> {
    let mut written = Vec::new();
    for file in self.files() {
      if !file.changed {
        tracing::debug!("{} unchanged, skipping write", file.path.display());
        continue;
      }
      replace_file(&file.path, &file.contents)?;
      written.push(file.path.clone());
    }
    Ok(written)
  }

  /// Human-readable status lines, one per file.
  pub fn summary_lines(&self, layout: &PwaProjectLayout, committed: bool) -> Vec<String> {
    let verb = if committed { "Updated" } else { "Would update" };
    let name = |file: &StagedFile| layout.display_name(&file.path).into_owned();
    let mut lines = Vec::new();

    lines.push(if self.manifest.changed {
      format!(
        "[ok] {verb} {} with base path: {} ({} paths rebased)",
        name(&self.manifest),
        self.base.as_str(),
        self.report.manifest_rebased
      )
    } else {
      format!("[ok] {} already uses base path: {}", name(&self.manifest), self.base.as_str())
    });

    let declaration = match self.report.declaration {
      DeclarationEdit::Inserted => "BASE_PATH added",
      DeclarationEdit::Updated(_) => "BASE_PATH set",
      DeclarationEdit::Computed => "BASE_PATH left as computed",
    };
    lines.push(format!(
      "[ok] {verb} {} with base path: {} ({declaration}, {} assets rebased)",
      name(&self.service_worker),
      self.base.as_str(),
      self.report.worker_rebased
    ));
    if self.report.declaration == DeclarationEdit::Computed {
      lines.push(format!(
        "[warn] {} computes BASE_PATH; make sure it yields {}",
        name(&self.service_worker),
        self.base.as_str()
      ));
    }
    if !self.report.asset_list_found {
      lines.push(format!(
        "[warn] {} has no {} array; cached asset paths were not rebased",
        name(&self.service_worker),
        layout.asset_list_name
      ));
    }

    lines.push(match self.report.html {
      HtmlOutcome::Inserted => format!(
        "[ok] {verb} {} with base tag: {}",
        name(&self.index_html),
        self.base.with_trailing_slash()
      ),
      HtmlOutcome::AlreadyPresent => {
        format!("[warn] {} already has base tag", name(&self.index_html))
      }
      HtmlOutcome::MissingCharset => format!(
        "[warn] {} has no <meta charset=\"UTF-8\">; base tag not inserted",
        name(&self.index_html)
      ),
    });

    lines
  }
}

fn read_source(path: &Path) -> Result<String, ConfigureError> {
  fs::read_to_string(path).map_err(|err| ConfigureError::io(path, err))
}

/// Replace `path` with `contents` via a temporary file in the same directory.
fn replace_file(path: &Path, contents: &str) -> Result<(), ConfigureError> {
  let io_err = |err| ConfigureError::io(path, err);
  let parent = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let permissions = fs::metadata(path).map_err(io_err)?.permissions();
  let mut temp = NamedTempFile::new_in(parent).map_err(io_err)?;
  temp.write_all(contents.as_bytes()).map_err(io_err)?;
  temp.as_file().sync_all().map_err(io_err)?;
  fs::set_permissions(temp.path(), permissions).map_err(io_err)?;
  temp.persist(path).map_err(|err| io_err(err.error))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ProjectConfig;
  use tempfile::tempdir;

  fn write_project(root: &Path) -> PwaProjectLayout {
    let layout = ProjectConfig::default().to_layout(root);
    fs::create_dir_all(&layout.public_dir).unwrap();
    fs::write(
      &layout.manifest_path,
      r#"{"name": "App", "start_url": "/", "scope": "/", "icons": [{"src": "/icon.png"}]}"#,
    )
    .unwrap();
    fs::write(
      &layout.service_worker_path,
      "const CACHE_VERSION = 'v1';\nconst STATIC_ASSETS = [\n  '/',\n  '/index.html'\n];\n",
    )
    .unwrap();
    fs::write(
      &layout.index_html_path,
      "<html>\n<head>\n  <meta charset=\"UTF-8\">\n</head>\n</html>\n",
    )
    .unwrap();
    layout
  }

  #[test]
  fn plan_does_not_touch_disk_until_commit() {
    let dir = tempdir().unwrap();
    let layout = write_project(dir.path());
    let before = fs::read_to_string(&layout.service_worker_path).unwrap();

    let plan = Configurator::new(&layout).plan(&BasePath::new("/app")).unwrap();
    assert!(plan.files().iter().all(|file| file.changed));
    assert_eq!(fs::read_to_string(&layout.service_worker_path).unwrap(), before);

    let written = plan.commit().unwrap();
    assert_eq!(written.len(), 3);
    let worker = fs::read_to_string(&layout.service_worker_path).unwrap();
    assert!(worker.contains("const BASE_PATH = '/app';"));
    assert!(worker.contains("BASE_PATH + '/index.html'"));
  }

  #[test]
  fn failing_read_leaves_every_file_untouched() {
    let dir = tempdir().unwrap();
    let layout = write_project(dir.path());
    fs::remove_file(&layout.index_html_path).unwrap();
    let manifest_before = fs::read_to_string(&layout.manifest_path).unwrap();

    let err = Configurator::new(&layout)
      .plan(&BasePath::new("/app"))
      .unwrap_err();
    assert!(matches!(err, ConfigureError::Io { ref path, .. } if *path == layout.index_html_path));
    assert_eq!(fs::read_to_string(&layout.manifest_path).unwrap(), manifest_before);
  }

  #[test]
  fn invalid_manifest_reports_parse_error() {
    let dir = tempdir().unwrap();
    let layout = write_project(dir.path());
    fs::write(&layout.manifest_path, "{ broken").unwrap();

    let err = Configurator::new(&layout)
      .plan(&BasePath::new("/app"))
      .unwrap_err();
    assert!(matches!(err, ConfigureError::Parse { .. }));
    assert!(err.to_string().contains("manifest.json"));
  }

  #[test]
  fn second_run_only_reports_existing_base_tag() {
    let dir = tempdir().unwrap();
    let layout = write_project(dir.path());
    let base = BasePath::new("/app");
    Configurator::new(&layout).plan(&base).unwrap().commit().unwrap();

    let plan = Configurator::new(&layout).plan(&base).unwrap();
    assert_eq!(plan.report.html, HtmlOutcome::AlreadyPresent);
    assert!(plan.commit().unwrap().is_empty());

    let lines = plan.summary_lines(&layout, true);
    assert!(lines.iter().any(|line| line.contains("already has base tag")));
  }

  #[test]
  fn changing_base_strips_only_the_base_written_before() {
    let dir = tempdir().unwrap();
    let layout = write_project(dir.path());
    Configurator::new(&layout)
      .plan(&BasePath::new("/old"))
      .unwrap()
      .commit()
      .unwrap();

    let plan = Configurator::new(&layout).plan(&BasePath::new("/new")).unwrap();
    assert!(plan.manifest.contents.contains("\"/new/icon.png\""));
    assert!(!plan.manifest.contents.contains("/old"));
  }

  #[test]
  fn hand_written_scope_keeps_real_directories() {
    let dir = tempdir().unwrap();
    let layout = write_project(dir.path());
    fs::write(
      &layout.manifest_path,
      r#"{"scope": "/app/", "icons": [{"src": "/app/icon.png"}]}"#,
    )
    .unwrap();

    let plan = Configurator::new(&layout).plan(&BasePath::new("/site")).unwrap();
    assert!(plan.manifest.contents.contains("\"/site/app/icon.png\""));
  }

  #[test]
  fn computed_base_path_is_reported() {
    let dir = tempdir().unwrap();
    let layout = write_project(dir.path());
    fs::write(
      &layout.service_worker_path,
      "const CACHE_VERSION = 'v1';\nconst BASE_PATH = self.location.pathname.replace(/\\/sw\\.js$/, '');\n",
    )
    .unwrap();

    let plan = Configurator::new(&layout).plan(&BasePath::new("/app")).unwrap();
    assert_eq!(plan.report.declaration, DeclarationEdit::Computed);
    let lines = plan.summary_lines(&layout, false);
    assert!(lines.iter().any(|line| line.contains("computes BASE_PATH")));
  }

  #[cfg(unix)]
  #[test]
  fn commit_preserves_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let layout = write_project(dir.path());
    fs::set_permissions(&layout.manifest_path, fs::Permissions::from_mode(0o644)).unwrap();

    Configurator::new(&layout)
      .plan(&BasePath::new("/app"))
      .unwrap()
      .commit()
      .unwrap();

    let mode = fs::metadata(&layout.manifest_path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
  }
}
