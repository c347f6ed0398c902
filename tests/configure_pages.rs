use std::fs;
use std::path::Path;

use pwa_pages_kit::rewrite::HtmlOutcome;
use pwa_pages_kit::{BasePath, Configurator, ProjectConfig};
use serde_json::Value;
use tempfile::tempdir;

const MANIFEST: &str = r#"{
  "name": "Desktop Matching",
  "short_name": "Matching",
  "start_url": "/",
  "scope": "/",
  "display": "standalone",
  "icons": [
    { "src": "/icons/icon-192.png", "sizes": "192x192", "type": "image/png" },
    { "src": "/icons/icon-512.png", "sizes": "512x512", "type": "image/png" }
  ],
  "shortcuts": [
    {
      "name": "Open bundle",
      "url": "/?action=open",
      "icons": [{ "src": "/icons/open.png", "sizes": "96x96" }]
    }
  ]
}"#;

const WORKER: &str = "const CACHE_VERSION = 'v3.0.0';
const CACHE_NAME = `desktop-matching-${CACHE_VERSION}`;

const STATIC_ASSETS = [
  '/',
  '/index.html',
  '/compatibility.js',
  '/xml-handler.js',
  '/renderer.js',
  '/api-client.js',
  '/storage.js',
  '/bundle-processor.js',
  '/localization.js',
  '/locales/en.json',
  '/manifest.json'
];

self.addEventListener('fetch', event => {
  event.respondWith(caches.match(event.request).then(hit => hit || caches.match('/index.html')));
});
";

const INDEX: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
  <meta charset=\"UTF-8\">
  <title>Desktop Matching</title>
</head>
<body></body>
</html>
";

fn project(root: &Path, config: &ProjectConfig) {
  let public = config.public_dir_path(root);
  fs::create_dir_all(&public).unwrap();
  fs::write(public.join(&config.manifest_file), MANIFEST).unwrap();
  fs::write(public.join(&config.service_worker_file), WORKER).unwrap();
  fs::write(public.join(&config.index_html_file), INDEX).unwrap();
}

#[test]
fn configures_all_assets_for_a_sub_path() {
  let dir = tempdir().unwrap();
  let config = ProjectConfig::discover(dir.path());
  project(dir.path(), &config);
  let layout = config.to_layout(dir.path());

  let base = BasePath::new("/tone_comparison_app/desktop_matching_app/public/");
  let plan = Configurator::new(&layout).plan(&base).unwrap();
  plan.commit().unwrap();

  let manifest: Value =
    serde_json::from_str(&fs::read_to_string(&layout.manifest_path).unwrap()).unwrap();
  let prefix = "/tone_comparison_app/desktop_matching_app/public";
  assert_eq!(manifest["start_url"], format!("{prefix}/"));
  assert_eq!(manifest["icons"][1]["src"], format!("{prefix}/icons/icon-512.png"));
  assert_eq!(manifest["shortcuts"][0]["url"], format!("{prefix}/?action=open"));

  let worker = fs::read_to_string(&layout.service_worker_path).unwrap();
  assert_eq!(worker.lines().nth(1), Some(format!("const BASE_PATH = '{prefix}';").as_str()));
  assert_eq!(worker.matches("BASE_PATH + '").count(), 9);
  assert!(worker.contains("  '/xml-handler.js',"));
  assert!(worker.contains("caches.match('/index.html')"));

  let index = fs::read_to_string(&layout.index_html_path).unwrap();
  assert!(index.contains(&format!("  <meta charset=\"UTF-8\">\n  <base href=\"{prefix}/\">\n")));
}

#[test]
fn reconfiguring_keeps_files_consistent() {
  let dir = tempdir().unwrap();
  let config = ProjectConfig::default();
  project(dir.path(), &config);
  let layout = config.to_layout(dir.path());

  for base in ["/first", "/second", "/second"] {
    Configurator::new(&layout)
      .plan(&BasePath::new(base))
      .unwrap()
      .commit()
      .unwrap();
  }

  let manifest: Value =
    serde_json::from_str(&fs::read_to_string(&layout.manifest_path).unwrap()).unwrap();
  assert_eq!(manifest["scope"], "/second/");
  assert_eq!(manifest["icons"][0]["src"], "/second/icons/icon-192.png");

  let worker = fs::read_to_string(&layout.service_worker_path).unwrap();
  assert_eq!(worker.matches("const BASE_PATH").count(), 1);
  assert!(worker.contains("const BASE_PATH = '/second';"));
  assert!(!worker.contains("BASE_PATH + BASE_PATH"));

  let plan = Configurator::new(&layout).plan(&BasePath::new("/second")).unwrap();
  assert_eq!(plan.report.html, HtmlOutcome::AlreadyPresent);
  assert!(plan.files().iter().all(|file| !file.changed));
}

#[test]
fn honours_custom_layout_from_config_file() {
  let dir = tempdir().unwrap();
  fs::write(
    dir.path().join("pwa.config.json"),
    r#"{"public_dir": "site", "service_worker_file": "sw.js", "static_assets": ["/"]}"#,
  )
  .unwrap();
  let config = ProjectConfig::discover(dir.path());
  project(dir.path(), &config);
  let layout = config.to_layout(dir.path());
  assert!(layout.service_worker_path.ends_with("site/sw.js"));

  let plan = Configurator::new(&layout).plan(&BasePath::new("/app")).unwrap();
  assert_eq!(plan.report.worker_rebased, 1);
}
