use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use tracing::Level;

use pwa_pages_kit::cli::{CONFIGURE_EXAMPLES, ConfigureCli};
use pwa_pages_kit::{Configurator, logging};

fn main() -> Result<()> {
  logging::init(Level::WARN);

  let cli = match ConfigureCli::try_parse() {
    Ok(cli) => cli,
    Err(err) if err.kind() == ErrorKind::MissingRequiredArgument => {
      err.print().ok();
      eprintln!("\n{CONFIGURE_EXAMPLES}");
      std::process::exit(1);
    }
    Err(err) => err.exit(),
  };

  let base = cli.base_path();
  let root = cli.project.resolved_root();
  let config = cli.project.load_config()?;
  let layout = config.to_layout(&root);

  println!("\nConfiguring PWA for GitHub Pages...");
  println!("Project root: {}", root.display());
  println!("Base path: {base}");
  println!();

  let plan = Configurator::new(&layout).plan(&base)?;

  if cli.dry_run {
    for line in plan.summary_lines(&layout, false) {
      println!("{line}");
    }
    println!("\nDry run: no files were written.");
    return Ok(());
  }

  plan.commit()?;
  for line in plan.summary_lines(&layout, true) {
    println!("{line}");
  }

  println!();
  println!("Configuration complete!");
  println!();
  println!("Next steps:");
  println!("1. Test locally: serve-pwa");
  println!(
    "2. Commit changes: git add {}/ && git commit -m \"Configure for GitHub Pages\"",
    config.public_dir
  );
  println!("3. Push: git push origin main");
  println!("4. Enable GitHub Pages in repository settings");
  println!();
  Ok(())
}
