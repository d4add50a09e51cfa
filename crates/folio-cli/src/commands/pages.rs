//! `folio pages`: list discovered pages.

use folio_build::DiscoveryOptions;
use folio_build::pages::discover_pages_async;

use crate::cli::PagesArgs;
use crate::commands::utils::load_project;
use crate::error::Result;
use crate::ui;

pub async fn execute(args: PagesArgs) -> Result<()> {
    let project = load_project(&args.project)?;
    folio_config::validate_schema(&project.config).or_else(|err| match err {
        // listing pages does not need an application entry
        folio_config::ConfigError::MissingField("main") => Ok(()),
        other => Err(other),
    })?;

    let options = DiscoveryOptions {
        extensions: project.config.normalized_extensions(),
        exclude: project.config.exclude.clone(),
        framework: Some(project.framework),
    };
    let pages = discover_pages_async(project.config.pages_root(&project.dir), options)
        .await
        .map_err(folio_build::Error::from)?;

    for page in &pages {
        println!("{}\t{}", page.id, page.path.display());
    }

    if pages.is_empty() {
        ui::warning("no pages found");
    } else {
        ui::success(&format!("{} pages", pages.len()));
    }
    Ok(())
}
