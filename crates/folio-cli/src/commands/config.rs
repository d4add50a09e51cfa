//! `folio config`: print the assembled bundler configuration.

use folio_build::{AssembleOptions, ConfigAssembler};

use crate::cli::ConfigArgs;
use crate::commands::utils::{load_project, to_json};
use crate::error::Result;
use crate::ui;

pub async fn execute(args: ConfigArgs) -> Result<()> {
    let project = load_project(&args.project)?;
    folio_config::validate_fs(&project.config, &project.dir)?;

    let options = AssembleOptions {
        dev: args.dev,
        is_server: args.server,
        build_id: args.build_id,
    };

    let assembler = ConfigAssembler::new(&project.dir, options, project.config)
        .with_framework(project.framework);
    let plan = assembler.plan().await?;
    let config = assembler.assemble(&plan)?;

    println!("{}", to_json(&config, args.compact)?);
    ui::info(&format!(
        "{} configuration: {} bundles, {} stages",
        config.name,
        config.entry.len(),
        config.pipeline.len()
    ));
    Ok(())
}
