use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use axis_formats::{SceneDescriptor, StagingFs, stage};
use axis_viewer::cli::{Args, collect_scene_files, manifest_from};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let files = collect_scene_files(&args.scene_dir)
        .with_context(|| format!("collecting scene files from {}", args.scene_dir.display()))?;
    info!("collected {} files", files.len());

    let descriptor = SceneDescriptor {
        root: args.root.clone(),
        files,
        xml: None,
    };
    let mut staging = StagingFs::new();
    let root = stage(&descriptor, &mut staging).context("staging scene")?;

    if args.json {
        let manifest = manifest_from(&root, &staging);
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        println!("staged {} files, root {}", staging.len(), staging.staged_path(&root));
    }
    Ok(())
}
