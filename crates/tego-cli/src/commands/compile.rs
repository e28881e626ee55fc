//! `tegoc compile`: ATerm programs to class files.

use anyhow::{bail, Context};
use std::path::PathBuf;
use tego_compiler::{compile_units, CompilerConfig, DirectoryClassWriter};
use tracing::debug;

/// Options of the compile command
pub struct CompileOptions {
    pub inputs: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub class_version: Option<u16>,
    pub verify: bool,
}

pub fn execute(options: CompileOptions) -> anyhow::Result<()> {
    let mut config = match &options.config {
        Some(path) => CompilerConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => CompilerConfig::default(),
    };
    if let Some(version) = options.class_version {
        config.class_version = version;
    }
    if !options.verify {
        config.verify = false;
    }
    config.validate()?;
    debug!(?config, "compiler configuration");

    let units = options
        .inputs
        .iter()
        .map(|path| tego_aterm::read_file(path).with_context(|| format!("failed to read {}", path.display())))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let writer = DirectoryClassWriter::new(&options.out_dir);
    let results = compile_units(&units, &config, &writer);

    let mut compiled = 0;
    let mut failed = 0;
    for (path, result) in options.inputs.iter().zip(results) {
        match result {
            Ok(classes) => {
                compiled += classes.len();
                for class in &classes {
                    println!("  {}", class.internal_name());
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("error: {}: {}", path.display(), e);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} inputs failed to compile", failed, options.inputs.len());
    }
    println!("Compiled {} classes into {}", compiled, options.out_dir.display());
    Ok(())
}
