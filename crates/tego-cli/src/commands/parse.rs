//! `tegoc parse`: print the normalized IR.

use anyhow::Context;
use std::path::Path;
use tego_compiler::IrBuilder;

pub fn execute(input: &Path) -> anyhow::Result<()> {
    let term = tego_aterm::read_file(input).with_context(|| format!("failed to read {}", input.display()))?;
    let project = IrBuilder::new().to_project(&term)?;

    for module in &project.modules {
        println!("module {}", module.name);
        for decl in &module.declarations {
            println!("  decl {}", decl);
        }
        for def in &module.definitions {
            println!();
            println!("  def {}({}) {} =", def.name, def.param_names().join(", "), def.input_name);
            for line in def.body.to_string().lines() {
                println!("    {}", line);
            }
        }
    }
    Ok(())
}
