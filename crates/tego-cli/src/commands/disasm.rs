//! `tegoc disasm`: list a class file.

use anyhow::{anyhow, Context};
use std::path::Path;
use tego_bytecode::{verify_class, JvmClass};
use tego_jvm::{JvmObject, JvmType};

pub fn execute(file: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let name = {
        let class = verify_class(&bytes)?;
        class
            .this_class_name()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("{} has no class name", file.display()))?
    };
    let class = JvmClass::from_type(&JvmType::Object(JvmObject::new(name)), bytes)?;
    print!("{}", class);
    Ok(())
}
