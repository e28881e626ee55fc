//! `tegoc signature`: decode a type signature or descriptor.

use tego_jvm::JvmType;

pub fn execute(text: &str, descriptor: bool) -> anyhow::Result<()> {
    let ty = if descriptor {
        JvmType::from_descriptor(text)?
    } else {
        JvmType::from_signature(text)?
    };
    println!("type:       {}", ty);
    match ty.descriptor() {
        Ok(descriptor) => println!("descriptor: {}", descriptor),
        Err(e) => println!("descriptor: none ({})", e),
    }
    println!("signature:  {}", ty.signature());
    Ok(())
}
