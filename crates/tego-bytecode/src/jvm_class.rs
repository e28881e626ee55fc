//! A compiled class ready to be written out

use crate::class_file::{decode_local_variable_table, ClassFile};
use crate::error::ClassFileError;
use crate::instruction::decode_code;
use crate::verify::{verify_class, VerifyError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tego_jvm::JvmType;
use tracing::debug;

/// The bytes of one class together with its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JvmClass {
    /// Simple class name
    pub class_name: String,
    /// Package in internal form (`org/example`), empty for the default package
    pub package_name: String,
    /// Class-file bytes
    pub bytes: Vec<u8>,
}

impl JvmClass {
    /// Create from an object type and the class bytes
    pub fn from_type(ty: &JvmType, bytes: Vec<u8>) -> Result<Self, ClassFileError> {
        let class_path = ty.class_path()?;
        let (package_name, class_name) = match class_path.rfind('.') {
            Some(i) => (class_path[..i].replace('.', "/"), class_path[i + 1..].to_string()),
            None => (String::new(), class_path),
        };
        Ok(Self {
            class_name,
            package_name,
            bytes,
        })
    }

    /// Internal name, `package/ClassName`
    pub fn internal_name(&self) -> String {
        if self.package_name.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}/{}", self.package_name, self.class_name)
        }
    }

    /// Structurally verify the bytes
    pub fn check(&self) -> Result<(), VerifyError> {
        verify_class(&self.bytes).map(|_| ())
    }

    /// Write under `root`, creating the package directories
    ///
    /// Returns the path of the written file.
    pub fn write_in_package(&self, root: &Path) -> Result<PathBuf, ClassFileError> {
        let mut dir = root.to_path_buf();
        for segment in self.package_name.split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.class", file_name_of(&self.class_name)));
        self.write_to_file(&path)?;
        Ok(path)
    }

    /// Write the bytes to `path`
    pub fn write_to_file(&self, path: &Path) -> Result<(), ClassFileError> {
        fs::write(path, &self.bytes)?;
        debug!(path = %path.display(), size = self.bytes.len(), "wrote class");
        Ok(())
    }
}

/// Strip characters that do not belong in a class file name
fn file_name_of(class_name: &str) -> String {
    class_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect()
}

impl fmt::Display for JvmClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match ClassFile::parse(&self.bytes) {
            Ok(class) => class,
            Err(e) => return writeln!(f, "// {}: undecodable ({})", self.internal_name(), e),
        };
        let pool = &class.constant_pool;

        writeln!(
            f,
            "class {} extends {} // version {}, flags {:#06x}",
            class.this_class_name().unwrap_or("?"),
            class.super_class_name().unwrap_or("?"),
            class.major_version,
            class.access_flags
        )?;
        for interface in class.interface_names() {
            writeln!(f, "  implements {}", interface)?;
        }
        if let Some(signature) = class.signature_in(&class.attributes) {
            writeln!(f, "  signature {}", signature)?;
        }

        for field in &class.fields {
            writeln!(
                f,
                "  field {} {} // flags {:#06x}",
                class.member_name(field).unwrap_or("?"),
                class.member_descriptor(field).unwrap_or("?"),
                field.access_flags
            )?;
        }

        for method in &class.methods {
            writeln!(f)?;
            writeln!(
                f,
                "  method {}{} // flags {:#06x}",
                class.member_name(method).unwrap_or("?"),
                class.member_descriptor(method).unwrap_or("?"),
                method.access_flags
            )?;
            if let Some(signature) = class.signature_in(&method.attributes) {
                writeln!(f, "    signature {}", signature)?;
            }
            let code = match class.code_of(method) {
                Some(Ok(code)) => code,
                Some(Err(e)) => {
                    writeln!(f, "    // bad Code attribute: {}", e)?;
                    continue;
                }
                None => continue,
            };
            writeln!(f, "    stack={}, locals={}", code.max_stack, code.max_locals)?;
            match decode_code(&code.code) {
                Ok(instructions) => {
                    for instruction in instructions {
                        writeln!(f, "    {}", instruction.display(pool))?;
                    }
                }
                Err(e) => writeln!(f, "    // undecodable code: {}", e)?,
            }
            if let Some(table) = class
                .find_attribute(&code.attributes, crate::class_file::attr::LOCAL_VARIABLE_TABLE)
                .and_then(|a| decode_local_variable_table(&a.info).ok())
            {
                for entry in table {
                    writeln!(
                        f,
                        "    local {} {} slot {} [{}, {})",
                        pool.utf8_at(entry.name_index).unwrap_or("?"),
                        pool.utf8_at(entry.descriptor_index).unwrap_or("?"),
                        entry.index,
                        entry.start_pc,
                        entry.start_pc as u32 + entry.length as u32
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tego_jvm::JvmObject;

    #[test]
    fn test_from_type_splits_package() {
        let ty = JvmType::Object(JvmObject::new("org/example/FooStrategy"));
        let class = JvmClass::from_type(&ty, vec![]).unwrap();
        assert_eq!(class.class_name, "FooStrategy");
        assert_eq!(class.package_name, "org/example");
        assert_eq!(class.internal_name(), "org/example/FooStrategy");

        let top = JvmType::Object(JvmObject::new("Top"));
        let class = JvmClass::from_type(&top, vec![]).unwrap();
        assert_eq!(class.package_name, "");
        assert_eq!(class.internal_name(), "Top");

        assert!(JvmClass::from_type(&JvmType::Int, vec![]).is_err());
    }

    #[test]
    fn test_file_name_filter() {
        assert_eq!(file_name_of("Foo$Bar"), "Foo$Bar");
        assert_eq!(file_name_of("../Evil Name"), "EvilName");
    }

    #[test]
    fn test_write_in_package() {
        let dir = tempfile::tempdir().unwrap();
        let class = JvmClass {
            class_name: "FooStrategy".to_string(),
            package_name: "org/example".to_string(),
            bytes: vec![0xca, 0xfe, 0xba, 0xbe],
        };
        let path = class.write_in_package(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("org").join("example").join("FooStrategy.class"));
        assert_eq!(fs::read(&path).unwrap(), class.bytes);
    }
}
