//! Destinations for compiled classes

use crate::error::CompileResult;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tego_bytecode::JvmClass;
use tracing::info;

/// Receives every class the compiler emits
pub trait ClassWriter: Send + Sync {
    /// Accept one compiled class
    fn accept(&self, class: &JvmClass) -> CompileResult<()>;
}

impl<W: ClassWriter + ?Sized> ClassWriter for &W {
    fn accept(&self, class: &JvmClass) -> CompileResult<()> {
        (**self).accept(class)
    }
}

/// Discards classes
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopClassWriter;

impl ClassWriter for NoopClassWriter {
    fn accept(&self, _class: &JvmClass) -> CompileResult<()> {
        Ok(())
    }
}

/// Writes `root/package/Name.class` files
#[derive(Debug, Clone)]
pub struct DirectoryClassWriter {
    root: PathBuf,
}

impl DirectoryClassWriter {
    /// Write below `root`, which is created when needed
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClassWriter for DirectoryClassWriter {
    fn accept(&self, class: &JvmClass) -> CompileResult<()> {
        fs::create_dir_all(&self.root)?;
        let path = class.write_in_package(&self.root)?;
        info!(class = %class.internal_name(), path = %path.display(), "class written");
        Ok(())
    }
}

/// Keeps classes in memory
#[derive(Debug, Default)]
pub struct MemoryClassWriter {
    classes: Mutex<Vec<JvmClass>>,
}

impl MemoryClassWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// The classes accepted so far
    pub fn classes(&self) -> Vec<JvmClass> {
        self.classes.lock().clone()
    }

    /// Number of classes accepted so far
    pub fn len(&self) -> usize {
        self.classes.lock().len()
    }

    /// Whether no class was accepted yet
    pub fn is_empty(&self) -> bool {
        self.classes.lock().is_empty()
    }

    /// Take the accepted classes
    pub fn into_classes(self) -> Vec<JvmClass> {
        self.classes.into_inner()
    }
}

impl ClassWriter for MemoryClassWriter {
    fn accept(&self, class: &JvmClass) -> CompileResult<()> {
        self.classes.lock().push(class.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class() -> JvmClass {
        JvmClass {
            class_name: "idStrategy".to_string(),
            package_name: "org/example".to_string(),
            bytes: vec![0xCA, 0xFE, 0xBA, 0xBE],
        }
    }

    #[test]
    fn test_memory_writer() {
        let writer = MemoryClassWriter::new();
        assert!(writer.is_empty());
        writer.accept(&class()).unwrap();
        (&writer).accept(&class()).unwrap();
        assert_eq!(writer.len(), 2);
        assert_eq!(writer.into_classes()[0].class_name, "idStrategy");
    }

    #[test]
    fn test_directory_writer() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DirectoryClassWriter::new(dir.path().join("out"));
        writer.accept(&class()).unwrap();
        let path = dir.path().join("out/org/example/idStrategy.class");
        assert_eq!(std::fs::read(path).unwrap(), class().bytes);
    }

    #[test]
    fn test_noop_writer() {
        assert!(NoopClassWriter.accept(&class()).is_ok());
    }
}
