//! The compiler driver
//!
//! A compilation unit is compiled in two passes: first every declaration of
//! every module is entered into a [`SymbolTable`], then each definition is
//! emitted as a class and handed to the [`ClassWriter`].

use crate::class_writer::{ClassWriter, NoopClassWriter};
use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileResult};
use crate::ir::{Project, StrategyDef, StrategyTypeDecl, SymbolTable, TypeDecl};
use crate::ir_builder::IrBuilder;
use crate::strategy_writer::StrategyWriter;
use crate::type_manager::JvmTypeManager;
use crossbeam::channel;
use std::path::Path;
use tego_aterm::Term;
use tego_bytecode::JvmClass;
use tracing::{debug, info};

/// Compiles Tego programs to JVM classes
pub struct TegoCompiler<W: ClassWriter = NoopClassWriter> {
    config: CompilerConfig,
    writer: W,
}

impl TegoCompiler<NoopClassWriter> {
    /// A compiler that only returns the classes
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_writer(config, NoopClassWriter)
    }
}

impl<W: ClassWriter> TegoCompiler<W> {
    /// A compiler that hands every class to `writer`
    pub fn with_writer(config: CompilerConfig, writer: W) -> Self {
        Self { config, writer }
    }

    /// The configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// The class writer
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Read and compile an ATerm file
    pub fn compile_file(&self, path: impl AsRef<Path>) -> CompileResult<Vec<JvmClass>> {
        let text = std::fs::read_to_string(path.as_ref())?;
        self.compile_text(&text)
    }

    /// Parse and compile ATerm text
    pub fn compile_text(&self, text: &str) -> CompileResult<Vec<JvmClass>> {
        let term = tego_aterm::read(text)?;
        self.compile_term(&term)
    }

    /// Compile a `Program` or `Module` term
    pub fn compile_term(&self, term: &Term) -> CompileResult<Vec<JvmClass>> {
        let project = IrBuilder::new().to_project(term)?;
        self.compile_project(&project)
    }

    /// Compile every definition of `project`
    pub fn compile_project(&self, project: &Project) -> CompileResult<Vec<JvmClass>> {
        self.config.validate()?;

        let mut symbols = SymbolTable::new();
        for decl in project.declarations() {
            symbols.insert(decl.clone())?;
        }
        debug!(declarations = symbols.len(), "symbol table built");

        let mut classes = Vec::new();
        for (module, def) in project.definitions() {
            let decl = declaration_of(&symbols, def)?;
            let types = JvmTypeManager::new(&symbols, &self.config, &module.name);
            let class = StrategyWriter::new(&types).write_strategy(decl, def)?;
            self.writer.accept(&class)?;
            classes.push(class);
        }

        info!(
            modules = project.modules.len(),
            classes = classes.len(),
            "compilation finished"
        );
        Ok(classes)
    }
}

/// The declaration a definition implements: by pointer, else by name
fn declaration_of<'s>(symbols: &'s SymbolTable, def: &StrategyDef) -> CompileResult<&'s StrategyTypeDecl> {
    if let Some(pointer) = &def.pointer {
        return symbols
            .strategy(pointer)
            .ok_or_else(|| CompileError::unresolved(format!("declaration {} of {}", pointer, def.name)));
    }
    match symbols.get_by_name(&def.name) {
        Some(TypeDecl::Strategy(decl)) => Ok(decl),
        _ => Err(CompileError::unresolved(format!("declaration of {}", def.name))),
    }
}

/// Compile independent units on a pool of worker threads
///
/// Each unit gets its own symbol table and fresh-name counter. Results are
/// returned in the order of `units`.
pub fn compile_units<W: ClassWriter>(
    units: &[Term],
    config: &CompilerConfig,
    writer: &W,
) -> Vec<CompileResult<Vec<JvmClass>>> {
    let workers = num_cpus::get().clamp(1, units.len().max(1));
    let (job_tx, job_rx) = channel::unbounded::<(usize, &Term)>();
    let (result_tx, result_rx) = channel::unbounded();
    for job in units.iter().enumerate() {
        if job_tx.send(job).is_err() {
            break;
        }
    }
    drop(job_tx);
    debug!(units = units.len(), workers, "compiling units");

    let outcome = crossbeam::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move |_| {
                let compiler = TegoCompiler::with_writer(config.clone(), writer);
                for (index, term) in job_rx.iter() {
                    if result_tx.send((index, compiler.compile_term(term))).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut results: Vec<Option<CompileResult<Vec<JvmClass>>>> = units.iter().map(|_| None).collect();
    for (index, result) in result_rx.iter() {
        results[index] = Some(result);
    }
    let panicked = outcome.is_err();
    results
        .into_iter()
        .map(|result| {
            result.unwrap_or_else(|| {
                Err(CompileError::Internal {
                    message: if panicked {
                        "compilation worker panicked".to_string()
                    } else {
                        "unit was not compiled".to_string()
                    },
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_writer::MemoryClassWriter;

    const IDENTITY: &str = r#"Module("lib", [
        StrategyDecl([], "identity"){OfType(STRATEGY([], ANY(), ANY())), OfDecl(Ref(){TermIndex("lib.tego", 1)})},
        StrategyDef("identity", [], "x", Var("x"){OfType(ANY())}){OfRef(Ref(){TermIndex("lib.tego", 1)})}
    ])"#;

    #[test]
    fn test_compile_text() {
        let writer = MemoryClassWriter::new();
        let compiler = TegoCompiler::with_writer(CompilerConfig::default(), &writer);
        let classes = compiler.compile_text(IDENTITY).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].internal_name(), "lib/identityStrategy");
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn test_definition_found_by_name() {
        let text = IDENTITY.replace(r#"{OfRef(Ref(){TermIndex("lib.tego", 1)})}"#, "");
        let classes = TegoCompiler::new(CompilerConfig::default()).compile_text(&text).unwrap();
        assert_eq!(classes.len(), 1);
    }

    #[test]
    fn test_definition_without_declaration() {
        let text = r#"Module("lib", [StrategyDef("orphan", [], "x", Var("x"){OfType(ANY())})])"#;
        let err = TegoCompiler::new(CompilerConfig::default()).compile_text(text).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedSymbol { .. }));
    }

    #[test]
    fn test_duplicate_declaration() {
        let decl = r#"StrategyDecl([], "identity"){OfType(STRATEGY([], ANY(), ANY())), OfDecl(Ref(){TermIndex("lib.tego", 1)})}"#;
        let text = format!(r#"Module("lib", [{}, {}])"#, decl, decl);
        let err = TegoCompiler::new(CompilerConfig::default()).compile_text(&text).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateSymbol { .. }));
    }

    #[test]
    fn test_format_error() {
        let err = TegoCompiler::new(CompilerConfig::default()).compile_text("Module(").unwrap_err();
        assert!(matches!(err, CompileError::Format(_)));
    }

    #[test]
    fn test_compile_units_keeps_order() {
        let units: Vec<Term> = (0..6)
            .map(|i| {
                let text = IDENTITY.replace("\"lib\"", &format!("\"lib{}\"", i));
                tego_aterm::read(&text).unwrap()
            })
            .chain(std::iter::once(tego_aterm::read(r#"Module("bad", [Foo()])"#).unwrap()))
            .collect();
        let writer = MemoryClassWriter::new();
        let results = compile_units(&units, &CompilerConfig::default(), &writer);
        assert_eq!(results.len(), 7);
        for (i, result) in results.iter().take(6).enumerate() {
            let classes = result.as_ref().unwrap();
            assert_eq!(classes[0].internal_name(), format!("lib{}/identityStrategy", i));
        }
        assert!(results[6].is_err());
        assert_eq!(writer.len(), 6);
    }
}
