pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod env;
pub mod ir;
pub mod program;

use std::path::PathBuf;

use anyhow::Context as _;
use cppl_ast::Item;
use inkwell::context::Context;
use inkwell::module::Module;

use crate::config::{CompilerConfig, ErrorMode};
use crate::diagnostics::CompileErrors;
use crate::program::Program;

/// Compilation options for the cppl compiler.
///
/// The compiler consumes a finished AST, serialized as a JSON array of
/// items by an external parser, and produces the textual IR module.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// JSON file holding the `Vec<Item>` to compile
    pub input: PathBuf,

    /// Source text the AST was parsed from. Diagnostic spans are byte
    /// offsets into it; without it they are printed as raw offsets.
    pub source: Option<PathBuf>,

    /// Explicit configuration file; `cppl.toml` is used when present
    pub config_path: Option<PathBuf>,

    /// Where to write the IR; stdout when `None`
    pub output: Option<PathBuf>,

    /// Stop at the first failing item regardless of the configured mode
    pub abort_on_error: bool,
}

impl CompileOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        CompileOptions {
            input: input.into(),
            ..Default::default()
        }
    }
}

/// Registers `items`, builds all of them and returns the verified module.
pub fn compile_items<'ctx>(
    context: &'ctx Context,
    items: Vec<Item>,
    config: CompilerConfig,
) -> Result<Module<'ctx>, CompileErrors> {
    let mut program = Program::new(context, config);
    program.add_items(items);
    program.finalize()?;
    Ok(program.into_module())
}

/// Runs the full driver: load config and input, compile, report
/// diagnostics, write the IR.
pub fn compile(options: CompileOptions) -> anyhow::Result<()> {
    let mut config = CompilerConfig::load(options.config_path.as_deref())?;
    if options.abort_on_error {
        config.error_mode = ErrorMode::Abort;
    }

    let text = std::fs::read_to_string(&options.input)
        .with_context(|| format!("failed to read {}", options.input.display()))?;
    let items: Vec<Item> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid cppl AST", options.input.display()))?;
    let source = match &options.source {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
        ),
        None => None,
    };
    log::info!(
        "compiling {} item(s) from {}",
        items.len(),
        options.input.display()
    );

    let context = Context::create();
    let module = match compile_items(&context, items, config) {
        Ok(module) => module,
        Err(errors) => {
            let file = options
                .source
                .as_ref()
                .unwrap_or(&options.input)
                .display()
                .to_string();
            for d in &errors.diagnostics {
                diagnostics::emit_diagnostic(
                    &d.clone().with_file(file.clone()),
                    source.as_deref(),
                );
            }
            return Err(errors.into());
        }
    };

    let ir = module.print_to_string().to_string();
    match &options.output {
        Some(path) => std::fs::write(path, ir)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", ir),
    }
    Ok(())
}
