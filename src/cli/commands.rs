//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::Path;

use crate::config::{BindingMode, GeneratorConfig, Synchronization};
use crate::container::emit_container;
use crate::descriptors::DescriptorDocument;
use crate::emit::EmissionContext;
use crate::mock::emit_mocks;
use crate::output::{Destination, OutputError};

use super::{CliError, CliResult, ContainerArgs, ExitCode, MockArgs, OutputArgs};

/// Load the descriptor document named on the command line.
pub fn load_descriptors(path: &Path) -> CliResult<DescriptorDocument> {
    DescriptorDocument::load(path).map_err(CliError::diagnostic)
}

/// `dicon container`
pub fn generate_container(args: &ContainerArgs) -> CliResult<ExitCode> {
    let doc = load_descriptors(&args.output.descriptors)?;
    let Some(container) = doc.container.as_ref() else {
        return Err(CliError::failure(format!(
            "Error: {} has no \"container\" section",
            args.output.descriptors.display()
        )));
    };

    let config = GeneratorConfig::new()
        .with_binding(if args.lenient {
            BindingMode::Lenient
        } else {
            BindingMode::Strict
        })
        .with_synchronization(if args.synchronized {
            Synchronization::Mutex
        } else {
            Synchronization::None
        })
        .with_container_names(&args.container_type, &args.constructor)
        .with_imports(doc.imports.clone());

    let mut ctx = EmissionContext::new(config);
    if let Some(package) = &doc.package {
        ctx.begin(package).map_err(CliError::diagnostic)?;
    }
    emit_container(&mut ctx, &container.interface, &container.factories).map_err(CliError::diagnostic)?;
    tracing::info!(
        interface = %container.interface.name,
        factories = container.factories.len(),
        "generated container"
    );

    write_generated(ctx, &args.output)
}

/// `dicon mock`
pub fn generate_mocks(args: &MockArgs) -> CliResult<ExitCode> {
    let doc = load_descriptors(&args.output.descriptors)?;
    if doc.mocks.is_empty() {
        return Err(CliError::failure(format!(
            "Error: {} has no \"mocks\" to generate",
            args.output.descriptors.display()
        )));
    }

    let mut ctx = EmissionContext::new(GeneratorConfig::new().with_imports(doc.imports.clone()));
    if let Some(package) = args.package.as_ref().or(doc.package.as_ref()) {
        ctx.begin(package).map_err(CliError::diagnostic)?;
    }
    emit_mocks(&mut ctx, &doc.mocks).map_err(CliError::diagnostic)?;
    tracing::info!(mocks = doc.mocks.len(), "generated mocks");

    write_generated(ctx, &args.output)
}

/// Normalize and write the buffer. On normalizer failure the raw buffer goes to stderr first, so the broken text
/// can be inspected.
///
/// Unless the normalizer adds imports itself, every package the code refers to must have a known import path.
fn write_generated(ctx: EmissionContext, args: &OutputArgs) -> CliResult<ExitCode> {
    let destination = Destination::from_option(args.output.clone());
    let normalizer = args.normalizer.build();
    if !normalizer.resolves_imports() {
        ctx.check_imports().map_err(CliError::diagnostic)?;
    }

    match destination.emit(&ctx.finish(), normalizer.as_ref()) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            if let OutputError::Normalize { raw, .. } = &err {
                eprintln!("{}", raw);
            }
            Err(CliError::diagnostic(err))
        }
    }
}
