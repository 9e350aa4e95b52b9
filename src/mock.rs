//! Mock emission.
//!
//! For an interface `Store` this emits a `StoreMock` struct holding one function field per method, a
//! `NewStoreMock` constructor and one trampoline per method that forwards its arguments to the field and its
//! results back to the caller. Tests swap behaviour in by assigning the fields.

use std::collections::{HashMap, HashSet};

use dicon_model::{InterfaceDescriptor, MethodDescriptor, go_keywords};

use crate::emit::EmissionContext;
use crate::errors::{GenerateError, GenerateResult};

/// Receiver name of the generated trampolines.
const RECEIVER: &str = "mk";

/// Emit one mock per target, in input order.
///
/// Begins the run with the first target's package unless the context already targets a package.
#[tracing::instrument(skip_all, fields(target_count = targets.len()))]
pub fn emit_mocks(ctx: &mut EmissionContext, targets: &[InterfaceDescriptor]) -> GenerateResult<()> {
    let suffix = ctx.config().mock_suffix.as_str();
    let mut mock_types: HashMap<String, &InterfaceDescriptor> = HashMap::new();
    for target in targets {
        check_names(target)?;
        check_members(target, suffix)?;
        let mock = format!("{}{}", target.name, suffix);
        if let Some(first) = mock_types.get(&mock) {
            return Err(GenerateError::NameCollision {
                name: mock,
                existing: format!("the mock of `{}.{}`", first.package, first.name),
            });
        }
        mock_types.insert(mock, target);
    }
    if !ctx.has_begun() {
        if let Some(first) = targets.first() {
            ctx.begin(&first.package)?;
        }
    }

    for target in targets {
        tracing::debug!(interface = %target.name, methods = target.methods.len(), "emitting mock");
        emit_mock(ctx, target);
    }
    Ok(())
}

fn check_names(target: &InterfaceDescriptor) -> GenerateResult<()> {
    let names = std::iter::once((&target.name, "mock target name"))
        .chain(target.methods.iter().map(|m| (&m.name, "method name")));
    for (name, role) in names {
        if !go_keywords::is_identifier(name) {
            return Err(GenerateError::InvalidIdentifier {
                name: name.clone(),
                role,
            });
        }
    }
    Ok(())
}

/// Every method becomes both a trampoline `<M>` and a field `<M><suffix>` on the same struct.
fn check_members(target: &InterfaceDescriptor, suffix: &str) -> GenerateResult<()> {
    let mut methods = HashSet::new();
    for method in &target.methods {
        if !methods.insert(method.name.as_str()) {
            return Err(GenerateError::NameCollision {
                name: method.name.clone(),
                existing: format!("another method of `{}`", target.name),
            });
        }
    }
    for method in &target.methods {
        let field = format!("{}{}", method.name, suffix);
        if methods.contains(field.as_str()) {
            return Err(GenerateError::NameCollision {
                name: field,
                existing: format!("the mock field for method `{}` of `{}`", method.name, target.name),
            });
        }
    }
    Ok(())
}

/// Render a result list: nothing, a bare type, or a parenthesized group.
pub fn render_returns(returns: &[String]) -> String {
    match returns {
        [] => String::new(),
        [single] => single.clone(),
        many => format!("({})", many.join(", ")),
    }
}

/// A method's parameters (`a0 T0, a1 T1`) and rendered results.
struct RenderedSignature {
    params: Vec<String>,
    arg_names: Vec<String>,
    returns: String,
}

impl RenderedSignature {
    fn of(ctx: &mut EmissionContext, method: &MethodDescriptor) -> Self {
        let arg_names: Vec<String> = (0..method.arguments.len()).map(|i| format!("a{}", i)).collect();
        let params = method
            .arguments
            .iter()
            .zip(&arg_names)
            .map(|(ty, name)| format!("{} {}", name, ctx.render(ty)))
            .collect();
        let returns: Vec<String> = method.returns.iter().map(|r| ctx.render(r)).collect();
        Self {
            params,
            arg_names,
            returns: render_returns(&returns),
        }
    }

    /// `(params) returns`, without a trailing space when there are no results.
    fn tail(&self) -> String {
        let params = format!("({})", self.params.join(", "));
        if self.returns.is_empty() {
            params
        } else {
            format!("{} {}", params, self.returns)
        }
    }
}

fn emit_mock(ctx: &mut EmissionContext, target: &InterfaceDescriptor) {
    let suffix = ctx.config().mock_suffix.clone();
    let mock = format!("{}{}", target.name, suffix);
    let signatures: Vec<RenderedSignature> = target
        .methods
        .iter()
        .map(|m| RenderedSignature::of(ctx, m))
        .collect();

    ctx.blank();
    ctx.block(&format!("type {} struct", mock), |ctx| {
        let fields: Vec<(String, String)> = target
            .methods
            .iter()
            .zip(&signatures)
            .map(|(m, sig)| (format!("{}{}", m.name, suffix), format!("func{}", sig.tail())))
            .collect();
        ctx.aligned_fields(&fields);
    });

    ctx.blank();
    ctx.block(&format!("func New{}() *{}", mock, mock), |ctx| {
        ctx.line(&format!("return &{}{{}}", mock));
    });

    for (method, sig) in target.methods.iter().zip(&signatures) {
        let call = format!("{}.{}{}({})", RECEIVER, method.name, suffix, sig.arg_names.join(", "));
        ctx.blank();
        ctx.block(
            &format!("func ({} *{}) {}{}", RECEIVER, mock, method.name, sig.tail()),
            |ctx| {
                if sig.returns.is_empty() {
                    ctx.line(&call);
                } else {
                    ctx.line(&format!("return {}", call));
                }
            },
        );
    }
}
