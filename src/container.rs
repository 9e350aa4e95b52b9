//! Container emission.
//!
//! Emits the `dicontainer` struct, its constructor and one resolver method per factory. A resolver returns the
//! cached instance when there is one, otherwise resolves the factory's dependencies depth-first in argument order,
//! calls `New<Name>` and caches the result under `<Name>`.
//!
//! ## Notes
//!
//! - The whole input is validated before the first byte is written, so a rejected run leaves the buffer untouched.
//! - With [`Synchronization::Mutex`] the public resolvers lock once and delegate to unexported `resolve<Name>`
//!   methods, which call each other without re-locking.

use std::collections::HashSet;

use dicon_model::{FuncDescriptor, InterfaceDescriptor, SignatureError, TypeDescriptor, go_keywords};

use crate::config::{BindingMode, GeneratorConfig, Synchronization};
use crate::emit::EmissionContext;
use crate::errors::{GenerateError, GenerateResult};
use crate::graph::{BindingTable, DependencyGraph};

/// Receiver name of the generated resolver methods.
const RECEIVER: &str = "d";

/// Everything needed to emit one resolver, decided before emission starts.
#[derive(Debug)]
struct ResolverPlan<'a> {
    factory: &'a FuncDescriptor,
    produced: &'a TypeDescriptor,
    /// Factory names of the dependencies, in argument order
    dependencies: Vec<String>,
}

/// Emit a container exposing `target` whose resolvers construct `factories`.
///
/// Fails without writing anything when a factory signature is not `(instance, error)`, a name is not a Go
/// identifier, a factory name repeats, or (in strict binding mode) the dependency graph has a missing or ambiguous
/// producer or a cycle.
///
/// Begins the run with the target's package unless the context already targets a package; types and constructors
/// are then qualified relative to that package.
#[tracing::instrument(skip_all, fields(target = %target.name, factory_count = factories.len()))]
pub fn emit_container(
    ctx: &mut EmissionContext,
    target: &InterfaceDescriptor,
    factories: &[FuncDescriptor],
) -> GenerateResult<()> {
    let package = ctx.package().unwrap_or(target.package.as_str()).to_string();
    let plans = plan_resolvers(ctx.config(), target, factories, &package)?;
    if !ctx.has_begun() {
        ctx.begin(&target.package)?;
    }

    emit_struct_defs(ctx, target);
    for plan in &plans {
        tracing::debug!(factory = %plan.factory.name, dependencies = ?plan.dependencies, "emitting resolver");
        emit_resolver(ctx, plan);
    }
    Ok(())
}

fn plan_resolvers<'a>(
    config: &GeneratorConfig,
    target: &InterfaceDescriptor,
    factories: &'a [FuncDescriptor],
    package: &str,
) -> GenerateResult<Vec<ResolverPlan<'a>>> {
    check_identifier(&target.name, "container interface name")?;
    check_identifier(&config.container_type, "container type name")?;
    check_identifier(&config.container_constructor, "container constructor name")?;

    let mut seen = HashSet::new();
    let mut produced = Vec::with_capacity(factories.len());
    for factory in factories {
        check_identifier(&factory.name, "factory name")?;
        check_identifier(&factory.package, "factory package")?;
        if !seen.insert(factory.name.as_str()) {
            return Err(GenerateError::DuplicateFactory {
                name: factory.name.clone(),
            });
        }
        produced.push(check_signature(factory, &target.package)?);
    }
    check_collisions(config, factories, package, &seen)?;

    let dependencies: Vec<Vec<String>> = match config.binding {
        BindingMode::Strict => {
            let table = BindingTable::build(factories)?;
            DependencyGraph::from_bindings(&table)?.check_acyclic()?;
            factories
                .iter()
                .map(|f| -> GenerateResult<Vec<String>> {
                    Ok(table.bind(f)?.into_iter().map(|dep| dep.name.clone()).collect())
                })
                .collect::<GenerateResult<_>>()?
        }
        BindingMode::Lenient => factories
            .iter()
            .map(|f| f.arguments.iter().map(|a| a.simple_name().to_string()).collect())
            .collect(),
    };

    Ok(factories
        .iter()
        .zip(produced)
        .zip(dependencies)
        .map(|((factory, produced), dependencies)| ResolverPlan {
            factory,
            produced,
            dependencies,
        })
        .collect())
}

fn check_identifier(name: &str, role: &'static str) -> GenerateResult<()> {
    if go_keywords::is_identifier(name) {
        Ok(())
    } else {
        Err(GenerateError::InvalidIdentifier {
            name: name.to_string(),
            role,
        })
    }
}

/// Reject factories whose generated members would clash with the container's own fields, methods or constructor.
fn check_collisions(
    config: &GeneratorConfig,
    factories: &[FuncDescriptor],
    package: &str,
    names: &HashSet<&str>,
) -> GenerateResult<()> {
    let mut fields = vec!["store"];
    if config.is_synchronized() {
        fields.push("mu");
    }

    for factory in factories {
        let name = factory.name.as_str();
        if let Some(field) = fields.iter().find(|&&field| field == name) {
            return Err(GenerateError::NameCollision {
                name: name.to_string(),
                existing: format!("the container field `{}`", field),
            });
        }
        let internal = resolve_symbol(config, name);
        if internal != name && names.contains(internal.as_str()) {
            return Err(GenerateError::NameCollision {
                name: internal,
                existing: format!("the internal resolver of factory `{}`", name),
            });
        }
        let constructor = factory.constructor_symbol();
        if factory.package == package && constructor == config.container_constructor {
            return Err(GenerateError::NameCollision {
                name: constructor,
                existing: "the generated container constructor".to_string(),
            });
        }
    }
    Ok(())
}

fn check_signature<'a>(factory: &'a FuncDescriptor, package: &str) -> GenerateResult<&'a TypeDescriptor> {
    factory.check_signature().map_err(|e| match e {
        SignatureError::Arity { found } => GenerateError::ReturnArity {
            factory: factory.name.clone(),
            found,
            returns: factory
                .returns
                .iter()
                .map(|r| r.render(package))
                .collect::<Vec<_>>()
                .join(", "),
        },
        SignatureError::NotError { found } => GenerateError::ErrorReturn {
            factory: factory.name.clone(),
            found: found.render(package),
        },
    })
}

/// Name of the method that performs resolution for `factory`.
fn resolve_symbol(config: &GeneratorConfig, factory: &str) -> String {
    match config.synchronization {
        Synchronization::None => factory.to_string(),
        Synchronization::Mutex => format!("resolve{}", factory),
    }
}

fn emit_struct_defs(ctx: &mut EmissionContext, target: &InterfaceDescriptor) {
    let container = ctx.config().container_type.clone();
    let constructor = ctx.config().container_constructor.clone();
    let synchronized = ctx.config().is_synchronized();

    ctx.blank();
    ctx.block(&format!("type {} struct", container), |ctx| {
        let mut fields = Vec::new();
        if synchronized {
            fields.push(("mu".to_string(), "sync.Mutex".to_string()));
        }
        fields.push(("store".to_string(), "map[string]interface{}".to_string()));
        ctx.aligned_fields(&fields);
    });

    ctx.blank();
    let iface = ctx.render(&target.as_type());
    ctx.block(&format!("func {}() {}", constructor, iface), |ctx| {
        ctx.open(&format!("return &{}{{", container));
        ctx.line("store: map[string]interface{}{},");
        ctx.close("}");
    });
}

fn emit_resolver(ctx: &mut EmissionContext, plan: &ResolverPlan<'_>) {
    let container = ctx.config().container_type.clone();
    let name = &plan.factory.name;
    let produced = ctx.render(plan.produced);
    let signature = format!("({}, error)", produced);

    if ctx.config().is_synchronized() {
        let internal = resolve_symbol(ctx.config(), name);
        ctx.blank();
        ctx.block(
            &format!("func ({} *{}) {}() {}", RECEIVER, container, name, signature),
            |ctx| {
                ctx.line(&format!("{}.mu.Lock()", RECEIVER));
                ctx.line(&format!("defer {}.mu.Unlock()", RECEIVER));
                ctx.line(&format!("return {}.{}()", RECEIVER, internal));
            },
        );
    }

    let method = resolve_symbol(ctx.config(), name);
    let dependencies: Vec<String> = plan
        .dependencies
        .iter()
        .map(|dep| resolve_symbol(ctx.config(), dep))
        .collect();
    let constructor = format!(
        "{}{}",
        ctx.qualify(&plan.factory.package),
        plan.factory.constructor_symbol()
    );

    ctx.blank();
    ctx.block(
        &format!("func ({} *{}) {}() {}", RECEIVER, container, method, signature),
        |ctx| {
            // 1. cache lookup
            ctx.block(&format!("if i, ok := {}.store[\"{}\"]; ok", RECEIVER, name), |ctx| {
                ctx.line(&format!("instance, ok := i.({})", produced));
                ctx.block("if ok", |ctx| ctx.line("return instance, nil"));
                ctx.line(&format!(
                    "return nil, errors.Errorf(\"invalid instance is cached for {}: %v\", i)",
                    name
                ));
            });

            // 2. dependencies, depth-first in argument order
            let mut args = Vec::with_capacity(dependencies.len());
            for (i, (dep, dep_method)) in plan.dependencies.iter().zip(&dependencies).enumerate() {
                ctx.line(&format!("dep{}, err := {}.{}()", i, RECEIVER, dep_method));
                ctx.block("if err != nil", |ctx| {
                    ctx.line(&format!(
                        "return nil, errors.Wrap(err, \"resolve {} for {} failed at DICON\")",
                        dep, name
                    ));
                });
                args.push(format!("dep{}", i));
            }

            // 3. construction
            ctx.line(&format!("instance, err := {}({})", constructor, args.join(", ")));
            ctx.block("if err != nil", |ctx| {
                ctx.line(&format!("return nil, errors.Wrap(err, \"creation {} failed at DICON\")", name));
            });

            // 4. memoize
            ctx.line(&format!("{}.store[\"{}\"] = instance", RECEIVER, name));
            ctx.line("return instance, nil");
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(pkg: &str, name: &str) -> TypeDescriptor {
        TypeDescriptor::named(pkg, name).pointer()
    }

    fn greeter() -> InterfaceDescriptor {
        InterfaceDescriptor::new("app", "Greeter")
    }

    fn foo_and_db() -> Vec<FuncDescriptor> {
        vec![
            FuncDescriptor::new("app", "Foo").arg(ty("app", "DB")).produces(ty("app", "Foo")),
            FuncDescriptor::new("app", "DB").produces(ty("app", "DB")),
        ]
    }

    fn generate(config: GeneratorConfig, factories: &[FuncDescriptor]) -> GenerateResult<String> {
        let mut ctx = EmissionContext::new(config);
        emit_container(&mut ctx, &greeter(), factories)?;
        Ok(ctx.finish())
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("`{}` not found in:\n{}", needle, haystack))
    }

    // ========================================
    // Structure
    // ========================================

    #[test]
    fn test_container_struct_and_constructor() {
        let out = generate(GeneratorConfig::default(), &foo_and_db()).unwrap();
        assert!(out.contains("type dicontainer struct {\n\tstore map[string]interface{}\n}\n"));
        assert!(out.contains(
            "func NewDIContainer() Greeter {\n\treturn &dicontainer{\n\t\tstore: map[string]interface{}{},\n\t}\n}\n"
        ));
    }

    #[test]
    fn test_resolvers_follow_input_order() {
        let out = generate(GeneratorConfig::default(), &foo_and_db()).unwrap();
        let foo = position(&out, "func (d *dicontainer) Foo() (*Foo, error) {");
        let db = position(&out, "func (d *dicontainer) DB() (*DB, error) {");
        assert!(foo < db);
    }

    #[test]
    fn test_resolver_steps_are_ordered() {
        let out = generate(GeneratorConfig::default(), &foo_and_db()).unwrap();
        let body = &out[position(&out, "func (d *dicontainer) Foo()")..position(&out, "func (d *dicontainer) DB()")];

        let lookup = position(body, "if i, ok := d.store[\"Foo\"]; ok {");
        let dep = position(body, "dep0, err := d.DB()");
        let construct = position(body, "instance, err := NewFoo(dep0)");
        let store = position(body, "d.store[\"Foo\"] = instance");
        assert!(lookup < dep && dep < construct && construct < store);
    }

    #[test]
    fn test_cache_mismatch_is_an_error_not_a_rebuild() {
        let out = generate(GeneratorConfig::default(), &foo_and_db()).unwrap();
        assert!(out.contains("\t\tinstance, ok := i.(*Foo)\n"));
        assert!(out.contains("return nil, errors.Errorf(\"invalid instance is cached for Foo: %v\", i)\n\t}\n"));
    }

    #[test]
    fn test_errors_name_dependency_and_factory() {
        let out = generate(GeneratorConfig::default(), &foo_and_db()).unwrap();
        assert!(out.contains("errors.Wrap(err, \"resolve DB for Foo failed at DICON\")"));
        assert!(out.contains("errors.Wrap(err, \"creation Foo failed at DICON\")"));
        assert!(out.contains("errors.Wrap(err, \"creation DB failed at DICON\")"));
    }

    #[test]
    fn test_dependencies_resolved_in_argument_order() {
        let factories = vec![
            FuncDescriptor::new("app", "App")
                .arg(ty("app", "Repo"))
                .arg(ty("app", "Cache"))
                .produces(ty("app", "App")),
            FuncDescriptor::new("app", "Cache").arg(ty("app", "DB")).produces(ty("app", "Cache")),
            FuncDescriptor::new("app", "Repo").arg(ty("app", "DB")).produces(ty("app", "Repo")),
            FuncDescriptor::new("app", "DB").produces(ty("app", "DB")),
        ];
        let out = generate(GeneratorConfig::default(), &factories).unwrap();
        let first = position(&out, "dep0, err := d.Repo()");
        let second = position(&out, "dep1, err := d.Cache()");
        assert!(first < second);
        assert!(out.contains("instance, err := NewApp(dep0, dep1)"));
        // the shared dependency has exactly one resolver and one cache slot
        assert_eq!(out.matches("func (d *dicontainer) DB()").count(), 1);
        assert_eq!(out.matches("d.store[\"DB\"] = instance").count(), 1);
    }

    #[test]
    fn test_cross_package_types_and_constructors_are_qualified() {
        let factories = vec![
            FuncDescriptor::new("infra", "DB").produces(ty("infra", "DB")),
            FuncDescriptor::new("app", "Foo").arg(ty("infra", "DB")).produces(ty("app", "Foo")),
        ];
        let out = generate(GeneratorConfig::default(), &factories).unwrap();
        assert!(out.contains("func (d *dicontainer) DB() (*infra.DB, error) {"));
        assert!(out.contains("instance, ok := i.(*infra.DB)"));
        assert!(out.contains("instance, err := infra.NewDB()"));
        assert!(out.contains("instance, err := NewFoo(dep0)"));
    }

    // ========================================
    // Validation
    // ========================================

    #[test]
    fn test_wrong_arity_aborts_before_any_output() {
        for returns in [vec![ty("app", "DB")], vec![ty("app", "DB"), ty("app", "X"), TypeDescriptor::error()]] {
            let bad = FuncDescriptor {
                returns,
                ..FuncDescriptor::new("app", "DB")
            };
            let factories = vec![FuncDescriptor::new("app", "Foo").produces(ty("app", "Foo")), bad];

            let mut ctx = EmissionContext::new(GeneratorConfig::default());
            let err = emit_container(&mut ctx, &greeter(), &factories).unwrap_err();
            assert!(matches!(err, GenerateError::ReturnArity { ref factory, .. } if factory == "DB"));
            assert!(ctx.as_str().is_empty(), "partial output: {}", ctx.as_str());
            assert!(!ctx.has_begun());
        }
    }

    #[test]
    fn test_second_return_must_be_error() {
        let factories = vec![FuncDescriptor::new("app", "DB")
            .ret(ty("app", "DB"))
            .ret(TypeDescriptor::builtin("bool"))];
        let err = generate(GeneratorConfig::default(), &factories).unwrap_err();
        assert_eq!(
            err,
            GenerateError::ErrorReturn {
                factory: "DB".into(),
                found: "bool".into()
            }
        );
    }

    #[test]
    fn test_duplicate_factory_name() {
        let factories = vec![
            FuncDescriptor::new("app", "DB").produces(ty("app", "DB")),
            FuncDescriptor::new("app", "DB").produces(ty("app", "OtherDB")),
        ];
        let err = generate(GeneratorConfig::default(), &factories).unwrap_err();
        assert_eq!(err, GenerateError::DuplicateFactory { name: "DB".into() });
    }

    #[test]
    fn test_invalid_factory_name() {
        let factories = vec![FuncDescriptor::new("app", "func").produces(ty("app", "DB"))];
        let err = generate(GeneratorConfig::default(), &factories).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidIdentifier { role: "factory name", .. }));
    }

    #[test]
    fn test_factory_named_after_container_field() {
        let factories = vec![FuncDescriptor::new("app", "store").produces(ty("app", "Store"))];
        let mut ctx = EmissionContext::new(GeneratorConfig::default());
        let err = emit_container(&mut ctx, &greeter(), &factories).unwrap_err();
        assert_eq!(
            err,
            GenerateError::NameCollision {
                name: "store".into(),
                existing: "the container field `store`".into()
            }
        );
        assert!(ctx.as_str().is_empty());
    }

    #[test]
    fn test_mutex_field_is_reserved_only_when_synchronized() {
        let factories = vec![FuncDescriptor::new("app", "mu").produces(ty("app", "Mu"))];
        assert!(generate(GeneratorConfig::default(), &factories).is_ok());

        let config = GeneratorConfig::new().with_synchronization(Synchronization::Mutex);
        let err = generate(config, &factories).unwrap_err();
        assert!(matches!(err, GenerateError::NameCollision { ref name, .. } if name == "mu"));
    }

    #[test]
    fn test_factory_named_like_internal_resolver() {
        let factories = vec![
            FuncDescriptor::new("app", "DB").produces(ty("app", "DB")),
            FuncDescriptor::new("app", "resolveDB").produces(ty("app", "Other")),
        ];
        assert!(generate(GeneratorConfig::default(), &factories).is_ok());

        let config = GeneratorConfig::new().with_synchronization(Synchronization::Mutex);
        let err = generate(config, &factories).unwrap_err();
        assert_eq!(
            err,
            GenerateError::NameCollision {
                name: "resolveDB".into(),
                existing: "the internal resolver of factory `DB`".into()
            }
        );
    }

    #[test]
    fn test_factory_constructor_clashes_with_container_constructor() {
        let factories = vec![FuncDescriptor::new("app", "DIContainer").produces(ty("app", "DIContainer"))];
        let err = generate(GeneratorConfig::default(), &factories).unwrap_err();
        assert!(matches!(err, GenerateError::NameCollision { ref name, .. } if name == "NewDIContainer"));

        // a constructor living in another package does not share the namespace
        let foreign = vec![FuncDescriptor::new("infra", "DIContainer").produces(ty("infra", "DIContainer"))];
        assert!(generate(GeneratorConfig::default(), &foreign).is_ok());
    }

    #[test]
    fn test_renamed_container() {
        let config = GeneratorConfig::new().with_container_names("registry", "NewRegistry");
        let out = generate(config, &foo_and_db()).unwrap();
        assert!(out.contains("type registry struct {"));
        assert!(out.contains("func NewRegistry() Greeter {\n\treturn &registry{"));
        assert!(out.contains("func (d *registry) DB() (*DB, error) {"));

        let bad = GeneratorConfig::new().with_container_names("registry", "New-Registry");
        assert!(matches!(
            generate(bad, &foo_and_db()),
            Err(GenerateError::InvalidIdentifier { role: "container constructor name", .. })
        ));
    }

    #[test]
    fn test_strict_rejects_cycle() {
        let factories = vec![
            FuncDescriptor::new("app", "A").arg(ty("app", "B")).produces(ty("app", "A")),
            FuncDescriptor::new("app", "B").arg(ty("app", "A")).produces(ty("app", "B")),
        ];
        let mut ctx = EmissionContext::new(GeneratorConfig::default());
        let err = emit_container(&mut ctx, &greeter(), &factories).unwrap_err();
        assert!(matches!(err, GenerateError::DependencyCycle { .. }));
        assert!(ctx.as_str().is_empty());
    }

    #[test]
    fn test_strict_rejects_missing_producer() {
        let factories = vec![FuncDescriptor::new("app", "Foo").arg(ty("app", "DB")).produces(ty("app", "Foo"))];
        let err = generate(GeneratorConfig::default(), &factories).unwrap_err();
        assert!(matches!(err, GenerateError::MissingFactory { .. }));
    }

    // ========================================
    // Lenient binding
    // ========================================

    #[test]
    fn test_lenient_binds_by_simple_name() {
        // nothing produces `DB`; lenient mode trusts the name
        let factories = vec![FuncDescriptor::new("app", "Foo")
            .arg(ty("infra", "DB"))
            .produces(ty("app", "Foo"))];
        let config = GeneratorConfig::new().with_binding(BindingMode::Lenient);
        let out = generate(config, &factories).unwrap();
        assert!(out.contains("dep0, err := d.DB()"));
    }

    #[test]
    fn test_lenient_still_checks_signatures() {
        let factories = vec![FuncDescriptor::new("app", "Foo").ret(ty("app", "Foo"))];
        let config = GeneratorConfig::new().with_binding(BindingMode::Lenient);
        assert!(matches!(
            generate(config, &factories),
            Err(GenerateError::ReturnArity { found: 1, .. })
        ));
    }

    // ========================================
    // Synchronization
    // ========================================

    #[test]
    fn test_synchronized_container() {
        let config = GeneratorConfig::new().with_synchronization(Synchronization::Mutex);
        let out = generate(config, &foo_and_db()).unwrap();

        assert!(out.contains("type dicontainer struct {\n\tmu    sync.Mutex\n\tstore map[string]interface{}\n}\n"));
        assert!(out.contains(
            "func (d *dicontainer) Foo() (*Foo, error) {\n\td.mu.Lock()\n\tdefer d.mu.Unlock()\n\treturn d.resolveFoo()\n}\n"
        ));
        assert!(out.contains("func (d *dicontainer) resolveFoo() (*Foo, error) {"));
        // internal resolution never goes through the locking entry points
        assert!(out.contains("dep0, err := d.resolveDB()"));
        assert!(!out.contains("dep0, err := d.DB()"));
        assert_eq!(out.matches(".mu.Lock()").count(), 2);
    }

    #[test]
    fn test_container_after_mocks_shares_header() {
        let mut ctx = EmissionContext::new(GeneratorConfig::default());
        ctx.begin("app").unwrap();
        emit_container(&mut ctx, &greeter(), &foo_and_db()).unwrap();
        assert_eq!(ctx.as_str().matches("package app").count(), 1);
    }

    #[test]
    fn test_container_into_other_package_qualifies_everything() {
        let mut ctx = EmissionContext::new(GeneratorConfig::default());
        ctx.begin("wire").unwrap();
        emit_container(&mut ctx, &greeter(), &foo_and_db()).unwrap();
        let out = ctx.finish();
        assert!(out.contains("package wire\n"));
        assert!(out.contains("func NewDIContainer() app.Greeter {"));
        assert!(out.contains("func (d *dicontainer) Foo() (*app.Foo, error) {"));
        assert!(out.contains("instance, err := app.NewFoo(dep0)"));
    }
}
