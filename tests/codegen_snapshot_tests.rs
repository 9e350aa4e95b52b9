//! Golden snapshot tests for codegen
//!
//! These tests generate Go code from descriptor models and compare
//! the output against stored snapshots. This ensures codegen changes are
//! reviewed and intentional.
//!
//! Run with: `cargo test --test codegen_snapshot_tests`
//! Review changes: `cargo insta review`

use std::path::Path;

use dicon::model::{FuncDescriptor, InterfaceDescriptor, MethodDescriptor, TypeDescriptor};
use dicon::{
    BuiltinNormalizer, EmissionContext, GeneratorConfig, SourceNormalizer, Synchronization, emit_container,
    emit_mocks,
};

fn ptr(name: &str) -> TypeDescriptor {
    TypeDescriptor::named("app", name).pointer()
}

/// `Greeter` backed by `Foo`, which depends on `DB`.
fn greeter_container(ctx: &mut EmissionContext) {
    let target = InterfaceDescriptor::new("app", "Greeter");
    let factories = vec![
        FuncDescriptor::new("app", "Foo").arg(ptr("DB")).produces(ptr("Foo")),
        FuncDescriptor::new("app", "DB").produces(ptr("DB")),
    ];
    emit_container(ctx, &target, &factories).expect("container generation failed");
}

fn store_interface() -> InterfaceDescriptor {
    InterfaceDescriptor::new("app", "Store")
        .method(
            MethodDescriptor::new("Get")
                .arg(TypeDescriptor::builtin("string"))
                .ret(ptr("Item"))
                .ret(TypeDescriptor::error()),
        )
        .method(MethodDescriptor::new("Close"))
        .method(MethodDescriptor::new("Len").ret(TypeDescriptor::builtin("int")))
}

fn normalize(source: &str) -> String {
    BuiltinNormalizer::new()
        .normalize(Path::new("dicon_gen.go"), source)
        .expect("normalization failed")
}

#[test]
fn test_greeter_container_codegen() {
    let mut ctx = EmissionContext::new(GeneratorConfig::default());
    greeter_container(&mut ctx);
    let go_code = ctx.finish();
    insta::assert_snapshot!("greeter_container", go_code);
}

#[test]
fn test_synchronized_container_codegen() {
    let mut ctx = EmissionContext::new(GeneratorConfig::new().with_synchronization(Synchronization::Mutex));
    greeter_container(&mut ctx);
    let go_code = normalize(&ctx.finish());
    insta::assert_snapshot!("synchronized_container", go_code);
}

#[test]
fn test_store_mock_codegen() {
    let mut ctx = EmissionContext::new(GeneratorConfig::default());
    emit_mocks(&mut ctx, &[store_interface()]).expect("mock generation failed");
    let go_code = normalize(&ctx.finish());
    insta::assert_snapshot!("store_mock", go_code);
}
