//! Tests for kiln-gen program building

use kiln_gen::{
    Allocator, GenError, ImportKind, ImportTable, ProgramBuilder, SourceType, string_literal,
};
use proptest::prelude::*;

#[test]
fn test_snippets_accumulate_in_order() {
    let allocator = Allocator::default();
    let mut module = ProgramBuilder::new(&allocator);

    module.push_source("const commands = new Map();").unwrap();
    module
        .push_source(r#"commands.set("ping", async () => { return { name: "ping" }; });"#)
        .unwrap();
    module.push_source("export default commands;").unwrap();
    assert_eq!(module.len(), 3);

    let code = module.generate().unwrap();
    let map = code.find("new Map()").unwrap();
    let set = code.find("commands.set(\"ping\"").unwrap();
    let export = code.find("export default commands").unwrap();
    assert!(map < set && set < export);
}

#[test]
fn test_invalid_snippet_is_rejected() {
    let allocator = Allocator::default();
    let mut module = ProgramBuilder::new(&allocator);

    let err = module.push_source("export default [;").unwrap_err();
    assert!(matches!(err, GenError::InvalidSnippet { .. }));
    assert!(module.is_empty());
}

#[test]
fn test_top_level_await_in_module() {
    let allocator = Allocator::default();
    let mut module = ProgramBuilder::new(&allocator);

    module
        .push_source(r#"import { bootstrap } from "@kiln/runtime";"#)
        .unwrap();
    module
        .push_source("export default await bootstrap({ dependencies: [] });")
        .unwrap();

    let code = module.generate().unwrap();
    assert!(code.contains("export default await bootstrap("));
}

#[test]
fn test_typescript_source_type_keeps_types() {
    let allocator = Allocator::default();
    let mut module = ProgramBuilder::with_source_type(&allocator, SourceType::ts());

    module.push_source("const routes: unknown[] = [];").unwrap();
    let code = module.generate().unwrap();
    assert!(code.contains("unknown[]"));
}

#[test]
fn test_manifest_with_import_table() {
    let allocator = Allocator::default();
    let mut module = ProgramBuilder::new(&allocator);

    let mut imports = ImportTable::new();
    let api = imports.import("./api.js", ImportKind::for_export("Api"), "Api");
    let again = imports.import("./api.js", ImportKind::for_export("Api"), "Api");
    assert_eq!(api, again);

    module.push_source(&imports.render()).unwrap();
    module
        .push_source(&format!(
            "export default [{{ endpoint: {}, handler: {}, entity: {api} }}, {{ endpoint: {}, handler: {}, entity: {again} }}];",
            string_literal("/a"),
            string_literal("a"),
            string_literal("/b"),
            string_literal("b"),
        ))
        .unwrap();

    let code = module.generate().unwrap();
    assert_eq!(code.matches("import { Api }").count(), 1);
    assert!(code.contains("entity: Api"));
}

proptest! {
    #[test]
    fn string_literals_always_parse(value in ".*") {
        let allocator = Allocator::default();
        let mut module = ProgramBuilder::new(&allocator);
        let snippet = format!("const x = {};", string_literal(&value));
        prop_assert!(module.push_source(&snippet).is_ok());
    }
}
