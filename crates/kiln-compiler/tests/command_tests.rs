//! Command files: bundling and the restrictions that make bundling possible.

mod helpers;

use helpers::{Project, assert_contains, assert_not_contains, norm};
use kiln_compiler::ErrorKind;
use kiln_graph::SourceLocation;

fn bot() -> Project {
    Project::new()
        .src(
            "managers/users.ts",
            "@Injectable\nexport class UserManager { count() { return 1; } }\n",
        )
        .src(
            "commands/ping.ts",
            r#"
            import { UserManager } from "../managers/users";
            import type { Context } from "kiln:client";
            import * as util from "node:util";
            import format, { pad as leftPad } from "kiln:text";
            import "../polyfill";

            export const description = "Replies with pong";
            export type Reply = string;
            type Internal = number;

            export default {
                description,
                run(ctx: Context): Reply {
                    return format(leftPad(util.inspect(UserManager)));
                },
            };
            "#,
        )
        .src("polyfill.ts", "globalThis.ready = true;\n")
        .src(
            "commands/admin/ban.ts",
            "export default function ban(target: string) { return target; }\n",
        )
}

#[tokio::test]
async fn command_files_are_bundled_not_written() {
    let project = bot();
    let report = project.build().await.unwrap();
    assert_eq!(report.commands, 2);

    let written = project.written();
    assert!(!written.iter().any(|p| p.starts_with("/app/.kiln/commands")));
    assert!(written.contains(&"/app/.kiln/polyfill.js".into()));

    let bundle = norm(&project.output("commands.js"));
    let admin = bundle.find(r#"commands.set("admin/ban""#).expect("admin/ban registered");
    let ping = bundle.find(r#"commands.set("ping""#).expect("ping registered");
    assert!(admin < ping, "commands are registered by name");
    assert!(bundle.contains("exportdefaultcommands;"));
}

#[tokio::test]
async fn static_imports_become_awaited_dynamic_imports() {
    let project = bot();
    project.build().await.unwrap();

    let bundle = project.output("commands.js");
    assert_contains(
        &bundle,
        r#"const { UserManager } = await import("./managers/users.js");"#,
    );
    assert_contains(&bundle, r#"const util = await import("node:util");"#);
    assert_contains(
        &bundle,
        r#"const { default: format, pad: leftPad } = await import("kiln:text");"#,
    );
    assert_contains(&bundle, r#"await import("./polyfill.js");"#);
    assert_not_contains(&bundle, "kiln:client");
    assert_not_contains(&bundle, "import {");
}

#[tokio::test]
async fn exports_become_locals_and_a_return() {
    let project = bot();
    project.build().await.unwrap();

    let bundle = project.output("commands.js");
    assert_contains(&bundle, r#"const description = "Replies with pong";"#);
    assert_contains(&bundle, "return {");
    assert_contains(&bundle, "return function ban(target)");
    assert_not_contains(&bundle, "export const");
    assert_not_contains(&bundle, "Reply");
    assert_not_contains(&bundle, "Internal");
}

#[tokio::test]
async fn commands_may_not_declare_classes_or_enums() {
    let class = Project::new().src(
        "commands/a.ts",
        "class Helper {}\nexport default new Helper();\n",
    );
    assert_eq!(class.build_errors().await, vec![ErrorKind::CommandClass]);

    let class_expression = Project::new().src(
        "commands/a.ts",
        "export default { Helper: class {} };\n",
    );
    class_expression.build().await.unwrap();

    let enumeration = Project::new().src(
        "commands/a.ts",
        "enum Color { Red }\nexport default Color.Red;\n",
    );
    assert_eq!(enumeration.build_errors().await, vec![ErrorKind::CommandEnum]);
}

#[tokio::test]
async fn commands_may_not_use_export_lists() {
    let list = Project::new().src(
        "commands/a.ts",
        "const a = 1;\nexport { a };\nexport default a;\n",
    );
    assert_eq!(
        list.build_errors().await,
        vec![ErrorKind::CommandExportSpecifiers]
    );

    let reexport = Project::new()
        .src("util.ts", "export const b = 2;\n")
        .src(
            "commands/a.ts",
            "export { b } from '../util';\nexport default 1;\n",
        );
    assert_eq!(
        reexport.build_errors().await,
        vec![ErrorKind::CommandExportSpecifiers]
    );

    let star = Project::new()
        .src("util.ts", "export const b = 2;\n")
        .src("commands/a.ts", "export * from '../util';\nexport default 1;\n");
    assert_eq!(star.build_errors().await, vec![ErrorKind::CommandExportAll]);
}

#[tokio::test]
async fn type_only_export_lists_are_dropped() {
    let project = Project::new().src(
        "commands/a.ts",
        "type Shape = { id: number };\nexport type { Shape };\nexport default 1;\n",
    );
    project.build().await.unwrap();
    assert_not_contains(&project.output("commands.js"), "Shape");
}

#[tokio::test]
async fn commands_need_a_default_export() {
    let project = Project::new().src("commands/a.ts", "export const a = 1;\n");
    let err = project.build().await.unwrap_err();
    assert_eq!(err.errors.len(), 1);
    assert_eq!(err.errors[0].kind(), ErrorKind::CommandDefaultExpected);
    assert_eq!(
        err.errors[0].location(),
        Some(&SourceLocation::new("/app/src/commands/a.ts", 1, 1))
    );
}

#[tokio::test]
async fn a_default_interface_is_not_a_command() {
    let project = Project::new().src(
        "commands/a.ts",
        "export const run = () => 1;\nexport default interface Options { name: string }\n",
    );
    assert_eq!(
        project.build_errors().await,
        vec![ErrorKind::CommandDefaultExpected]
    );
}

#[tokio::test]
async fn unresolved_local_imports_in_commands_fail() {
    let project = Project::new().src(
        "commands/a.ts",
        "import { x } from './missing';\nexport default x;\n",
    );
    assert_eq!(
        project.build_errors().await,
        vec![ErrorKind::UnresolvedImport]
    );
}

#[tokio::test]
async fn command_directories_are_configurable() {
    let custom = Project::new()
        .configure(|config| config.command_dirs = vec!["cmd".into(), "tools/cmd".into()])
        .src("cmd/a.ts", "export default 1;\n")
        .src("tools/cmd/b.ts", "export default 2;\n")
        .src("commands/c.ts", "export const c = 3;\n");
    let report = custom.build().await.unwrap();
    assert_eq!(report.commands, 2);

    let bundle = norm(&custom.output("commands.js"));
    assert!(bundle.contains(r#"commands.set("a""#));
    assert!(bundle.contains(r#"commands.set("b""#));
    assert!(custom.runtime.contents("/app/.kiln/commands/c.js").is_some());
}
