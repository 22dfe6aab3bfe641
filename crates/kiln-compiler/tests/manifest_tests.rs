//! End-to-end builds: decorators in, manifests out.

mod helpers;

use helpers::{Project, assert_contains, assert_not_contains, norm};
use kiln_config::EmitTarget;

fn managers() -> Project {
    Project::new()
        .src(
            "managers/db.ts",
            r#"
            @Injectable
            export class Database {
                query(sql: string) { return sql; }
            }
            "#,
        )
        .src(
            "managers/users.ts",
            r#"
            import { Database } from "./db";

            @Manager
            export class UserManager {
                constructor(private db: Database) {}
            }
            "#,
        )
        .src(
            "services/cache.ts",
            r#"
            import { Database } from "../managers/db.js";
            import { UserManager } from "../managers/users";

            @Service
            export default class Cache {
                constructor(private readonly db: Database, public users: UserManager) {}
            }
            "#,
        )
}

#[tokio::test]
async fn dependencies_follow_constructor_order() {
    let project = managers();
    let report = project.build().await.unwrap();
    assert_eq!(report.injectables, 3);
    assert_eq!(report.modules, 3);

    let manifest = project.output("dependencies.js");
    assert_contains(&manifest, "{ entity: Database, dependencies: [] }");
    assert_contains(&manifest, "{ entity: UserManager, dependencies: [Database] }");
    assert_contains(
        &manifest,
        "{ entity: Cache, dependencies: [Database, UserManager] }",
    );
}

#[tokio::test]
async fn same_class_through_different_specifiers_is_one_symbol() {
    let project = managers();
    let report = project.build().await.unwrap();

    // `./db` and `../managers/db.js` name the same module
    assert_eq!(report.statistics.symbols, 3);

    let manifest = norm(&project.output("dependencies.js"));
    assert_eq!(manifest.matches(r#"from"./managers/db.js""#).count(), 1);
    assert_contains(&manifest, r#"import Cache from "./services/cache.js";"#);
}

#[tokio::test]
async fn service_files_lose_decorators_and_types() {
    let project = managers();
    project.build().await.unwrap();

    let users = project.output("managers/users.js");
    assert_not_contains(&users, "@Manager");
    assert_not_contains(&users, "private");
    assert_contains(&users, "this.db = db");
    assert_contains(&users, "export class UserManager");
}

#[tokio::test]
async fn routes_and_events_manifests() {
    let project = Project::new().src(
        "bot.ts",
        r#"
        @Injectable
        export class Bot {
            @Http.get("/ping")
            ping() { return "pong"; }

            @Api.post("/users")
            createUser() {}

            @Event
            OnceReady() {}

            @Event
            OnMessageCreate(message: unknown) {}
        }
        "#,
    );
    let report = project.build().await.unwrap();
    assert_eq!((report.routes, report.events), (2, 2));

    let routes = norm(&project.output("routes.js"));
    let http = norm(r#"{ endpoint: "/ping", method: "get", ipc: false, handler: "ping", entity: Bot }"#);
    let ipc = norm(r#"{ endpoint: "/users", method: "post", ipc: true, handler: "createUser", entity: Bot }"#);
    assert!(routes.contains(&http), "{routes}");
    assert!(routes.contains(&ipc), "{routes}");
    // same module and class, so the handler name decides
    assert!(routes.find(&ipc) < routes.find(&http));
    assert_eq!(routes.matches(r#"import{Bot}from"./bot.js""#).count(), 1);

    let events = norm(&project.output("events.js"));
    let message = norm(r#"{ type: "messageCreate", once: false, handler: "OnMessageCreate", entity: Bot }"#);
    let ready = norm(r#"{ type: "ready", once: true, handler: "OnceReady", entity: Bot }"#);
    assert!(events.contains(&message), "{events}");
    assert!(events.contains(&ready), "{events}");
    assert!(events.find(&message) < events.find(&ready));

    let bot = project.output("bot.js");
    assert_not_contains(&bot, "@Http");
    assert_not_contains(&bot, "@Event");
}

#[tokio::test]
async fn manifests_are_ordered_by_module_then_handler() {
    let project = Project::new()
        .src(
            "z.ts",
            "@Injectable\nexport class Zed {\n  @Http.get('/a')\n  a() {}\n  @Event\n  OnReady() {}\n}\n",
        )
        .src(
            "a.ts",
            "@Injectable\nexport class Able {\n  @Http.get('/z')\n  z() {}\n  @Http.get('/b')\n  b() {}\n  @Event\n  OnceReady() {}\n}\n",
        );
    project.build().await.unwrap();

    let routes = norm(&project.output("routes.js"));
    let order: Vec<usize> = ["\"/b\"", "\"/z\"", "\"/a\""]
        .iter()
        .map(|endpoint| routes.find(&format!("endpoint:{endpoint}")).unwrap())
        .collect();
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{routes}");

    let events = norm(&project.output("events.js"));
    assert!(events.find("\"OnceReady\"") < events.find("\"OnReady\""), "{events}");
}

#[tokio::test]
async fn static_and_instance_handlers_stay_apart() {
    let project = Project::new().src(
        "api.ts",
        r#"
        @Injectable
        export class Api {
            @Http.get("/ping")
            ping() {}

            @Http.get("/health")
            static ping() {}
        }
        "#,
    );
    let report = project.build().await.unwrap();
    assert_eq!(report.routes, 2);

    let routes = norm(&project.output("routes.js"));
    assert!(routes.contains(&norm(
        r#"{ endpoint: "/health", method: "get", ipc: false, handler: "ping", static: true, entity: Api }"#
    )), "{routes}");
    assert!(routes.contains(&norm(
        r#"{ endpoint: "/ping", method: "get", ipc: false, handler: "ping", entity: Api }"#
    )), "{routes}");
}

#[tokio::test]
async fn entry_bootstraps_every_manifest() {
    let project = managers();
    let report = project.build().await.unwrap();

    let entry = project.output("index.js");
    assert_contains(&entry, r#"import { bootstrap } from "@kiln/runtime";"#);
    assert_contains(&entry, r#"import routes from "./routes.js";"#);
    assert_contains(
        &entry,
        "export default await bootstrap({ dependencies, routes, events, commands });",
    );

    // 3 services + 3 manifests + commands bundle + entry
    assert_eq!(report.written.len(), 8);
    assert_eq!(project.written().len(), 8);
}

#[tokio::test]
async fn unexported_classes_are_exported_for_the_manifest() {
    let project = Project::new().src(
        "hidden.ts",
        "@Injectable\nclass Hidden {}\n",
    );
    project.build().await.unwrap();

    assert_contains(&project.output("hidden.js"), "export { Hidden };");
    assert_contains(
        &project.output("dependencies.js"),
        r#"import { Hidden } from "./hidden.js";"#,
    );
}

#[tokio::test]
async fn renamed_exports_are_imported_by_their_export_name() {
    let project = Project::new().src(
        "store.ts",
        "@Injectable\nclass Store {}\nexport { Store as KeyValueStore };\n",
    );
    project.build().await.unwrap();

    let manifest = project.output("dependencies.js");
    assert_contains(&manifest, r#"import { KeyValueStore } from "./store.js";"#);
    assert_not_contains(&project.output("store.js"), "export { Store };");
}

#[tokio::test]
async fn package_dependencies_are_imported_verbatim() {
    let project = Project::new()
        .file("node_modules/discord.js/index.js", "export class Client {}")
        .src(
            "bot.ts",
            r#"
            import { Client } from "discord.js";
            import * as kiln from "kiln:client";

            @Injectable
            export class Bot {
                constructor(private client: Client, private gateway: kiln.Gateway) {}
            }
            "#,
        );
    project.build().await.unwrap();

    let manifest = project.output("dependencies.js");
    assert_contains(&manifest, r#"import { Client } from "discord.js";"#);
    assert_contains(&manifest, r#"import { Gateway } from "kiln:client";"#);
    assert_contains(&manifest, "{ entity: Bot, dependencies: [Client, Gateway] }");
}

#[tokio::test]
async fn serializable_classes_are_flagged() {
    let project = Project::new().src(
        "models/user.ts",
        "@Serializable\nexport class User { id = 0; }\n",
    );
    project.build().await.unwrap();

    let user = project.output("models/user.js");
    assert_contains(&user, "User.serializable = true;");
    assert_not_contains(&user, "@Serializable");
}

#[tokio::test]
async fn unknown_decorators_pass_through() {
    let project = Project::new().src(
        "audited.ts",
        r#"
        @Injectable
        @audit("users")
        export class Audited {
            @trace
            run() {}
        }
        "#,
    );
    project.build().await.unwrap();

    let code = project.output("audited.js");
    assert_not_contains(&code, "@Injectable");
    assert_contains(&code, "@audit(\"users\")");
    assert_contains(&code, "@trace");
}

#[tokio::test]
async fn typescript_output_keeps_types() {
    let project = managers().configure(|config| config.emit = EmitTarget::Ts);
    project.build().await.unwrap();

    let users = project.output("managers/users.ts");
    assert_contains(&users, "constructor(private db: Database)");
    assert_not_contains(&users, "@Manager");
    assert_contains(
        &project.output("dependencies.ts"),
        r#"import { Database } from "./managers/db.ts";"#,
    );
}

#[tokio::test]
async fn output_is_deterministic() {
    let first = managers();
    first.build().await.unwrap();
    let second = managers();
    second.build().await.unwrap();

    for artifact in ["dependencies.js", "routes.js", "events.js", "commands.js", "index.js"] {
        assert_eq!(first.output(artifact), second.output(artifact), "{artifact}");
    }
}

#[tokio::test]
async fn clean_removes_stale_output() {
    let project = managers()
        .file(".kiln/stale.js", "old")
        .configure(|config| config.clean = true);
    project.build().await.unwrap();

    assert!(project.runtime.contents("/app/.kiln/stale.js").is_none());
    assert!(project.runtime.contents("/app/.kiln/index.js").is_some());
}

#[tokio::test]
async fn handlers_on_plain_classes_warn() {
    let project = Project::new().src(
        "plain.ts",
        "export class Plain {\n  @Http.get(\"/x\")\n  x() {}\n}\n",
    );
    let report = project.build().await.unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].message.contains("not injectable"));
}
