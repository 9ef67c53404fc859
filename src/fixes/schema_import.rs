//! Schema Import Fix
//!
//! Generates the schema bridge file under the target package and then
//! rewires the GraphQL route from the mock schema import to the
//! generated one.

use super::{apply_and_report, FixOptions, FixResult, ROUTE_FILE};
use crate::applier::{ApplyError, PatchApplier};
use crate::patch::PatchSpec;

const FIX_NAME: &str = "schema-import";

/// Where the bridge lands inside the target package
pub(crate) const BRIDGE_FILE: &str = "packages/hono/src/schema/bridge.ts";
/// Single source of truth for the SDL, relative to the workspace root
pub(crate) const SCHEMA_SOURCE: &str = "schema/schema.graphql";

/// Embedded when the schema source cannot be read
const FALLBACK_SDL: &str = "type Query {
  hello: String
  getTopic(topic: String): TopicDetails
}

type TopicDetails {
  symbol: String
  name: String
  close: Float
  sentiment: Float
  social_score: Float
  interactions_24h: Int
}
";

/// Escape SDL text for embedding in a TypeScript template literal
fn escape_template_literal(sdl: &str) -> String {
    sdl.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

fn render_bridge(sdl: &str) -> String {
    format!(
        "// Schema Bridge - Import Single Source of Truth\n\
         // Generated file, do not edit by hand.\n\n\
         export const typeDefs = `\n{}`\n",
        escape_template_literal(sdl)
    )
}

fn route_rewire() -> PatchSpec {
    PatchSpec::new(ROUTE_FILE, "import the generated schema")
        .replace_pattern(
            r#"import.*from.*['"]\.\./graphql/pure-schema['"]"#,
            "import { typeDefs } from '../../../schema/generated/schema'",
        )
        .replace_pattern(r"buildSchema\([^)]+\)", "buildSchema(typeDefs)")
}

fn create_schema_bridge(applier: &PatchApplier) -> bool {
    let sdl = match applier
        .resolve_existing(SCHEMA_SOURCE)
        .and_then(|p| std::fs::read_to_string(p).map_err(ApplyError::from))
    {
        Ok(sdl) => sdl,
        Err(e) => {
            eprintln!("[BRIDGE] schema source unreadable ({e}), embedding fallback SDL");
            FALLBACK_SDL.to_string()
        }
    };

    match applier.create_file(BRIDGE_FILE, &render_bridge(&sdl)) {
        Ok(path) => {
            println!("✅ Created schema bridge: {}", path.display());
            true
        }
        Err(e) => {
            println!("❌ Failed to create schema bridge: {e}");
            false
        }
    }
}

pub(crate) fn run(applier: &PatchApplier, options: &FixOptions) -> FixResult {
    println!("🔧 Fixing Hono schema to use single source of truth...");

    let bridge_ok = create_schema_bridge(applier);
    let route_ok = apply_and_report(applier, &route_rewire(), options);

    if bridge_ok && route_ok {
        println!("✅ Schema fix completed!");
        FixResult::ok(FIX_NAME, "schema bridge created and route rewired")
    } else {
        FixResult::err(FIX_NAME, "schema fix failed")
    }
}
