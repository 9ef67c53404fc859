//! Environment Context Fix
//!
//! Wires the Cloudflare Workers env into the GraphQL context on the
//! route side, and normalizes how the resolver reports a missing
//! API-key secret.

use super::{apply_and_report, FixOptions, FixResult, RESOLVERS_FILE, ROUTE_FILE};
use crate::applier::PatchApplier;
use crate::patch::PatchSpec;

const FIX_NAME: &str = "env-context";

const ENV_INTERFACE: &str = r#"

// Cloudflare Workers Environment Interface
interface Env {
  LUNARCRUSH_API_KEY: { get(): Promise<string> };
  LUNARCRUSH_CACHE?: KVNamespace;
  ENVIRONMENT?: string;
}"#;

const CONTEXT_WITH_ENV: &str = r#"context: (c: any) => ({
      request: c.req,
      env: c.env
    })"#;

const MISSING_SECRET_BRANCH: &str = r#"if (!apiKey) {
        console.error('❌ LUNARCRUSH_API_KEY secret not found')
        throw new Error('LUNARCRUSH_API_KEY not configured in Cloudflare Workers secrets')
      }"#;

fn route_env_interface() -> PatchSpec {
    PatchSpec::new(ROUTE_FILE, "declare the Workers Env interface")
        .guard_contains("interface Env")
        .insert_after(r"(?m)^import .*$", ENV_INTERFACE)
}

fn route_context() -> PatchSpec {
    PatchSpec::new(ROUTE_FILE, "pass env through the GraphQL context")
        .replace_pattern(r"context:\s*\([^)]*\)\s*=>\s*\([^)]*\)", CONTEXT_WITH_ENV)
}

fn resolver_secret_handling() -> PatchSpec {
    PatchSpec::new(RESOLVERS_FILE, "report a missing API key loudly")
        .guard_contains("LUNARCRUSH_API_KEY secret not found")
        .replace_pattern(
            r"if \(!apiKey\) \{\s*throw new Error\([^)]+\)\s*\}",
            MISSING_SECRET_BRANCH,
        )
}

pub(crate) fn run(applier: &PatchApplier, options: &FixOptions) -> FixResult {
    println!("🔧 Fixing environment context and secret access...");

    let interface_ok = apply_and_report(applier, &route_env_interface(), options);
    let context_ok = apply_and_report(applier, &route_context(), options);
    let resolver_ok = apply_and_report(applier, &resolver_secret_handling(), options);

    if interface_ok && context_ok && resolver_ok {
        println!("✅ Environment and secret access fixed!");
        FixResult::ok(FIX_NAME, "environment and secret access fixed")
    } else {
        println!("❌ Some fixes failed!");
        FixResult::err(FIX_NAME, "one or more patches failed")
    }
}
