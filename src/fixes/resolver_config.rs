//! Resolver Config Fix
//!
//! Routes getTopic through the LunarCrush config carried in the
//! GraphQL context instead of reading the env binding directly.

use super::{apply_and_report, FixOptions, FixResult, RESOLVERS_FILE};
use crate::applier::PatchApplier;
use crate::patch::PatchSpec;

const FIX_NAME: &str = "resolver-config";

const CONFIG_RESOLVER: &str = r#"  getTopic: async (args: any, context: any) => {
    console.log('🌙 getTopic resolver called with:', args.topic)
    const { topic } = args

    try {
      // Get config from context (passed from main entry)
      const { config } = context
      if (!config || !config.apiKey) {
        throw new Error('LunarCrush config not available in context')
      }

      console.log('✅ Using LunarCrush config from context')

      // Import LunarCrush service
      const { getTopic: getLunarCrushTopic } = await import('../services/lunarcrush')

      // Get real data from LunarCrush API using config
      const rawData = await getLunarCrushTopic(config, topic)

      console.log('✅ Real LunarCrush data retrieved for:', topic)

      // Return raw data - let GraphQL schema handle field resolution
      return rawData

    } catch (error) {
      console.error('❌ getTopic error:', error)
      throw error // Let GraphQL handle error responses
    }
  },"#;

fn resolver_spec() -> PatchSpec {
    PatchSpec::new(RESOLVERS_FILE, "route getTopic through config from context")
        .guard_contains("const rawData = await getLunarCrushTopic(config, topic)")
        .replace_block("getTopic: async", CONFIG_RESOLVER)
}

pub(crate) fn run(applier: &PatchApplier, options: &FixOptions) -> FixResult {
    if apply_and_report(applier, &resolver_spec(), options) {
        println!("✅ Resolver updated to use config from context");
        FixResult::ok(FIX_NAME, "getTopic resolver now uses config from context")
    } else {
        FixResult::err(FIX_NAME, "resolver patch failed")
    }
}
