//! Resolver Simplify Fix
//!
//! Reduces the getTopic resolver to the raw-data form: call the
//! service, return whatever it gives back, let the schema resolve
//! fields.

use super::{apply_and_report, read_target, FixOptions, FixResult, RESOLVERS_FILE};
use crate::applier::PatchApplier;
use crate::patch::PatchSpec;

const FIX_NAME: &str = "resolver-simplify";

const RAW_DATA_RESOLVER: &str = r#"  getTopic: async (args: any, context: any) => {
    console.log('🌙 getTopic resolver called with:', args.topic)
    const { topic } = args

    try {
      // Get API key from Cloudflare Workers secret binding
      const apiKey = await context.env.LUNARCRUSH_API_KEY.get()
      if (!apiKey) {
        throw new Error('LUNARCRUSH_API_KEY not configured')
      }

      // Import LunarCrush service
      const { getTopic: getLunarCrushTopic } = await import('../services/lunarcrush')

      // Get real data from LunarCrush API
      const rawData = await getLunarCrushTopic({ apiKey }, topic)

      console.log('✅ Real LunarCrush data retrieved for:', topic)

      // Return raw data - let GraphQL schema handle field resolution
      return rawData

    } catch (error) {
      console.error('❌ getTopic error:', error)
      throw error // Let GraphQL handle error responses
    }
  },"#;

fn resolver_spec() -> PatchSpec {
    PatchSpec::new(RESOLVERS_FILE, "reduce getTopic to the raw-data form")
        .guard_contains("const rawData = await getLunarCrushTopic({ apiKey }, topic)")
        .replace_block("getTopic: async", RAW_DATA_RESOLVER)
}

fn verify(content: &str) -> bool {
    let manual_mapping_removed =
        !content.contains("socialScore:") || !content.contains("price:");
    let raw_data_returned = content.contains("return rawData");

    if manual_mapping_removed && raw_data_returned {
        println!("✅ Confirmed: Manual field mapping removed, raw data returned");
        true
    } else {
        println!("⚠️  Warning: Verification failed");
        false
    }
}

pub(crate) fn run(applier: &PatchApplier, options: &FixOptions) -> FixResult {
    if !apply_and_report(applier, &resolver_spec(), options) {
        println!("\n❌ getTopic resolver simplification failed!");
        return FixResult::err(FIX_NAME, "resolver patch failed");
    }

    let verified = match read_target(applier, RESOLVERS_FILE) {
        Ok(content) => verify(&content),
        Err(e) => {
            println!("❌ Could not verify resolver update: {e}");
            false
        }
    };

    if verified {
        println!("\n🎉 getTopic resolver simplified successfully!");
        println!("📊 Now follows the raw-data pattern: return rawData");
        FixResult::ok(FIX_NAME, "getTopic resolver now returns raw data")
    } else {
        println!("\n❌ getTopic resolver simplification failed!");
        FixResult::err(FIX_NAME, "post-apply verification failed")
    }
}
