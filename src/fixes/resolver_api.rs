//! Resolver API Fix
//!
//! Swaps the mock getTopic resolver body for the real LunarCrush API
//! call, then verifies the mock artifacts are actually gone.

use super::{apply_and_report, read_target, FixOptions, FixResult, RESOLVERS_FILE};
use crate::applier::PatchApplier;
use crate::patch::PatchSpec;

const FIX_NAME: &str = "resolver-api";

const REAL_API_RESOLVER: &str = r#"  getTopic: async (args: any, context: any) => {
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
      const realData = await getLunarCrushTopic({ apiKey }, topic)

      console.log('✅ Real LunarCrush data retrieved for:', topic)

      // Return real data in expected format
      return {
        symbol: realData.symbol || topic.toUpperCase(),
        name: realData.name || topic,
        price: realData.close || realData.price || 0,
        sentiment: realData.sentiment || 0,
        socialScore: realData.social_score || realData.socialScore || 0,
        raw: JSON.stringify(realData)
      }

    } catch (error) {
      console.error('❌ getTopic error:', error)

      // Fallback to prevent resolver crashes (temporary)
      return {
        symbol: topic.toUpperCase(),
        name: topic,
        price: 0,
        sentiment: 0,
        socialScore: 0,
        raw: JSON.stringify({ error: error.message })
      }
    }
  },"#;

fn resolver_spec() -> PatchSpec {
    PatchSpec::new(RESOLVERS_FILE, "replace getTopic with the real API call")
        .guard_contains("raw: JSON.stringify(realData)")
        .replace_block("getTopic: async", REAL_API_RESOLVER)
}

fn verify(content: &str) -> bool {
    if content.contains("Math.random()") {
        println!("⚠️  Warning: Still found Math.random() in file");
        return false;
    }
    if content.contains("LUNARCRUSH_API_KEY") {
        println!("✅ Confirmed: Real API integration added");
        return true;
    }
    false
}

pub(crate) fn run(applier: &PatchApplier, options: &FixOptions) -> FixResult {
    if !apply_and_report(applier, &resolver_spec(), options) {
        println!("\n❌ getTopic resolver migration failed!");
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
        println!("\n🎉 getTopic resolver migration successful!");
        FixResult::ok(FIX_NAME, "getTopic resolver now calls the real API")
    } else {
        println!("\n❌ getTopic resolver migration failed!");
        FixResult::err(FIX_NAME, "post-apply verification failed")
    }
}
