//! Route Import Fix
//!
//! Rewrites whatever schema import the GraphQL route currently has to
//! the canonical `../graphql/schema` module.

use super::{apply_and_report, FixOptions, FixResult, ROUTE_FILE};
use crate::applier::PatchApplier;
use crate::patch::PatchSpec;

const FIX_NAME: &str = "route-import";

fn route_import_spec() -> PatchSpec {
    PatchSpec::new(ROUTE_FILE, "point the route at the canonical schema module")
        // Any typeDefs import, whatever module it names today
        .replace_pattern(
            r#"import.*typeDefs.*from.*['"][^'"]*['"]"#,
            r#"import { typeDefs } from "../graphql/schema""#,
        )
        // Any other specifier that mentions a schema module
        .replace_pattern(
            r#"from.*['"][^'"]*schema[^'"]*['"]"#,
            r#"from "../graphql/schema""#,
        )
}

pub(crate) fn run(applier: &PatchApplier, options: &FixOptions) -> FixResult {
    if apply_and_report(applier, &route_import_spec(), options) {
        println!("✅ Updated GraphQL route import");
        FixResult::ok(FIX_NAME, "GraphQL route import updated")
    } else {
        FixResult::err(FIX_NAME, "route import patch failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn seed_route(dir: &TempDir, content: &str) {
        let route = dir.path().join(ROUTE_FILE);
        fs::create_dir_all(route.parent().unwrap()).unwrap();
        fs::write(&route, content).unwrap();
    }

    #[test]
    fn test_typedefs_import_rewritten() {
        let dir = TempDir::new().unwrap();
        seed_route(
            &dir,
            "import { Hono } from 'hono'\nimport { typeDefs } from '../graphql/pure-schema'\n\nexport default app\n",
        );
        let applier = PatchApplier::new(dir.path(), false);

        let result = run(&applier, &FixOptions { backup: false, show_diff: false });
        assert!(result.success);

        let route = fs::read_to_string(dir.path().join(ROUTE_FILE)).unwrap();
        assert!(route
            .lines()
            .any(|l| l == r#"import { typeDefs } from "../graphql/schema""#));
        assert!(!route.contains("pure-schema"));
        assert!(route.contains("import { Hono } from 'hono'"));
    }

    #[test]
    fn test_rewrite_is_stable_on_second_run() {
        let dir = TempDir::new().unwrap();
        seed_route(
            &dir,
            "import { typeDefs } from './old-schema'\nexport default app\n",
        );
        let applier = PatchApplier::new(dir.path(), false);
        let options = FixOptions { backup: false, show_diff: false };

        run(&applier, &options);
        let first = fs::read_to_string(dir.path().join(ROUTE_FILE)).unwrap();
        run(&applier, &options);
        let second = fs::read_to_string(dir.path().join(ROUTE_FILE)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_route_reports_failure() {
        let dir = TempDir::new().unwrap();
        let applier = PatchApplier::new(dir.path(), false);

        let result = run(&applier, &FixOptions { backup: false, show_diff: false });
        assert!(!result.success);
        assert!(!dir.path().join("packages").exists());
    }
}
