//! Helpers shared by the matcher's integration tests.

use std::sync::Once;

use stencil_common::{Config, ConfigBuilder, Graph, Stencil};

use crate::matcher::find_matches;

static INIT: Once = Once::new();

/// Configures logging for the test runner.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A stencil, a host, and how many matches to expect.
pub struct TestSpec<'a> {
    /// The stencil to search for.
    pub pattern: &'a Stencil,
    /// The graph to search in.
    pub host: &'a Graph,
    /// Number of matches expected.
    pub expected_count: usize,
    /// Optional configuration builder to override defaults.
    pub config_fn: Option<fn(ConfigBuilder) -> ConfigBuilder>,
}

/// Run a matcher test, failing with both counts on a mismatch.
#[track_caller]
pub fn run_match_test(spec: TestSpec<'_>) -> Result<(), Box<dyn std::error::Error>> {
    setup_test_logging();

    let mut builder = Config::builder();
    if let Some(f) = spec.config_fn {
        builder = f(builder);
    }
    let config = builder.build();

    let matches = find_matches(spec.pattern, spec.host, &config);
    if matches.len() != spec.expected_count {
        tracing::error!(
            "expected {} matches of {}, found {}",
            spec.expected_count,
            spec.pattern.name,
            matches.len()
        );
        return Err(format!(
            "expected {} matches, found {}",
            spec.expected_count,
            matches.len()
        )
        .into());
    }
    Ok(())
}

/// Defines a matcher test.
#[macro_export]
macro_rules! match_test {
    (
        name: $test_name:ident,
        pattern: $pattern:expr,
        host: $host:expr,
        expect: $count:expr
    ) => {
        #[test]
        fn $test_name() -> Result<(), Box<dyn std::error::Error>> {
            $crate::test_harness::run_match_test($crate::test_harness::TestSpec {
                pattern: $pattern,
                host: $host,
                expected_count: $count,
                config_fn: None,
            })
        }
    };

    (
        name: $test_name:ident,
        pattern: $pattern:expr,
        host: $host:expr,
        expect: $count:expr,
        config: $cfg_closure:expr
    ) => {
        #[test]
        fn $test_name() -> Result<(), Box<dyn std::error::Error>> {
            $crate::test_harness::run_match_test($crate::test_harness::TestSpec {
                pattern: $pattern,
                host: $host,
                expected_count: $count,
                config_fn: Some($cfg_closure),
            })
        }
    };
}
