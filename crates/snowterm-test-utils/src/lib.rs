pub mod keys;
pub mod lines;

pub use keys::{auto_complete_transitions, KeyFeeder};
pub use lines::{assert_lines_eq, diff_lines};

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("snowterm=debug,snowterm_terminal=debug")),
            )
            .with_test_writer()
            .init();
    });
}
