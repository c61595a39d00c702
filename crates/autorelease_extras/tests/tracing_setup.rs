//! Subscriber installation. Kept in its own binary since the global
//! subscriber can only be set once per process.

use autorelease_extras::{TracingConfig, TracingFormat};
use tracing::Level;

#[test]
fn init_installs_once() {
    let config = TracingConfig::new()
        .with_level(Level::DEBUG)
        .with_format(TracingFormat::Compact);

    assert!(config.init());
    assert!(!config.init());
    assert!(!TracingConfig::new().with_format(TracingFormat::Json).init());
}
