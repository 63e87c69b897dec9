//! Test support shared by the orchestrating modules.

use std::sync::{Arc, Mutex};

use crate::config::AuthConfig;


pub(crate) use mock::{Call, MockTransport};

/// An enabled configuration pointing at nothing; tests use the mock transport.
pub(crate) fn enabled_config() -> AuthConfig {
    AuthConfig {
        enabled: true,
        address: vec!["http://iam.test".to_string()],
        app_code: "cmdb".to_string(),
        app_secret: "secret".to_string(),
        ..AuthConfig::default()
    }
}

#[derive(Clone, Default)]
pub(crate) struct SharedLogBuffer(Arc<Mutex<Vec<u8>>>);

pub(crate) struct SharedLogWriter(Arc<Mutex<Vec<u8>>>);

impl SharedLogBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLogBuffer {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriter(Arc::clone(&self.0))
    }
}

impl std::io::Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route this thread's events into a buffer until the guard drops.
pub(crate) fn capture_logs() -> (SharedLogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = SharedLogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(buffer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    tracing::callsite::rebuild_interest_cache();
    (buffer, guard)
}
