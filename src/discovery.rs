//! Round-robin rotation over policy engine server addresses.

use std::sync::Mutex;

use tracing::debug;

use crate::error::AuthError;

/// The configured server addresses plus a shared rotation cursor.
///
/// Every call to [`ServerRing::rotation`] returns the full list starting at
/// the cursor and advances it, so consecutive requests start on different
/// servers.
#[derive(Debug)]
pub struct ServerRing {
    servers: Vec<String>,
    cursor: Mutex<usize>,
}

impl ServerRing {
    pub fn new(servers: Vec<String>) -> Self {
        ServerRing {
            servers,
            cursor: Mutex::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn rotation(&self) -> Result<Vec<String>, AuthError> {
        if self.servers.is_empty() {
            return Err(AuthError::NoServerAddress);
        }

        // A poisoned cursor is still a valid index.
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        let start = *cursor % self.servers.len();
        *cursor = (start + 1) % self.servers.len();
        drop(cursor);

        let mut rotated = Vec::with_capacity(self.servers.len());
        rotated.extend_from_slice(&self.servers[start..]);
        rotated.extend_from_slice(&self.servers[..start]);
        debug!(event = "Discovery", phase = "Rotate", start, first = rotated[0].as_str());
        Ok(rotated)
    }

    /// The server the next request should go to.
    pub fn pick(&self) -> Result<String, AuthError> {
        let mut rotation = self.rotation()?;
        Ok(rotation.swap_remove(0))
    }
}
