// packages/engine/src/transport/descriptor.rs
//! Wire form of a transported mock

use crate::creation::settings::MockSettings;
use crate::handler::HandlerSnapshot;
use crate::interception::mock::{Mock, MockId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current descriptor format; anything else is rejected on read
pub const FORMAT_VERSION: u32 = 1;

/// Everything needed to rebuild a mock on the other side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockReplacement {
    pub format_version: u32,

    /// Id of the mock that was written; the rebuilt mock gets a new one
    pub source_mock: MockId,

    pub type_name: String,

    pub settings: MockSettings,

    pub handler: HandlerSnapshot,

    pub written_at: DateTime<Utc>,
}

impl MockReplacement {
    pub fn new(mock: &Mock, handler: HandlerSnapshot) -> Self {
        let settings = MockSettings::clone(mock.settings());
        Self {
            format_version: FORMAT_VERSION,
            source_mock: mock.id(),
            type_name: settings.type_name.clone(),
            settings,
            handler,
            written_at: Utc::now(),
        }
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
