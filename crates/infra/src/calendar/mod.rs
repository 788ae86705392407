//! Google Calendar adapters
//!
//! The writer overwrites a mirrored event; the payload module turns Google
//! event JSON into [`clinisync_domain::RemoteEvent`] for a detection pass.

pub mod google;
pub mod payload;

pub use google::GoogleCalendarWriter;
pub use payload::{parse_event, parse_events_response, GoogleEvent};
