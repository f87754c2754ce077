//! Agent-to-agent communication: message schemes and the advertisement
//! policy that turns their messages into scheduled communication events.

pub mod advertisement;
pub mod message_scheme;

pub use advertisement::AdvertisementScheme;
pub use message_scheme::{DefaultMessageScheme, MessageScheme, MessageSchemeKind, PreferenceImpact};
