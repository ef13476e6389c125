pub mod client;
pub mod config;
pub mod crypto;
pub mod endorsement;
pub mod error;
pub mod net;
pub mod peer;
pub mod request;
pub mod response;

pub use discovery_messages as messages;

pub use crate::client::{Client, Connection, Dial, Sign};
pub use crate::config::Config;
pub use crate::endorsement::{EndorsementDescriptor, Layout};
pub use crate::error::{Error, Result};
pub use crate::peer::Peer;
pub use crate::request::{QueryKind, Request};
pub use crate::response::{ChannelResponse, Response};
