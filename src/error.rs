use derive_more::Display;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Display)]
pub enum Error {
    #[display(fmt = "failed marshaling request to bytes: {}", _0)]
    Encode(bincode::Error),
    #[display(fmt = "failed signing request: {}", _0)]
    Signing(anyhow::Error),
    #[display(fmt = "failed connecting to discovery service: {}", _0)]
    Connection(anyhow::Error),
    #[display(fmt = "discovery service refused our request: {}", _0)]
    Service(anyhow::Error),
    /// The response does not have the shape the request asked for.
    #[display(fmt = "{}", _0)]
    Protocol(String),
    /// The service answered this particular query with an error.
    #[display(fmt = "{}", _0)]
    Query(String),
    #[display(fmt = "not found")]
    NotFound,
    #[display(
        fmt = "layout has a group {} that requires at least {} peers, but only {} peers are known",
        group,
        required,
        available
    )]
    InsufficientEndorsers {
        group: String,
        required: usize,
        available: usize,
    },
    #[display(fmt = "group {} isn't mapped to endorsers, but exists in a layout", _0)]
    UnmappedGroup(String),
    #[display(fmt = "no layouts for chaincode {}", _0)]
    NoLayouts(String),
    #[display(fmt = "received empty envelope(s) for {}", _0)]
    MissingEnvelope(String),
    #[display(fmt = "failed unmarshaling gossip envelope to {} message: {}", _0, _1)]
    EnvelopeDecode(&'static str, bincode::Error),
    #[display(fmt = "failed unmarshaling peer's identity: {}", _0)]
    IdentityDecode(bincode::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(err) | Self::IdentityDecode(err) | Self::EnvelopeDecode(_, err) => {
                Some(&**err)
            }
            Self::Signing(err) | Self::Connection(err) | Self::Service(err) => Some(&**err),
            _ => None,
        }
    }
}
