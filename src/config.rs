use std::{net::SocketAddr, path::Path};

use discovery_messages::{AuthInfo, SerializedIdentity};
use serde::{Deserialize, Serialize};

use crate::{client::Sign, crypto, net::TcpDialer, Client};

/// Where the discovery service is and who the client is, as kept in a JSON
/// file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub address: SocketAddr,
    pub msp_id: String,
    /// PEM of the client's enrollment certificate.
    pub certificate: String,
    /// PEM of the client's TLS certificate, whose hash binds the request to
    /// the TLS session.
    #[serde(default)]
    pub tls_certificate: Option<String>,
}

impl Config {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn identity(&self) -> SerializedIdentity {
        SerializedIdentity {
            msp_id: self.msp_id.clone(),
            id_bytes: self.certificate.clone().into_bytes(),
        }
    }

    pub fn auth_info(&self) -> bincode::Result<AuthInfo> {
        crypto::auth_info(
            &self.identity(),
            self.tls_certificate.as_deref().map(str::as_bytes),
        )
    }

    pub fn dialer(&self) -> TcpDialer {
        TcpDialer { addr: self.address }
    }

    pub fn client<S: Sign>(&self, signer: S) -> bincode::Result<Client<TcpDialer, S>> {
        Ok(Client::new(self.dialer(), self.auth_info()?, signer))
    }
}
