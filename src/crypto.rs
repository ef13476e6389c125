use discovery_messages::{AuthInfo, SerializedIdentity};
use secp256k1::{ecdsa, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::client::Sign;

thread_local! {
    static SECP: Secp256k1<secp256k1::All> = Secp256k1::new();
}

fn digest(payload: &[u8]) -> anyhow::Result<Message> {
    Ok(Message::from_digest_slice(&Sha256::digest(payload))?)
}

/// ECDSA request signer over secp256k1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signer(SecretKey);

impl Signer {
    pub fn generate() -> Self {
        Self(SecretKey::new(&mut rand::thread_rng()))
    }

    pub fn from_slice(secret: &[u8]) -> anyhow::Result<Self> {
        Ok(Self(SecretKey::from_slice(secret)?))
    }

    pub fn verifier(&self) -> Verifier {
        Verifier(SECP.with(|secp| PublicKey::from_secret_key(secp, &self.0)))
    }
}

impl Sign for Signer {
    fn sign(&self, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
        let message = digest(payload)?;
        let signature = SECP.with(|secp| secp.sign_ecdsa(&message, &self.0));
        Ok(signature.serialize_compact().to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verifier(PublicKey);

impl Verifier {
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> anyhow::Result<()> {
        let message = digest(payload)?;
        let signature = ecdsa::Signature::from_compact(signature)?;
        SECP.with(|secp| secp.verify_ecdsa(&message, &signature, &self.0))?;
        Ok(())
    }
}

/// Credentials attached to every request: the client's serialized identity and
/// the SHA-256 hash of its TLS certificate, if it has one.
pub fn auth_info(
    identity: &SerializedIdentity,
    tls_certificate: Option<&[u8]>,
) -> bincode::Result<AuthInfo> {
    Ok(AuthInfo {
        client_identity: identity.to_bytes()?,
        client_tls_cert_hash: tls_certificate
            .map(|certificate| Sha256::digest(certificate).to_vec())
            .unwrap_or_default(),
    })
}
