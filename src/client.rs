use discovery_messages::{AuthInfo, SignedRequest};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    request::Request,
    response::{compute_response, Response},
    Error, Result,
};

pub trait Sign
where
    Self: Send + Sync,
{
    fn sign(&self, payload: &[u8]) -> anyhow::Result<Vec<u8>>;
}

impl<F> Sign for F
where
    F: Fn(&[u8]) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    fn sign(&self, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
        self(payload)
    }
}

#[async_trait::async_trait]
pub trait Dial
where
    Self: Send + Sync,
{
    type Connection: Connection;

    async fn dial(&self) -> anyhow::Result<Self::Connection>;
}

#[async_trait::async_trait]
pub trait Connection
where
    Self: Send,
{
    async fn discover(
        &mut self,
        request: SignedRequest,
    ) -> anyhow::Result<discovery_messages::Response>;

    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Client of the discovery service.
///
/// The client remembers the last payload it signed, and sends the same
/// signature again for a byte-identical payload instead of signing anew. That
/// cache is why [`send`](Self::send) takes `&mut self`: one client serves one
/// request at a time, share it behind a lock or use one client per task.
#[derive(Debug)]
pub struct Client<D, S> {
    dialer: D,
    auth_info: AuthInfo,
    signer: S,
    last_signed: Option<SignedRequest>,
}

impl<D, S> Client<D, S> {
    pub fn new(dialer: D, auth_info: AuthInfo, signer: S) -> Self {
        Self {
            dialer,
            auth_info,
            signer,
            last_signed: None,
        }
    }

    pub fn auth_info(&self) -> &AuthInfo {
        &self.auth_info
    }
}

impl<D: Dial, S: Sign> Client<D, S> {
    /// Sends `request` over a fresh connection and demultiplexes the answer.
    ///
    /// Nothing is retried. `cancel` aborts the pending call, which then fails
    /// as [`Error::Service`].
    pub async fn send(&mut self, cancel: &CancellationToken, request: &Request) -> Result<Response> {
        let payload = request
            .payload(Some(&self.auth_info))
            .map_err(Error::Encode)?;
        let signed = match &self.last_signed {
            Some(last) if last.payload == payload => {
                debug!("reusing signature of identical request");
                last.clone()
            }
            _ => {
                let signature = self.signer.sign(&payload).map_err(Error::Signing)?;
                SignedRequest { payload, signature }
            }
        };
        self.last_signed = Some(signed.clone());

        let mut connection = self.dialer.dial().await.map_err(Error::Connection)?;
        let result = tokio::select! {
            result = connection.discover(signed) => result,
            () = cancel.cancelled() => Err(anyhow::anyhow!("request cancelled")),
        };
        if let Err(err) = connection.close().await {
            debug!(%err, "failed closing connection");
        }
        let raw = result.map_err(Error::Service)?;

        let num_query = request.query_count();
        if raw.results.len() != num_query {
            warn!(num_query, num_result = raw.results.len(), "result count mismatch");
            return Err(Error::Protocol(format!(
                "Sent {num_query} queries but received {} responses back",
                raw.results.len()
            )));
        }
        debug!(num_query, "received discovery response");
        compute_response(request, raw)
    }
}
