use std::net::SocketAddr;

use bytes::Bytes;
use discovery_messages::{Reply, SignedRequest};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::debug;

use crate::client::{Connection, Dial};

/// Frames on a discovery connection: one length-delimited bincode message each.
pub type Transport = Framed<TcpStream, LengthDelimitedCodec>;

pub fn transport(stream: TcpStream) -> Transport {
    Framed::new(stream, LengthDelimitedCodec::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpDialer {
    pub addr: SocketAddr,
}

#[async_trait::async_trait]
impl Dial for TcpDialer {
    type Connection = TcpConnection;

    async fn dial(&self) -> anyhow::Result<Self::Connection> {
        let stream = TcpStream::connect(self.addr).await?;
        stream.set_nodelay(true)?;
        debug!(addr = %self.addr, "connected to discovery service");
        Ok(TcpConnection(transport(stream)))
    }
}

#[derive(Debug)]
pub struct TcpConnection(Transport);

#[async_trait::async_trait]
impl Connection for TcpConnection {
    async fn discover(
        &mut self,
        request: SignedRequest,
    ) -> anyhow::Result<discovery_messages::Response> {
        let buf = discovery_messages::serialize(&request)?;
        self.0.send(Bytes::from(buf)).await?;
        let frame = self
            .0
            .next()
            .await
            .ok_or_else(|| anyhow::anyhow!("connection closed before reply"))??;
        let reply = discovery_messages::deserialize::<Reply>(&frame)?;
        reply.map_err(|reason| anyhow::anyhow!(reason))
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        SinkExt::<Bytes>::close(&mut self.0).await?;
        Ok(())
    }
}
