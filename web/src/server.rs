use std::{fmt, future::Future, io, net::SocketAddr, sync::Arc, time::Duration};

use futures_util::StreamExt;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::{TcpListener, ToSocketAddrs},
};
use tokio_util::codec::{AnyDelimiterCodec, Framed};

use crate::{
    error::TransportError,
    handler::Dispatch,
    http::{
        codec,
        frames::{self, FRAME_DELIMITER},
        Response,
    },
};

/// Longest request or header line accepted from a client.
const MAX_LINE_LENGTH: usize = 8 * 1024;

type Handler<A, F> = fn(String, A) -> F;

/// One frame per `\n`-terminated line in both directions.
fn line_codec() -> AnyDelimiterCodec {
    AnyDelimiterCodec::new_with_max_length(
        vec![FRAME_DELIMITER],
        vec![FRAME_DELIMITER],
        MAX_LINE_LENGTH,
    )
}

/// Strips a trailing `\r` and decodes the rest, replacing invalid UTF-8 with
/// U+FFFD.
fn decode_line(chunk: &[u8]) -> String {
    let chunk = chunk.strip_suffix(b"\r").unwrap_or(chunk);
    String::from_utf8_lossy(chunk).into_owned()
}

pub struct Server<A, F> {
    state: A,
    handler: Handler<A, F>,
    idle_timeout: Duration,
}

/// Why a connection ended.
#[derive(Debug)]
pub enum Disconnect {
    ResponseSent { frames: usize },
    RemoteClosed,
    IdleTimeout,
    Transport(TransportError),
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disconnect::ResponseSent { frames } => write!(f, "response sent in {frames} frames"),
            Disconnect::RemoteClosed => f.write_str("closed by client"),
            Disconnect::IdleTimeout => f.write_str("idle timeout"),
            Disconnect::Transport(err) => write!(f, "{err}"),
        }
    }
}

impl<S, F> Server<S, F>
where
    S: Clone + Send + Sync + 'static,
    F: Future<Output = Dispatch> + Send + 'static,
{
    pub fn new(state: S, handler: Handler<S, F>, idle_timeout: Duration) -> Self {
        Self {
            state,
            handler,
            idle_timeout,
        }
    }

    pub async fn bind<A: ToSocketAddrs>(self, addr: A) -> io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        let server = Arc::new(self);

        let addr = listener.local_addr()?;
        tracing::info!(target: "listener", ?addr, "server is running");

        loop {
            let (socket, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!(target: "listener", %err, "failed to accept connection");
                    continue;
                }
            };

            let server = Arc::clone(&server);
            tokio::spawn(async move {
                server.handle_connection(socket, addr).await;
            });
        }
    }

    /// Runs one connection until a response has been sent, the client goes
    /// away, or it stays silent for longer than the idle timeout.
    #[tracing::instrument(skip(self, io))]
    pub async fn handle_connection<T>(self: Arc<Self>, io: T, addr: SocketAddr)
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let mut framed = Framed::new(io, line_codec());
        self.on_connect(addr);

        let reason = loop {
            let line = match tokio::time::timeout(self.idle_timeout, framed.next()).await {
                Err(_) => break Disconnect::IdleTimeout,
                Ok(None) => break Disconnect::RemoteClosed,
                Ok(Some(Err(err))) => break Disconnect::Transport(err.into()),
                Ok(Some(Ok(chunk))) => decode_line(&chunk),
            };

            match self.on_message(line).await {
                Dispatch::Ignored | Dispatch::NoContent => continue,
                Dispatch::Respond(resp) => {
                    break match send_response(&mut framed, &resp).await {
                        Ok(frames) => Disconnect::ResponseSent { frames },
                        Err(err) => Disconnect::Transport(err),
                    };
                }
            }
        };

        if let Err(err) = framed.into_inner().shutdown().await {
            tracing::debug!(%err, "failed to shut down connection");
        }

        self.on_disconnect(addr, &reason);
    }

    fn on_connect(&self, addr: SocketAddr) {
        tracing::debug!(target: "listener", %addr, "client connected");
    }

    async fn on_message(&self, line: String) -> Dispatch {
        tracing::trace!(%line, "received line");
        (self.handler)(line, self.state.clone()).await
    }

    fn on_disconnect(&self, addr: SocketAddr, reason: &Disconnect) {
        match reason {
            Disconnect::Transport(err) => {
                tracing::warn!(target: "listener", %addr, %err, "connection failed")
            }
            reason => tracing::debug!(target: "listener", %addr, %reason, "client disconnected"),
        }
    }
}

/// Serializes `resp` and writes it one line per frame.
async fn send_response<T>(
    framed: &mut Framed<T, AnyDelimiterCodec>,
    resp: &Response,
) -> Result<usize, TransportError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let message = codec::encode(resp)?;
    let frames = frames::send_frames(framed, &message).await?;

    Ok(frames)
}
