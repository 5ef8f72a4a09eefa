//! Listeners and per-connection session tasks.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use log::{error, info, warn};
use termfolio_core::{FrameSink, FrameSource, Session, SessionOptions};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::app::{Flags, Portfolio};
use crate::config::Settings;
use crate::theme::Theme;
use crate::transport::ws::UpgradePolicy;
use crate::transport::{tcp, ws};

/// How long live sessions get to finish after shutdown is requested.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

/// Bound listeners plus everything a new session needs.
pub struct Server {
    ws: TcpListener,
    tcp: Option<TcpListener>,
    policy: UpgradePolicy,
    flags: Flags,
    ws_options: SessionOptions,
    tcp_options: SessionOptions,
    grace: Duration,
}

impl Server {
    /// Bind the configured listeners.
    pub async fn bind(settings: &Settings) -> Result<Self, ServerError> {
        let ws = listen(&settings.host, settings.ws_port).await?;
        let tcp = match settings.tcp_port {
            Some(port) => Some(listen(&settings.host, port).await?),
            None => None,
        };
        Ok(Self {
            ws,
            tcp,
            policy: UpgradePolicy {
                path: settings.ws_path.clone(),
                allowed_origins: settings.allowed_origins.clone(),
            },
            flags: Flags {
                theme: Theme::new(settings.palette),
            },
            ws_options: settings.session.clone(),
            tcp_options: settings.tcp_session(),
            grace: GRACE_PERIOD,
        })
    }

    /// Change how long sessions get to finish on shutdown.
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn ws_addr(&self) -> io::Result<SocketAddr> {
        self.ws.local_addr()
    }

    pub fn tcp_addr(&self) -> Option<io::Result<SocketAddr>> {
        self.tcp.as_ref().map(TcpListener::local_addr)
    }

    /// Accept connections until `shutdown` resolves, then stop every session,
    /// waiting up to the grace period before aborting stragglers.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<(), ServerError> {
        let stop = CancellationToken::new();
        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        if let Ok(addr) = self.ws_addr() {
            info!("web-socket endpoint ws://{addr}{}", self.policy.path);
        }
        if let Some(Ok(addr)) = self.tcp_addr() {
            info!("raw terminal endpoint tcp://{addr}");
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.ws.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let policy = self.policy.clone();
                        let flags = self.flags.clone();
                        let options = self.ws_options.clone();
                        let stop = stop.child_token();
                        sessions.spawn(async move {
                            serve_ws(stream, peer, policy, flags, options, stop).await;
                        });
                    }
                    Err(err) => warn!("web-socket accept failed: {err}"),
                },
                accepted = accept_optional(self.tcp.as_ref()) => match accepted {
                    Ok((stream, peer)) => {
                        let flags = self.flags.clone();
                        let options = self.tcp_options.clone();
                        let stop = stop.child_token();
                        sessions.spawn(async move {
                            serve_tcp(stream, peer, flags, options, stop).await;
                        });
                    }
                    Err(err) => warn!("terminal accept failed: {err}"),
                },
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(err) = joined {
                        error!("connection task failed: {err}");
                    }
                }
            }
        }

        info!("stopping: {} live session(s)", sessions.len());
        stop.cancel();
        let drained = tokio::time::timeout(self.grace, async {
            while sessions.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                "grace period elapsed, aborting {} session(s)",
                sessions.len()
            );
            sessions.shutdown().await;
        }
        Ok(())
    }
}

async fn listen(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

async fn accept_optional(listener: Option<&TcpListener>) -> io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some(listener) => listener.accept().await,
        None => std::future::pending().await,
    }
}

async fn serve_ws(
    stream: TcpStream,
    peer: SocketAddr,
    policy: UpgradePolicy,
    flags: Flags,
    options: SessionOptions,
    stop: CancellationToken,
) {
    let (source, sink) = match ws::accept(stream, &policy).await {
        Ok(halves) => halves,
        Err(err) => {
            warn!("web-socket handshake with {peer} failed: {err}");
            return;
        }
    };
    serve(peer, source, sink, flags, options, stop).await;
}

async fn serve_tcp(
    stream: TcpStream,
    peer: SocketAddr,
    flags: Flags,
    options: SessionOptions,
    stop: CancellationToken,
) {
    if let Err(err) = stream.set_nodelay(true) {
        warn!("could not disable Nagle for {peer}: {err}");
    }
    let (source, sink) = tcp::split(stream);
    serve(peer, source, sink, flags, options, stop).await;
}

/// Run one session to completion. `stop` is a child of the server token, so
/// the session ends early when the server stops.
async fn serve<R: FrameSource, S: FrameSink>(
    peer: SocketAddr,
    source: R,
    sink: S,
    flags: Flags,
    options: SessionOptions,
    stop: CancellationToken,
) {
    let session = Session::<Portfolio>::with_shutdown(flags, options, stop);
    info!("session {}: connected from {peer}", session.id());
    match session.serve(source, sink).await {
        Ok(()) => info!("session {}: {peer} disconnected", session.id()),
        Err(err) => warn!("session {}: {peer} ended with error: {err}", session.id()),
    }
}
