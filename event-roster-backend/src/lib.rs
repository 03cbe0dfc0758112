#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    reason = "not yet ready for that"
)]

pub mod auth;
pub mod error;
pub mod extract;
pub mod notice;
pub mod router;
pub mod routes;
pub mod tls;

use core::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use error::AppError;
use event_roster_assignment::{AssignmentManager, Store};
use event_roster_config::Config;
use futures_util::pin_mut;
use http::Request;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;
use tower::ServiceExt as _;
use tracing::{debug, error, info, warn};

pub struct AppState<S> {
    pub manager: AssignmentManager<S>,
    pub config: Config,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self {
            manager: AssignmentManager::new(store, config.removal_policy, config.store_timeout()),
            config,
        }
    }
}

pub fn setup_server<S: Store + 'static>(config: Config, store: S) -> Router {
    info!("starting up server...");
    router::router(Arc::new(AppState::new(store, config)))
}

#[allow(clippy::redundant_pub_crate)]
async fn serve_connection<I>(io: I, app: Router, shutdown_tx: Arc<watch::Sender<()>>)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let socket = TokioIo::new(io);
    let hyper_service =
        hyper::service::service_fn(move |request: Request<Incoming>| app.clone().oneshot(request));
    let builder = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new());
    let connection = builder.serve_connection_with_upgrades(socket, hyper_service);
    pin_mut!(connection);

    select! {
        connection_result = connection.as_mut() => {
            if let Err(err) = connection_result {
                error!("failed to serve connection: {err:#}");
            }
            return;
        }
        () = shutdown_tx.closed() => {
            debug!("finishing open requests before closing the connection");
            connection.as_mut().graceful_shutdown();
        }
    }

    // the request timeout bounds how long this can take
    if let Err(err) = connection.as_mut().await {
        error!("failed to finish connection: {err:#}");
    }
}

/// Accepts connections until `shutdown` resolves, then lets open connections
/// finish their current requests before returning.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    tls: Option<TlsAcceptor>,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<(), AppError> {
    // tell the connections to shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let shutdown_tx = Arc::new(shutdown_tx);

    // wait for the connections to finish shutdown
    let (closed_tx, closed_rx) = watch::channel(());

    pin_mut!(shutdown);

    #[allow(clippy::redundant_pub_crate)]
    loop {
        select! {
            accept = listener.accept() => {
                let (socket, remote_addr) = match accept {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!("failed to accept connection: {err}");
                        continue;
                    }
                };
                debug!(%remote_addr, "accepted connection");

                let app = app.clone();
                let shutdown_tx = Arc::clone(&shutdown_tx);
                let closed_rx = closed_rx.clone();
                let tls = tls.clone();

                tokio::spawn(async move {
                    match tls {
                        Some(acceptor) => match acceptor.accept(socket).await {
                            Ok(stream) => serve_connection(stream, app, shutdown_tx).await,
                            Err(err) => warn!(%remote_addr, "tls handshake failed: {err}"),
                        },
                        None => serve_connection(socket, app, shutdown_tx).await,
                    }
                    drop(closed_rx);
                });
            }
            () = shutdown.as_mut() => {
                warn!("shutting down, waiting for open connections");
                drop(shutdown_rx); // initiate shutdown
                drop(closed_rx);
                drop(listener);
                closed_tx.closed().await;
                break;
            }
        }
    }

    info!("server stopped");
    Ok(())
}

/// Binds the configured address and returns the server future, which stops on
/// Ctrl+C or SIGTERM.
pub async fn run_server<S: Store + 'static>(
    config: Config,
    store: S,
) -> Result<impl Future<Output = Result<(), AppError>>, AppError> {
    let tls = config.tls.as_ref().map(tls::load_tls_acceptor).transpose()?;
    let address: SocketAddr = config.address;
    let listener = TcpListener::bind(address).await?;
    let app = setup_server(config, store);

    info!(
        %address,
        tls = tls.is_some(),
        "started up server..."
    );

    Ok(serve(listener, app, tls, shutdown_signal()))
}

#[allow(clippy::redundant_pub_crate)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {err}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install signal handler: {err}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
