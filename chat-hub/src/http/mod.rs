use crate::{hub::HubHandle, session::Session, transport::ws};
use axum::{
    Router,
    extract::{
        ConnectInfo, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::{Html, IntoResponse},
    routing::get,
};
use hyper::{Request, body::Incoming};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server,
};
use log::{debug, error};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_service::Service;

/// Accepts connections and serves the demo page and the WebSocket attach
/// point until the process ends.
pub async fn listen(listener: TcpListener, hub: HubHandle) {
    let app = Router::new()
        .route("/", get(home))
        .route("/ws", get(attach))
        .with_state(hub);

    loop {
        let (socket, remote_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                error!("Could not get socket from accepted connection: {error}");
                continue;
            }
        };

        let tower_service = app.clone();
        tokio::spawn(async move {
            let socket = TokioIo::new(socket);
            let hyper_service =
                hyper::service::service_fn(move |mut request: Request<Incoming>| {
                    // Hand the peer address to the attach handler
                    request.extensions_mut().insert(ConnectInfo(remote_addr));
                    tower_service.clone().call(request)
                });

            if let Err(error) = server::conn::auto::Builder::new(TokioExecutor::new())
                .serve_connection_with_upgrades(socket, hyper_service)
                .await
            {
                debug!("Failed to serve connection: {error:#}");
            }
        });
    }
}

async fn home() -> Html<&'static str> {
    Html(include_str!("home.html"))
}

async fn attach(
    ws: WebSocketUpgrade,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    State(hub): State<HubHandle>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| attached(socket, remote_addr, hub))
}

async fn attached(socket: WebSocket, remote_addr: SocketAddr, hub: HubHandle) {
    let (reader, writer) = ws::split(socket);
    Session::new(remote_addr.to_string(), hub)
        .run(reader, writer)
        .await;
}
