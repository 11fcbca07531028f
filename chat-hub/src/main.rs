use chat_hub::{http, hub::Hub};
use dotenvy::dotenv;
use env_logger::Env;
use log::info;
use std::env;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = TcpListener::bind(&listen_addr)
        .await
        .expect("Could not bind hub server");

    info!("Hub listening on {listen_addr}");

    let (hub, handle) = Hub::new();
    tokio::spawn(hub.run());

    http::listen(listener, handle).await;
}
