use crate::errors::transport_error::TransportError;
use crate::transport::{MessageReader, MessageWriter};
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};

/// Splits an upgraded WebSocket into the two halves the session loops own.
pub fn split(socket: WebSocket) -> (WsReader, WsWriter) {
    let (sink, stream) = socket.split();
    (WsReader { stream }, WsWriter { sink })
}

pub struct WsReader {
    stream: SplitStream<WebSocket>,
}

pub struct WsWriter {
    sink: SplitSink<WebSocket, Message>,
}

impl MessageReader for WsReader {
    async fn read(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_bytes().to_vec())),
                Some(Ok(Message::Binary(bytes))) => return Ok(Some(bytes.to_vec())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Ping and pong frames are answered by the transport itself
                Some(Ok(_)) => continue,
                Some(Err(error)) => return Err(TransportError::Read(error.to_string())),
            }
        }
    }
}

impl MessageWriter for WsWriter {
    async fn write(&mut self, message: Vec<u8>) -> Result<(), TransportError> {
        let text = String::from_utf8(message)
            .map_err(|error| TransportError::Write(error.to_string()))?;

        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|error| TransportError::Write(error.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.sink.close().await;
    }
}
