use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::map_ws_error;
use crate::StreamError;

/// Opens one transport connection per call.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Link>, StreamError>;
}

/// An open, bidirectional text connection.
#[async_trait::async_trait]
pub trait Link: Send {
    async fn send(&mut self, text: &str) -> Result<(), StreamError>;
    /// Next text frame; `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Option<Result<String, StreamError>>;
    async fn close(&mut self);
}

#[derive(Debug, Clone)]
pub struct WsConnector {
    url: Url,
    bearer_token: Option<String>,
}

impl WsConnector {
    pub fn new(url: Url, bearer_token: Option<String>) -> Self {
        Self { url, bearer_token }
    }
}

#[async_trait::async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn Link>, StreamError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(map_ws_error)?;
        if let Some(token) = self.bearer_token.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| StreamError::InvalidToken)?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (socket, _response) = connect_async(request).await.map_err(map_ws_error)?;
        Ok(Box::new(WsLink { socket }))
    }
}

struct WsLink {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait::async_trait]
impl Link for WsLink {
    async fn send(&mut self, text: &str) -> Result<(), StreamError> {
        self.socket
            .send(Message::Text(text.to_string()))
            .await
            .map_err(map_ws_error)
    }

    async fn recv(&mut self) -> Option<Result<String, StreamError>> {
        loop {
            let message = match self.socket.next().await? {
                Ok(message) => message,
                Err(err) => return Some(Err(map_ws_error(err))),
            };
            match message {
                Message::Text(text) => return Some(Ok(text)),
                // Malformed payloads still reach the parser as opaque text.
                Message::Binary(bytes) => {
                    return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Message::Close(_) => return None,
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}
