//! A single stream destination, reconnected on a timer independent of
//! message traffic.

use tokio::{io::AsyncWriteExt, net::TcpStream};

/// One stream destination the forwarder mirrors frames to.
///
/// Holds its own connection, reconnecting lazily: a write against a closed
/// connection fails fast, the connection is dropped, and the next timer
/// tick (see [`crate::exporter::ForwarderExporter`]) retries the connect
/// rather than the write path blocking on it.
pub struct StreamSink {
    address: String,
    connection: Option<TcpStream>,
}

impl StreamSink {
    /// Creates a sink for `address`, not yet connected.
    pub fn new(address: String) -> Self {
        Self { address, connection: None }
    }

    /// The destination address this sink mirrors to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether the sink currently holds a live connection.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Attempts to (re)connect if not already connected. A no-op when
    /// already connected.
    pub async fn reconnect(&mut self) {
        if self.connection.is_some() {
            return;
        }
        match TcpStream::connect(&self.address).await {
            Ok(stream) => {
                tracing::info!(address = %self.address, "forwarder stream destination connected");
                self.connection = Some(stream);
            }
            Err(error) => {
                tracing::warn!(address = %self.address, %error, "forwarder stream destination connect failed");
            }
        }
    }

    /// Writes `payload` to the destination, dropping the connection on any
    /// write failure so the next timer tick reconnects. Returns whether
    /// the write succeeded.
    pub async fn send(&mut self, payload: &[u8]) -> bool {
        let Some(stream) = self.connection.as_mut() else {
            return false;
        };
        if let Err(error) = stream.write_all(payload).await {
            tracing::warn!(address = %self.address, %error, "forwarder stream destination write failed, dropping connection");
            self.connection = None;
            return false;
        }
        true
    }
}

#[cfg(test)]
mod test {
    use tokio::{io::AsyncReadExt, net::TcpListener};

    use super::*;

    #[tokio::test]
    async fn reconnect_then_send_delivers_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let accept = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = vec![0u8; 32];
            let n = socket.read(&mut buf).await.expect("read");
            buf.truncate(n);
            buf
        });

        let mut sink = StreamSink::new(addr.to_string());
        assert!(!sink.is_connected());
        sink.reconnect().await;
        assert!(sink.is_connected());
        assert!(sink.send(b"<5> hello").await);

        let received = accept.await.expect("join");
        assert_eq!(received, b"<5> hello");
    }

    #[tokio::test]
    async fn send_without_connection_returns_false() {
        let mut sink = StreamSink::new("127.0.0.1:1".to_string());
        assert!(!sink.send(b"x").await);
    }
}
