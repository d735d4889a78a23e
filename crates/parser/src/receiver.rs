//! The `AsyncReceiver` that turns raw bytes into [`CollectorEvent`]s.

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use collector_model::CollectorEvent;
use collector_settings::MessageTypeTable;
use receiver::{effect::EffectHandler, signal::Signal, AsyncReceiver, Error, ReceiverFactory};
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use tokio::{io::AsyncReadExt, net::UdpSocket};

use crate::{frame, framing::FrameExtractor};

/// Default port both the datagram and stream sockets listen on.
pub const DEFAULT_PORT: u16 = 3514;

fn default_bind_address() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}

/// Per-receiver-instance configuration, taken from the pipeline YAML.
#[derive(Debug, Deserialize)]
pub struct ParserConfig {
    /// Address both the TCP and UDP sockets bind to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Receives structured-syslog frames over both a stream and a datagram
/// socket bound to the same address, reassembling and parsing each into a
/// [`CollectorEvent::Syslog`].
pub struct StructuredSyslogReceiver {
    bind_address: String,
    message_types: MessageTypeTable,
}

impl StructuredSyslogReceiver {
    /// Creates a receiver bound to `config.bind_address`, consulting
    /// `message_types` for each frame's `int_fields` coercion set.
    pub fn new(config: ParserConfig, message_types: MessageTypeTable) -> Self {
        Self {
            bind_address: config.bind_address,
            message_types,
        }
    }
}

#[async_trait]
impl AsyncReceiver<CollectorEvent> for StructuredSyslogReceiver {
    async fn receive(
        &mut self,
        mut signal_receiver: receiver::signal::SignalReceiver,
        effect_handler: EffectHandler<CollectorEvent>,
    ) -> Result<(), Error> {
        let addr: SocketAddr = self.bind_address.parse().map_err(|e: std::net::AddrParseError| Error::InvalidConfig {
            receiver: "structured-syslog".into(),
            message: e.to_string(),
            line: None,
            column: None,
        })?;

        let tcp_listener = effect_handler.tokio_tcp_listener(addr).await?;
        let udp_socket = UdpSocket::bind(addr).await.map_err(|e| Error::TcpListener {
            receiver: "structured-syslog".into(),
            error: e.to_string(),
        })?;

        tracing::info!(%addr, "structured-syslog receiver listening (tcp + udp)");

        let message_types = self.message_types.clone();
        let mut udp_buf = vec![0u8; 64 * 1024];

        loop {
            tokio::select! {
                signal = signal_receiver.recv() => {
                    match signal {
                        Signal::Stop => {
                            tracing::info!("structured-syslog receiver stopping");
                            break;
                        }
                        Signal::TimerTick { .. } => { /* nothing to do on a tick */ }
                    }
                }
                accepted = tcp_listener.accept() => {
                    match accepted {
                        Ok((socket, peer)) => {
                            let effect_handler = effect_handler.clone();
                            let message_types = message_types.clone();
                            let _ = tokio::spawn(async move {
                                handle_tcp_connection(socket, peer, effect_handler, message_types).await;
                            });
                        }
                        Err(error) => tracing::error!(%error, "tcp accept failed"),
                    }
                }
                received = udp_socket.recv_from(&mut udp_buf) => {
                    match received {
                        Ok((n, peer)) => handle_datagram(&udp_buf[..n], peer, &effect_handler, &message_types).await,
                        Err(error) => tracing::error!(%error, "udp recv failed"),
                    }
                }
            }
        }

        Ok(())
    }
}

async fn handle_tcp_connection(
    mut socket: tokio::net::TcpStream,
    peer: SocketAddr,
    effect_handler: EffectHandler<CollectorEvent>,
    message_types: MessageTypeTable,
) {
    let mut extractor = FrameExtractor::new();
    let mut buf = vec![0u8; 16 * 1024];

    loop {
        match socket.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let frames = extractor.push(&buf[..n]);
                if extractor.take_overflow() {
                    tracing::error!(%peer, "carry-over buffer overflow, partial frame discarded");
                }
                for raw in frames {
                    emit_frame(&raw, &effect_handler, &message_types).await;
                }
            }
            Err(error) => {
                tracing::error!(%peer, %error, "tcp read failed");
                break;
            }
        }
    }
}

async fn handle_datagram(
    datagram: &[u8],
    peer: SocketAddr,
    effect_handler: &EffectHandler<CollectorEvent>,
    message_types: &MessageTypeTable,
) {
    // Datagrams carry no state across reads; a fresh extractor per packet
    // mirrors the "carry-over is empty for datagram transports" rule.
    let mut extractor = FrameExtractor::new();
    let frames = extractor.push(datagram);
    if extractor.take_overflow() {
        tracing::error!(%peer, "oversized datagram discarded");
    }
    for raw in frames {
        emit_frame(&raw, effect_handler, message_types).await;
    }
}

async fn emit_frame(raw: &[u8], effect_handler: &EffectHandler<CollectorEvent>, message_types: &MessageTypeTable) {
    match frame::parse_frame(raw, message_types) {
        Ok(record) => {
            if let Err(error) = effect_handler.send_messages(vec![CollectorEvent::Syslog(record)]).await {
                tracing::error!(%error, "failed to hand off parsed record to the pipeline");
            }
        }
        Err(error) => {
            tracing::warn!(%error, "dropping malformed frame");
        }
    }
}

/// Builds [`StructuredSyslogReceiver`] instances, sharing one
/// [`MessageTypeTable`] across every instance it creates.
pub struct ParserReceiverFactory {
    message_types: MessageTypeTable,
}

impl ParserReceiverFactory {
    /// Creates a factory that hands `message_types` to every receiver it
    /// builds.
    pub fn new(message_types: MessageTypeTable) -> Self {
        Self { message_types }
    }
}

impl ReceiverFactory<CollectorEvent> for ParserReceiverFactory {
    fn create(
        &self,
        receiver_name: &str,
        receiver_type: &str,
        config: YamlValue,
    ) -> Result<Box<dyn AsyncReceiver<CollectorEvent> + Send + Sync>, Error> {
        match receiver_type {
            "structured-syslog" => {
                let config: ParserConfig = if config.is_null() {
                    ParserConfig::default()
                } else {
                    serde_yaml::from_value(config).map_err(|e| Error::InvalidConfig {
                        receiver: receiver_name.into(),
                        message: e.to_string(),
                        line: None,
                        column: None,
                    })?
                };
                Ok(Box::new(StructuredSyslogReceiver::new(config, self.message_types.clone())))
            }
            _ => Err(Error::UnknownReceiver {
                receiver: receiver_name.into(),
                receiver_type: receiver_type.into(),
            }),
        }
    }
}
