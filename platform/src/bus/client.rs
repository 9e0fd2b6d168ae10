//! Log bus client implementation
//!
//! Thin wrapper over an MQTT broker: the orchestrator publishes through
//! [`BusPublisher`], the relay consumes through [`BusSubscriber`]. Channels
//! are plain topic strings; pattern subscription uses the broker's `+`
//! wildcard.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::PipelineError;

/// Log bus broker address
#[derive(Debug, Clone)]
pub struct BusAddress {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    /// Optional path to a PEM-encoded CA certificate for broker verification.
    /// When `None` and `use_tls` is `true`, the system certificate store is used.
    pub ca_cert_path: Option<String>,
}

impl Default for BusAddress {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            use_tls: false,
            ca_cert_path: None,
        }
    }
}

fn broker_options(address: &BusAddress, client_id: &str) -> Result<MqttOptions, PipelineError> {
    if address.host.is_empty() {
        return Err(PipelineError::BusError("bus host is not configured".to_string()));
    }

    let mut options = MqttOptions::new(client_id, &address.host, address.port);
    options.set_keep_alive(Duration::from_secs(30));

    if address.use_tls {
        use rumqttc::{TlsConfiguration, Transport};
        use rustls::ClientConfig;
        use std::sync::Arc;

        let mut root_cert_store = rustls::RootCertStore::empty();

        if let Some(ref ca_path) = address.ca_cert_path {
            let ca_pem = std::fs::read(ca_path)
                .map_err(|e| PipelineError::BusError(format!("Failed to read CA cert {ca_path}: {e}")))?;
            let mut cursor = std::io::Cursor::new(ca_pem);
            for cert in rustls_pemfile::certs(&mut cursor).flatten() {
                let _ = root_cert_store.add(cert);
            }
        } else {
            for cert in rustls_native_certs::load_native_certs().unwrap_or_default() {
                let _ = root_cert_store.add(cert);
            }
        }

        let client_config = ClientConfig::builder()
            .with_root_certificates(root_cert_store)
            .with_no_client_auth();

        options.set_transport(Transport::tls_with_config(TlsConfiguration::Rustls(
            Arc::new(client_config),
        )));
    }

    Ok(options)
}

/// Publishing half of the log bus.
///
/// The connection is driven by a background task so publishes flow out
/// while the caller is busy, e.g. while the build command is running.
pub struct BusPublisher {
    client: AsyncClient,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl BusPublisher {
    /// Create a publisher and start its connection driver
    pub fn connect(address: &BusAddress, client_id: &str) -> Result<Self, PipelineError> {
        let options = broker_options(address, client_id)?;
        let (client, mut eventloop) = AsyncClient::new(options, 64);

        let driver = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("Log bus connected");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!("Log bus connection closed: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            client,
            driver: Mutex::new(Some(driver)),
        })
    }

    /// Publish one message on a channel. Publish order is delivery order.
    pub async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), PipelineError> {
        self.client
            .publish(channel, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| PipelineError::BusError(e.to_string()))
    }

    /// Disconnect, letting queued publishes drain first
    pub async fn close(&self) {
        let _ = self.client.disconnect().await;
        if let Some(driver) = self.driver.lock().await.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), driver).await;
        }
    }
}

/// Subscribing half of the log bus, polled for incoming messages
pub struct BusSubscriber {
    client: AsyncClient,
    eventloop: EventLoop,
}

impl BusSubscriber {
    /// Create a subscriber for the given broker
    pub fn connect(address: &BusAddress, client_id: &str) -> Result<Self, PipelineError> {
        let options = broker_options(address, client_id)?;
        let (client, eventloop) = AsyncClient::new(options, 64);
        Ok(Self { client, eventloop })
    }

    /// Subscribe to a channel pattern (`+` matches one level)
    pub async fn subscribe_pattern(&mut self, pattern: &str) -> Result<(), PipelineError> {
        self.client
            .subscribe(pattern, QoS::AtLeastOnce)
            .await
            .map_err(|e| PipelineError::BusError(e.to_string()))?;
        info!("Subscribed to: {}", pattern);
        Ok(())
    }

    /// Poll for the next event
    pub async fn poll(&mut self) -> Result<Option<BusMessage>, PipelineError> {
        match self.eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let channel = publish.topic.clone();
                let payload = publish.payload.to_vec();

                debug!("Received message on channel: {}", channel);

                Ok(Some(BusMessage { channel, payload }))
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Log bus connected");
                Ok(None)
            }
            Ok(Event::Incoming(Packet::SubAck(_))) => {
                debug!("Subscription acknowledged");
                Ok(None)
            }
            Ok(_) => Ok(None),
            Err(e) => {
                warn!("Bus poll error: {}", e);
                Err(PipelineError::BusError(e.to_string()))
            }
        }
    }
}

/// Message received from the log bus
#[derive(Debug, Clone)]
pub struct BusMessage {
    pub channel: String,
    pub payload: Vec<u8>,
}

impl BusMessage {
    /// Parse the payload as JSON
    pub fn parse_json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, PipelineError> {
        serde_json::from_slice(&self.payload).map_err(|e| PipelineError::BusError(e.to_string()))
    }
}
