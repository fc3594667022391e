//! MQTT event loop driving the [`MessageRouter`]

use rumqttc::{AsyncClient, Event, EventLoop, Outgoing, Packet, Publish, QoS};
use spamguard_client::PredictionApi;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::RouterConfig;
use crate::publisher::MqttPublisher;
use crate::router::MessageRouter;
use crate::topics;

/// Upper bound on waiting for in-flight messages at shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of the broker connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Subscribed,
}

/// Connection bookkeeping, independent of the transport
#[derive(Debug)]
pub struct Session {
    state: ConnectionState,
    pending_subacks: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            pending_subacks: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// About to poll the transport, which reconnects when disconnected
    pub fn on_poll(&mut self) {
        if self.state == ConnectionState::Disconnected {
            self.transition(ConnectionState::Connecting);
        }
    }

    /// The broker accepted the connection; `subscriptions` requests follow
    pub fn on_connack(&mut self, subscriptions: usize) {
        self.pending_subacks = subscriptions;
        self.transition(ConnectionState::Connected);
        if subscriptions == 0 {
            self.transition(ConnectionState::Subscribed);
        }
    }

    pub fn on_suback(&mut self) {
        self.pending_subacks = self.pending_subacks.saturating_sub(1);
        if self.pending_subacks == 0 && self.state == ConnectionState::Connected {
            self.transition(ConnectionState::Subscribed);
        }
    }

    /// The connection was lost or closed by the broker
    pub fn on_error(&mut self) {
        self.pending_subacks = 0;
        self.transition(ConnectionState::Disconnected);
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            info!("MQTT session {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

/// Owns the MQTT connection and spawns one task per inbound publish
pub struct Bridge {
    client: AsyncClient,
    eventloop: EventLoop,
    router: Arc<MessageRouter>,
    /// Messages being processed
    limiter: Arc<Semaphore>,
    /// Messages processed or waiting for a processing slot
    backlog: Arc<Semaphore>,
    max_in_flight: usize,
    reconnect_delay: Duration,
    drain_timeout: Duration,
    session: Session,
    subscriber: Option<JoinHandle<()>>,
}

impl Bridge {
    pub fn new(config: &RouterConfig, api: Arc<dyn PredictionApi>) -> Self {
        let (client, eventloop) =
            AsyncClient::new(config.broker.mqtt_options(), config.broker.capacity);
        let publisher = Arc::new(MqttPublisher::new(client.clone()));
        let backlog = config
            .max_in_flight
            .saturating_add(config.max_pending)
            .min(Semaphore::MAX_PERMITS);

        Self {
            client,
            eventloop,
            router: Arc::new(MessageRouter::new(api, publisher)),
            limiter: Arc::new(Semaphore::new(config.max_in_flight)),
            backlog: Arc::new(Semaphore::new(backlog)),
            max_in_flight: config.max_in_flight,
            reconnect_delay: config.broker.reconnect_delay(),
            drain_timeout: DRAIN_TIMEOUT,
            session: Session::new(),
            subscriber: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state()
    }

    /// Poll the broker until `shutdown` resolves
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            self.session.on_poll();

            let event = tokio::select! {
                _ = &mut shutdown => break,
                event = self.eventloop.poll() => event,
            };

            match event {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    debug!("ConnAck: {:?}", ack.code);
                    self.session.on_connack(topics::SUBSCRIPTIONS.len());
                    self.resubscribe();
                }
                Ok(Event::Incoming(Packet::SubAck(_))) => self.session.on_suback(),
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.dispatch(publish);
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    warn!("Broker closed the connection");
                    self.session.on_error();
                }
                Ok(_) => {}
                Err(e) => {
                    error!(
                        "MQTT connection error: {}; retrying in {:?}",
                        e, self.reconnect_delay
                    );
                    self.session.on_error();
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(self.reconnect_delay) => {}
                    }
                }
            }
        }

        self.drain_and_disconnect().await;
    }

    fn resubscribe(&mut self) {
        if let Some(previous) = self.subscriber.take() {
            previous.abort();
        }
        self.subscriber = Some(self.subscribe());
    }

    /// Queue the subscriptions from a separate task.
    ///
    /// Only `poll` drains the request channel, and results published while
    /// the broker was away may have filled it.
    fn subscribe(&self) -> JoinHandle<()> {
        let client = self.client.clone();

        tokio::spawn(async move {
            for topic in topics::SUBSCRIPTIONS {
                match client.subscribe(topic, QoS::AtLeastOnce).await {
                    Ok(()) => info!("Subscribing to {}", topic),
                    Err(e) => error!("Failed to subscribe to {}: {}", topic, e),
                }
            }
        })
    }

    /// Hand `publish` to its own task.
    ///
    /// Returns false when the backlog is full and the message was dropped.
    fn dispatch(&self, publish: Publish) -> bool {
        let Ok(slot) = self.backlog.clone().try_acquire_owned() else {
            warn!("Backlog full, dropping message on {}", publish.topic);
            metrics::counter!("spamguard_router_dropped_total").increment(1);
            return false;
        };
        let router = self.router.clone();
        let limiter = self.limiter.clone();

        tokio::spawn(async move {
            let _slot = slot;
            let Ok(_permit) = limiter.acquire_owned().await else {
                return;
            };
            router.handle(&publish.topic, &publish.payload).await;
        });
        true
    }

    /// Let in-flight messages finish, then send a clean disconnect.
    ///
    /// The event loop keeps being polled so queued publications still reach
    /// the broker.
    async fn drain_and_disconnect(mut self) {
        info!("Stopping router, waiting for in-flight messages");
        if let Some(subscriber) = self.subscriber.take() {
            subscriber.abort();
        }

        let permits = u32::try_from(self.max_in_flight).unwrap_or(u32::MAX);
        let limiter = self.limiter.clone();
        let drain = limiter.acquire_many(permits);
        let deadline = tokio::time::sleep(self.drain_timeout);
        tokio::pin!(drain, deadline);

        let mut connected = true;
        loop {
            tokio::select! {
                _ = &mut drain => break,
                _ = &mut deadline => {
                    warn!("Timed out waiting for in-flight messages");
                    break;
                }
                event = self.eventloop.poll(), if connected => {
                    if let Err(e) = event {
                        debug!("Connection lost while draining: {}", e);
                        connected = false;
                    }
                }
            }
        }

        if !connected {
            return;
        }
        if let Err(e) = self.client.disconnect().await {
            debug!("Disconnect request not queued: {}", e);
            return;
        }

        let flushed = tokio::time::timeout(self.drain_timeout, async {
            loop {
                match self.eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;
        if flushed.is_err() {
            warn!("Timed out sending disconnect");
        }
        info!("Disconnected from broker");
    }
}
