//! Control panel to page agent delivery
//!
//! A send that finds no receiver is recovered by injecting the agent and
//! retrying once after a short delay. A second failure is dropped without
//! surfacing an error.

use async_trait::async_trait;
use soundmaster_core::{Clock, PageMessage, PageResponse};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure of a single send or injection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// No agent is listening in the tab
    #[error("No receiver in tab: {0}")]
    NoReceiver(String),

    /// The agent received the message but closed the channel before replying
    #[error("Message channel closed before a response was received")]
    ChannelClosed,

    /// The agent could not be injected (protected page, closed tab)
    #[error("Agent injection failed: {0}")]
    Injection(String),
}

/// Messaging seam to the active tab
#[async_trait(?Send)]
pub trait TabChannel {
    /// Send one message to the tab's agent and wait for its reply
    async fn send(&self, message: &PageMessage) -> Result<PageResponse, DeliveryError>;

    /// Inject the agent into the tab
    async fn inject_agent(&self) -> Result<(), DeliveryError>;
}

/// What happened to a delivered message
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// The first send succeeded
    Delivered(PageResponse),

    /// The send succeeded after the agent was injected
    DeliveredAfterInjection(PageResponse),

    /// Not delivered; no further retries
    Dropped,
}

impl DeliveryOutcome {
    pub fn response(&self) -> Option<&PageResponse> {
        match self {
            Self::Delivered(response) | Self::DeliveredAfterInjection(response) => Some(response),
            Self::Dropped => None,
        }
    }

    pub fn is_delivered(&self) -> bool {
        !matches!(self, Self::Dropped)
    }
}

/// Deliver `message`, injecting the agent and retrying once if nobody listens
pub async fn deliver<C, K>(
    channel: &C,
    clock: &K,
    message: &PageMessage,
    retry_delay: Duration,
) -> DeliveryOutcome
where
    C: TabChannel + ?Sized,
    K: Clock + ?Sized,
{
    match channel.send(message).await {
        Ok(response) => return DeliveryOutcome::Delivered(response),
        Err(DeliveryError::ChannelClosed) => {
            debug!("Channel closed by agent, not retrying");
            return DeliveryOutcome::Dropped;
        }
        Err(e) => debug!("First send failed ({e}), injecting agent"),
    }

    if let Err(e) = channel.inject_agent().await {
        warn!("Could not inject agent: {e}");
        return DeliveryOutcome::Dropped;
    }

    clock.sleep(retry_delay).await;

    match channel.send(message).await {
        Ok(response) => DeliveryOutcome::DeliveredAfterInjection(response),
        Err(e) => {
            debug!("Retry after injection failed: {e}");
            DeliveryOutcome::Dropped
        }
    }
}
