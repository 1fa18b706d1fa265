//! Classification of `tabs.sendMessage` failures

use soundmaster_settings::DeliveryError;

/// Fragment of the error raised when the agent got the message but never answered
const CHANNEL_CLOSED: &str = "message channel closed";

/// Map a browser messaging error to a delivery error
///
/// A closed channel means an agent is present, so it must not trigger
/// re-injection. Every other failure is treated as a missing receiver.
pub fn classify_send_error(message: &str) -> DeliveryError {
    if message.contains(CHANNEL_CLOSED) {
        DeliveryError::ChannelClosed
    } else {
        DeliveryError::NoReceiver(message.to_string())
    }
}
