//! Events that drive the notification state machine

use disbadge_protocol::Message;

/// Inputs to [`NotificationMachine`](super::NotificationMachine)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A complete message arrived from the bot link
    MessageReceived(Message),
    /// Scheduler pass at the given monotonic time (ms)
    Tick(u64),
    /// The dismiss button was pressed
    DismissPressed,
    /// The bot link went down
    LinkLost,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Event {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Event::MessageReceived(message) => defmt::write!(f, "MessageReceived({})", message),
            Event::Tick(now_ms) => defmt::write!(f, "Tick({=u64})", now_ms),
            Event::DismissPressed => defmt::write!(f, "DismissPressed"),
            Event::LinkLost => defmt::write!(f, "LinkLost"),
        }
    }
}

