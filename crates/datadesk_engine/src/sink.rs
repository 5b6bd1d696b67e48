use tokio::sync::mpsc;

use crate::TrackerEvent;

pub trait TrackerSink: Send + Sync {
    fn emit(&self, event: TrackerEvent);
}

/// Forwards events into an unbounded channel; a closed receiver drops them.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<TrackerEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<TrackerEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TrackerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl TrackerSink for ChannelSink {
    fn emit(&self, event: TrackerEvent) {
        let _ = self.tx.send(event);
    }
}
