use steps_core::StepSnapshot;
use tokio::sync::mpsc;

/// Receives the current day's steps on every change and on each heartbeat.
pub trait StepsListener: Send + Sync {
    fn on_steps_updated(&self, snapshot: StepSnapshot);
}

impl<F> StepsListener for F
where
    F: Fn(StepSnapshot) + Send + Sync,
{
    fn on_steps_updated(&self, snapshot: StepSnapshot) {
        self(snapshot)
    }
}

/// Hands snapshots to whichever task owns the receiving end.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<StepSnapshot>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StepSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StepsListener for ChannelListener {
    fn on_steps_updated(&self, snapshot: StepSnapshot) {
        // receiver gone means the host shut down
        let _ = self.tx.send(snapshot);
    }
}
