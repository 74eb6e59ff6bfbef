use tokio::sync::watch;
use tokio::task::JoinHandle;

/// handle to one spawned periodic loop: a shutdown flag plus the task
/// itself. dropping the sender also stops the loop, so a torn-down manager
/// can never leak its task.
pub struct RunningTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RunningTask {
    pub fn new(shutdown: watch::Sender<bool>, handle: JoinHandle<()>) -> RunningTask {
        RunningTask { shutdown, handle }
    }

    /// signals shutdown, cancelling the loop's in-flight sleep, and waits
    /// for the task to wind down
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            log::warn!("periodic task ended abnormally: {e}");
        }
    }
}
