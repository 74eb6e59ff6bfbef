use super::{HookError, RunningTask};
use crate::model::commuter::CommuterId;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// behavior injected into an [ExpirationManager]. the manager knows nothing
/// about queues, statistics, or events; all of that lives behind this seam.
pub trait ExpirationHooks: Send + Sync {
    /// snapshot of (id, last activity) for every commuter still waiting
    fn active_commuters(&self) -> Vec<(CommuterId, DateTime<Utc>)>;

    fn expire(&self, id: CommuterId) -> Result<(), HookError>;
}

/// generic periodic inactivity sweep. every `check_interval` it fetches the
/// active set and expires every entry idle longer than
/// `inactivity_threshold`. one failing expire call is logged and the sweep
/// moves on; the loop itself never dies.
pub struct ExpirationManager {
    check_interval: Duration,
    inactivity_threshold: Duration,
    hooks: Arc<dyn ExpirationHooks>,
    task: Mutex<Option<RunningTask>>,
}

impl ExpirationManager {
    pub fn new(
        check_interval: Duration,
        inactivity_threshold: Duration,
        hooks: Arc<dyn ExpirationHooks>,
    ) -> ExpirationManager {
        ExpirationManager {
            check_interval,
            inactivity_threshold,
            hooks,
            task: Mutex::new(None),
        }
    }

    /// spawns the sweep loop. calling start on a running manager is a no-op.
    pub fn start(&self) {
        let mut task = self.task.lock().expect("expiration task lock poisoned");
        if task.is_some() {
            return;
        }
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let hooks = self.hooks.clone();
        let check_interval = self.check_interval;
        let inactivity_threshold = self.inactivity_threshold;
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(check_interval) => {
                        sweep(hooks.as_ref(), inactivity_threshold);
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });
        *task = Some(RunningTask::new(shutdown_tx, handle));
    }

    /// stops the loop, cancelling its pending sleep. idempotent.
    pub async fn stop(&self) {
        let task = {
            let mut guard = self.task.lock().expect("expiration task lock poisoned");
            guard.take()
        };
        if let Some(task) = task {
            task.stop().await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .expect("expiration task lock poisoned")
            .is_some()
    }
}

fn sweep(hooks: &dyn ExpirationHooks, inactivity_threshold: Duration) {
    let now = Utc::now();
    for (id, last_activity) in hooks.active_commuters() {
        // a future last_activity is simply not stale
        let idle = (now - last_activity).to_std().unwrap_or_default();
        if idle > inactivity_threshold {
            if let Err(e) = hooks.expire(id) {
                log::warn!("failed to expire commuter {id}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ExpirationHooks, ExpirationManager, HookError};
    use crate::model::commuter::CommuterId;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingHooks {
        active: Mutex<Vec<(CommuterId, DateTime<Utc>)>>,
        expired: Mutex<Vec<CommuterId>>,
    }

    impl ExpirationHooks for RecordingHooks {
        fn active_commuters(&self) -> Vec<(CommuterId, DateTime<Utc>)> {
            self.active.lock().expect("lock").clone()
        }

        fn expire(&self, id: CommuterId) -> Result<(), HookError> {
            self.active.lock().expect("lock").retain(|(i, _)| *i != id);
            self.expired.lock().expect("lock").push(id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stale_commuter_expired_exactly_once() {
        let hooks = Arc::new(RecordingHooks::default());
        {
            let mut active = hooks.active.lock().expect("lock");
            // 1 went idle long ago; 2 is fresh
            active.push((1, Utc::now() - ChronoDuration::seconds(120)));
            active.push((2, Utc::now()));
        }
        let manager = ExpirationManager::new(
            Duration::from_millis(10),
            Duration::from_secs(60),
            hooks.clone(),
        );
        manager.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        manager.stop().await;

        let expired = hooks.expired.lock().expect("lock").clone();
        assert_eq!(expired, vec![1]);
        assert_eq!(hooks.active.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_cancels_sleep() {
        let hooks = Arc::new(RecordingHooks::default());
        // an hour-long interval: stop must not wait for the sleep to elapse
        let manager = ExpirationManager::new(
            Duration::from_secs(3600),
            Duration::from_secs(60),
            hooks,
        );
        manager.start();
        assert!(manager.is_running());
        manager.stop().await;
        manager.stop().await;
        assert!(!manager.is_running());
    }

    struct FailingHooks {
        attempts: Mutex<u32>,
    }

    impl ExpirationHooks for FailingHooks {
        fn active_commuters(&self) -> Vec<(CommuterId, DateTime<Utc>)> {
            *self.attempts.lock().expect("lock") += 1;
            vec![(9, Utc::now() - ChronoDuration::seconds(120))]
        }

        fn expire(&self, _id: CommuterId) -> Result<(), HookError> {
            Err("sink offline".into())
        }
    }

    #[tokio::test]
    async fn test_failing_expire_does_not_kill_the_loop() {
        let hooks = Arc::new(FailingHooks {
            attempts: Mutex::new(0),
        });
        let manager = ExpirationManager::new(
            Duration::from_millis(10),
            Duration::from_secs(60),
            hooks.clone(),
        );
        manager.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        manager.stop().await;

        // multiple sweeps ran despite every expire call failing
        assert!(*hooks.attempts.lock().expect("lock") > 1);
    }
}
