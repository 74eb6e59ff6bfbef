use super::{HookError, RunningTask};
use crate::model::spawn::SpawnRequest;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// behavior injected into a [SpawningCoordinator]. request generation and
/// processing both live behind this seam so the coordinator stays free of
/// zone, queue, and statistics knowledge.
pub trait SpawnHooks: Send + Sync {
    fn generate_requests(&self) -> Result<Vec<SpawnRequest>, HookError>;

    fn process_request(&self, request: SpawnRequest) -> Result<(), HookError>;
}

/// generic periodic spawn pump. every `spawn_interval` it asks the hooks
/// for a batch of requests and processes them in order. a failing
/// generation or processing call is logged and the loop continues at the
/// next interval.
pub struct SpawningCoordinator {
    spawn_interval: Duration,
    hooks: Arc<dyn SpawnHooks>,
    task: Mutex<Option<RunningTask>>,
}

impl SpawningCoordinator {
    pub fn new(spawn_interval: Duration, hooks: Arc<dyn SpawnHooks>) -> SpawningCoordinator {
        SpawningCoordinator {
            spawn_interval,
            hooks,
            task: Mutex::new(None),
        }
    }

    /// spawns the pump loop. calling start on a running coordinator is a
    /// no-op.
    pub fn start(&self) {
        let mut task = self.task.lock().expect("spawning task lock poisoned");
        if task.is_some() {
            return;
        }
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let hooks = self.hooks.clone();
        let spawn_interval = self.spawn_interval;
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(spawn_interval) => {
                        pump(hooks.as_ref());
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
            let mut guard = self.task.lock().expect("spawning task lock poisoned");
            guard.take()
        };
        if let Some(task) = task {
            task.stop().await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .expect("spawning task lock poisoned")
            .is_some()
    }
}

fn pump(hooks: &dyn SpawnHooks) {
    let requests = match hooks.generate_requests() {
        Ok(requests) => requests,
        Err(e) => {
            log::warn!("spawn request generation failed: {e}");
            return;
        }
    };
    for request in requests {
        if let Err(e) = hooks.process_request(request) {
            log::warn!("spawn request processing failed: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::{HookError, SpawnHooks, SpawningCoordinator};
    use crate::model::commuter::Direction;
    use crate::model::spawn::SpawnRequest;
    use ridesim_geo::location::Coordinate;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn request(zone_id: &str) -> SpawnRequest {
        SpawnRequest {
            zone_id: zone_id.to_string(),
            origin: Coordinate::new(39.7, -105.0),
            destination: Coordinate::new(39.8, -105.1),
            direction: Direction::Outbound,
        }
    }

    struct BatchHooks {
        processed: Mutex<Vec<String>>,
        fail_on: Option<String>,
        iterations: Mutex<u32>,
    }

    impl SpawnHooks for BatchHooks {
        fn generate_requests(&self) -> Result<Vec<SpawnRequest>, HookError> {
            let mut iterations = self.iterations.lock().expect("lock");
            *iterations += 1;
            if *iterations == 1 {
                Ok(vec![request("a"), request("b"), request("c")])
            } else {
                Ok(vec![])
            }
        }

        fn process_request(&self, request: SpawnRequest) -> Result<(), HookError> {
            if self.fail_on.as_deref() == Some(request.zone_id.as_str()) {
                return Err(format!("zone {} rejected", request.zone_id).into());
            }
            self.processed.lock().expect("lock").push(request.zone_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_requests_processed_in_order() {
        let hooks = Arc::new(BatchHooks {
            processed: Mutex::new(vec![]),
            fail_on: None,
            iterations: Mutex::new(0),
        });
        let coordinator = SpawningCoordinator::new(Duration::from_millis(10), hooks.clone());
        coordinator.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        coordinator.stop().await;

        let processed = hooks.processed.lock().expect("lock").clone();
        assert_eq!(processed, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_one_failing_request_does_not_stop_the_batch_or_loop() {
        let hooks = Arc::new(BatchHooks {
            processed: Mutex::new(vec![]),
            fail_on: Some("b".to_string()),
            iterations: Mutex::new(0),
        });
        let coordinator = SpawningCoordinator::new(Duration::from_millis(10), hooks.clone());
        coordinator.start();
        tokio::time::sleep(Duration::from_millis(60)).await;
        coordinator.stop().await;

        // b failed but a and c landed, and later iterations kept running
        let processed = hooks.processed.lock().expect("lock").clone();
        assert_eq!(processed, vec!["a", "c"]);
        assert!(*hooks.iterations.lock().expect("lock") > 1);
    }
}
