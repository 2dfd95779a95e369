use tokio::sync::watch;

/// Suspend/resume primitive shared by the executor and the operator.
///
/// The gate starts open. The executor closes it and then waits; any resume
/// command opens it. Opening an open gate and closing a closed gate are no-ops.
#[derive(Debug)]
pub struct ResumeGate {
    tx: watch::Sender<bool>,
}

/// Handle a suspended task awaits on.
pub struct GateWaiter {
    rx: watch::Receiver<bool>,
}

impl ResumeGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { tx }
    }

    pub fn open(&self) {
        self.tx.send_if_modified(|open| !std::mem::replace(open, true));
    }

    pub fn close(&self) {
        self.tx.send_if_modified(|open| std::mem::replace(open, false));
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Close the gate and return a waiter bound to it.
    ///
    /// The waiter is created after the close, so an `open` racing in between
    /// is observed rather than lost.
    pub fn close_and_wait(&self) -> GateWaiter {
        self.close();
        GateWaiter {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ResumeGate {
    fn default() -> Self {
        Self::new()
    }
}

impl GateWaiter {
    /// Resolve once the gate is open or has been torn down.
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|open| *open).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_starts_open_and_toggles_idempotently() {
        let gate = ResumeGate::new();
        assert!(gate.is_open());
        gate.open();
        assert!(gate.is_open());
        gate.close();
        gate.close();
        assert!(!gate.is_open());
        gate.open();
        assert!(gate.is_open());
    }

    #[tokio::test]
    async fn test_waiter_released_by_open() {
        let gate = ResumeGate::new();
        let waiter = gate.close_and_wait();
        let task = tokio::spawn(waiter.wait());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!task.is_finished());

        gate.open();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter released")
            .unwrap();
    }

    #[tokio::test]
    async fn test_open_before_wait_is_not_lost() {
        let gate = ResumeGate::new();
        let waiter = gate.close_and_wait();
        gate.open();
        tokio::time::timeout(Duration::from_secs(1), waiter.wait())
            .await
            .expect("no missed wakeup");
    }

    #[tokio::test]
    async fn test_dropping_gate_releases_waiter() {
        let gate = ResumeGate::new();
        let waiter = gate.close_and_wait();
        drop(gate);
        tokio::time::timeout(Duration::from_secs(1), waiter.wait())
            .await
            .expect("teardown releases waiter");
    }
}
