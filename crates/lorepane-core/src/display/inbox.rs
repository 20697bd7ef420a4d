//! UI execution context: an inbox of paint jobs.
//!
//! Producers post [`PaintJob`]s from any thread. Whoever owns the paint
//! target drains the inbox, once per frame or by awaiting [`UiReceiver::run_next`].

use tokio::sync::mpsc;

use super::paint::PaintTarget;
use crate::error::PanelError;

/// Paint work executed on the UI context.
pub type PaintJob = Box<dyn FnOnce(&mut dyn PaintTarget) + Send + 'static>;

/// Sending half of the UI inbox.
#[derive(Clone, Debug)]
pub struct UiSender {
    tx: mpsc::UnboundedSender<PaintJob>,
}

/// Receiving half of the UI inbox. Owned by the paint target's thread.
#[derive(Debug)]
pub struct UiReceiver {
    rx: mpsc::UnboundedReceiver<PaintJob>,
}

/// Creates a connected inbox pair.
pub fn ui_inbox() -> (UiSender, UiReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiSender { tx }, UiReceiver { rx })
}

impl UiSender {
    /// Posts a job. Fails only if the receiver was dropped.
    pub fn post<F>(&self, job: F) -> Result<(), PanelError>
    where
        F: FnOnce(&mut dyn PaintTarget) + Send + 'static,
    {
        self.tx
            .send(Box::new(job))
            .map_err(|_closed| PanelError::UiContextClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl UiReceiver {
    /// Runs every queued job against `target`. Returns how many ran.
    pub fn drain(&mut self, target: &mut dyn PaintTarget) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job(target);
            ran += 1;
        }
        ran
    }

    /// Waits for the next job and runs it. Returns false once every sender is gone.
    pub async fn run_next(&mut self, target: &mut dyn PaintTarget) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job(target);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::recording::RecordingCanvas;

    #[test]
    fn test_drain_runs_jobs_in_order() {
        let (tx, mut rx) = ui_inbox();
        tx.post(|target| target.clear_rect(0, 0, 1, 1)).unwrap();
        tx.post(|target| target.refresh()).unwrap();

        let mut canvas = RecordingCanvas::new();
        assert_eq!(rx.drain(&mut canvas), 2);
        assert_eq!(canvas.clear_count(), 1);
        assert_eq!(canvas.refresh_count(), 1);
        assert_eq!(rx.drain(&mut canvas), 0);
    }

    #[test]
    fn test_post_fails_after_receiver_dropped() {
        let (tx, rx) = ui_inbox();
        drop(rx);
        assert!(tx.is_closed());
        assert_eq!(tx.post(|_| {}), Err(PanelError::UiContextClosed));
    }

    #[tokio::test]
    async fn test_run_next_stops_when_senders_gone() {
        let (tx, mut rx) = ui_inbox();
        tx.post(|target| target.refresh()).unwrap();
        drop(tx);

        let mut canvas = RecordingCanvas::new();
        assert!(rx.run_next(&mut canvas).await);
        assert!(!rx.run_next(&mut canvas).await);
    }
}
