use crate::event::AppEvent;
use std::time::Duration;
use tokio::sync::mpsc;

/// Sends `AppEvent::Tick` so toasts expire while no keys arrive.
pub async fn start_ticker(tx: mpsc::UnboundedSender<AppEvent>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.tick().await;

    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_receiver_drops() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(start_ticker(tx, 1));

        tokio::time::advance(Duration::from_millis(1100)).await;
        assert!(matches!(rx.recv().await, Some(AppEvent::Tick)));

        drop(rx);
        tokio::time::advance(Duration::from_secs(2)).await;
        handle.await.unwrap();
    }
}
