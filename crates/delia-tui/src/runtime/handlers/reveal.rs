use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::events::UiEvent;
use crate::runtime::inbox::UiEventSender;
use crate::transcript::CellId;
use crate::transcript::reveal::drive_reveal;

/// Announces a reveal task for `cell` and spawns it.
///
/// The token travels with `RevealStarted` so the reducer owns cancellation.
/// The task also stops on its own once the inbox is gone.
pub fn spawn_reveal(
    tx: &UiEventSender,
    cell: CellId,
    generation: u64,
    steps: usize,
    interval: Duration,
) {
    let cancel = CancellationToken::new();
    if tx
        .send(UiEvent::RevealStarted {
            cell,
            generation,
            cancel: cancel.clone(),
        })
        .is_err()
    {
        return;
    }
    let tx = tx.clone();
    tokio::spawn(drive_reveal(steps, interval, cancel, move || {
        tx.send(UiEvent::RevealTick { cell, generation }).is_ok()
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::inbox;

    #[tokio::test(start_paused = true)]
    async fn test_reveal_sends_one_tick_per_step() {
        let (tx, mut rx) = inbox::channel();
        let cell = CellId::new();
        spawn_reveal(&tx, cell, 4, 3, Duration::from_millis(15));
        drop(tx);

        let Some(UiEvent::RevealStarted { generation, .. }) = rx.recv().await else {
            panic!("expected RevealStarted");
        };
        assert_eq!(generation, 4);

        let mut ticks = 0;
        while let Some(event) = rx.recv().await {
            assert!(matches!(event, UiEvent::RevealTick { generation: 4, .. }));
            ticks += 1;
        }
        assert_eq!(ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_reveal_stops() {
        let (tx, mut rx) = inbox::channel();
        spawn_reveal(&tx, CellId::new(), 1, 100, Duration::from_millis(15));
        drop(tx);

        let Some(UiEvent::RevealStarted { cancel, .. }) = rx.recv().await else {
            panic!("expected RevealStarted");
        };
        cancel.cancel();

        let mut ticks = 0;
        while rx.recv().await.is_some() {
            ticks += 1;
        }
        assert!(ticks < 100);
    }
}
