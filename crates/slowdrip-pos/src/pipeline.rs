//! Receipt pipeline: observation -> receipt -> digest -> signature -> output.
//!
//! [`build_and_sign`] is the one-shot form. [`pump`] runs it continuously
//! over an [`ObservationSource`] until cancelled.
//!
//! Cancellation is cooperative. It is checked before every dequeue and
//! raced against waiting for the next observation; once an observation has
//! been taken, it is signed and emitted without further checks (signing is
//! fast and never suspends).

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use slowdrip_pos_core::{Receipt, SegmentObservation, SessionSigner, SignerError};
use slowdrip_pos_qos::Aggregator;

use crate::error::{PosError, Result};
use crate::source::ObservationSource;

/// Build an unsigned receipt from `obs` with the given nonce and sign it.
pub fn build_and_sign(
    signer: &SessionSigner,
    obs: &SegmentObservation,
    nonce: u64,
) -> std::result::Result<Receipt, SignerError> {
    let mut receipt = Receipt::from_observation(obs, nonce);
    signer.sign(&mut receipt)?;
    Ok(receipt)
}

/// Why a [`pump`] returned successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// The cancellation signal was raised (or its sender dropped).
    Cancelled,
    /// The observation source was exhausted.
    SourceClosed,
}

/// Summary of a finished [`pump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpReport {
    /// How the loop ended.
    pub exit: PumpExit,
    /// Receipts signed and emitted.
    pub signed: u64,
}

/// Wall-clock nonces, strictly increasing within one pump.
///
/// Two observations inside the same clock tick would otherwise share a
/// nonce, so each value is at least one more than the previous.
#[derive(Debug, Default)]
struct NonceClock {
    last: u64,
}

impl NonceClock {
    fn next(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        self.last = now.max(self.last.saturating_add(1));
        self.last
    }
}

/// Continuously sign observations from `source` and send them to `out`.
///
/// Runs until `cancel` becomes `true` (or its sender is dropped), or the
/// source is exhausted. Signing failures and a closed output channel end the
/// loop with an error; nothing is retried.
pub async fn pump<S>(
    signer: &SessionSigner,
    source: &mut S,
    out: &mpsc::UnboundedSender<Receipt>,
    cancel: &mut watch::Receiver<bool>,
) -> Result<PumpReport>
where
    S: ObservationSource + ?Sized,
{
    run(signer, None, source, out, cancel).await
}

/// Like [`pump`], but also records every observation (on time or late) in
/// `aggregator` before signing it.
pub async fn pump_with_qos<S>(
    signer: &SessionSigner,
    aggregator: &Aggregator,
    source: &mut S,
    out: &mpsc::UnboundedSender<Receipt>,
    cancel: &mut watch::Receiver<bool>,
) -> Result<PumpReport>
where
    S: ObservationSource + ?Sized,
{
    run(signer, Some(aggregator), source, out, cancel).await
}

async fn run<S>(
    signer: &SessionSigner,
    aggregator: Option<&Aggregator>,
    source: &mut S,
    out: &mpsc::UnboundedSender<Receipt>,
    cancel: &mut watch::Receiver<bool>,
) -> Result<PumpReport>
where
    S: ObservationSource + ?Sized,
{
    let mut nonces = NonceClock::default();
    let mut signed = 0u64;
    info!(session_id = signer.session_id(), "receipt pump started");

    let exit = loop {
        if *cancel.borrow_and_update() {
            break PumpExit::Cancelled;
        }

        let obs = tokio::select! {
            biased;
            changed = cancel.changed() => {
                if changed.is_err() {
                    debug!("cancel sender dropped, stopping pump");
                    break PumpExit::Cancelled;
                }
                continue;
            }
            next = source.next_observation() => match next {
                Some(obs) => obs,
                None => break PumpExit::SourceClosed,
            },
        };

        if let Some(agg) = aggregator {
            agg.record(&obs);
        }

        let receipt = build_and_sign(signer, &obs, nonces.next()).map_err(|e| {
            warn!(error = %e, path = %obs.path, seq = obs.seq, "receipt signing failed");
            PosError::from(e)
        })?;
        out.send(receipt).map_err(|_| PosError::OutputClosed)?;
        signed += 1;
    };

    info!(
        session_id = signer.session_id(),
        signed,
        exit = ?exit,
        "receipt pump stopped"
    );
    Ok(PumpReport { exit, signed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use slowdrip_pos_core::verify;
    use std::time::Duration;

    fn observation(seq: u64) -> SegmentObservation {
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        SegmentObservation {
            path: "live/stream".to_string(),
            seq,
            size: 1000,
            deadline: t,
            recv: t,
            commit: [seq as u8; 32],
            meta: None,
        }
    }

    #[test]
    fn test_build_and_sign() {
        let signer = SessionSigner::create("t").unwrap();
        let r = build_and_sign(&signer, &observation(1), 5).unwrap();
        assert_eq!(r.nonce, 5);
        assert_eq!(r.seq, 1);
        verify(&r).unwrap();
    }

    #[test]
    fn test_build_and_sign_fails_after_close() {
        let signer = SessionSigner::create("t").unwrap();
        signer.close();
        assert!(matches!(
            build_and_sign(&signer, &observation(1), 5),
            Err(SignerError::Uninitialized)
        ));
    }

    #[test]
    fn test_nonce_clock_strictly_increasing() {
        let mut clock = NonceClock::default();
        let mut prev = clock.next();
        assert!(prev > 0);
        for _ in 0..1000 {
            let n = clock.next();
            assert!(n > prev);
            prev = n;
        }
    }

    #[tokio::test]
    async fn test_pump_until_source_closed() {
        let signer = SessionSigner::create("t").unwrap();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, mut cancel_rx) = watch::channel(false);

        for seq in 1..=3 {
            in_tx.send(observation(seq)).unwrap();
        }
        drop(in_tx);

        let report = pump(&signer, &mut in_rx, &out_tx, &mut cancel_rx).await.unwrap();
        assert_eq!(report.exit, PumpExit::SourceClosed);
        assert_eq!(report.signed, 3);

        let mut nonces = Vec::new();
        while let Ok(r) = out_rx.try_recv() {
            verify(&r).unwrap();
            nonces.push(r.nonce);
        }
        assert_eq!(nonces.len(), 3);
        assert!(nonces.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_pump_cancelled_before_start_takes_nothing() {
        let signer = SessionSigner::create("t").unwrap();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        in_tx.send(observation(1)).unwrap();
        cancel_tx.send(true).unwrap();

        let report = pump(&signer, &mut in_rx, &out_tx, &mut cancel_rx).await.unwrap();
        assert_eq!(report.exit, PumpExit::Cancelled);
        assert_eq!(report.signed, 0);
        assert!(out_rx.try_recv().is_err());
        // The queued observation is still there for someone else.
        assert!(in_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_pump_output_closed_is_error() {
        let signer = SessionSigner::create("t").unwrap();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, mut cancel_rx) = watch::channel(false);
        drop(out_rx);

        in_tx.send(observation(1)).unwrap();
        let err = pump(&signer, &mut in_rx, &out_tx, &mut cancel_rx)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::OutputClosed));
    }

    #[tokio::test]
    async fn test_pump_signer_closed_is_error() {
        let signer = SessionSigner::create("t").unwrap();
        signer.close();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, mut cancel_rx) = watch::channel(false);

        in_tx.send(observation(1)).unwrap();
        let err = pump(&signer, &mut in_rx, &out_tx, &mut cancel_rx)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Signer(SignerError::Uninitialized)));
    }

    #[tokio::test]
    async fn test_pump_with_qos_records_late_too() {
        let signer = SessionSigner::create("t").unwrap();
        let agg = Aggregator::default();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, mut cancel_rx) = watch::channel(false);

        in_tx.send(observation(1)).unwrap();
        let mut late = observation(2);
        late.recv = late.deadline + Duration::from_millis(1);
        in_tx.send(late).unwrap();
        drop(in_tx);

        let report = pump_with_qos(&signer, &agg, &mut in_rx, &out_tx, &mut cancel_rx)
            .await
            .unwrap();
        assert_eq!(report.signed, 2);

        let st = agg.stats("live/stream").unwrap();
        assert_eq!(st.accepted, 1);
        assert_eq!(st.late, 1);
    }
}
