//! Relay stage between the watcher and the console.
//!
//! Two tasks cooperate through a pair of zero-capacity hand-off queues:
//!
//! - [`run_receiver`] moves events and errors from the watcher's streams onto
//!   the queues without looking at them.
//! - [`run_handler`] takes them off the queues, prints one line per event and
//!   logs errors.
//!
//! A send on a hand-off queue completes only once the handler has taken the
//! item, so a slow handler stalls the receiver, which in turn stalls the
//! watcher's backend thread. Nothing is buffered or dropped on the way.

use crate::error::{Result, WatchError};
use crate::event::FileSystemEvent;
use crate::watcher::WatchStreams;
use std::io::Write;
use tracing::{debug, error, info, trace};

/// Producer half of the hand-off queues, owned by the receiver task.
#[derive(Debug, Clone)]
pub struct HandOffSender {
    events: flume::Sender<FileSystemEvent>,
    errors: flume::Sender<WatchError>,
}

/// Consumer half of the hand-off queues, owned by the handler task.
#[derive(Debug, Clone)]
pub struct HandOffReceiver {
    events: flume::Receiver<FileSystemEvent>,
    errors: flume::Receiver<WatchError>,
}

/// Creates the two unbuffered hand-off queues, one for events and one for
/// errors.
pub fn hand_off() -> (HandOffSender, HandOffReceiver) {
    let (event_tx, event_rx) = flume::bounded(0);
    let (error_tx, error_rx) = flume::bounded(0);
    (
        HandOffSender {
            events: event_tx,
            errors: error_tx,
        },
        HandOffReceiver {
            events: event_rx,
            errors: error_rx,
        },
    )
}

/// Forwards whatever arrives first on either watcher stream onto the
/// matching hand-off queue.
///
/// Runs until both streams are closed or the handler has gone away. While
/// the watch handle is alive neither happens.
pub async fn run_receiver(mut streams: WatchStreams, out: HandOffSender) {
    loop {
        tokio::select! {
            Some(event) = streams.events.recv() => {
                trace!("Relaying event: {:?}", event);
                if out.events.send_async(event).await.is_err() {
                    debug!("Handler dropped the event queue. Receiver exiting.");
                    break;
                }
            }
            Some(err) = streams.errors.recv() => {
                trace!("Relaying error: {}", err);
                if out.errors.send_async(err).await.is_err() {
                    debug!("Handler dropped the error queue. Receiver exiting.");
                    break;
                }
            }
            else => {
                info!("Watcher streams closed. Receiver exiting.");
                break;
            }
        }
    }
}

/// Takes events and errors off the hand-off queues.
///
/// Each event with a reportable kind produces exactly one
/// `File <action>: <path>` line on `out`, flushed immediately. Errors are
/// logged and never stop the loop.
///
/// Returns the writer once both queues are closed.
///
/// # Errors
///
/// Returns [`WatchError::Output`] if writing to `out` fails.
pub async fn run_handler<W: Write>(input: HandOffReceiver, mut out: W) -> Result<W> {
    loop {
        tokio::select! {
            Ok(event) = input.events.recv_async() => {
                handle_event(&event, &mut out)?;
            }
            Ok(err) = input.errors.recv_async() => {
                error!("Error: {}", err);
            }
            else => {
                info!("Hand-off queues closed. Handler exiting.");
                break;
            }
        }
    }
    Ok(out)
}

fn handle_event<W: Write>(event: &FileSystemEvent, out: &mut W) -> Result<()> {
    match event.describe() {
        Some(line) => {
            writeln!(out, "{}", line)?;
            out.flush()?;
        }
        None => trace!("No reportable kind in {:?}", event),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Op;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn send_waits_for_the_handler() {
        let (tx, rx) = hand_off();
        let event = FileSystemEvent::new("a", Op::CREATE);

        // Nobody is receiving, so the hand-off cannot complete.
        let blocked = timeout(
            Duration::from_millis(100),
            tx.events.send_async(event.clone()),
        )
        .await;
        assert!(blocked.is_err());
        assert!(rx.events.is_empty());

        let (sent, received) = tokio::join!(tx.events.send_async(event), rx.events.recv_async());
        sent.unwrap();
        assert_eq!(received.unwrap().path, "a");
    }
}
