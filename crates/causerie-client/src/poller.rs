//! Fixed-interval history poll for the open conversation.
//!
//! There is no push channel: a background task re-reads the conversation's
//! history every tick and delivers the snapshot over an mpsc channel.  The
//! poll is suspended while search results are on screen, so a tick cannot
//! clobber them, and stopped when the conversation view closes.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use causerie_shared::ChatId;

use crate::context::AppContext;
use crate::history::{self, HistoryOutcome};

enum PollerCommand {
    Suspend,
    Resume,
    Stop,
}

/// Handle to a running history poll.
pub struct HistoryPoller {
    commands: mpsc::Sender<PollerCommand>,
    handle: JoinHandle<()>,
}

impl HistoryPoller {
    /// Start polling the conversation at the context's configured interval.
    /// Snapshots arrive on the returned receiver.
    pub fn spawn(ctx: AppContext, chat_id: ChatId) -> (Self, mpsc::Receiver<HistoryOutcome>) {
        let interval = Duration::from_millis(ctx.config.poll_interval_ms);
        let (snapshot_tx, snapshot_rx) = mpsc::channel(8);
        let (command_tx, command_rx) = mpsc::channel(8);

        info!(chat = %chat_id, interval_ms = interval.as_millis() as u64, "starting history poll");
        let handle = tokio::spawn(poll_loop(ctx, chat_id, interval, snapshot_tx, command_rx));

        (
            Self {
                commands: command_tx,
                handle,
            },
            snapshot_rx,
        )
    }

    /// Skip ticks until [`resume`](Self::resume) is called.
    pub async fn suspend(&self) {
        let _ = self.commands.send(PollerCommand::Suspend).await;
    }

    /// Resume a suspended poll.
    pub async fn resume(&self) {
        let _ = self.commands.send(PollerCommand::Resume).await;
    }

    /// Stop the poll and wait for the task to finish.
    pub async fn stop(self) {
        let _ = self.commands.send(PollerCommand::Stop).await;
        let _ = self.handle.await;
    }
}

async fn poll_loop(
    ctx: AppContext,
    chat_id: ChatId,
    interval: Duration,
    snapshots: mpsc::Sender<HistoryOutcome>,
    mut commands: mpsc::Receiver<PollerCommand>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut suspended = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if suspended {
                    continue;
                }
                match history::view_history(&ctx, &chat_id, None, None) {
                    Ok(outcome) => {
                        if snapshots.send(outcome).await.is_err() {
                            // Receiver dropped: the view is gone.
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(chat = %chat_id, error = %e, "history poll failed");
                    }
                }
            }
            command = commands.recv() => match command {
                Some(PollerCommand::Suspend) => {
                    debug!(chat = %chat_id, "history poll suspended");
                    suspended = true;
                }
                Some(PollerCommand::Resume) => {
                    debug!(chat = %chat_id, "history poll resumed");
                    suspended = false;
                }
                Some(PollerCommand::Stop) | None => break,
            }
        }
    }

    info!(chat = %chat_id, "history poll stopped");
}
