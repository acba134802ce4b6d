use super::provider::CalendarProvider;
use crate::availability::{check_and_reserve, ReservationOutcome, ReservationRequest};
use crate::error::{component_error, BotResult};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

/// The reservation actor.
///
/// Requests are handled one at a time, so two reservations made through this
/// process cannot both pass the conflict check for the same slot.
pub struct ReservationActor {
    provider: Arc<dyn CalendarProvider>,
    event_limit: usize,
    command_rx: mpsc::Receiver<ReservationCommand>,
}

/// Commands that can be sent to the reservation actor
pub enum ReservationCommand {
    Reserve(ReservationRequest, oneshot::Sender<ReservationOutcome>),
    Shutdown,
}

/// Handle for communicating with the reservation actor
#[derive(Clone, Debug)]
pub struct ReservationActorHandle {
    command_tx: mpsc::Sender<ReservationCommand>,
}

impl ReservationActorHandle {
    /// Check the request for conflicts and book it if free
    pub async fn reserve(&self, request: ReservationRequest) -> BotResult<ReservationOutcome> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(ReservationCommand::Reserve(request, response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| component_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        let _ = self.command_tx.send(ReservationCommand::Shutdown).await;
        Ok(())
    }
}

impl ReservationActor {
    /// Create a new actor and return its handle
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        event_limit: usize,
    ) -> (Self, ReservationActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            provider,
            event_limit,
            command_rx,
        };

        (actor, ReservationActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Reservation actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                ReservationCommand::Reserve(request, response_tx) => {
                    let outcome =
                        check_and_reserve(self.provider.as_ref(), &request, self.event_limit)
                            .await;
                    let _ = response_tx.send(outcome);
                }
                ReservationCommand::Shutdown => {
                    info!("Reservation actor shutting down");
                    break;
                }
            }
        }

        info!("Reservation actor shut down");
    }
}
