use crate::event::EventReceiver;
use tokio::select;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod session;
pub mod surface;

pub use session::CallNotificationSession;

/// User interactions with the notification dialog, delivered to the session
/// event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Dismiss,
    ViewDetails,
}

/// Drive a session from the notification feed and the user command channel
/// until cancellation. This is the single-threaded dispatch point: every
/// session operation runs here, in delivery order.
pub async fn serve(
    mut session: CallNotificationSession,
    mut events: EventReceiver,
    mut commands: mpsc::Receiver<SessionCommand>,
    token: CancellationToken,
) {
    loop {
        select! {
            event = events.recv() => {
                match event {
                    Ok(event) => session.on_inbound_call(event),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "notification feed lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        info!("notification feed closed");
                        break;
                    }
                }
            }
            command = commands.recv() => {
                match command {
                    Some(SessionCommand::Dismiss) => session.dismiss(),
                    Some(SessionCommand::ViewDetails) => session.on_view_details(),
                    None => break,
                }
            }
            _ = token.cancelled() => {
                break;
            }
        }
    }
    session.dismiss();
}
