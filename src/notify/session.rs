use super::surface::{
    AlertSurface, AudibleAlert, Indicator, Navigator, NoticeSink, Presentation,
    PresentationContent, PresentationSurface,
};
use crate::event::CallEvent;
use tracing::{debug, info, warn};

const UNKNOWN: &str = "Unknown";

/// Tracks at most one active inbound-call notification: the dialog shown to
/// the agent and the looping ringtone bound to it.
///
/// All operations run on a single event loop, so there is no locking here;
/// ordering is simply the order in which events are delivered.
pub struct CallNotificationSession {
    presenter: Box<dyn PresentationSurface>,
    alerts: Box<dyn AlertSurface>,
    navigator: Box<dyn Navigator>,
    notices: Box<dyn NoticeSink>,
    sound_locator: String,
    active_call: Option<CallEvent>,
    presentation: Option<Box<dyn Presentation>>,
    sound: Option<Box<dyn AudibleAlert>>,
}

impl CallNotificationSession {
    pub fn new(
        presenter: Box<dyn PresentationSurface>,
        alerts: Box<dyn AlertSurface>,
        navigator: Box<dyn Navigator>,
        notices: Box<dyn NoticeSink>,
        sound_locator: impl Into<String>,
    ) -> Self {
        Self {
            presenter,
            alerts,
            navigator,
            notices,
            sound_locator: sound_locator.into(),
            active_call: None,
            presentation: None,
            sound: None,
        }
    }

    pub fn is_notifying(&self) -> bool {
        self.active_call.is_some()
    }

    pub fn active_call(&self) -> Option<&CallEvent> {
        self.active_call.as_ref()
    }

    /// Handle an inbound call notification. Repeat events for the call
    /// already on screen are suppressed; a different caller replaces the
    /// current dialog and ringtone.
    pub fn on_inbound_call(&mut self, event: CallEvent) {
        if let Some(active) = &self.active_call {
            if active.caller_number == event.caller_number {
                debug!(
                    caller_number = event.caller_number,
                    "duplicate notification suppressed"
                );
                return;
            }
        }
        self.show_call_popup(event);
    }

    /// Close the notification, releasing the ringtone and the dialog. Safe
    /// to call when nothing is active.
    pub fn dismiss(&mut self) {
        self.stop_notification_sound();
        if let Some(mut presentation) = self.presentation.take() {
            presentation.hide();
        }
        if let Some(call) = self.active_call.take() {
            info!(caller_number = call.caller_number, "notification dismissed");
        }
    }

    /// Open the matched lead record. Without a lead reference this only
    /// raises a notice; the call stays on screen and keeps ringing.
    pub fn on_view_details(&mut self) {
        let lead_id = match self.active_call.as_ref().and_then(|c| c.lead_id.clone()) {
            Some(lead_id) => lead_id,
            None => {
                self.notices.notice("Lead details not available", Indicator::Red);
                return;
            }
        };
        self.stop_notification_sound();
        self.navigator.open_record("Lead", &lead_id);
        self.dismiss();
    }

    fn show_call_popup(&mut self, event: CallEvent) {
        // Tear down the previous notification before the new one goes up,
        // so two dialogs or ringtones are never live at once.
        if let Some(mut presentation) = self.presentation.take() {
            presentation.hide();
            self.stop_notification_sound();
        }

        info!(caller_number = event.caller_number, "incoming call");

        let content = PresentationContent {
            title: "Incoming Call".to_string(),
            caller_number: if event.caller_number.is_empty() {
                UNKNOWN.to_string()
            } else {
                event.caller_number.clone()
            },
            lead_name: event
                .lead_name
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            has_details: event.lead_id.is_some(),
        };

        let mut presentation = self.presenter.create(content);
        presentation.show();
        self.presentation = Some(presentation);
        self.active_call = Some(event);
        self.play_notification_sound();
    }

    fn play_notification_sound(&mut self) {
        // Stop any existing sound first
        self.stop_notification_sound();
        let mut sound = self.alerts.create(&self.sound_locator);
        match sound.play() {
            Ok(()) => self.sound = Some(sound),
            Err(e) => {
                warn!("failed to play notification sound: {}", e);
                self.sound = None;
            }
        }
    }

    fn stop_notification_sound(&mut self) {
        if let Some(mut sound) = self.sound.take() {
            sound.pause();
            sound.reset();
        }
    }
}
