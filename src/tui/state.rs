use crate::model::{ActionEvent, Outcome, PrefixSet};

const LOG_CAP: usize = 200;

/// Focusable form elements, in traversal order. The buttons carry the
/// `name` the combined update form routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Channel,
    First,
    Middle,
    Last,
    Augment,
    Update,
    Abridge,
}

const FOCUS_ORDER: [Focus; 7] = [
    Focus::Channel,
    Focus::First,
    Focus::Middle,
    Focus::Last,
    Focus::Augment,
    Focus::Update,
    Focus::Abridge,
];

impl Focus {
    pub fn next(self) -> Focus {
        let i = FOCUS_ORDER.iter().position(|f| *f == self).unwrap_or(0);
        FOCUS_ORDER[(i + 1) % FOCUS_ORDER.len()]
    }

    pub fn prev(self) -> Focus {
        let i = FOCUS_ORDER.iter().position(|f| *f == self).unwrap_or(0);
        FOCUS_ORDER[(i + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len()]
    }

    pub fn is_field(self) -> bool {
        matches!(self, Focus::Channel | Focus::First | Focus::Middle | Focus::Last)
    }

    /// The `name` attribute of a submit control, used for routing.
    pub fn control_name(self) -> Option<&'static str> {
        match self {
            Focus::Augment => Some("augment"),
            Focus::Update => Some("update"),
            Focus::Abridge => Some("abridge"),
            _ => None,
        }
    }
}

pub(crate) struct UiState {
    pub focus: Focus,
    pub channel: String,
    pub first: String,
    pub middle: String,
    pub last: String,
    /// Failure text currently shown; input is captive until dismissed.
    pub alert: Option<String>,
    pub status: String,
    pub in_flight: usize,
    pub refreshes: u64,
    pub log: Vec<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Channel,
            channel: String::new(),
            first: String::new(),
            middle: String::new(),
            last: String::new(),
            alert: None,
            status: String::new(),
            in_flight: 0,
            refreshes: 0,
            log: Vec::new(),
        }
    }
}

impl UiState {
    pub fn prefix_set(&self) -> PrefixSet {
        PrefixSet::new(self.first.clone(), self.middle.clone(), self.last.clone())
    }

    pub fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Channel => Some(&mut self.channel),
            Focus::First => Some(&mut self.first),
            Focus::Middle => Some(&mut self.middle),
            Focus::Last => Some(&mut self.last),
            _ => None,
        }
    }

    pub fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > LOG_CAP {
            let excess = self.log.len() - LOG_CAP;
            self.log.drain(..excess);
        }
    }
}

pub(crate) fn apply_event(state: &mut UiState, ev: ActionEvent) {
    match ev {
        ActionEvent::Dispatched { kind, channel } => {
            state.push_log(format!("→ {kind} {channel}"));
        }
        ActionEvent::OutcomeReceived {
            kind,
            channel,
            outcome,
        } => {
            let line = match &outcome {
                Outcome::Success => format!("{kind} {channel}: Success"),
                Outcome::Failure(text) => format!("{kind} {channel}: {text}"),
            };
            state.status = line.clone();
            state.push_log(line);
        }
        ActionEvent::Alert { text } => {
            state.alert = Some(text);
        }
        ActionEvent::ViewRefreshed { path } => {
            // The reload analog: transient form state resets. The channel
            // comes from the page context and survives, the prefix
            // fields would be repopulated by the server.
            state.first.clear();
            state.middle.clear();
            state.last.clear();
            state.refreshes += 1;
            state.status = format!("View refreshed: {path}");
            state.push_log(state.status.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActionKind;

    #[test]
    fn focus_order_wraps_both_ways() {
        assert_eq!(Focus::Abridge.next(), Focus::Channel);
        assert_eq!(Focus::Channel.prev(), Focus::Abridge);
        assert_eq!(Focus::Channel.next(), Focus::First);
    }

    #[test]
    fn alert_event_raises_modal() {
        let mut state = UiState::default();
        apply_event(
            &mut state,
            ActionEvent::Alert {
                text: "Channel not found".into(),
            },
        );
        assert_eq!(state.alert.as_deref(), Some("Channel not found"));
    }

    #[test]
    fn refresh_resets_prefix_fields_but_keeps_channel() {
        let mut state = UiState {
            channel: "lobby".into(),
            first: "+ ".into(),
            middle: "| ".into(),
            last: "` ".into(),
            ..UiState::default()
        };
        apply_event(
            &mut state,
            ActionEvent::ViewRefreshed {
                path: "/augmentation/lobby".into(),
            },
        );
        assert_eq!(state.channel, "lobby");
        assert!(state.first.is_empty() && state.middle.is_empty() && state.last.is_empty());
        assert_eq!(state.refreshes, 1);
    }

    #[test]
    fn outcome_events_land_in_status_and_log() {
        let mut state = UiState::default();
        apply_event(
            &mut state,
            ActionEvent::OutcomeReceived {
                kind: ActionKind::Remove,
                channel: "general".into(),
                outcome: Outcome::Success,
            },
        );
        assert_eq!(state.status, "remove general: Success");
        assert_eq!(state.log.len(), 1);
    }

    #[test]
    fn log_is_capped() {
        let mut state = UiState::default();
        for i in 0..(LOG_CAP + 50) {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.log.len(), LOG_CAP);
        assert_eq!(state.log.last().unwrap(), &format!("line {}", LOG_CAP + 49));
    }
}
