use serde::{Deserialize, Serialize};

/// Default glyphs used when a channel is augmented without an explicit
/// prefix set. These match what the service renders for a fresh tree.
pub const DEFAULT_FIRST_PREFIX: &str = "╓─ ";
pub const DEFAULT_MIDDLE_PREFIX: &str = "╟─ ";
pub const DEFAULT_LAST_PREFIX: &str = "╙─ ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub base_url: String,
    pub user_agent: String,
}

/// The three tree-glyph prefixes of an augmentation. Field order is the
/// wire order of the JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixSet {
    pub first: String,
    pub middle: String,
    pub last: String,
}

impl PrefixSet {
    pub fn new(first: impl Into<String>, middle: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            middle: middle.into(),
            last: last.into(),
        }
    }

    /// The glyph set posted by the direct augment shape.
    pub fn default_glyphs() -> Self {
        Self::new(
            DEFAULT_FIRST_PREFIX,
            DEFAULT_MIDDLE_PREFIX,
            DEFAULT_LAST_PREFIX,
        )
    }
}

/// One user-triggered action against the augmentation service.
///
/// `Augment` and `QuickAugment` are two entry points of the same
/// capability but address different server routes (singular vs plural
/// path segment), so they stay distinct variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Action {
    /// Augment with prefixes taken from the form fields.
    Augment { channel: String, prefix: PrefixSet },
    /// Augment with the default glyphs via the channel-list route.
    QuickAugment { channel: String },
    ChangePrefix { channel: String, prefix: PrefixSet },
    Abridge { channel: String },
    /// Remove the augmentation entirely via the channel-list route.
    Remove { channel: String },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Augment { .. } => ActionKind::Augment,
            Action::QuickAugment { .. } => ActionKind::QuickAugment,
            Action::ChangePrefix { .. } => ActionKind::ChangePrefix,
            Action::Abridge { .. } => ActionKind::Abridge,
            Action::Remove { .. } => ActionKind::Remove,
        }
    }

    pub fn channel(&self) -> &str {
        match self {
            Action::Augment { channel, .. }
            | Action::QuickAugment { channel }
            | Action::ChangePrefix { channel, .. }
            | Action::Abridge { channel }
            | Action::Remove { channel } => channel,
        }
    }

    /// The page this action was triggered from, refreshed after the
    /// response body is read. Form-route actions live on the
    /// augmentation page, channel-list-route actions on the tree page.
    pub fn view(&self) -> ViewTarget {
        match self {
            Action::Augment { channel, .. }
            | Action::ChangePrefix { channel, .. }
            | Action::Abridge { channel } => ViewTarget::Augmentation(channel.clone()),
            Action::QuickAugment { .. } | Action::Remove { .. } => ViewTarget::Tree,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Augment,
    QuickAugment,
    ChangePrefix,
    Abridge,
    Remove,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Augment => "augment",
            ActionKind::QuickAugment => "quick-augment",
            ActionKind::ChangePrefix => "change-prefix",
            ActionKind::Abridge => "abridge",
            ActionKind::Remove => "remove",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body text the service sends when an action succeeded. Anything else
/// is a failure message meant for the user, verbatim.
pub const SUCCESS_BODY: &str = "Success";

/// Decoded plaintext response of an action endpoint. HTTP status codes
/// are never inspected; only the body text matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn from_body(body: &str) -> Self {
        if body == SUCCESS_BODY {
            Outcome::Success
        } else {
            Outcome::Failure(body.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// The page a dispatch refreshes once its response body has been read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewTarget {
    Augmentation(String),
    Tree,
}

impl ViewTarget {
    pub fn path(&self) -> String {
        match self {
            ViewTarget::Augmentation(channel) => format!("/augmentation/{}", channel),
            ViewTarget::Tree => "/".to_string(),
        }
    }
}

/// Events emitted by the dispatcher and consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionEvent {
    Dispatched {
        kind: ActionKind,
        channel: String,
    },
    OutcomeReceived {
        kind: ActionKind,
        channel: String,
        outcome: Outcome,
    },
    /// Failure text to show the user, blocking in the TUI.
    Alert {
        text: String,
    },
    ViewRefreshed {
        path: String,
    },
}

/// Result record of one dispatched action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReport {
    #[serde(default)]
    pub timestamp_utc: String,
    pub base_url: String,
    pub channel: String,
    pub action: ActionKind,
    pub outcome: Outcome,
}

/// Form action a named submit control maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRoute {
    Update,
    Abridge,
}

/// Route a combined update-form submission by the name of the control
/// that triggered it. Unknown or missing names are a silent no-op.
pub fn route_submit(name: &str) -> Option<SubmitRoute> {
    match name {
        "update" => Some(SubmitRoute::Update),
        "abridge" => Some(SubmitRoute::Abridge),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_decodes_success_body_exactly() {
        assert_eq!(Outcome::from_body("Success"), Outcome::Success);
        assert_eq!(
            Outcome::from_body("Channel not found"),
            Outcome::Failure("Channel not found".into())
        );
        // Case and whitespace both matter.
        assert_eq!(
            Outcome::from_body("success"),
            Outcome::Failure("success".into())
        );
        assert_eq!(
            Outcome::from_body("Success\n"),
            Outcome::Failure("Success\n".into())
        );
        assert_eq!(Outcome::from_body(""), Outcome::Failure(String::new()));
    }

    #[test]
    fn prefix_set_serializes_in_wire_order() {
        let p = PrefixSet::new("a", "b", "c");
        assert_eq!(
            serde_json::to_string(&p).unwrap(),
            r#"{"first":"a","middle":"b","last":"c"}"#
        );
    }

    #[test]
    fn default_glyph_payload_matches_service_defaults() {
        assert_eq!(
            serde_json::to_string(&PrefixSet::default_glyphs()).unwrap(),
            r#"{"first":"╓─ ","middle":"╟─ ","last":"╙─ "}"#
        );
    }

    #[test]
    fn empty_fields_serialize_as_empty_strings() {
        let p = PrefixSet::new("", "", "");
        assert_eq!(
            serde_json::to_string(&p).unwrap(),
            r#"{"first":"","middle":"","last":""}"#
        );
    }

    #[test]
    fn submit_routing_by_control_name() {
        assert_eq!(route_submit("update"), Some(SubmitRoute::Update));
        assert_eq!(route_submit("abridge"), Some(SubmitRoute::Abridge));
        assert_eq!(route_submit("delete"), None);
        assert_eq!(route_submit(""), None);
        assert_eq!(route_submit("Update"), None);
    }

    #[test]
    fn action_views_follow_route_family() {
        let form = Action::Augment {
            channel: "lobby".into(),
            prefix: PrefixSet::default_glyphs(),
        };
        assert_eq!(form.view().path(), "/augmentation/lobby");

        let direct = Action::QuickAugment {
            channel: "lobby".into(),
        };
        assert_eq!(direct.view().path(), "/");

        let remove = Action::Remove {
            channel: "general".into(),
        };
        assert_eq!(remove.view().path(), "/");
    }
}
