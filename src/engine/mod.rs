//! The form/action dispatcher.
//!
//! Every dispatch follows the same shape: build the payload, POST it,
//! decode the plaintext outcome, raise an alert event on failure, then
//! refresh the originating view. Transport errors propagate before any
//! alert or refresh happens; application failures still refresh.

mod api;

use crate::model::{Action, ActionEvent, ActionReport, Outcome, RunConfig};
use anyhow::Result;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct ActionEngine {
    cfg: RunConfig,
    api: api::ApiClient,
}

impl ActionEngine {
    pub fn new(cfg: RunConfig) -> Result<Self> {
        let api = api::ApiClient::new(&cfg)?;
        Ok(Self { cfg, api })
    }

    /// Dispatch one action and return its report. Events mirror what a
    /// user would see: dispatch, outcome, alert on failure, refresh.
    pub async fn run(
        &self,
        action: Action,
        event_tx: &mpsc::UnboundedSender<ActionEvent>,
    ) -> Result<ActionReport> {
        let kind = action.kind();
        let channel = action.channel().to_string();
        let _ = event_tx.send(ActionEvent::Dispatched {
            kind,
            channel: channel.clone(),
        });

        let outcome = match &action {
            Action::Augment { channel, prefix } => self.api.augment(channel, prefix).await?,
            Action::QuickAugment { channel } => self.api.quick_augment(channel).await?,
            Action::ChangePrefix { channel, prefix } => {
                self.api.change_prefix(channel, prefix).await?
            }
            Action::Abridge { channel } => self.api.abridge(channel).await?,
            Action::Remove { channel } => self.api.remove(channel).await?,
        };

        let _ = event_tx.send(ActionEvent::OutcomeReceived {
            kind,
            channel: channel.clone(),
            outcome: outcome.clone(),
        });
        if let Outcome::Failure(text) = &outcome {
            let _ = event_tx.send(ActionEvent::Alert { text: text.clone() });
        }

        // Refresh runs regardless of outcome, once the body is read.
        let view = action.view();
        self.api.reload_view(&view).await?;
        let _ = event_tx.send(ActionEvent::ViewRefreshed { path: view.path() });

        Ok(ActionReport {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            base_url: self.cfg.base_url.clone(),
            channel,
            action: kind,
            outcome,
        })
    }
}
