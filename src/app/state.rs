use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Local};

use super::notifications::{self, Notifications};
use super::store::SourcesStore;
use crate::chronograf::{AlertRule, Kapacitor, KapacitorApi, RuleStatus, Source};
use crate::wizard::{KapacitorChoice, KapacitorStep, NextReturn};

/// Current page
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Page {
    Rules,
    Kapacitor,
}

/// Global application state
pub struct AppState {
    pub api: Box<dyn KapacitorApi>,
    pub store: SourcesStore,
    pub notifications: Notifications,
    pub current_page: Page,
    /// Source the console works against; resolved on refresh when unset
    pub source_id: Option<String>,
    pub rules: Vec<AlertRule>,
    pub rules_loading: bool,
    pub step: Option<KapacitorStep>,
    /// Error flag of the wizard, cleared by any input change
    pub wizard_error: bool,
    pub show_new_kapacitor: bool,
    pub on_boarding: bool,
    /// Last refresh attempt, drives the auto refresh interval
    pub last_update: Instant,
    /// Wall clock time of the last successful refresh
    pub refreshed_at: Option<DateTime<Local>>,
}

impl AppState {
    pub fn new(api: Box<dyn KapacitorApi>, source_id: Option<String>) -> Self {
        Self {
            api,
            store: SourcesStore::default(),
            notifications: Notifications::new(),
            current_page: Page::Rules,
            source_id,
            rules: Vec::new(),
            rules_loading: true,
            step: None,
            wizard_error: false,
            show_new_kapacitor: false,
            on_boarding: false,
            last_update: Instant::now(),
            refreshed_at: None,
        }
    }

    pub fn current_source(&self) -> Option<&Source> {
        self.store.source(self.source_id.as_deref()?)
    }

    pub fn active_kapacitor(&self) -> Option<&Kapacitor> {
        self.store.active_kapacitor(self.source_id.as_deref()?)
    }

    pub fn has_kapacitor(&self) -> bool {
        self.active_kapacitor().is_some()
    }

    /// Reload sources, Kapacitors and rules
    pub async fn refresh(&mut self) -> Result<()> {
        self.last_update = Instant::now();
        self.store.fetch_sources(self.api.as_ref()).await?;

        let known = self
            .source_id
            .as_deref()
            .is_some_and(|id| self.store.source(id).is_some());
        if !known {
            let sources = self.store.sources();
            self.source_id = sources
                .iter()
                .find(|s| s.default)
                .or_else(|| sources.first())
                .map(|s| s.id.clone());
        }

        let Some(source_id) = self.source_id.clone() else {
            anyhow::bail!("Chronograf has no sources configured");
        };
        self.store
            .fetch_kapacitors(self.api.as_ref(), &source_id)
            .await?;

        if self.step.is_none() {
            self.open_wizard();
        }

        self.load_rules().await;
        self.refreshed_at = Some(Local::now());
        Ok(())
    }

    /// (Re)create the wizard step for the current source
    pub fn open_wizard(&mut self) {
        let Some(source) = self.current_source().cloned() else {
            return;
        };
        self.step = Some(KapacitorStep::new(
            source,
            &self.store,
            None,
            self.show_new_kapacitor,
            self.on_boarding,
        ));
        self.wizard_error = false;
    }

    pub async fn load_rules(&mut self) {
        let Some(kapacitor) = self.active_kapacitor().cloned() else {
            self.rules.clear();
            self.rules_loading = false;
            return;
        };

        self.rules_loading = true;
        match self.api.get_rules(&kapacitor).await {
            Ok(rules) => self.rules = rules,
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "failed to load rules");
                self.notifications
                    .notify(notifications::load_failed("alert rules", &err));
            }
        }
        self.rules_loading = false;
    }

    pub async fn delete_rule(&mut self, rule: &AlertRule) {
        match self.api.delete_rule(rule).await {
            Ok(()) => {
                self.rules.retain(|r| r.id != rule.id);
                self.notifications
                    .notify(notifications::rule_deleted(&rule.name));
            }
            Err(err) => {
                tracing::error!(rule = %rule.id, error = %format!("{:#}", err), "failed to delete rule");
                self.notifications
                    .notify(notifications::rule_not_deleted(&rule.name));
            }
        }
    }

    pub async fn change_rule_status(&mut self, rule: &AlertRule, status: RuleStatus) {
        match self.api.update_rule_status(rule, status).await {
            Ok(updated) => {
                if let Some(existing) = self.rules.iter_mut().find(|r| r.id == rule.id) {
                    existing.status = updated.status;
                }
                self.notifications
                    .notify(notifications::rule_status_updated(&rule.name, status.as_str()));
            }
            Err(err) => {
                tracing::error!(rule = %rule.id, error = %format!("{:#}", err), "failed to change rule status");
                self.notifications
                    .notify(notifications::rule_status_not_updated(&rule.name, status.as_str()));
            }
        }
    }

    /// Advance the Kapacitor wizard step
    pub async fn wizard_next(&mut self) -> Option<NextReturn> {
        let step = self.step.as_mut()?;
        let result = step
            .next(self.api.as_ref(), &mut self.store, &mut self.notifications)
            .await;

        self.wizard_error = result.error;
        if !result.error {
            self.load_rules().await;
        }
        Some(result)
    }

    pub async fn wizard_choose(&mut self, choice: KapacitorChoice) {
        let Some(step) = self.step.as_mut() else {
            return;
        };
        match choice {
            KapacitorChoice::Existing(kapacitor) => {
                step.set_active_kapacitor(
                    kapacitor,
                    self.api.as_ref(),
                    &mut self.store,
                    &mut self.notifications,
                )
                .await;
                self.load_rules().await;
            }
            KapacitorChoice::AddNew => step.reset_default(),
        }
    }

    pub async fn wizard_delete(&mut self, kapacitor: &Kapacitor) {
        let Some(step) = self.step.as_mut() else {
            return;
        };
        step.delete_kapacitor(
            kapacitor,
            self.api.as_ref(),
            &mut self.store,
            &mut self.notifications,
        )
        .await;
        self.load_rules().await;
    }
}
