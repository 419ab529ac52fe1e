use anyhow::Result;
use async_trait::async_trait;

use super::types::{AlertRule, Kapacitor, RuleStatus, Source};

/// Operations the console needs from the Chronograf API.
///
/// `ChronografClient` is the production implementation; tests drive the
/// wizard and store through a recording fake.
#[async_trait]
pub trait KapacitorApi: Send + Sync {
    async fn get_sources(&self) -> Result<Vec<Source>>;

    async fn get_kapacitors(&self, source: &Source) -> Result<Vec<Kapacitor>>;

    async fn create_kapacitor(&self, source: &Source, kapacitor: &Kapacitor) -> Result<Kapacitor>;

    async fn update_kapacitor(&self, kapacitor: &Kapacitor) -> Result<Kapacitor>;

    async fn delete_kapacitor(&self, kapacitor: &Kapacitor) -> Result<()>;

    /// Connectivity probe through the Chronograf proxy
    async fn ping_kapacitor(&self, kapacitor: &Kapacitor) -> Result<()>;

    async fn get_rules(&self, kapacitor: &Kapacitor) -> Result<Vec<AlertRule>>;

    async fn delete_rule(&self, rule: &AlertRule) -> Result<()>;

    async fn update_rule_status(&self, rule: &AlertRule, status: RuleStatus) -> Result<AlertRule>;
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::sync::Mutex;

    /// One recorded API call
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        GetSources,
        GetKapacitors(String),
        Create(String),
        Update(String),
        Delete(String),
        Ping(String),
        GetRules(String),
        DeleteRule(String),
        UpdateRuleStatus(String, RuleStatus),
    }

    /// In-memory Chronograf that records every call
    #[derive(Debug, Default)]
    pub struct FakeApi {
        pub sources: Mutex<Vec<Source>>,
        pub rules: Mutex<Vec<AlertRule>>,
        pub calls: Mutex<Vec<Call>>,
        pub fail_create: bool,
        pub fail_update: bool,
        pub fail_ping: bool,
        pub fail_get_kapacitors: bool,
        next_id: Mutex<u32>,
    }

    impl FakeApi {
        pub fn with_source(source: Source) -> Self {
            Self {
                sources: Mutex::new(vec![source]),
                next_id: Mutex::new(100),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        /// Calls that mutate or probe, ignoring list refreshes
        pub fn mutating_calls(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| !matches!(c, Call::GetSources | Call::GetKapacitors(_)))
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl KapacitorApi for FakeApi {
        async fn get_sources(&self) -> Result<Vec<Source>> {
            self.record(Call::GetSources);
            Ok(self.sources.lock().unwrap().clone())
        }

        async fn get_kapacitors(&self, source: &Source) -> Result<Vec<Kapacitor>> {
            self.record(Call::GetKapacitors(source.id.clone()));
            if self.fail_get_kapacitors {
                anyhow::bail!("kapacitors unavailable");
            }
            let sources = self.sources.lock().unwrap();
            Ok(sources
                .iter()
                .find(|s| s.id == source.id)
                .map(|s| s.kapacitors.clone())
                .unwrap_or_default())
        }

        async fn create_kapacitor(
            &self,
            source: &Source,
            kapacitor: &Kapacitor,
        ) -> Result<Kapacitor> {
            self.record(Call::Create(kapacitor.name.clone()));
            if self.fail_create {
                anyhow::bail!("create refused");
            }
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let mut created = kapacitor.clone();
            created.id = Some(next_id.to_string());
            created.links.self_link = format!("/sources/{}/kapacitors/{}", source.id, next_id);
            let mut sources = self.sources.lock().unwrap();
            if let Some(s) = sources.iter_mut().find(|s| s.id == source.id) {
                s.kapacitors.push(created.clone());
            }
            Ok(created)
        }

        async fn update_kapacitor(&self, kapacitor: &Kapacitor) -> Result<Kapacitor> {
            let id = kapacitor.id.clone().unwrap_or_default();
            self.record(Call::Update(id.clone()));
            if self.fail_update {
                anyhow::bail!("update refused");
            }
            let mut sources = self.sources.lock().unwrap();
            for source in sources.iter_mut() {
                for existing in source.kapacitors.iter_mut() {
                    if existing.id.as_deref() == Some(id.as_str()) {
                        *existing = kapacitor.clone();
                    } else if kapacitor.active {
                        existing.active = false;
                    }
                }
            }
            Ok(kapacitor.clone())
        }

        async fn delete_kapacitor(&self, kapacitor: &Kapacitor) -> Result<()> {
            let id = kapacitor.id.clone().unwrap_or_default();
            self.record(Call::Delete(id.clone()));
            let mut sources = self.sources.lock().unwrap();
            for source in sources.iter_mut() {
                source.kapacitors.retain(|k| k.id.as_deref() != Some(id.as_str()));
            }
            Ok(())
        }

        async fn ping_kapacitor(&self, kapacitor: &Kapacitor) -> Result<()> {
            self.record(Call::Ping(kapacitor.id.clone().unwrap_or_default()));
            if self.fail_ping {
                anyhow::bail!("connection refused");
            }
            Ok(())
        }

        async fn get_rules(&self, kapacitor: &Kapacitor) -> Result<Vec<AlertRule>> {
            self.record(Call::GetRules(kapacitor.id.clone().unwrap_or_default()));
            Ok(self.rules.lock().unwrap().clone())
        }

        async fn delete_rule(&self, rule: &AlertRule) -> Result<()> {
            self.record(Call::DeleteRule(rule.id.clone()));
            self.rules.lock().unwrap().retain(|r| r.id != rule.id);
            Ok(())
        }

        async fn update_rule_status(
            &self,
            rule: &AlertRule,
            status: RuleStatus,
        ) -> Result<AlertRule> {
            self.record(Call::UpdateRuleStatus(rule.id.clone(), status));
            let mut updated = rule.clone();
            updated.status = status;
            Ok(updated)
        }
    }
}
