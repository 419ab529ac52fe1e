//! Kapacitor connection step of the source setup wizard.
//!
//! Holds the in-progress connection config and, on `next`, creates or
//! updates it and probes the resulting connection.

use url::Url;

use super::NextReturn;
use crate::app::notifications::{self, Notifications};
use crate::app::store::SourcesStore;
use crate::chronograf::{Kapacitor, KapacitorApi, Source};
use crate::ui::widgets::DropdownChild;

pub const ADD_NEW_KEY: &str = "__add_new__";
const DIVIDER_KEY: &str = "__divider__";

/// Editable fields of the connection form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Url,
    Name,
    Username,
    Password,
    InsecureSkipVerify,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Url,
        Field::Name,
        Field::Username,
        Field::Password,
        Field::InsecureSkipVerify,
    ];

    pub fn label(&self) -> &str {
        match self {
            Field::Url => "Kapacitor URL",
            Field::Name => "Name",
            Field::Username => "Username",
            Field::Password => "Password",
            Field::InsecureSkipVerify => "Unsafe SSL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

/// Entry of the Kapacitor dropdown
#[derive(Debug, Clone, PartialEq)]
pub enum KapacitorChoice {
    Existing(Kapacitor),
    AddNew,
}

#[derive(Debug, Clone)]
pub struct KapacitorStep {
    source: Source,
    on_boarding: bool,
    kapacitor: Kapacitor,
}

impl KapacitorStep {
    pub fn new(
        source: Source,
        store: &SourcesStore,
        kapacitor: Option<Kapacitor>,
        show_new_kapacitor: bool,
        on_boarding: bool,
    ) -> Self {
        let initial = if show_new_kapacitor {
            Kapacitor::default()
        } else {
            store
                .active_kapacitor(&source.id)
                .cloned()
                .or(kapacitor)
                .unwrap_or_default()
        };
        let kapacitor = sync_hostnames(&source, initial);

        Self {
            source,
            on_boarding,
            kapacitor,
        }
    }

    pub fn kapacitor(&self) -> &Kapacitor {
        &self.kapacitor
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn on_boarding(&self) -> bool {
        self.on_boarding
    }

    /// Single input handler for every form field
    pub fn change_input(&mut self, field: Field, value: FieldValue, set_error: impl FnOnce(bool)) {
        match (field, value) {
            (Field::Url, FieldValue::Text(v)) => self.kapacitor.url = v,
            (Field::Name, FieldValue::Text(v)) => self.kapacitor.name = v,
            (Field::Username, FieldValue::Text(v)) => self.kapacitor.username = v,
            (Field::Password, FieldValue::Text(v)) => self.kapacitor.password = v,
            (Field::InsecureSkipVerify, FieldValue::Bool(v)) => {
                self.kapacitor.insecure_skip_verify = v
            }
            (field, value) => {
                tracing::warn!(?field, ?value, "ignoring value of the wrong type");
                return;
            }
        }
        set_error(false);
    }

    pub fn text_value(&self, field: Field) -> FieldValue {
        match field {
            Field::Url => FieldValue::Text(self.kapacitor.url.clone()),
            Field::Name => FieldValue::Text(self.kapacitor.name.clone()),
            Field::Username => FieldValue::Text(self.kapacitor.username.clone()),
            Field::Password => FieldValue::Text(self.kapacitor.password.clone()),
            Field::InsecureSkipVerify => FieldValue::Bool(self.kapacitor.insecure_skip_verify),
        }
    }

    /// Create or update the config, then probe it
    pub async fn next(
        &mut self,
        api: &dyn KapacitorApi,
        store: &mut SourcesStore,
        notifications: &mut Notifications,
    ) -> NextReturn {
        if self.kapacitor.exists() {
            if !self.existing_kapacitor_has_changed(store) {
                return NextReturn::success(self.kapacitor.clone());
            }

            return match self.update(api, store).await {
                Ok(updated) => {
                    notifications.notify(notifications::kapacitor_updated());
                    self.kapacitor = updated.clone();
                    NextReturn::success(updated)
                }
                Err(err) => {
                    tracing::error!(error = %format!("{:#}", err), "failed to update Kapacitor");
                    notifications.notify(notifications::could_not_connect_to_updated_kapacitor(
                        &self.kapacitor.name,
                    ));
                    NextReturn::failure()
                }
            };
        }

        match self.create(api, store).await {
            Ok(created) => {
                self.kapacitor = created.clone();
                notifications.notify(notifications::kapacitor_success());
                NextReturn::success(created)
            }
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "failed to create Kapacitor");
                notifications.notify(notifications::could_not_connect_to_kapacitor(
                    &self.kapacitor.name,
                ));
                NextReturn::failure()
            }
        }
    }

    async fn update(
        &self,
        api: &dyn KapacitorApi,
        store: &mut SourcesStore,
    ) -> anyhow::Result<Kapacitor> {
        let updated = api.update_kapacitor(&self.kapacitor).await?;
        self.fetch_new_kapacitors(api, store).await;
        api.ping_kapacitor(&updated).await?;
        Ok(updated)
    }

    async fn create(
        &self,
        api: &dyn KapacitorApi,
        store: &mut SourcesStore,
    ) -> anyhow::Result<Kapacitor> {
        let created = api.create_kapacitor(&self.source, &self.kapacitor).await?;
        self.fetch_new_kapacitors(api, store).await;
        api.ping_kapacitor(&created).await?;
        Ok(created)
    }

    /// Refresh the store's list; a failed refresh does not abort the step
    async fn fetch_new_kapacitors(&self, api: &dyn KapacitorApi, store: &mut SourcesStore) {
        if let Err(err) = store.fetch_kapacitors(api, &self.source.id).await {
            tracing::warn!(error = %format!("{:#}", err), "failed to refresh Kapacitors");
        }
    }

    fn existing_kapacitor_has_changed(&self, store: &SourcesStore) -> bool {
        store.active_kapacitor(&self.source.id) != Some(&self.kapacitor)
    }

    pub async fn set_active_kapacitor(
        &mut self,
        kapacitor: Kapacitor,
        api: &dyn KapacitorApi,
        store: &mut SourcesStore,
        notifications: &mut Notifications,
    ) {
        match store.set_active_kapacitor(api, &kapacitor).await {
            Ok(updated) => {
                notifications.notify(notifications::kapacitor_activated(&updated.name));
                self.kapacitor = updated;
            }
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "failed to activate Kapacitor");
                notifications.notify(notifications::could_not_connect_to_kapacitor(
                    &kapacitor.name,
                ));
                self.kapacitor = kapacitor;
            }
        }
    }

    pub async fn delete_kapacitor(
        &mut self,
        kapacitor: &Kapacitor,
        api: &dyn KapacitorApi,
        store: &mut SourcesStore,
        notifications: &mut Notifications,
    ) {
        match store.delete_kapacitor(api, kapacitor).await {
            Ok(()) => {
                notifications.notify(notifications::kapacitor_deleted(&kapacitor.name));
                if self.kapacitor.id == kapacitor.id {
                    self.reset_default();
                }
            }
            Err(err) => {
                notifications.notify(notifications::load_failed("Kapacitor deletion", &err));
            }
        }
    }

    /// Start over with a fresh config ("add new")
    pub fn reset_default(&mut self) {
        self.kapacitor = Kapacitor::default();
    }

    /// Dropdown entries: the source's Kapacitors, a divider and "add new"
    pub fn dropdown_children(&self, store: &SourcesStore) -> Vec<DropdownChild<KapacitorChoice>> {
        let mut children: Vec<_> = store
            .source(&self.source.id)
            .map(|s| s.kapacitors.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|k| {
                let id = k.id.clone()?;
                let label = if k.active {
                    format!("{} (active)", k.name)
                } else {
                    k.name.clone()
                };
                Some(DropdownChild::item(id, KapacitorChoice::Existing(k.clone()), label))
            })
            .collect();

        if !children.is_empty() {
            children.push(DropdownChild::divider(DIVIDER_KEY));
        }
        let add_label = match self.display_value() {
            Some(name) => format!("{} (new)", name),
            None => "Add new Kapacitor".to_string(),
        };
        children.push(DropdownChild::item(
            ADD_NEW_KEY,
            KapacitorChoice::AddNew,
            add_label,
        ));
        children
    }

    /// Key of the dropdown entry matching the config being edited
    pub fn dropdown_selected_key(&self) -> String {
        match &self.kapacitor.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => ADD_NEW_KEY.to_string(),
        }
    }

    /// Name shown on the dropdown while editing an unsaved config
    pub fn display_value(&self) -> Option<&str> {
        if self.kapacitor.exists() {
            None
        } else {
            Some(&self.kapacitor.name)
        }
    }
}

/// Point the Kapacitor URL at the source's host when both URLs parse
pub fn sync_hostnames(source: &Source, kapacitor: Kapacitor) -> Kapacitor {
    if source.url.is_empty() {
        return kapacitor;
    }
    let (Ok(source_url), Ok(mut kapacitor_url)) =
        (Url::parse(&source.url), Url::parse(&kapacitor.url))
    else {
        return kapacitor;
    };
    let Some(hostname) = source_url.host_str().filter(|h| !h.is_empty()) else {
        return kapacitor;
    };
    if kapacitor_url.set_host(Some(hostname)).is_err() {
        return kapacitor;
    }

    Kapacitor {
        url: kapacitor_url.to_string(),
        ..kapacitor
    }
}
