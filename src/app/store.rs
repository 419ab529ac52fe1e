use anyhow::{Context, Result};

use crate::chronograf::{Kapacitor, KapacitorApi, Source};

/// Shared sources/Kapacitors state
///
/// List access is synchronous; fetches and mutations go through the API and
/// then update the cached list.
#[derive(Debug, Default, Clone)]
pub struct SourcesStore {
    sources: Vec<Source>,
}

impl SourcesStore {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// The Kapacitor flagged active for a source
    pub fn active_kapacitor(&self, source_id: &str) -> Option<&Kapacitor> {
        self.source(source_id)?.kapacitors.iter().find(|k| k.active)
    }

    /// Replace the source list, keeping Kapacitors already fetched
    pub async fn fetch_sources(&mut self, api: &dyn KapacitorApi) -> Result<()> {
        let mut sources = api.get_sources().await.context("Failed to fetch sources")?;
        for source in sources.iter_mut() {
            if let Some(known) = self.source(&source.id) {
                source.kapacitors = known.kapacitors.clone();
            }
        }
        self.sources = sources;
        Ok(())
    }

    pub async fn fetch_kapacitors(&mut self, api: &dyn KapacitorApi, source_id: &str) -> Result<()> {
        let source = self
            .source(source_id)
            .ok_or_else(|| anyhow::anyhow!("Source '{}' not found", source_id))?
            .clone();
        let kapacitors = api
            .get_kapacitors(&source)
            .await
            .with_context(|| format!("Failed to fetch Kapacitors for {}", source.name))?;

        if let Some(source) = self.sources.iter_mut().find(|s| s.id == source_id) {
            source.kapacitors = kapacitors;
        }
        Ok(())
    }

    pub async fn delete_kapacitor(&mut self, api: &dyn KapacitorApi, kapacitor: &Kapacitor) -> Result<()> {
        api.delete_kapacitor(kapacitor).await?;
        for source in self.sources.iter_mut() {
            source.kapacitors.retain(|k| k.id != kapacitor.id);
        }
        Ok(())
    }

    /// Mark `kapacitor` active, clearing the flag on its siblings
    pub async fn set_active_kapacitor(
        &mut self,
        api: &dyn KapacitorApi,
        kapacitor: &Kapacitor,
    ) -> Result<Kapacitor> {
        let mut request = kapacitor.clone();
        request.active = true;
        let updated = api.update_kapacitor(&request).await?;

        for source in self.sources.iter_mut() {
            if !source.kapacitors.iter().any(|k| k.id == updated.id) {
                continue;
            }
            for k in source.kapacitors.iter_mut() {
                if k.id == updated.id {
                    *k = updated.clone();
                } else {
                    k.active = false;
                }
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chronograf::api::fake::{Call, FakeApi};

    fn kapacitor(id: &str, active: bool) -> Kapacitor {
        Kapacitor {
            id: Some(id.to_string()),
            name: format!("kapa-{}", id),
            active,
            ..Default::default()
        }
    }

    fn source() -> Source {
        Source {
            id: "1".to_string(),
            name: "influx".to_string(),
            url: "http://influx:8086".to_string(),
            kapacitors: vec![kapacitor("a", true), kapacitor("b", false)],
            ..Default::default()
        }
    }

    #[test]
    fn test_active_kapacitor() {
        let store = SourcesStore::new(vec![source()]);
        assert_eq!(
            store.active_kapacitor("1").and_then(|k| k.id.as_deref()),
            Some("a")
        );
        assert!(store.active_kapacitor("missing").is_none());
    }

    #[tokio::test]
    async fn test_set_active_keeps_single_active() {
        let api = FakeApi::with_source(source());
        let mut store = SourcesStore::new(vec![source()]);

        store
            .set_active_kapacitor(&api, &kapacitor("b", false))
            .await
            .unwrap();

        let active: Vec<_> = store.sources()[0]
            .kapacitors
            .iter()
            .filter(|k| k.active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_delete_kapacitor_removes_from_list() {
        let api = FakeApi::with_source(source());
        let mut store = SourcesStore::new(vec![source()]);

        store.delete_kapacitor(&api, &kapacitor("a", true)).await.unwrap();

        assert_eq!(store.sources()[0].kapacitors.len(), 1);
        assert!(store.active_kapacitor("1").is_none());
        assert_eq!(api.calls(), vec![Call::Delete("a".to_string())]);
    }

    #[tokio::test]
    async fn test_fetch_sources_keeps_known_kapacitors() {
        let mut bare = source();
        bare.kapacitors.clear();
        let api = FakeApi::with_source(bare);
        let mut store = SourcesStore::new(vec![source()]);

        store.fetch_sources(&api).await.unwrap();

        assert_eq!(store.sources()[0].kapacitors.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_kapacitors_unknown_source() {
        let api = FakeApi::with_source(source());
        let mut store = SourcesStore::default();

        assert!(store.fetch_kapacitors(&api, "1").await.is_err());
        assert!(api.calls().is_empty());
    }
}
