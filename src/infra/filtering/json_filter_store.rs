use crate::core::filtering::{FilterError, FilterRule, FilterStore};
use async_trait::async_trait;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

/// JSON-file filter store. The file holds an array of filter records in
/// creation order:
/// [{ "id": ..., "action": "BAN" | null, "pingStaff": bool, "match": ..., "matchType": ... }]
pub struct JsonFilterStore {
    path: PathBuf,
    cache: RwLock<Vec<FilterRule>>,
}

impl JsonFilterStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, FilterError> {
        let path = path.into();
        let rules: Vec<FilterRule> = if path.exists() {
            let file = File::open(&path).map_err(|e| FilterError::Storage(e.to_string()))?;
            serde_json::from_reader(BufReader::new(file))
                .map_err(|e| FilterError::Storage(e.to_string()))?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(rules),
        })
    }

    fn persist(&self, rules: &[FilterRule]) -> Result<(), FilterError> {
        let file = File::create(&self.path).map_err(|e| FilterError::Storage(e.to_string()))?;
        serde_json::to_writer_pretty(file, rules)
            .map_err(|e| FilterError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl FilterStore for JsonFilterStore {
    async fn get_all(&self) -> Result<Vec<FilterRule>, FilterError> {
        Ok(self.cache.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<FilterRule>, FilterError> {
        let cache = self.cache.read().await;
        Ok(cache.iter().find(|rule| rule.id == id).cloned())
    }

    // Writes go to disk first; memory only changes once the file has them.
    async fn set(&self, rule: &FilterRule) -> Result<(), FilterError> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        match next.iter_mut().find(|existing| existing.id == rule.id) {
            Some(existing) => *existing = rule.clone(),
            None => next.push(rule.clone()),
        }
        self.persist(&next)?;
        *cache = next;
        Ok(())
    }

    async fn remove(&self, rule: &FilterRule) -> Result<(), FilterError> {
        let mut cache = self.cache.write().await;
        let next: Vec<FilterRule> = cache
            .iter()
            .filter(|existing| existing.id != rule.id)
            .cloned()
            .collect();
        self.persist(&next)?;
        *cache = next;
        Ok(())
    }
}
