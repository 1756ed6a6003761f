//! Work log service, bucketed by day.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::document::{DateBucket, DocumentResult, ModuleStorage};
use crate::module::StorageModule;
use crate::provision::StorageRoot;

use super::event::EventInfo;

/// Reads and writes the daily work log
#[derive(Debug, Clone)]
pub struct WorkCenterService {
    storage: ModuleStorage,
}

impl StorageModule for WorkCenterService {
    const IDENTITY: &'static str = "toolboxes.workcenter.service.WorkCenterServiceImpl";
}

impl WorkCenterService {
    /// Service over this module's provisioned directory under `root`
    pub fn new(root: &StorageRoot) -> Self {
        Self::with_storage(ModuleStorage::for_module::<Self>(root))
    }

    pub fn with_storage(storage: ModuleStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &ModuleStorage {
        &self.storage
    }

    /// All events of `date`, oldest first
    pub fn list_events_by_date(&self, date: NaiveDate) -> DocumentResult<Vec<EventInfo>> {
        let bucket = DateBucket::new(date);
        info!(bucket = %bucket, "listing work log");

        let mut events: Vec<EventInfo> = self.storage.bucket(bucket).list_all()?;
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    /// Number of events recorded for `date`
    pub fn count_events_by_date(&self, date: NaiveDate) -> DocumentResult<usize> {
        let bucket = DateBucket::new(date);
        info!(bucket = %bucket, "counting work log");
        self.storage.bucket(bucket).count()
    }

    /// Stores `event` in the bucket of its date
    pub fn add_event(&self, event: EventInfo) -> DocumentResult<EventInfo> {
        let bucket = DateBucket::new(event.date);
        let path = self
            .storage
            .bucket(bucket)
            .insert(&event.document_id(), &event)?;
        debug!(id = %event.id, path = %path.display(), "work log entry written");
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentError;
    use crate::module::resolve;
    use std::fs;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_identity_resolves_to_module_path() {
        assert_eq!(
            resolve(WorkCenterService::IDENTITY).as_str(),
            "/toolboxes/workcenter/service/workcenter/"
        );
    }

    #[test]
    fn test_add_then_list() {
        let temp = TempDir::new().unwrap();
        let service = WorkCenterService::new(&StorageRoot::new(temp.path()));

        let first = service.add_event(EventInfo::new("a", "", day(1))).unwrap();
        service.add_event(EventInfo::new("b", "", day(1))).unwrap();
        service.add_event(EventInfo::new("c", "", day(2))).unwrap();

        let events = service.list_events_by_date(day(1)).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.contains(&first));
        assert_eq!(service.count_events_by_date(day(1)).unwrap(), 2);
        assert_eq!(service.count_events_by_date(day(2)).unwrap(), 1);

        let file = temp
            .path()
            .join("toolboxes/workcenter/service/workcenter/20240301")
            .join(format!("{}.json", first.id));
        assert!(file.is_file());
    }

    #[test]
    fn test_empty_day() {
        let temp = TempDir::new().unwrap();
        let service = WorkCenterService::new(&StorageRoot::new(temp.path()));

        assert!(service.list_events_by_date(day(9)).unwrap().is_empty());
        assert_eq!(service.count_events_by_date(day(9)).unwrap(), 0);
    }

    #[test]
    fn test_corrupt_entry_fails_day_listing() {
        let temp = TempDir::new().unwrap();
        let service = WorkCenterService::new(&StorageRoot::new(temp.path()));
        service.add_event(EventInfo::new("a", "", day(1))).unwrap();
        let bucket = service.storage().dir().join("20240301");
        fs::write(bucket.join("broken.json"), b"{").unwrap();

        assert!(matches!(
            service.list_events_by_date(day(1)),
            Err(DocumentError::Decode { .. })
        ));
        assert!(service.list_events_by_date(day(2)).unwrap().is_empty());
    }
}
