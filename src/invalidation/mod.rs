//! Invalidation coordinator: which confirmed mutations make a dependent aggregate stale.
//!
//! Rules are data. Each names the resource and mutation kind it watches, a predicate over
//! the mutation, and the aggregate to refetch. New rules go in [`default_rules`], not at
//! call sites.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::store::{DashboardRefresh, ResourceKey, ResourceStore};

/// Kind of confirmed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// A server-confirmed mutation as seen by the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationEvent {
    pub resource: ResourceKey,
    pub kind: MutationKind,
    /// Scheduled date of the entity. For deletes this is the date stored before deletion.
    pub date: Option<NaiveDate>,
    /// Wire names of the patched fields (updates only).
    pub fields: Vec<&'static str>,
}

impl MutationEvent {
    pub fn created(resource: ResourceKey, date: Option<NaiveDate>) -> Self {
        Self {
            resource,
            kind: MutationKind::Create,
            date,
            fields: Vec::new(),
        }
    }

    pub fn updated(resource: ResourceKey, date: Option<NaiveDate>, fields: Vec<&'static str>) -> Self {
        Self {
            resource,
            kind: MutationKind::Update,
            date,
            fields,
        }
    }

    pub fn deleted(resource: ResourceKey, date: Option<NaiveDate>) -> Self {
        Self {
            resource,
            kind: MutationKind::Delete,
            date,
            fields: Vec::new(),
        }
    }

    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.date == Some(day)
    }

    pub fn touches(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}

/// Derived views that can be invalidated by mutations elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Dashboard,
}

/// `(resource, kind, predicate) -> aggregate`
#[derive(Clone)]
pub struct InvalidationRule {
    pub name: &'static str,
    pub resource: ResourceKey,
    pub kind: MutationKind,
    /// Called with the mutation and today's date.
    pub predicate: fn(&MutationEvent, NaiveDate) -> bool,
    pub refetch: Aggregate,
}

impl std::fmt::Debug for InvalidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationRule")
            .field("name", &self.name)
            .field("resource", &self.resource)
            .field("kind", &self.kind)
            .field("refetch", &self.refetch)
            .finish()
    }
}

impl InvalidationRule {
    pub fn matches(&self, event: &MutationEvent, today: NaiveDate) -> bool {
        self.resource == event.resource && self.kind == event.kind && (self.predicate)(event, today)
    }
}

/// The dashboard shows today's events and XP/level, so it goes stale when today's agenda
/// changes or any completion flag flips.
pub fn default_rules() -> Vec<InvalidationRule> {
    vec![
        InvalidationRule {
            name: "study-event-created-today",
            resource: ResourceKey::StudyEvents,
            kind: MutationKind::Create,
            predicate: |event, today| event.is_on(today),
            refetch: Aggregate::Dashboard,
        },
        InvalidationRule {
            name: "study-event-completion-changed",
            resource: ResourceKey::StudyEvents,
            kind: MutationKind::Update,
            predicate: |event, _| event.touches("isCompleted"),
            refetch: Aggregate::Dashboard,
        },
        InvalidationRule {
            name: "study-event-deleted-today",
            resource: ResourceKey::StudyEvents,
            kind: MutationKind::Delete,
            predicate: |event, today| event.is_on(today),
            refetch: Aggregate::Dashboard,
        },
    ]
}

/// Evaluates the rule table and refetches what it names.
pub struct InvalidationCoordinator {
    rules: Vec<InvalidationRule>,
    clock: Arc<dyn Clock>,
}

impl InvalidationCoordinator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_rules(clock, default_rules())
    }

    pub fn with_rules(clock: Arc<dyn Clock>, rules: Vec<InvalidationRule>) -> Self {
        Self { rules, clock }
    }

    pub fn rules(&self) -> &[InvalidationRule] {
        &self.rules
    }

    /// Aggregates made stale by a group of mutations, each listed once.
    pub fn targets(&self, events: &[MutationEvent]) -> Vec<Aggregate> {
        let today = self.clock.today();
        let mut targets = Vec::new();
        for event in events {
            for rule in self.rules.iter().filter(|rule| rule.matches(event, today)) {
                tracing::debug!(rule = rule.name, resource = %event.resource, "Invalidation rule matched");
                if !targets.contains(&rule.refetch) {
                    targets.push(rule.refetch);
                }
            }
        }
        targets
    }

    /// Refetch every aggregate invalidated by `events`. Returns the aggregates refetched.
    pub async fn after_mutations(&self, store: &ResourceStore, events: &[MutationEvent]) -> Vec<Aggregate> {
        let targets = self.targets(events);
        for target in &targets {
            match target {
                Aggregate::Dashboard => {
                    tracing::info!("Refetching dashboard after study event change");
                    if let DashboardRefresh::Failed(err) = store.fetch_dashboard().await {
                        tracing::debug!("Dashboard refetch after mutation failed: {}", err);
                    }
                }
            }
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn coordinator() -> InvalidationCoordinator {
        InvalidationCoordinator::new(Arc::new(FixedClock(today())))
    }

    fn days_from_today(days: i64) -> Option<NaiveDate> {
        Some(today() + chrono::Duration::days(days))
    }

    #[test]
    fn test_create_today_invalidates_dashboard() {
        let coordinator = coordinator();
        let events = ResourceKey::StudyEvents;

        assert_eq!(
            coordinator.targets(&[MutationEvent::created(events, days_from_today(0))]),
            vec![Aggregate::Dashboard]
        );
        assert!(coordinator
            .targets(&[MutationEvent::created(events, days_from_today(1))])
            .is_empty());
    }

    #[test]
    fn test_completion_patch_invalidates_regardless_of_date() {
        let coordinator = coordinator();
        let events = ResourceKey::StudyEvents;

        assert_eq!(
            coordinator.targets(&[MutationEvent::updated(events, days_from_today(-1), vec!["isCompleted"])]),
            vec![Aggregate::Dashboard]
        );
        assert!(coordinator
            .targets(&[MutationEvent::updated(events, days_from_today(0), vec!["notes"])])
            .is_empty());
    }

    #[test]
    fn test_delete_checks_stored_date() {
        let coordinator = coordinator();
        let events = ResourceKey::StudyEvents;

        assert_eq!(
            coordinator.targets(&[MutationEvent::deleted(events, days_from_today(0))]),
            vec![Aggregate::Dashboard]
        );
        assert!(coordinator
            .targets(&[MutationEvent::deleted(events, days_from_today(7))])
            .is_empty());
        assert!(coordinator
            .targets(&[MutationEvent::deleted(events, None)])
            .is_empty());
    }

    #[test]
    fn test_other_resources_never_invalidate() {
        let coordinator = coordinator();
        let mutations = [
            MutationEvent::created(ResourceKey::Documents, days_from_today(0)),
            MutationEvent::updated(ResourceKey::Videos, None, vec!["isCompleted"]),
            MutationEvent::deleted(ResourceKey::ForumPosts, days_from_today(0)),
        ];
        assert!(coordinator.targets(&mutations).is_empty());
    }

    #[test]
    fn test_targets_are_deduplicated() {
        let coordinator = coordinator();
        let events = ResourceKey::StudyEvents;
        let mutations = [
            MutationEvent::created(events, days_from_today(0)),
            MutationEvent::created(events, days_from_today(0)),
            MutationEvent::updated(events, None, vec!["isCompleted"]),
        ];
        assert_eq!(coordinator.targets(&mutations), vec![Aggregate::Dashboard]);
    }
}
