//! Constituent registry: people and the interactions logged with them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use super::error::ServiceError;
use crate::dtos::apply_text;
use crate::dtos::interactions::{
    CreateInteractionRequest, InteractionQuery, UpdateInteractionRequest,
};
use crate::dtos::people::{CreatePersonRequest, UpdatePersonRequest};
use crate::models::{Interaction, InteractionStatus, Person, ScheduleWindow};
use crate::scheduler::desired_status;

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub total_people: usize,
    pub total_interactions: usize,
    pub interactions_by_status: BTreeMap<&'static str, usize>,
    pub interactions_by_kind: BTreeMap<&'static str, usize>,
    /// Not yet started, not cancelled.
    pub upcoming: usize,
}

#[derive(Debug, Serialize)]
pub struct RegistrySnapshot {
    pub people: Vec<Person>,
    pub interactions: Vec<Interaction>,
}

#[derive(Default)]
pub struct Registry {
    people: DashMap<Uuid, Person>,
    interactions: DashMap<Uuid, Interaction>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_person(&self, person: Person) -> Person {
        self.people.insert(person.id, person.clone());
        person
    }

    pub fn create_person(&self, req: CreatePersonRequest, author: Uuid) -> Person {
        let mut person = Person::new(req.name.trim().to_string(), author);
        apply_text(&mut person.email, req.email.map(|e| e.to_lowercase()));
        apply_text(&mut person.phone, req.phone);
        apply_text(&mut person.neighborhood, req.neighborhood);
        apply_text(&mut person.city, req.city);
        apply_text(&mut person.notes, req.notes);
        self.insert_person(person)
    }

    pub fn get_person(&self, id: Uuid) -> Result<Person, ServiceError> {
        self.people
            .get(&id)
            .map(|p| p.value().clone())
            .ok_or(ServiceError::PersonNotFound)
    }

    pub fn update_person(&self, id: Uuid, req: UpdatePersonRequest) -> Result<Person, ServiceError> {
        let mut person = self
            .people
            .get_mut(&id)
            .ok_or(ServiceError::PersonNotFound)?;

        if let Some(name) = req.name {
            person.name = name.trim().to_string();
        }
        apply_text(&mut person.email, req.email.map(|e| e.to_lowercase()));
        apply_text(&mut person.phone, req.phone);
        apply_text(&mut person.neighborhood, req.neighborhood);
        apply_text(&mut person.city, req.city);
        apply_text(&mut person.notes, req.notes);
        person.updated_at = Utc::now();

        Ok(person.clone())
    }

    /// Remove a person together with their interactions. Returns how many
    /// interactions went with them.
    pub fn delete_person(&self, id: Uuid) -> Result<usize, ServiceError> {
        self.people.remove(&id).ok_or(ServiceError::PersonNotFound)?;

        let before = self.interactions.len();
        self.interactions.retain(|_, i| i.person_id != id);
        Ok(before.saturating_sub(self.interactions.len()))
    }

    /// People ordered by name, optionally filtered by a case-insensitive
    /// match on name, email, neighborhood or city.
    pub fn list_people(&self, search: Option<&str>) -> Vec<Person> {
        let needle = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);

        let mut people: Vec<Person> = self
            .people
            .iter()
            .filter(|p| match &needle {
                None => true,
                Some(needle) => [
                    Some(&p.name),
                    p.email.as_ref(),
                    p.neighborhood.as_ref(),
                    p.city.as_ref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(needle)),
            })
            .map(|p| p.value().clone())
            .collect();
        people.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        people
    }

    pub fn insert_interaction(&self, interaction: Interaction) -> Interaction {
        self.interactions.insert(interaction.id, interaction.clone());
        interaction
    }

    /// The new interaction starts in whatever status its window implies.
    pub fn create_interaction(
        &self,
        req: CreateInteractionRequest,
        author: Uuid,
    ) -> Result<Interaction, ServiceError> {
        // Held until the insert so a concurrent delete_person cannot
        // remove the person in between and leave an orphan behind.
        let _person = self
            .people
            .get(&req.person_id)
            .ok_or(ServiceError::PersonNotFound)?;
        let window = ScheduleWindow {
            start: req.scheduled_start,
            end: req.scheduled_end,
        };
        check_window(window)?;

        let mut interaction =
            Interaction::new(req.person_id, req.subject.trim().to_string(), req.kind, author);
        apply_text(&mut interaction.description, req.description);
        interaction.scheduled_start = window.start;
        interaction.scheduled_end = window.end;
        interaction.status = desired_status(
            Utc::now(),
            window,
            req.status.unwrap_or(InteractionStatus::Pendente),
        );

        Ok(self.insert_interaction(interaction))
    }

    pub fn get_interaction(&self, id: Uuid) -> Result<Interaction, ServiceError> {
        self.interactions
            .get(&id)
            .map(|i| i.value().clone())
            .ok_or(ServiceError::InteractionNotFound)
    }

    /// An explicit status is taken as given; the scheduler only moves it
    /// forward from there.
    pub fn update_interaction(
        &self,
        id: Uuid,
        req: UpdateInteractionRequest,
    ) -> Result<Interaction, ServiceError> {
        let mut interaction = self
            .interactions
            .get_mut(&id)
            .ok_or(ServiceError::InteractionNotFound)?;

        let window = ScheduleWindow {
            start: req.scheduled_start.or(interaction.scheduled_start),
            end: req.scheduled_end.or(interaction.scheduled_end),
        };
        check_window(window)?;

        if let Some(subject) = req.subject {
            interaction.subject = subject.trim().to_string();
        }
        if let Some(kind) = req.kind {
            interaction.kind = kind;
        }
        apply_text(&mut interaction.description, req.description);
        interaction.scheduled_start = window.start;
        interaction.scheduled_end = window.end;
        if let Some(status) = req.status {
            interaction.status = status;
        }
        interaction.updated_at = Utc::now();

        Ok(interaction.clone())
    }

    pub fn delete_interaction(&self, id: Uuid) -> Result<Interaction, ServiceError> {
        self.interactions
            .remove(&id)
            .map(|(_, i)| i)
            .ok_or(ServiceError::InteractionNotFound)
    }

    /// Interactions ordered by scheduled start (unscheduled last), then by
    /// creation time.
    pub fn list_interactions(&self, query: &InteractionQuery) -> Vec<Interaction> {
        let needle = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut interactions: Vec<Interaction> = self
            .interactions
            .iter()
            .filter(|i| query.person_id.map_or(true, |p| i.person_id == p))
            .filter(|i| query.status.map_or(true, |s| i.status == s))
            .filter(|i| match &needle {
                None => true,
                Some(needle) => {
                    i.subject.to_lowercase().contains(needle)
                        || i
                            .description
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(needle))
                }
            })
            .map(|i| i.value().clone())
            .collect();
        interactions.sort_by(|a, b| {
            match (a.scheduled_start, b.scheduled_start) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(a.created_at.cmp(&b.created_at))
        });
        interactions
    }

    /// Apply [`desired_status`] to every interaction. Returns the ones that
    /// changed with their new status.
    pub fn refresh_statuses(&self, now: DateTime<Utc>) -> Vec<(Uuid, InteractionStatus)> {
        let mut changed = Vec::new();
        for mut entry in self.interactions.iter_mut() {
            let next = desired_status(now, entry.window(), entry.status);
            if next != entry.status {
                entry.status = next;
                entry.updated_at = now;
                changed.push((entry.id, next));
            }
        }
        changed
    }

    pub fn summary(&self, now: DateTime<Utc>) -> SummaryReport {
        let mut by_status: BTreeMap<&'static str, usize> = InteractionStatus::ALL
            .iter()
            .map(|s| (s.as_str(), 0))
            .collect();
        let mut by_kind = BTreeMap::new();
        let mut upcoming = 0;

        for i in self.interactions.iter() {
            *by_status.entry(i.status.as_str()).or_default() += 1;
            *by_kind.entry(i.kind.as_str()).or_default() += 1;
            if !i.status.is_terminal() && i.scheduled_start.is_some_and(|s| s > now) {
                upcoming += 1;
            }
        }

        SummaryReport {
            generated_at: now,
            total_people: self.people.len(),
            total_interactions: self.interactions.len(),
            interactions_by_status: by_status,
            interactions_by_kind: by_kind,
            upcoming,
        }
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            people: self.list_people(None),
            interactions: self.list_interactions(&InteractionQuery::default()),
        }
    }
}

fn check_window(window: ScheduleWindow) -> Result<(), ServiceError> {
    match (window.start, window.end) {
        (Some(start), Some(end)) if end < start => Err(ServiceError::InvalidSchedule),
        _ => Ok(()),
    }
}
