//! In-memory user directory. The only place a role changes.

use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::error::ServiceError;
use crate::dtos::users::UpdateUserRequest;
use crate::models::{Role, User};

#[derive(Default)]
pub struct UserDirectory {
    users: DashMap<Uuid, User>,
    /// Lowercased email -> user id.
    emails: DashMap<String, Uuid>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) -> Result<User, ServiceError> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(ServiceError::EmailAlreadyRegistered),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    pub fn create(&self, name: &str, email: &str, role: Role) -> Result<User, ServiceError> {
        let user = self.insert(User::new(name.trim().to_string(), email.trim().to_string(), role))?;
        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    pub fn find(&self, id: Uuid) -> Result<User, ServiceError> {
        self.get(id).ok_or(ServiceError::UserNotFound)
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let id = *self.emails.get(&email.trim().to_lowercase())?;
        self.get(id)
    }

    /// All users ordered by name.
    pub fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.email.cmp(&b.email)));
        users
    }

    pub fn update(&self, id: Uuid, req: UpdateUserRequest) -> Result<User, ServiceError> {
        let mut user = self.users.get_mut(&id).ok_or(ServiceError::UserNotFound)?;

        if let Some(email) = req.email {
            let email = email.trim().to_lowercase();
            if email != user.email {
                match self.emails.entry(email.clone()) {
                    Entry::Occupied(_) => return Err(ServiceError::EmailAlreadyRegistered),
                    Entry::Vacant(slot) => {
                        slot.insert(id);
                    }
                }
                self.emails.remove(&user.email);
                user.email = email;
            }
        }
        if let Some(name) = req.name {
            user.name = name.trim().to_string();
        }
        if let Some(role) = req.role {
            if role != user.role {
                tracing::info!(user_id = %id, from = %user.role, to = %role, "User role changed");
            }
            user.role = role;
        }
        if let Some(active) = req.active {
            user.active = active;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    pub fn delete(&self, id: Uuid) -> Result<User, ServiceError> {
        let (_, user) = self.users.remove(&id).ok_or(ServiceError::UserNotFound)?;
        self.emails.remove(&user.email);
        tracing::info!(user_id = %id, "User deleted");
        Ok(user)
    }

    /// Make sure the configured administrator exists and is an active admin.
    pub fn ensure_admin(&self, name: &str, email: &str) -> Result<User, ServiceError> {
        if let Some(existing) = self.find_by_email(email) {
            if existing.role == Role::Admin && existing.active {
                return Ok(existing);
            }
            return self.update(
                existing.id,
                UpdateUserRequest {
                    role: Some(Role::Admin),
                    active: Some(true),
                    ..Default::default()
                },
            );
        }
        self.create(name, email, Role::Admin)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
