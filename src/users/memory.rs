use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::repo::{UniqueViolation, UserStore};
use super::repo_types::{NewUser, ProfileUpdate, User};

/// In-process `UserStore` for router tests. Emulates the UNIQUE constraints on email/username.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<BTreeMap<i64, User>>,
}

impl MemoryUserStore {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let rows = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn get(&self, id: i64) -> Option<User> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn check_unique(
        rows: &BTreeMap<i64, User>,
        skip_id: Option<i64>,
        email: &str,
        username: &str,
    ) -> anyhow::Result<()> {
        let clash = rows
            .values()
            .filter(|u| Some(u.id) != skip_id)
            .any(|u| u.email == email || u.username == username);
        if clash {
            return Err(UniqueViolation.into());
        }
        Ok(())
    }

    fn with_row<F>(&self, id: i64, f: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut User),
    {
        if let Some(user) = self.rows.lock().unwrap().get_mut(&id) {
            f(user);
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let mut rows = self.rows.lock().unwrap();
        Self::check_unique(&rows, None, &user.email, &user.username)?;
        let id = rows.keys().next_back().copied().unwrap_or(0) + 1;
        let row = User {
            id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            hashed_password: user.hashed_password,
            is_active: user.is_active,
            role: user.role,
            phone_number: user.phone_number,
        };
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update_password(&self, id: i64, hashed_password: &str) -> anyhow::Result<()> {
        self.with_row(id, |u| u.hashed_password = hashed_password.to_string())
    }

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        Self::check_unique(&rows, Some(id), &update.email, &update.username)?;
        if let Some(user) = rows.get_mut(&id) {
            user.email = update.email.clone();
            user.username = update.username.clone();
            user.first_name = update.first_name.clone();
            user.last_name = update.last_name.clone();
            user.is_active = update.is_active;
            user.role = update.role.clone();
            user.phone_number = Some(update.phone_number.clone());
        }
        Ok(())
    }

    async fn update_phone_number(&self, id: i64, phone_number: &str) -> anyhow::Result<()> {
        self.with_row(id, |u| u.phone_number = Some(phone_number.to_string()))
    }
}
