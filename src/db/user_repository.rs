use crate::db::{Database, StoreError};
use crate::models::user::User;
use bincode::{Decode, Encode};
use std::str;
use tracing::info;

const USERS_TREE: &str = "users";
const EMAIL_INDEX_TREE: &str = "users_email_idx";

#[derive(Debug, Encode, Decode)]
struct StoredUser {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    image: Option<String>,
    age: Option<u32>,
    phone: Option<String>,
    created_at: i64, // Microsecond timestamp
}

impl From<User> for StoredUser {
    fn from(user: User) -> Self {
        StoredUser {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            image: user.image,
            age: user.age,
            phone: user.phone,
            created_at: user.created_at.timestamp_micros(),
        }
    }
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        User {
            id: stored.id,
            name: stored.name,
            email: stored.email,
            password_hash: stored.password_hash,
            image: stored.image,
            age: stored.age,
            phone: stored.phone,
            created_at: chrono::DateTime::from_timestamp_micros(stored.created_at)
                .unwrap_or_else(chrono::Utc::now),
        }
    }
}

pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        UserRepository { db }
    }

    /// Insert a new user. Email uniqueness is enforced through the email
    /// index tree; a duplicate reports `Conflict`.
    pub async fn create(&self, user: User) -> Result<User, StoreError> {
        let users_tree = self.db.tree(USERS_TREE)?;
        let email_index = self.db.tree(EMAIL_INDEX_TREE)?;

        if email_index.contains_key(user.email.as_bytes())? {
            return Err(StoreError::Conflict);
        }

        let stored = StoredUser::from(user.clone());
        let encoded = bincode::encode_to_vec(&stored, bincode::config::standard())?;

        users_tree.insert(user.id.as_bytes(), encoded.as_slice())?;
        email_index.insert(user.email.as_bytes(), user.id.as_bytes())?;

        info!(user_id = %user.id, email = %user.email, "User created in store");

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let users_tree = self.db.tree(USERS_TREE)?;

        match users_tree.get(id.as_bytes())? {
            Some(data) => {
                let (stored, _): (StoredUser, usize) =
                    bincode::decode_from_slice(&data, bincode::config::standard())?;
                Ok(Some(User::from(stored)))
            }
            None => Ok(None),
        }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email_index = self.db.tree(EMAIL_INDEX_TREE)?;

        match email_index.get(email.as_bytes())? {
            Some(user_id) => {
                let id = str::from_utf8(&user_id).map_err(|_| StoreError::NotFound)?;
                self.get_by_id(id).await
            }
            None => Ok(None),
        }
    }

    /// Replace the profile fields of an existing user. Email and password
    /// hash are untouched. Reports `NotFound` if the record is gone.
    pub async fn update_profile(
        &self,
        id: &str,
        name: &str,
        age: Option<u32>,
        phone: Option<String>,
        image: Option<String>,
    ) -> Result<User, StoreError> {
        let users_tree = self.db.tree(USERS_TREE)?;

        let mut user = self.get_by_id(id).await?.ok_or(StoreError::NotFound)?;
        user.name = name.to_string();
        user.age = age;
        user.phone = phone;
        user.image = image;

        let stored = StoredUser::from(user.clone());
        let encoded = bincode::encode_to_vec(&stored, bincode::config::standard())?;
        users_tree.insert(id.as_bytes(), encoded.as_slice())?;

        info!(user_id = %id, "User profile updated in store");

        Ok(user)
    }
}
