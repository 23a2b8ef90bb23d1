//! Identity registry - registration, credential verification and lookups.
//!
//! Passwords are stored as bcrypt hashes and never leave this module in
//! clear text. [`authenticate`] returns the request-scoped [`Identity`]
//! value that callers thread into every ownership-engine operation.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Condition, Set, prelude::*};

/// Authenticated caller identity, threaded explicitly into every mutating
/// ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Registered user id of the caller
    pub user_id: String,
    /// Display name of the caller
    pub name: String,
    /// Role in the supply chain
    pub user_type: String,
}

impl Identity {
    /// Whether the caller holds the privileged producer role.
    #[must_use]
    pub fn is_farmer(&self) -> bool {
        self.user_type == user::ROLE_FARMER
    }
}

impl From<&user::Model> for Identity {
    fn from(model: &user::Model) -> Self {
        Self {
            user_id: model.user_id.clone(),
            name: model.name.clone(),
            user_type: model.user_type.clone(),
        }
    }
}

/// Registers a new user, hashing the password with bcrypt.
///
/// Validates that the id, name, email, role and password are non-blank and
/// rejects ids or emails that are already registered. Users are never
/// deleted afterwards, since the transaction ledger references them forever.
///
/// # Errors
/// Returns an error if:
/// - Any required field is blank
/// - The user id or email is already registered
/// - Password hashing or the database insert fails
#[allow(clippy::too_many_arguments)]
pub async fn register_user(
    db: &DatabaseConnection,
    user_id: String,
    name: String,
    email: String,
    password: &str,
    user_type: String,
    phone: Option<String>,
    address: Option<String>,
) -> Result<user::Model> {
    // Validate inputs
    for (field, value) in [
        ("user id", &user_id),
        ("name", &name),
        ("email", &email),
        ("user type", &user_type),
    ] {
        if value.trim().is_empty() {
            return Err(Error::InvalidInput {
                message: format!("{field} cannot be empty"),
            });
        }
    }

    if password.is_empty() {
        return Err(Error::InvalidInput {
            message: "password cannot be empty".to_string(),
        });
    }

    let taken = User::find()
        .filter(
            Condition::any()
                .add(user::Column::UserId.eq(user_id.trim()))
                .add(user::Column::Email.eq(email.trim())),
        )
        .one(db)
        .await?;

    if taken.is_some() {
        return Err(Error::DuplicateUser {
            user_id: user_id.trim().to_string(),
        });
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    let registered = user::ActiveModel {
        user_id: Set(user_id.trim().to_string()),
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_string()),
        password_hash: Set(password_hash),
        user_type: Set(user_type.trim().to_string()),
        phone: Set(phone),
        address: Set(address),
        created_at: Set(chrono::Utc::now()),
    };

    registered.insert(db).await.map_err(Into::into)
}

/// Verifies a user's credentials and returns the caller [`Identity`].
///
/// An unknown user id and a wrong password both yield
/// [`Error::InvalidCredentials`], so callers cannot probe which ids exist.
///
/// # Errors
/// Returns an error if the credentials do not match or the lookup fails.
pub async fn authenticate(
    db: &DatabaseConnection,
    user_id: &str,
    password: &str,
) -> Result<Identity> {
    let Some(user) = User::find_by_id(user_id.to_string()).one(db).await? else {
        return Err(Error::InvalidCredentials);
    };

    if !bcrypt::verify(password, &user.password_hash)? {
        return Err(Error::InvalidCredentials);
    }

    Ok(Identity::from(&user))
}

/// Retrieves a user by id, returning None if not registered.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: &str) -> Result<Option<user::Model>> {
    User::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}
