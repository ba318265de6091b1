use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account. `username` is unique and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub pin_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub biometric_enabled: bool,
    pub created_at: NaiveDateTime,
}

/// Registration payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub pin_hash: String,
    #[serde(default)]
    pub biometric_enabled: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLogin {
    pub username: String,
    pub pin_hash: String,
}

/// Partial personal-info patch.
///
/// Each field has three states: absent (leave as is), `null` (clear),
/// or a value (overwrite).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub street_address: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub state: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub zip_code: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub country: Option<Option<String>>,
}

impl User {
    /// Create a new User from a registration request
    pub fn new(req: UserCreate) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            username: req.username,
            pin_hash: req.pin_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            street_address: req.street_address,
            city: req.city,
            state: req.state,
            zip_code: req.zip_code,
            country: req.country,
            biometric_enabled: req.biometric_enabled,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl UserCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username is required".to_string());
        }
        if self.pin_hash.is_empty() {
            return Err("PIN hash is required".to_string());
        }
        Ok(())
    }
}

fn patch(field: &mut Option<String>, update: &Option<Option<String>>) {
    if let Some(value) = update {
        *field = value.clone();
    }
}

impl PersonalInfoUpdate {
    /// True when the patch carries no fields at all
    pub fn is_empty(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.street_address,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.country,
        ]
        .iter()
        .all(|f| f.is_none())
    }

    /// Apply only the fields present in the patch
    pub fn apply_to(&self, user: &mut User) {
        patch(&mut user.first_name, &self.first_name);
        patch(&mut user.last_name, &self.last_name);
        patch(&mut user.email, &self.email);
        patch(&mut user.phone, &self.phone);
        patch(&mut user.street_address, &self.street_address);
        patch(&mut user.city, &self.city);
        patch(&mut user.state, &self.state);
        patch(&mut user.zip_code, &self.zip_code);
        patch(&mut user.country, &self.country);
    }
}
