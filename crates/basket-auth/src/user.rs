//! User types.

use basket_commerce::checkout::Customer;
use basket_commerce::ids::UserId;
use basket_commerce::wire;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::AuthError;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Regular customer.
    #[default]
    Customer,
    /// Store administrator.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    /// Read the backend's role claim. Anything unrecognised is a customer.
    pub fn from_claim(claim: &str) -> Self {
        claim.parse().unwrap_or_default()
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.strip_prefix("role_").unwrap_or(s.as_str()) {
            "customer" | "user" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let claim = Option::<String>::deserialize(deserializer)?;
        Ok(claim.as_deref().map(Role::from_claim).unwrap_or_default())
    }
}

/// A logged-in user as the backend describes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }

    /// The shopper checkout acts for.
    pub fn customer(&self) -> Customer {
        Customer {
            email: self.email.clone(),
            name: self.display_name().to_string(),
            phone: self.phone.clone(),
        }
    }
}

/// Body of a login call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AuthError::Validation("password is required".to_string()));
        }
        Ok(())
    }
}

/// Body of a registration call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Registration {
    pub const MIN_PASSWORD_LEN: usize = 6;

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.name.trim().is_empty() {
            return Err(AuthError::Validation("name is required".to_string()));
        }
        validate_email(&self.email)?;
        if self.password.chars().count() < Self::MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            )));
        }
        if let Some(phone) = &self.phone {
            if !phone.chars().all(|c| c.is_ascii_digit() || c == '+' || c == ' ') {
                return Err(AuthError::Validation("phone must be digits".to_string()));
            }
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(AuthError::Validation(format!("invalid email: {}", email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_claims() {
        assert_eq!(Role::from_claim("ADMIN"), Role::Admin);
        assert_eq!(Role::from_claim("ROLE_ADMIN"), Role::Admin);
        assert_eq!(Role::from_claim("user"), Role::Customer);
        assert_eq!(Role::from_claim("superuser"), Role::Customer);
    }

    #[test]
    fn test_user_from_backend() {
        let user: User = serde_json::from_str(
            r#"{"id": 3, "name": "Asha", "email": "asha@example.com", "role": "ADMIN", "phone": 98765}"#,
        )
        .unwrap();
        assert!(user.is_admin());
        assert_eq!(user.phone.as_deref(), Some("98765"));

        let user: User =
            serde_json::from_str(r#"{"id": "u1", "email": "r@example.com", "role": null}"#).unwrap();
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.customer().name, "r@example.com");
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new(" a@b.co ", "x").validate().is_ok());
        assert!(Credentials::new("nope", "x").validate().is_err());
        assert!(Credentials::new("a@b.co", "").validate().is_err());
    }

    #[test]
    fn test_registration_validation() {
        let mut reg = Registration {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password: "secret1".to_string(),
            phone: Some("+91 98765 43210".to_string()),
        };
        assert!(reg.validate().is_ok());
        reg.password = "123".to_string();
        assert!(matches!(reg.validate(), Err(AuthError::Validation(_))));
    }
}
