use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::dto::{LoginRequest, PublicUser, RegisterRequest};
use crate::auth::jwt::TokenCodec;
use crate::auth::password::Hasher;
use crate::auth::repo::{NewUser, UserRepo};
use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[1-9]\d{6,14}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

const MIN_PASSWORD_LEN: usize = 6;

// Presence treats blank as missing.
fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(message.into()))
}

// Passwords are never trimmed: the bytes hashed at registration must be the
// bytes verified at login.
fn required_password(value: &Option<String>) -> Result<&str, ApiError> {
    value
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("Password is required".into()))
}

/// Registration: field checks in fixed order, then email uniqueness, then
/// phone uniqueness, then hash and insert. The store's own constraints still
/// back up the two pre-checks against a racing duplicate.
pub async fn register(
    users: &dyn UserRepo,
    hasher: &dyn Hasher,
    req: RegisterRequest,
) -> Result<PublicUser, ApiError> {
    let first_name = required(&req.first_name, "First name is required")?;
    let last_name = required(&req.last_name, "Last name is required")?;

    let email = required(&req.email, "Email is required")?;
    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email address".into()));
    }

    let phone_number = required(&req.phone_number, "Phone number is required")?;
    if !is_valid_phone(phone_number) {
        return Err(ApiError::Validation("Invalid phone number".into()));
    }

    let password = required_password(&req.password)?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    if users.find_by_email(email).await?.is_some() {
        warn!(email, "registration conflict on email");
        return Err(ApiError::Conflict("Email already in use".into()));
    }
    if users.find_by_phone(phone_number).await?.is_some() {
        warn!(phone_number, "registration conflict on phone");
        return Err(ApiError::Conflict("Phone number already in use".into()));
    }

    let password_hash = hasher.hash(password).await?;
    let user = users
        .insert(NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone_number: phone_number.to_string(),
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, "user registered");
    Ok(user.into())
}

/// Login: unknown email and wrong password produce the identical error so
/// the response cannot be used to enumerate accounts.
pub async fn login(
    users: &dyn UserRepo,
    hasher: &dyn Hasher,
    codec: &dyn TokenCodec,
    req: LoginRequest,
) -> Result<String, ApiError> {
    let email = required(&req.email, "Email is required")?;
    let password = required_password(&req.password)?;

    let invalid_credentials = || ApiError::Unauthorized("Invalid credentials".into());

    let user = match users.find_by_email(email).await? {
        Some(u) => u,
        None => {
            warn!(email, "login with unknown email");
            return Err(invalid_credentials());
        }
    };

    if !hasher.verify(password, &user.password_hash).await? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(invalid_credentials());
    }

    let token = codec.issue(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

/// Profile lookup for a verified subject. A valid token whose account has
/// since disappeared yields 404, not 401: the stale token is allowed to
/// outlive the account.
pub async fn profile(users: &dyn UserRepo, subject: Uuid) -> Result<PublicUser, ApiError> {
    match users.find_by_id(subject).await? {
        Some(user) => Ok(user.into()),
        None => Err(ApiError::NotFound("User not found".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::VerifyError;
    use crate::auth::repo::User;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use time::OffsetDateTime;

    struct MemoryUsers {
        rows: Mutex<Vec<User>>,
    }

    impl MemoryUsers {
        fn empty() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
            }
        }

        fn with(user: User) -> Self {
            Self {
                rows: Mutex::new(vec![user]),
            }
        }
    }

    #[async_trait]
    impl UserRepo for MemoryUsers {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, ApiError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.phone_number == phone)
                .cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
            Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn insert(&self, new: NewUser) -> Result<User, ApiError> {
            let mut rows = self.rows.lock().unwrap();
            // Mirror the store's uniqueness constraints.
            if rows.iter().any(|u| u.email == new.email) {
                return Err(ApiError::Conflict("Email already in use".into()));
            }
            if rows.iter().any(|u| u.phone_number == new.phone_number) {
                return Err(ApiError::Conflict("Phone number already in use".into()));
            }
            let now = OffsetDateTime::now_utc();
            let user = User {
                id: Uuid::new_v4(),
                first_name: new.first_name,
                last_name: new.last_name,
                email: new.email,
                phone_number: new.phone_number,
                password_hash: new.password_hash,
                created_at: now,
                updated_at: now,
            };
            rows.push(user.clone());
            Ok(user)
        }
    }

    /// Deterministic stand-in for bcrypt.
    struct PlainHasher;

    #[async_trait]
    impl Hasher for PlainHasher {
        async fn hash(&self, plain: &str) -> Result<String, ApiError> {
            Ok(format!("plain${plain}"))
        }

        async fn verify(&self, plain: &str, digest: &str) -> Result<bool, ApiError> {
            Ok(digest == format!("plain${plain}"))
        }
    }

    struct FixedCodec;

    impl TokenCodec for FixedCodec {
        fn issue(&self, subject: Uuid) -> Result<String, ApiError> {
            Ok(format!("token-for-{subject}"))
        }

        fn verify(&self, token: &str) -> Result<Uuid, VerifyError> {
            token
                .strip_prefix("token-for-")
                .and_then(|s| Uuid::parse_str(s).ok())
                .ok_or(VerifyError::Malformed)
        }
    }

    fn valid_registration() -> RegisterRequest {
        RegisterRequest {
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            email: Some("a@b.com".into()),
            phone_number: Some("+15551234567".into()),
            password: Some("secret1".into()),
        }
    }

    async fn registered_user(users: &MemoryUsers) -> PublicUser {
        register(users, &PlainHasher, valid_registration())
            .await
            .expect("registration should succeed")
    }

    #[tokio::test]
    async fn register_returns_public_fields_without_password() {
        let users = MemoryUsers::empty();
        let user = registered_user(&users).await;
        assert_eq!(user.email, "a@b.com");

        let body = serde_json::to_value(&user).unwrap();
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());
        assert!(body.get("id").is_some());
    }

    #[tokio::test]
    async fn register_checks_fields_in_fixed_order() {
        let users = MemoryUsers::empty();
        let cases: Vec<(Box<dyn Fn(&mut RegisterRequest)>, &str)> = vec![
            (Box::new(|r| r.first_name = None), "First name is required"),
            (Box::new(|r| r.last_name = Some("  ".into())), "Last name is required"),
            (Box::new(|r| r.email = None), "Email is required"),
            (Box::new(|r| r.email = Some("not-an-email".into())), "Invalid email address"),
            (Box::new(|r| r.phone_number = None), "Phone number is required"),
            (Box::new(|r| r.phone_number = Some("0123".into())), "Invalid phone number"),
            (Box::new(|r| r.password = None), "Password is required"),
            (Box::new(|r| r.password = Some("short".into())), "Password must be at least 6 characters"),
        ];
        for (mutate, expected) in cases {
            let mut req = valid_registration();
            mutate(&mut req);
            let err = register(&users, &PlainHasher, req).await.unwrap_err();
            assert_eq!(err, ApiError::Validation(expected.into()));
        }
    }

    #[tokio::test]
    async fn register_reports_all_missing_fields_first_name_first() {
        let users = MemoryUsers::empty();
        let err = register(&users, &PlainHasher, RegisterRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Validation("First name is required".into()));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_naming_email() {
        let users = MemoryUsers::empty();
        registered_user(&users).await;

        let mut req = valid_registration();
        req.phone_number = Some("+15559876543".into());
        let err = register(&users, &PlainHasher, req).await.unwrap_err();
        assert_eq!(err, ApiError::Conflict("Email already in use".into()));
    }

    #[tokio::test]
    async fn duplicate_phone_conflicts_naming_phone() {
        let users = MemoryUsers::empty();
        registered_user(&users).await;

        let mut req = valid_registration();
        req.email = Some("c@d.com".into());
        let err = register(&users, &PlainHasher, req).await.unwrap_err();
        assert_eq!(err, ApiError::Conflict("Phone number already in use".into()));
    }

    #[tokio::test]
    async fn email_conflict_checked_before_phone_conflict() {
        let users = MemoryUsers::empty();
        registered_user(&users).await;

        // Both fields collide; the email conflict must win.
        let err = register(&users, &PlainHasher, valid_registration())
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Conflict("Email already in use".into()));
    }

    #[tokio::test]
    async fn racing_insert_surfaces_store_conflict() {
        // A user that appears between the pre-check and the insert: the
        // store-level rejection still comes back as Conflict.
        struct RacingUsers {
            inner: MemoryUsers,
        }

        #[async_trait]
        impl UserRepo for RacingUsers {
            async fn find_by_email(&self, _: &str) -> Result<Option<User>, ApiError> {
                Ok(None) // pre-check sees nothing
            }
            async fn find_by_phone(&self, _: &str) -> Result<Option<User>, ApiError> {
                Ok(None)
            }
            async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
                self.inner.find_by_id(id).await
            }
            async fn insert(&self, new: NewUser) -> Result<User, ApiError> {
                self.inner.insert(new).await
            }
        }

        let users = RacingUsers {
            inner: MemoryUsers::empty(),
        };
        registered_user(&users.inner).await;

        let mut req = valid_registration();
        req.phone_number = Some("+15559876543".into());
        let err = register(&users, &PlainHasher, req).await.unwrap_err();
        assert_eq!(err, ApiError::Conflict("Email already in use".into()));
    }

    #[tokio::test]
    async fn login_roundtrip_issues_token_for_user() {
        let users = MemoryUsers::empty();
        let registered = registered_user(&users).await;

        let token = login(
            &users,
            &PlainHasher,
            &FixedCodec,
            LoginRequest {
                email: Some("a@b.com".into()),
                password: Some("secret1".into()),
            },
        )
        .await
        .expect("login should succeed");
        assert_eq!(FixedCodec.verify(&token).unwrap(), registered.id);
    }

    #[tokio::test]
    async fn padded_password_round_trips_through_login() {
        let users = MemoryUsers::empty();
        let mut req = valid_registration();
        req.password = Some(" secret1 ".into());
        register(&users, &PlainHasher, req)
            .await
            .expect("registration should accept a padded password");

        // The exact registered bytes must log in; the trimmed variant is a
        // different password.
        let attempt = |password: &str| LoginRequest {
            email: Some("a@b.com".into()),
            password: Some(password.into()),
        };
        login(&users, &PlainHasher, &FixedCodec, attempt(" secret1 "))
            .await
            .expect("login with the registered bytes should succeed");
        let err = login(&users, &PlainHasher, &FixedCodec, attempt("secret1"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Unauthorized("Invalid credentials".into()));
    }

    #[tokio::test]
    async fn login_requires_email_then_password() {
        let users = MemoryUsers::empty();
        let err = login(&users, &PlainHasher, &FixedCodec, LoginRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Validation("Email is required".into()));

        let err = login(
            &users,
            &PlainHasher,
            &FixedCodec,
            LoginRequest {
                email: Some("a@b.com".into()),
                password: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, ApiError::Validation("Password is required".into()));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let users = MemoryUsers::empty();
        registered_user(&users).await;

        let unknown_email = login(
            &users,
            &PlainHasher,
            &FixedCodec,
            LoginRequest {
                email: Some("nobody@b.com".into()),
                password: Some("secret1".into()),
            },
        )
        .await
        .unwrap_err();

        let wrong_password = login(
            &users,
            &PlainHasher,
            &FixedCodec,
            LoginRequest {
                email: Some("a@b.com".into()),
                password: Some("wrong-password".into()),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(unknown_email, wrong_password);

        // Byte-identical response bodies and identical status codes.
        use axum::response::IntoResponse;
        let res_a = unknown_email.into_response();
        let res_b = wrong_password.into_response();
        assert_eq!(res_a.status(), res_b.status());
        let body_a = axum::body::to_bytes(res_a.into_body(), usize::MAX).await.unwrap();
        let body_b = axum::body::to_bytes(res_b.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body_a, body_b);
    }

    #[tokio::test]
    async fn profile_returns_user_and_404_when_gone() {
        let users = MemoryUsers::empty();
        let registered = registered_user(&users).await;

        let fetched = profile(&users, registered.id).await.expect("profile");
        assert_eq!(fetched.id, registered.id);

        // Token subject for an account that no longer exists.
        let err = profile(&users, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err, ApiError::NotFound("User not found".into()));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.domain.tld"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@.com"));
    }

    #[test]
    fn phone_shape() {
        assert!(is_valid_phone("+15551234567"));
        assert!(is_valid_phone("4915551234"));
        assert!(!is_valid_phone("+05551234567")); // leading zero after +
        assert!(!is_valid_phone("123456")); // too short
        assert!(!is_valid_phone("+1234567890123456")); // too long
        assert!(!is_valid_phone("555-123-4567"));
    }
}
