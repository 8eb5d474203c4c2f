//! Identity store
//!
//! Registers citizen and officer accounts, checks credentials and hands out
//! session tokens. Password hashes never leave this module.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

use crate::auth::{hash_password, password, verify_password, Role, TokenCodec};
use crate::clock::Clock;
use crate::db::schemas::{Account, AccountDoc, FullName};
use crate::db::AccountStore;
use crate::types::{PrecinctError, Result};

/// Minimum length of first and last name
pub const MIN_NAME_LENGTH: usize = 3;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email pattern is valid")
});

/// Registration input; empty strings count as missing
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub jurisdiction: String,
}

/// An account together with a freshly issued token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account: Account,
    pub token: String,
}

/// Whether `email` is syntactically acceptable
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn validate_registration(input: &Registration) -> Result<Role> {
    let missing: Vec<&str> = [
        ("firstname", &input.first_name),
        ("lastname", &input.last_name),
        ("email", &input.email),
        ("password", &input.password),
        ("role", &input.role),
        ("location", &input.jurisdiction),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(PrecinctError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if input.first_name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(PrecinctError::Validation(format!(
            "First name must be at least {} characters",
            MIN_NAME_LENGTH
        )));
    }
    if input.last_name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(PrecinctError::Validation(format!(
            "Last name must be at least {} characters",
            MIN_NAME_LENGTH
        )));
    }
    if !is_valid_email(&input.email) {
        return Err(PrecinctError::Validation(
            "Please provide a valid email".into(),
        ));
    }
    if input.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PrecinctError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    input.role.parse()
}

/// Account registry and credential checker
pub struct IdentityStore {
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl IdentityStore {
    pub fn new(accounts: Arc<dyn AccountStore>, tokens: Arc<TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            tokens,
            clock,
        }
    }

    /// Create an account and issue its first token
    pub async fn register(&self, input: Registration) -> Result<AuthSession> {
        let role = validate_registration(&input)?;

        if self
            .accounts
            .find_account_by_email(&input.email)
            .await?
            .is_some()
        {
            warn!("Registration rejected - email already registered");
            return Err(PrecinctError::Conflict("User already exists".into()));
        }

        let password_hash = hash_password(&input.password)?;
        let doc = AccountDoc::new(
            FullName {
                firstname: input.first_name.trim().to_string(),
                lastname: input.last_name.trim().to_string(),
            },
            input.email,
            password_hash,
            role,
            input.jurisdiction,
            self.clock.now(),
        );
        let account = Account::from(&doc);

        // The store re-checks uniqueness atomically for racing registrations
        self.accounts.insert_account(doc).await?;

        let token = self.tokens.issue(&account.id, account.role)?;
        info!(account_id = %account.id, role = %account.role, "Account registered");

        Ok(AuthSession { account, token })
    }

    /// Check credentials and issue a token
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession> {
        if email.is_empty() || password.is_empty() {
            return Err(PrecinctError::Validation(
                "Missing required fields: email, password".into(),
            ));
        }

        let doc = match self.accounts.find_account_by_email(email).await? {
            Some(doc) => doc,
            None => {
                password::verify_against_dummy(password);
                warn!("Login failed - unknown account");
                return Err(PrecinctError::InvalidCredentials);
            }
        };

        if !verify_password(password, &doc.password_hash)? {
            warn!(account_id = %doc.id, "Login failed - invalid password");
            return Err(PrecinctError::InvalidCredentials);
        }

        let token = self.tokens.issue(&doc.id, doc.role)?;
        info!(account_id = %doc.id, "Login successful");

        Ok(AuthSession {
            account: Account::from(&doc),
            token,
        })
    }

    /// Look up an account by ID
    pub async fn get_account(&self, account_id: &str) -> Result<Account> {
        self.accounts
            .find_account_by_id(account_id)
            .await?
            .map(|doc| Account::from(&doc))
            .ok_or_else(|| PrecinctError::NotFound(format!("Account '{}' not found", account_id)))
    }

    /// Look up an account by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .find_account_by_email(email)
            .await?
            .map(|doc| Account::from(&doc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::DEFAULT_TOKEN_EXPIRY_SECONDS;
    use crate::clock::SystemClock;
    use crate::config::DEV_JWT_SECRET;
    use crate::db::InMemoryAccountStore;

    fn store() -> (IdentityStore, Arc<InMemoryAccountStore>, Arc<TokenCodec>) {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let accounts = Arc::new(InMemoryAccountStore::new());
        let tokens = Arc::new(
            TokenCodec::new(DEV_JWT_SECRET.into(), DEFAULT_TOKEN_EXPIRY_SECONDS, clock.clone()).unwrap(),
        );
        (
            IdentityStore::new(accounts.clone(), tokens.clone(), clock),
            accounts,
            tokens,
        )
    }

    fn ann() -> Registration {
        Registration {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: "ann@x.com".into(),
            password: "secret1".into(),
            role: "CITIZEN".into(),
            jurisdiction: "Central".into(),
        }
    }

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email("ann@x.com"));
        assert!(is_valid_email("ann.lee-1@mail.example.org"));
        assert!(!is_valid_email("ann"));
        assert!(!is_valid_email("ann@"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("ann@x"));
        assert!(!is_valid_email("ann@x.museum"));
    }

    #[tokio::test]
    async fn test_register_returns_account_and_token() {
        let (identity, _accounts, tokens) = store();

        let session = identity.register(ann()).await.unwrap();
        assert_eq!(session.account.email, "ann@x.com");
        assert_eq!(session.account.role, Role::Citizen);
        assert_eq!(session.account.jurisdiction, "Central");

        let claims = tokens.verify(&session.token).unwrap();
        assert_eq!(claims.id, session.account.id);
        assert_eq!(claims.role, Role::Citizen);
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let (identity, accounts, _tokens) = store();
        identity.register(ann()).await.unwrap();

        let doc = accounts.find_account_by_email("ann@x.com").await.unwrap().unwrap();
        assert_ne!(doc.password_hash, "secret1");
        assert!(doc.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (identity, accounts, _tokens) = store();
        identity.register(ann()).await.unwrap();

        let mut again = ann();
        again.first_name = "Annabel".into();
        let result = identity.register(again).await;
        assert!(matches!(result, Err(PrecinctError::Conflict(_))));
        assert_eq!(accounts.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (identity, accounts, _tokens) = store();

        let cases = [
            Registration { first_name: "".into(), ..ann() },
            Registration { first_name: "Al".into(), ..ann() },
            Registration { last_name: "Li".into(), ..ann() },
            Registration { email: "not-an-email".into(), ..ann() },
            Registration { password: "12345".into(), ..ann() },
            Registration { role: "ADMIN".into(), ..ann() },
            Registration { jurisdiction: "  ".into(), ..ann() },
        ];

        for input in cases {
            let result = identity.register(input).await;
            assert!(matches!(result, Err(PrecinctError::Validation(_))));
        }
        assert!(accounts.is_empty().await);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (identity, _accounts, tokens) = store();
        let registered = identity.register(ann()).await.unwrap();

        let session = identity.authenticate("ann@x.com", "secret1").await.unwrap();
        assert_eq!(session.account.id, registered.account.id);
        assert_eq!(tokens.verify(&session.token).unwrap().id, registered.account.id);
    }

    #[tokio::test]
    async fn test_authenticate_failures() {
        let (identity, _accounts, _tokens) = store();
        identity.register(ann()).await.unwrap();

        assert!(matches!(
            identity.authenticate("ann@x.com", "wrong-pass").await,
            Err(PrecinctError::InvalidCredentials)
        ));
        assert!(matches!(
            identity.authenticate("nobody@x.com", "secret1").await,
            Err(PrecinctError::InvalidCredentials)
        ));
        assert!(matches!(
            identity.authenticate("", "secret1").await,
            Err(PrecinctError::Validation(_))
        ));
        assert!(matches!(
            identity.authenticate("ann@x.com", "").await,
            Err(PrecinctError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_get_account() {
        let (identity, _accounts, _tokens) = store();
        let session = identity.register(ann()).await.unwrap();

        let account = identity.get_account(&session.account.id).await.unwrap();
        assert_eq!(account, session.account);

        assert!(matches!(
            identity.get_account("missing").await,
            Err(PrecinctError::NotFound(_))
        ));
    }
}
