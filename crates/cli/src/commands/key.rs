//! Admin key management commands.
//!
//! # Usage
//!
//! ```bash
//! # Issue a department-scoped key
//! ss-cli key create -n "CSE Coordinator" -r dept_admin -d cse
//!
//! # Revoke every active key issued under a name
//! ss-cli key revoke -n "CSE Coordinator"
//!
//! # List keys
//! ss-cli key list
//! ```
//!
//! Secrets are printed exactly once at creation; only their SHA-256 digest
//! is stored.

use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;

use studyspace_admin::db::{AdminKeyRepository, RepositoryError};
use studyspace_admin::models::{AdminKeyRecord, NewAdminKey};
use studyspace_core::{AdminRole, CatalogError, Department, KeyHash};

use super::{DatabaseError, connect};

/// Length of a generated secret in bytes (hex-encoded to 64 chars).
const SECRET_BYTES: usize = 32;

/// Errors that can occur during key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Invalid role: {0}. Valid roles: super_admin, dept_admin")]
    InvalidRole(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("A dept_admin key requires a department (-d)")]
    MissingDepartment,

    #[error("A subject requires a department (-d)")]
    SubjectWithoutDepartment,

    #[error("Admin name must not be empty")]
    EmptyName,

    #[error("No active key found for: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Arguments for `key create`.
#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub name: String,
    pub role: String,
    pub department: Option<String>,
    pub subject: Option<String>,
    pub college: Option<String>,
}

/// Generate a fresh secret: 32 random bytes, hex-encoded.
fn generate_secret<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rng.fill(&mut bytes);
    hex::encode(bytes)
}

/// Validate `args` and build the record to insert for `secret`.
fn build_key(args: &CreateArgs, secret: &str) -> Result<NewAdminKey, KeyError> {
    let admin_name = args.name.trim();
    if admin_name.is_empty() {
        return Err(KeyError::EmptyName);
    }

    let role: AdminRole = args
        .role
        .parse()
        .map_err(|_| KeyError::InvalidRole(args.role.clone()))?;

    let department = args
        .department
        .as_deref()
        .map(str::parse::<Department>)
        .transpose()?;

    if role == AdminRole::DeptAdmin && department.is_none() {
        return Err(KeyError::MissingDepartment);
    }

    let subject = args.subject.as_deref().map(str::trim).filter(|s| !s.is_empty());
    if let Some(subject) = subject {
        department
            .ok_or(KeyError::SubjectWithoutDepartment)?
            .require_subject(subject)?;
    }

    Ok(NewAdminKey {
        key_hash: KeyHash::from_secret(secret),
        admin_name: admin_name.to_owned(),
        role,
        department,
        subject: subject.map(str::to_owned),
        college_id: args
            .college
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned),
    })
}

/// Human-readable scope column for `key list`.
fn scope(record: &AdminKeyRecord) -> String {
    match (record.department, record.subject.as_deref()) {
        (None, _) => "all".to_owned(),
        (Some(department), None) => department.code().to_owned(),
        (Some(department), Some(subject)) => format!("{}/{subject}", department.code()),
    }
}

/// Issue a new key and print its secret once.
pub async fn create(args: &CreateArgs) -> Result<(), KeyError> {
    let secret = generate_secret(&mut rand::rng());
    let key = build_key(args, &secret)?;

    let pool = connect().await?;
    let record = AdminKeyRepository::new(&pool).create(&key).await?;

    tracing::info!(
        "Admin key created! ID: {}, Name: {}, Role: {}, Scope: {}",
        record.id,
        record.admin_name,
        record.role,
        scope(&record)
    );

    #[allow(clippy::print_stdout)]
    {
        println!();
        println!("Secret key (shown once, store it now):");
        println!("  {secret}");
        println!();
    }

    Ok(())
}

/// Deactivate every active key issued under `name`.
pub async fn revoke(name: &str) -> Result<(), KeyError> {
    let pool = connect().await?;
    let revoked = AdminKeyRepository::new(&pool)
        .deactivate_by_name(name.trim())
        .await?;

    if revoked == 0 {
        return Err(KeyError::NotFound(name.to_owned()));
    }

    tracing::info!("Revoked {} key(s) for {}", revoked, name);
    Ok(())
}

/// Print every key, newest first.
pub async fn list() -> Result<(), KeyError> {
    let pool: PgPool = connect().await?;
    let records = AdminKeyRepository::new(&pool).list_all().await?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{:<28} {:<12} {:<28} {:<8} LAST USED",
            "NAME", "ROLE", "SCOPE", "ACTIVE"
        );
        for record in &records {
            let last_used = record
                .last_used
                .map_or_else(|| "never".to_owned(), |t| t.format("%Y-%m-%d %H:%M").to_string());
            println!(
                "{:<28} {:<12} {:<28} {:<8} {}",
                record.admin_name,
                record.role.as_str(),
                scope(record),
                if record.is_active { "yes" } else { "no" },
                last_used
            );
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn args(role: &str, department: Option<&str>, subject: Option<&str>) -> CreateArgs {
        CreateArgs {
            name: "  CSE Coordinator ".to_owned(),
            role: role.to_owned(),
            department: department.map(str::to_owned),
            subject: subject.map(str::to_owned),
            college: None,
        }
    }

    #[test]
    fn test_generate_secret_is_64_hex_chars() {
        let secret = generate_secret(&mut StdRng::seed_from_u64(7));
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(secret, generate_secret(&mut StdRng::seed_from_u64(8)));
    }

    #[test]
    fn test_build_dept_admin_key() {
        let key = build_key(&args("dept_admin", Some("cse"), Some("DBMS")), "s3cret").unwrap();
        assert_eq!(key.admin_name, "CSE Coordinator");
        assert_eq!(key.role, AdminRole::DeptAdmin);
        assert_eq!(key.department, Some(Department::Cse));
        assert_eq!(key.subject.as_deref(), Some("DBMS"));
        assert_eq!(key.key_hash, KeyHash::from_secret("s3cret"));
    }

    #[test]
    fn test_dept_admin_requires_department() {
        let result = build_key(&args("dept_admin", None, None), "s");
        assert!(matches!(result, Err(KeyError::MissingDepartment)));
    }

    #[test]
    fn test_subject_must_be_in_catalog() {
        let result = build_key(&args("dept_admin", Some("cse"), Some("Thermodynamics")), "s");
        assert!(matches!(result, Err(KeyError::Catalog(_))));

        let result = build_key(&args("super_admin", None, Some("DBMS")), "s");
        assert!(matches!(result, Err(KeyError::SubjectWithoutDepartment)));
    }

    #[test]
    fn test_invalid_role_and_department() {
        assert!(matches!(
            build_key(&args("owner", None, None), "s"),
            Err(KeyError::InvalidRole(_))
        ));
        assert!(matches!(
            build_key(&args("dept_admin", Some("civil"), None), "s"),
            Err(KeyError::Catalog(CatalogError::UnknownDepartment(_)))
        ));
    }

    #[test]
    fn test_super_admin_scope() {
        let key = build_key(&args("super_admin", None, None), "s").unwrap();
        assert_eq!(key.department, None);
        assert!(key.college_id.is_none());
    }
}
