use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::auth::credentials::{hash_password, verify_password};
use crate::errors::{is_unique_violation, AppError};
use crate::models::user::{OAuthProvider, UserRow, UserType};
use crate::oauth::OAuthUserInfo;

/// Fields required to open a student account.
#[derive(Debug, Deserialize)]
pub struct StudentSignup {
    pub email: String,
    pub password: String,
    pub course_name: String,
    pub course_generation: String,
    pub tech_stack: String,
}

/// Fields required to open a company account.
#[derive(Debug, Deserialize)]
pub struct CompanySignup {
    pub email: String,
    pub password: String,
    pub company_name: String,
    pub industry: String,
    pub size: String,
    pub intro: String,
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "email must be a valid email address".to_string(),
        ));
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Creates a student account: the `users` row and its `student_profile`
/// commit together or not at all. A duplicate email surfaces as the
/// `users.email` unique constraint, never as a pre-read.
pub async fn register_student(pool: &PgPool, signup: StudentSignup) -> Result<UserRow, AppError> {
    validate_email(&signup.email)?;
    validate_non_empty("password", &signup.password)?;
    validate_non_empty("course_name", &signup.course_name)?;
    validate_non_empty("course_generation", &signup.course_generation)?;
    validate_non_empty("tech_stack", &signup.tech_stack)?;

    let password_hash = hash_password(&signup.password)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, password_hash, user_type)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&signup.email)
    .bind(&password_hash)
    .bind(UserType::Student)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::DuplicateEmail
        } else {
            AppError::Database(e)
        }
    })?;

    sqlx::query(
        r#"
        INSERT INTO student_profile (user_id, course_name, course_generation, tech_stack)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user.id)
    .bind(&signup.course_name)
    .bind(&signup.course_generation)
    .bind(&signup.tech_stack)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Registered student account {} ({})", user.id, user.email);
    Ok(user)
}

/// Creates a company account, mirroring `register_student`.
pub async fn register_company(pool: &PgPool, signup: CompanySignup) -> Result<UserRow, AppError> {
    validate_email(&signup.email)?;
    validate_non_empty("password", &signup.password)?;
    validate_non_empty("company_name", &signup.company_name)?;
    validate_non_empty("industry", &signup.industry)?;
    validate_non_empty("size", &signup.size)?;

    let password_hash = hash_password(&signup.password)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, password_hash, user_type)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&signup.email)
    .bind(&password_hash)
    .bind(UserType::Company)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::DuplicateEmail
        } else {
            AppError::Database(e)
        }
    })?;

    sqlx::query(
        r#"
        INSERT INTO company_profile (user_id, company_name, industry, size, intro)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user.id)
    .bind(&signup.company_name)
    .bind(&signup.industry)
    .bind(&signup.size)
    .bind(&signup.intro)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Registered company account {} ({})", user.id, user.email);
    Ok(user)
}

/// Verifies email + password and returns the account.
/// Lookup miss, OAuth-only account, and wrong password all collapse into
/// the same `InvalidCredentials` so responses don't leak which emails exist.
pub async fn login(pool: &PgPool, email: &str, password: &str) -> Result<UserRow, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    let user = user.ok_or(AppError::InvalidCredentials)?;
    let digest = user
        .password_hash
        .as_deref()
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, digest) {
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

/// Resolves an OAuth sign-in to an account, creating one if needed.
/// Three tiers inside one transaction:
///   1. `(provider, oauth_id)` already known: refresh name/image and return.
///   2. An account with the same email exists: attach the OAuth identity,
///      but only when the provider asserts the email is verified.
///   3. Otherwise insert a fresh passwordless student account.
/// The boolean is true when tier 3 created the row.
pub async fn get_or_create_oauth_user(
    pool: &PgPool,
    provider: OAuthProvider,
    info: OAuthUserInfo,
) -> Result<(UserRow, bool), AppError> {
    let mut tx = pool.begin().await?;

    // Tier 1: returning visitor.
    let existing = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET name = COALESCE($3, name),
            profile_image = COALESCE($4, profile_image),
            updated_at = now()
        WHERE oauth_provider = $1 AND oauth_id = $2
        RETURNING *
        "#,
    )
    .bind(provider)
    .bind(&info.id)
    .bind(&info.name)
    .bind(&info.picture)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some(user) = existing {
        tx.commit().await?;
        return Ok((user, false));
    }

    // Tier 2: link to an account registered with the same email address.
    // Requires the provider to have verified the address, otherwise anyone
    // able to claim an email at the provider could take over the account.
    if let Some(email) = info.email.as_deref() {
        let by_email = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(account) = by_email {
            if !info.email_verified {
                return Err(AppError::Validation(format!(
                    "cannot link {} sign-in: the provider has not verified {email}",
                    provider.as_str()
                )));
            }

            let user = sqlx::query_as::<_, UserRow>(
                r#"
                UPDATE users
                SET oauth_provider = $2,
                    oauth_id = $3,
                    name = COALESCE($4, name),
                    profile_image = COALESCE($5, profile_image),
                    updated_at = now()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(account.id)
            .bind(provider)
            .bind(&info.id)
            .bind(&info.name)
            .bind(&info.picture)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            info!(
                "Linked {} identity to existing account {}",
                provider.as_str(),
                user.id
            );
            return Ok((user, false));
        }
    }

    // Tier 3: first visit. OAuth accounts default to the student role.
    let email = info.email.clone().ok_or_else(|| {
        AppError::Validation(format!(
            "{} did not supply an email address for this account",
            provider.as_str()
        ))
    })?;

    let inserted = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, user_type, oauth_provider, oauth_id, name, profile_image)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(UserType::Student)
    .bind(provider)
    .bind(&info.id)
    .bind(&info.name)
    .bind(&info.picture)
    .fetch_one(&mut *tx)
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            // A concurrent first sign-in won the insert race. When the winner
            // carries this exact identity its row is the caller's account;
            // only an email held by some other account is a real duplicate.
            tx.rollback().await?;
            let existing = sqlx::query_as::<_, UserRow>(
                "SELECT * FROM users WHERE oauth_provider = $1 AND oauth_id = $2",
            )
            .bind(provider)
            .bind(&info.id)
            .fetch_optional(pool)
            .await?;
            return match existing {
                Some(user) => Ok((user, false)),
                None => Err(AppError::DuplicateEmail),
            };
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await?;

    info!(
        "Created {} account {} via {}",
        user.user_type.as_str(),
        user.id,
        provider.as_str()
    );
    Ok((user, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation_rejects_bad_addresses() {
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b.c").is_ok());
    }

    #[test]
    fn test_non_empty_validation_names_the_field() {
        let err = validate_non_empty("password", "  ").unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("password")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    fn student_signup(email: &str) -> StudentSignup {
        StudentSignup {
            email: email.to_string(),
            password: "hunter2".to_string(),
            course_name: "Backend school".to_string(),
            course_generation: "3".to_string(),
            tech_stack: "Rust, Axum".to_string(),
        }
    }

    fn company_signup(email: &str) -> CompanySignup {
        CompanySignup {
            email: email.to_string(),
            password: "hunter2".to_string(),
            company_name: "Acme".to_string(),
            industry: "Software".to_string(),
            size: "11-50".to_string(),
            intro: "We build things".to_string(),
        }
    }

    fn provider_identity(id: &str, email: Option<&str>, verified: bool) -> OAuthUserInfo {
        OAuthUserInfo {
            id: id.to_string(),
            email: email.map(str::to_string),
            email_verified: verified,
            name: Some("Jan".to_string()),
            picture: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_signup_commits_user_and_profile_together(pool: PgPool) {
        let user = register_student(&pool, student_signup("s@example.com"))
            .await
            .unwrap();

        assert_eq!(user.user_type, UserType::Student);
        let profiles: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM student_profile WHERE user_id = $1")
                .bind(user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(profiles, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_email_is_unique_across_both_populations(pool: PgPool) {
        register_student(&pool, student_signup("taken@example.com"))
            .await
            .unwrap();

        let err = register_company(&pool, company_signup("taken@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind("taken@example.com")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_login_succeeds_with_the_right_password(pool: PgPool) {
        let created = register_student(&pool, student_signup("s@example.com"))
            .await
            .unwrap();

        let user = login(&pool, "s@example.com", "hunter2").await.unwrap();
        assert_eq!(user.id, created.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_login_failures_are_indistinguishable(pool: PgPool) {
        register_student(&pool, student_signup("s@example.com"))
            .await
            .unwrap();

        let unknown = login(&pool, "ghost@example.com", "hunter2")
            .await
            .unwrap_err();
        let wrong = login(&pool, "s@example.com", "wrong-password")
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_first_oauth_login_creates_a_student_account(pool: PgPool) {
        let (user, is_new) = get_or_create_oauth_user(
            &pool,
            OAuthProvider::Google,
            provider_identity("ext-1", Some("new@example.com"), true),
        )
        .await
        .unwrap();

        assert!(is_new);
        assert_eq!(user.user_type, UserType::Student);
        assert_eq!(user.email, "new@example.com");
        assert!(user.password_hash.is_none());

        // a passwordless account has nothing for password login to check
        let err = login(&pool, "new@example.com", "anything")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_returning_oauth_login_reuses_the_account(pool: PgPool) {
        let (created, _) = get_or_create_oauth_user(
            &pool,
            OAuthProvider::Google,
            provider_identity("ext-1", Some("s@example.com"), true),
        )
        .await
        .unwrap();

        let (user, is_new) = get_or_create_oauth_user(
            &pool,
            OAuthProvider::Google,
            provider_identity("ext-1", Some("s@example.com"), true),
        )
        .await
        .unwrap();

        assert!(!is_new);
        assert_eq!(user.id, created.id);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_verified_email_adopts_the_password_account(pool: PgPool) {
        let created = register_student(&pool, student_signup("s@example.com"))
            .await
            .unwrap();

        let (user, is_new) = get_or_create_oauth_user(
            &pool,
            OAuthProvider::Kakao,
            provider_identity("ext-7", Some("s@example.com"), true),
        )
        .await
        .unwrap();

        assert!(!is_new);
        assert_eq!(user.id, created.id);
        assert_eq!(user.oauth_provider, Some(OAuthProvider::Kakao));
        assert!(user.password_hash.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unverified_email_cannot_adopt_the_password_account(pool: PgPool) {
        let created = register_student(&pool, student_signup("s@example.com"))
            .await
            .unwrap();

        let err = get_or_create_oauth_user(
            &pool,
            OAuthProvider::Kakao,
            provider_identity("ext-7", Some("s@example.com"), false),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(created.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(row.oauth_provider.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_racing_first_logins_converge_on_one_account(pool: PgPool) {
        use std::time::Duration;

        // An uncommitted conflicting signup holds the unique index entries,
        // so the sign-in below blocks on its insert until the commit lands
        // and then sees the violation.
        let mut winner = pool.begin().await.unwrap();
        sqlx::query(
            "INSERT INTO users (email, user_type, oauth_provider, oauth_id, name) \
             VALUES ($1, 'student', $2, $3, 'Jan')",
        )
        .bind("racer@example.com")
        .bind(OAuthProvider::Google)
        .bind("ext-9")
        .execute(&mut *winner)
        .await
        .unwrap();

        let racing_login = tokio::spawn({
            let pool = pool.clone();
            async move {
                get_or_create_oauth_user(
                    &pool,
                    OAuthProvider::Google,
                    provider_identity("ext-9", Some("racer@example.com"), true),
                )
                .await
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        winner.commit().await.unwrap();

        let (user, is_new) = racing_login.await.unwrap().unwrap();
        assert!(!is_new);
        assert_eq!(user.email, "racer@example.com");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
