use chrono::Utc;
use uuid::Uuid;

use crate::domain::credential::{display_name_from_email, normalize_email};
use crate::domain::repository::TenantRepository;
use crate::domain::types::{DEFAULT_USER_TYPE, RequestMeta, SessionUser, TenantUser};
use crate::error::AuthServiceError;
use crate::usecase::session::{IssuedSession, SessionService};

pub struct SignInInput {
    pub email: String,
    pub meta: RequestMeta,
    pub remember_me: bool,
}

#[derive(Debug)]
pub struct SignInOutput {
    pub session: IssuedSession,
    pub user: SessionUser,
    pub created: bool,
}

/// Turns a verified email into a session, creating the tenant user on first login.
pub struct SignInUseCase<R>
where
    R: TenantRepository,
{
    pub sessions: SessionService<R>,
}

impl<R> SignInUseCase<R>
where
    R: TenantRepository,
{
    pub async fn execute(&self, input: SignInInput) -> Result<SignInOutput, AuthServiceError> {
        let email = normalize_email(&input.email);
        let (user, created) = self.find_or_create_user(&email).await?;
        let session = self
            .sessions
            .create_session(&user, &input.meta, input.remember_me)
            .await?;
        Ok(SignInOutput {
            session,
            user: SessionUser::from(&user),
            created,
        })
    }

    async fn find_or_create_user(
        &self,
        email: &str,
    ) -> Result<(TenantUser, bool), AuthServiceError> {
        let repo = &self.sessions.repo;
        if let Some(user) = repo.find_user_by_email(email).await? {
            return Ok((user, false));
        }

        let now = Utc::now();
        let user = TenantUser {
            id: Uuid::new_v4(),
            auth_id: Uuid::new_v4(),
            email: email.to_owned(),
            display_name: display_name_from_email(email),
            avatar_url: None,
            user_type: DEFAULT_USER_TYPE.to_owned(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        match repo.create_user(&user).await {
            Ok(()) => {
                tracing::info!(tenant = %repo.tenant(), user_id = %user.id, "user created");
                Ok((user, true))
            }
            // Lost a race against a concurrent first login for the same address.
            Err(e) => match repo.find_user_by_email(email).await? {
                Some(existing) => Ok((existing, false)),
                None => Err(e),
            },
        }
    }
}
