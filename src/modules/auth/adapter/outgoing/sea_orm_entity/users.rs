use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::auth::application::domain::entities::{ConfirmationCode, Role, User, UserId};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
    pub is_staff: bool,
    pub confirmation_code_state: String,
    pub confirmation_code_hash: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        use chrono::Utc;
        use sea_orm::ActiveValue::Set;

        if !insert {
            self.updated_at = Set(Utc::now().into());
        }

        Ok(self)
    }
}

impl Model {
    /// Fails when the row holds a role or code state the domain does not know.
    pub fn into_domain(self) -> Result<User, String> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| format!("user {}: {}", self.id, e))?;
        let confirmation_code =
            ConfirmationCode::from_parts(&self.confirmation_code_state, self.confirmation_code_hash)
                .map_err(|e| format!("user {}: {}", self.id, e))?;

        Ok(User {
            id: UserId::from(self.id),
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role,
            is_staff: self.is_staff,
            confirmation_code,
            created_at: self.created_at.with_timezone(&chrono::Utc),
            updated_at: self.updated_at.with_timezone(&chrono::Utc),
        })
    }
}

#[cfg(test)]
pub mod test_rows {
    use super::*;
    use chrono::Utc;

    pub fn user_row(username: &str, role: &str) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role: role.to_string(),
            is_staff: false,
            confirmation_code_state: ConfirmationCode::STATE_NONE.to_string(),
            confirmation_code_hash: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_rows::user_row;
    use super::*;

    #[test]
    fn maps_row_to_domain() {
        let mut row = user_row("alice", "moderator");
        row.confirmation_code_state = ConfirmationCode::STATE_PENDING.to_string();
        row.confirmation_code_hash = Some("abc".to_string());

        let user = row.clone().into_domain().unwrap();

        assert_eq!(user.id.value(), row.id);
        assert_eq!(user.role, Role::Moderator);
        assert_eq!(user.confirmation_code, ConfirmationCode::Pending("abc".into()));
    }

    #[test]
    fn unknown_role_is_corrupt() {
        assert!(user_row("alice", "superuser").into_domain().is_err());
    }

    #[test]
    fn pending_without_hash_is_corrupt() {
        let mut row = user_row("alice", "user");
        row.confirmation_code_state = ConfirmationCode::STATE_PENDING.to_string();

        assert!(row.into_domain().is_err());
    }
}
