use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::application::domain::entities::{ConfirmationCode, User, UserId};
use crate::shared::db::is_unique_violation;
use crate::auth::application::ports::outgoing::{
    CreateUserData, UpdateUserData, UserRepository, UserRepositoryError,
};

use super::sea_orm_entity::users::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as UserEntity, Model as UserModel,
};

#[derive(Clone, Debug)]
pub struct UserRepositoryPostgres {
    db: Arc<DatabaseConnection>,
}

impl UserRepositoryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn map_write_err(e: DbErr) -> UserRepositoryError {
    if is_unique_violation(&e) {
        // users_email_key / users_username_key
        if e.to_string().to_lowercase().contains("email") {
            return UserRepositoryError::EmailTaken;
        }
        return UserRepositoryError::UsernameTaken;
    }
    UserRepositoryError::DatabaseError(e.to_string())
}

fn to_domain(model: UserModel) -> Result<User, UserRepositoryError> {
    model.into_domain().map_err(UserRepositoryError::DatabaseError)
}

#[async_trait]
impl UserRepository for UserRepositoryPostgres {
    async fn create_user(&self, data: CreateUserData) -> Result<User, UserRepositoryError> {
        let active_user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(data.username),
            email: Set(data.email),
            first_name: Set(data.first_name),
            last_name: Set(data.last_name),
            bio: Set(data.bio),
            role: Set(data.role.as_str().to_string()),
            is_staff: Set(data.is_staff),
            confirmation_code_state: Set(ConfirmationCode::STATE_NONE.to_string()),
            confirmation_code_hash: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
        };

        let inserted = active_user.insert(&*self.db).await.map_err(map_write_err)?;
        to_domain(inserted)
    }

    async fn update_user(
        &self,
        user_id: UserId,
        data: UpdateUserData,
    ) -> Result<User, UserRepositoryError> {
        let id: Uuid = user_id.into();
        let user = UserEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(|e| UserRepositoryError::DatabaseError(e.to_string()))?
            .ok_or(UserRepositoryError::UserNotFound)?;

        let mut active_user: UserActiveModel = user.into();
        if let Some(username) = data.username {
            active_user.username = Set(username);
        }
        if let Some(email) = data.email {
            active_user.email = Set(email);
        }
        if let Some(first_name) = data.first_name {
            active_user.first_name = Set(first_name);
        }
        if let Some(last_name) = data.last_name {
            active_user.last_name = Set(last_name);
        }
        if let Some(bio) = data.bio {
            active_user.bio = Set(bio);
        }
        if let Some(role) = data.role {
            active_user.role = Set(role.as_str().to_string());
        }

        let updated = active_user.update(&*self.db).await.map_err(map_write_err)?;
        to_domain(updated)
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), UserRepositoryError> {
        let id: Uuid = user_id.into();
        let result = UserEntity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(|e| UserRepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(UserRepositoryError::UserNotFound);
        }
        Ok(())
    }

    async fn issue_confirmation_code(
        &self,
        user_id: UserId,
        code_hash: String,
    ) -> Result<(), UserRepositoryError> {
        let id: Uuid = user_id.into();
        let result = UserEntity::update_many()
            .col_expr(
                UserColumn::ConfirmationCodeState,
                Expr::value(ConfirmationCode::STATE_PENDING),
            )
            .col_expr(UserColumn::ConfirmationCodeHash, Expr::value(code_hash))
            .col_expr(UserColumn::UpdatedAt, Expr::current_timestamp().into())
            .filter(UserColumn::Id.eq(id))
            .exec(&*self.db)
            .await
            .map_err(|e| UserRepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(UserRepositoryError::UserNotFound);
        }
        Ok(())
    }

    async fn redeem_confirmation_code(
        &self,
        user_id: UserId,
        code_hash: &str,
    ) -> Result<bool, UserRepositoryError> {
        let id: Uuid = user_id.into();
        // Check and consume in one statement; concurrent attempts race on the row lock.
        let result = UserEntity::update_many()
            .col_expr(
                UserColumn::ConfirmationCodeState,
                Expr::value(ConfirmationCode::STATE_CONSUMED),
            )
            .col_expr(
                UserColumn::ConfirmationCodeHash,
                Expr::value(Option::<String>::None),
            )
            .col_expr(UserColumn::UpdatedAt, Expr::current_timestamp().into())
            .filter(UserColumn::Id.eq(id))
            .filter(UserColumn::ConfirmationCodeState.eq(ConfirmationCode::STATE_PENDING))
            .filter(UserColumn::ConfirmationCodeHash.eq(code_hash))
            .exec(&*self.db)
            .await
            .map_err(|e| UserRepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    async fn invalidate_confirmation_code(
        &self,
        user_id: UserId,
    ) -> Result<(), UserRepositoryError> {
        let id: Uuid = user_id.into();
        let result = UserEntity::update_many()
            .col_expr(
                UserColumn::ConfirmationCodeState,
                Expr::value(ConfirmationCode::STATE_CONSUMED),
            )
            .col_expr(
                UserColumn::ConfirmationCodeHash,
                Expr::value(Option::<String>::None),
            )
            .col_expr(UserColumn::UpdatedAt, Expr::current_timestamp().into())
            .filter(UserColumn::Id.eq(id))
            .exec(&*self.db)
            .await
            .map_err(|e| UserRepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(UserRepositoryError::UserNotFound);
        }
        Ok(())
    }
}
