use diesel::prelude::*;

use crate::helper_model::DriveshareError;
use crate::model::User;
use crate::POOL;

pub fn get_user_by_id(user_id: &i32) -> Result<User, DriveshareError> {
    use crate::schema::users::dsl::*;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    users
        .filter(id.eq(user_id))
        .get_result::<User>(&mut pool)
        .map_err(|e| DriveshareError::Internal(e.to_string()))
}

pub fn get_user_by_email(email_in: &str) -> Result<Option<User>, DriveshareError> {
    use crate::schema::users::dsl::*;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    users
        .filter(email.eq(email_in))
        .first::<User>(&mut pool)
        .optional()
        .map_err(|e| DriveshareError::Internal(e.to_string()))
}

/// The host record the partner user operates, if any. Partner-only
/// endpoints key their ownership checks on this.
pub fn get_host_for_user(user_id_in: &i32) -> Result<Option<crate::model::Host>, DriveshareError> {
    use crate::schema::hosts::dsl::*;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    hosts
        .filter(user_id.eq(user_id_in))
        .first::<crate::model::Host>(&mut pool)
        .optional()
        .map_err(|e| DriveshareError::Internal(e.to_string()))
}
