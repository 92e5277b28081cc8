use crate::{helper_model, methods, model, POOL};
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use diesel::{BoolExpressionMethods, ExpressionMethods, QueryDsl, RunQueryDsl};
use regex::Regex;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::reply::with_status;
use warp::{Filter, Reply};

#[derive(Deserialize, Serialize, Clone, Debug)]
struct CreateUserData {
    name: String,
    email: String,
    password: String,
    phone: String,
}

fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 {
        return false;
    }
    lazy_static::lazy_static! {
        static ref EMAIL_REGEX: Regex = Regex::new(
            r"(?i)^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9-](?:[a-z0-9-]{0,61}[a-z0-9])+(?:\.[a-z0-9-](?:[a-z0-9-]{0,61}[a-z0-9])+)+$"
        ).expect("Invalid regex");
    }
    EMAIL_REGEX.is_match(email)
}

fn is_valid_phone_number(phone: &str) -> bool {
    lazy_static::lazy_static! {
        static ref PHONE_REGEX: Regex = Regex::new(
            r"^\d{10}$"  // Exactly 10 digits
        ).expect("Invalid phone number regex");
    }
    PHONE_REGEX.is_match(phone)
}

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("create")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method, user_create_data: CreateUserData, user_agent: String| {
                if method != Method::POST {
                    return methods::standard_replies::method_not_allowed_response();
                }
                use crate::schema::users::dsl::*;
                let mut pool = POOL.get().unwrap();

                let email_clone = user_create_data.email.clone();
                let phone_clone = user_create_data.phone.clone();

                if !is_valid_email(&user_create_data.email)
                    || !is_valid_phone_number(&user_create_data.phone)
                {
                    return methods::standard_replies::bad_request(
                        "Please check your email and phone number format",
                    );
                }
                let existing = users
                    .filter(email.eq(&email_clone).or(phone.eq(&phone_clone)))
                    .get_result::<model::User>(&mut pool);
                match existing {
                    Ok(_user) => {
                        // credential existed
                        let error_msg = helper_model::ErrorResponse {
                            title: String::from("Conflict"),
                            message: String::from("Email or phone number already exists"),
                        };
                        Ok::<_, warp::Rejection>((with_status(
                            warp::reply::json(&error_msg),
                            StatusCode::CONFLICT,
                        )
                        .into_response(),))
                    }
                    Err(_) => {
                        let hashed_password = match hash(&user_create_data.password, DEFAULT_COST)
                        {
                            Ok(hashed) => hashed,
                            Err(_) => {
                                return methods::standard_replies::internal_server_error_response(
                                    String::from("user/create: Password hash error"),
                                );
                            }
                        };
                        let new_user = model::NewUser {
                            name: user_create_data.name.clone(),
                            email: email_clone,
                            password: hashed_password,
                            phone: phone_clone,
                            role: model::UserRole::Guest,
                            created_at: Utc::now(),
                        };
                        let inserted = diesel::insert_into(users)
                            .values(&new_user)
                            .get_result::<model::User>(&mut pool);
                        let Ok(inserted) = inserted else {
                            return methods::standard_replies::internal_server_error_response(
                                String::from("user/create: SQL error inserting user"),
                            );
                        };

                        let new_token = methods::tokens::gen_token_object(&inserted.id, &user_agent);
                        use crate::schema::access_tokens::dsl::access_tokens;
                        let token_result = diesel::insert_into(access_tokens)
                            .values(&new_token)
                            .get_result::<model::AccessToken>(&mut pool);
                        let Ok(token_row) = token_result else {
                            return methods::standard_replies::internal_server_error_response(
                                String::from("user/create: SQL error inserting access token"),
                            );
                        };

                        let user_msg = serde_json::json!({
                            "user": inserted.to_publish_user(),
                            "access_token": token_row.to_publish_access_token(),
                        });
                        methods::standard_replies::response_with_obj(user_msg, StatusCode::CREATED)
                    }
                }
            },
        )
}
