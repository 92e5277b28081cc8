use crate::model::{AccessToken, User};
use crate::schema::access_tokens::dsl::access_tokens;
use crate::{methods, POOL};
use bcrypt::verify;
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::Filter;

#[derive(Deserialize, Serialize, Clone)]
struct LoginData {
    email: String,
    password: String,
}

pub fn main() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("login")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method, login_data: LoginData, user_agent: String| {
                if method != Method::POST {
                    return methods::standard_replies::method_not_allowed_response();
                }
                use crate::schema::users::dsl::*;
                let mut pool = POOL.get().unwrap();
                let input_email = login_data.email.clone();
                let result = users
                    .filter(email.eq(&login_data.email))
                    .get_result::<User>(&mut pool);

                match result {
                    Ok(user) => {
                        if verify(&login_data.password, &user.password).unwrap_or(false) {
                            // user and password is verified
                            let new_access_token =
                                methods::tokens::gen_token_object(&user.id, &user_agent);
                            let insert_token_result = diesel::insert_into(access_tokens)
                                .values(&new_access_token)
                                .get_result::<AccessToken>(&mut pool);
                            let Ok(token_row) = insert_token_result else {
                                return methods::standard_replies::internal_server_error_response(
                                    String::from("user/login: SQL error inserting access token"),
                                );
                            };
                            let user_msg = serde_json::json!({
                                "user": user.to_publish_user(),
                                "access_token": token_row.to_publish_access_token(),
                            });
                            methods::standard_replies::response_with_obj(user_msg, StatusCode::OK)
                        } else {
                            let error_msg =
                                serde_json::json!({"email": &input_email, "error": "Credentials invalid"});
                            methods::standard_replies::response_with_obj(
                                error_msg,
                                StatusCode::FORBIDDEN,
                            )
                        }
                    }
                    Err(_) => {
                        let error_msg =
                            serde_json::json!({"email": &input_email, "error": "Credentials invalid"});
                        methods::standard_replies::response_with_obj(error_msg, StatusCode::FORBIDDEN)
                    }
                }
            },
        )
}
