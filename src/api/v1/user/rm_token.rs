use crate::helper_model::DriveshareError;
use crate::{methods, model};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("rm-token")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::header::<String>("auth"))
        .and_then(async move |method: Method, auth: String| {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }

            let token_and_id = auth.split("$").collect::<Vec<&str>>();
            if token_and_id.len() != 2 {
                return methods::tokens::token_invalid_return();
            }
            let user_id = match token_and_id[1].parse::<i32>() {
                Ok(int) => int,
                Err(_) => {
                    return methods::tokens::token_invalid_return();
                }
            };
            let access_token = model::RequestToken {
                user_id,
                token: String::from(token_and_id[0]),
            };
            match methods::tokens::verify_user_token(&access_token.user_id, &access_token.token) {
                Err(DriveshareError::TokenFormatError) => {
                    return methods::tokens::token_not_hex_warp_return();
                }
                Err(DriveshareError::InvalidToken) => {
                    return methods::tokens::token_invalid_return();
                }
                Err(_) => {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("user/rm-token: Token verification unexpected error"),
                    );
                }
                Ok(_row) => {}
            }

            let binary_token = match hex::decode(&access_token.token) {
                Ok(binary) => binary,
                Err(_) => {
                    return methods::tokens::token_not_hex_warp_return();
                }
            };
            if methods::tokens::rm_token_by_binary(binary_token).is_none() {
                return methods::standard_replies::internal_server_error_response(String::from(
                    "user/rm-token: SQL error removing token",
                ));
            }
            let reply = serde_json::json!({"signed_out": true});
            methods::standard_replies::response_with_obj(reply, StatusCode::OK)
        })
}
