use crate::db::user_repository::UserRepository;
use crate::db::StoreError;
use crate::models::user::User;
use crate::utils::auth::{create_session_token, hash_password, verify_password};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Public view of a user record; the password hash stays behind.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.image.clone(),
            age: user.age,
            phone: user.phone.clone(),
            created_at: user.created_at,
        }
    }
}

fn validation_error(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = SignupResponse),
        (status = 400, description = "Invalid input or email already registered")
    ),
    tag = "Authentication"
)]
pub async fn signup(
    user_repo: web::Data<UserRepository>,
    payload: web::Json<SignupRequest>,
) -> impl Responder {
    info!(email = %payload.email, "Signup attempt");

    let name_len = payload.name.chars().count();
    if name_len < 2 || name_len > 60 {
        return validation_error("Name must be between 2 and 60 characters");
    }
    if !payload.email.contains('@') {
        return validation_error("Invalid email address");
    }
    if payload.password.len() < 8 {
        return validation_error("Password must be at least 8 characters");
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = ?e, "Failed to hash password");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal Server Error"
            }));
        }
    };

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name.clone(),
        email: payload.email.clone(),
        password_hash,
        image: None,
        age: None,
        phone: None,
        created_at: chrono::Utc::now(),
    };

    let user = match user_repo.create(user).await {
        Ok(u) => u,
        Err(StoreError::Conflict) => {
            warn!(email = %payload.email, "Signup failed: email already registered");
            return validation_error("User already exists");
        }
        Err(e) => {
            error!(error = %e, "Failed to create user in store");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal Server Error"
            }));
        }
    };

    info!(user_id = %user.id, "User registered successfully");

    HttpResponse::Created().json(SignupResponse {
        message: "User created successfully".to_string(),
        user_id: user.id,
    })
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Authentication"
)]
pub async fn login(
    user_repo: web::Data<UserRepository>,
    payload: web::Json<LoginRequest>,
) -> impl Responder {
    info!(email = %payload.email, "Login attempt");

    let user = match user_repo.get_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            // Same response as a bad password so callers cannot probe
            // which emails exist
            warn!(email = %payload.email, "Login failed: unknown email");
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid credentials"
            }));
        }
        Err(e) => {
            error!(error = %e, "Store error during login");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal Server Error"
            }));
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(email = %payload.email, "Login failed: invalid credentials");
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid credentials"
        }));
    }

    let token = match create_session_token(&user) {
        Ok(t) => t,
        Err(e) => {
            error!(error = ?e, user_id = %user.id, "Failed to mint session token");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal Server Error"
            }));
        }
    };

    info!(user_id = %user.id, "User logged in successfully");

    HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use actix_web::{test, App};

    fn repo() -> web::Data<UserRepository> {
        web::Data::new(UserRepository::new(Database::temporary().unwrap()))
    }

    fn signup_body(name: &str, email: &str, password: &str) -> serde_json::Value {
        serde_json::json!({ "name": name, "email": email, "password": password })
    }

    #[actix_web::test]
    async fn test_signup_then_login() {
        let repo = repo();
        let app = test::init_service(
            App::new()
                .app_data(repo.clone())
                .route("/api/auth/signup", web::post().to(signup))
                .route("/api/auth/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body("Alice", "alice@example.com", "hunter2hunter2"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "User created successfully");
        let user_id = body["userId"].as_str().unwrap().to_string();

        // Stored password is hashed, never the plaintext
        let stored = repo
            .get_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, user_id);
        assert_ne!(stored.password_hash, "hunter2hunter2");

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({
                "email": "alice@example.com",
                "password": "hunter2hunter2"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(!body["token"].as_str().unwrap().is_empty());
        assert_eq!(body["user"]["email"], "alice@example.com");
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[actix_web::test]
    async fn test_duplicate_signup_conflicts() {
        let app = test::init_service(
            App::new()
                .app_data(repo())
                .route("/api/auth/signup", web::post().to(signup)),
        )
        .await;

        let payload = signup_body("Bob", "bob@example.com", "password123");
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(payload.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "User already exists");
    }

    #[actix_web::test]
    async fn test_signup_validation() {
        let app = test::init_service(
            App::new()
                .app_data(repo())
                .route("/api/auth/signup", web::post().to(signup)),
        )
        .await;

        for payload in [
            signup_body("A", "short-name@example.com", "password123"),
            signup_body("No At Sign", "not-an-email", "password123"),
            signup_body("Short Pass", "short@example.com", "abc"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert!(body["error"].is_string());
        }
    }

    #[actix_web::test]
    async fn test_login_rejects_bad_credentials() {
        let app = test::init_service(
            App::new()
                .app_data(repo())
                .route("/api/auth/signup", web::post().to(signup))
                .route("/api/auth/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body("Carol", "carol@example.com", "password123"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        // Wrong password and unknown email look identical
        for (email, password) in [
            ("carol@example.com", "wrong-password"),
            ("nobody@example.com", "password123"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(serde_json::json!({ "email": email, "password": password }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 401);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Invalid credentials");
        }
    }
}
