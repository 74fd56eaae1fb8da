//! The registration page for creating an account.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, endpoints,
    auth::{PasswordHash, ValidatedPassword, create_user, set_auth_cookie},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, email_input,
        loading_spinner, log_in_register, password_input,
    },
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

fn registration_form(
    email: &str,
    email_error_message: Option<&str>,
    password_error_message: Option<&str>,
    confirm_password_error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, email_error_message))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, password_error_message))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, confirm_password_error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", None, None, None);
    let content = log_in_register("Create your account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for registering a new user.
#[derive(Deserialize)]
pub struct RegisterForm {
    /// The email address to register with.
    pub email: String,
    /// The raw password.
    pub password: String,
    /// The raw password, again, to catch typos.
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success the new user is logged in straight away: the auth cookie is set
/// and the client is redirected to the dashboard.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let email = match EmailAddress::from_str(user_data.email.trim()) {
        Ok(email) => email,
        Err(_) => {
            return registration_form(
                &user_data.email,
                Some("Enter a valid email address."),
                None,
                None,
            )
            .into_response();
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(
                &user_data.email,
                None,
                Some(error.to_string().as_ref()),
                None,
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(&user_data.email, None, None, Some("Passwords do not match"))
            .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return Error::HashingError(error.to_string()).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let user = match create_user(&email, password_hash, &connection) {
        Ok(user) => user,
        Err(Error::DuplicateEmail(email)) => {
            return registration_form(
                &email,
                Some("This email is already registered, log in with your existing password."),
                None,
                None,
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Could not create user: {error}");
            return error.into_response();
        }
    };
    drop(connection);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(updated_jar) => (
            updated_jar,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set auth cookie: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod register_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_htmx::HX_REDIRECT;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};

    use crate::{
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, user::count_users},
        db::initialize,
        endpoints,
    };

    use super::{RegistrationState, register_user};

    const STRONG_PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_server() -> (TestServer, Arc<Mutex<Connection>>) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        let state = RegistrationState {
            cookie_key: Key::from(&Sha512::digest("42")),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: conn.clone(),
        };

        let app = Router::new()
            .route(endpoints::USERS, post(register_user))
            .with_state(state);

        (
            TestServer::try_new(app).expect("Could not create test server."),
            conn,
        )
    }

    #[tokio::test]
    async fn register_creates_user_and_logs_in() {
        let (server, conn) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .form(&[
                ("email", "test@example.com"),
                ("password", STRONG_PASSWORD),
                ("confirm_password", STRONG_PASSWORD),
            ])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header(HX_REDIRECT), endpoints::DASHBOARD_VIEW);
        assert!(!response.cookie(COOKIE_TOKEN).value().is_empty());
        assert_eq!(count_users(&conn.lock().unwrap()), Ok(1));
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let (server, conn) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .form(&[
                ("email", "not an email"),
                ("password", STRONG_PASSWORD),
                ("confirm_password", STRONG_PASSWORD),
            ])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Enter a valid email address."));
        assert_eq!(count_users(&conn.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn register_rejects_weak_password() {
        let (server, conn) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .form(&[
                ("email", "test@example.com"),
                ("password", "hunter2"),
                ("confirm_password", "hunter2"),
            ])
            .await;

        response.assert_status_ok();
        assert_eq!(count_users(&conn.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let (server, conn) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .form(&[
                ("email", "test@example.com"),
                ("password", STRONG_PASSWORD),
                ("confirm_password", "a different password entirely"),
            ])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Passwords do not match"));
        assert_eq!(count_users(&conn.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let (server, _conn) = get_test_server();

        let form = [
            ("email", "test@example.com"),
            ("password", STRONG_PASSWORD),
            ("confirm_password", STRONG_PASSWORD),
        ];
        server.post(endpoints::USERS).form(&form).await;

        let response = server.post(endpoints::USERS).form(&form).await;

        response.assert_status_ok();
        assert!(response.text().contains("already registered"));
    }
}
