pub const START_URL: &str = "/";
pub const QUIZ_URL: &str = "/quiz";
pub const REMARKS_URL: &str = "/remarks";
pub const FOCUS_URL: &str = "/focus";
pub const REPORT_URL: &str = "/report";

pub const SESSION_COOKIE_NAME: &str = "quiz_session";

pub fn session_cookie(value: &str) -> String {
    format!("{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax")
}
