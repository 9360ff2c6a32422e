// Server routes
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const CHAT_ENDPOINT: &str = "/chat";
pub const LOGIN_ENDPOINT: &str = "/login";
pub const REGISTER_ENDPOINT: &str = "/register";
pub const LOGOUT_ENDPOINT: &str = "/logout";
pub const LANDING_ROUTE: &str = "/index";

// Success sentinels sent by the server in `message`
pub const LOGIN_SUCCESS: &str = "Login successful";
pub const REGISTER_SUCCESS: &str = "Registration successful";

// Alert copy
pub const LOGIN_REJECTED: &str = "Login failed";
pub const LOGIN_MISMATCH: &str = "Invalid username or password";
pub const LOGIN_CATCH_ALL: &str = "Login failed. Please try again.";
pub const REGISTER_REJECTED: &str = "Registration failed";
pub const REGISTER_MISMATCH: &str = "Username already exists";
pub const REGISTER_CATCH_ALL: &str = "Registration failed. Please try again.";
pub const CHAT_CATCH_ALL: &str = "Chat failed. Please try again.";

pub const API_CALL_LOG_TARGET: &str = "api_calls";
