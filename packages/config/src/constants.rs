// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names and defaults

// Server
pub const BULLETIN_PORT: &str = "BULLETIN_PORT";
pub const PORT: &str = "PORT"; // Legacy
pub const BULLETIN_HOST: &str = "BULLETIN_HOST";
pub const DEFAULT_PORT: u16 = 4001;
pub const DEFAULT_HOST: &str = "127.0.0.1";

// Content and uploads
pub const BULLETIN_CONTENT_DIR: &str = "BULLETIN_CONTENT_DIR";
pub const BULLETIN_UPLOAD_DIR: &str = "BULLETIN_UPLOAD_DIR";
pub const DEFAULT_CONTENT_DIR: &str = "content";
pub const DEFAULT_UPLOAD_DIR: &str = "public/uploads";

// Storage backend
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const POSTGRES_URL: &str = "POSTGRES_URL"; // Legacy

// Access gate
pub const ACCESS_ADMIN_KEY: &str = "ACCESS_ADMIN_KEY";
pub const BULLETIN_COOKIE_SECURE: &str = "BULLETIN_COOKIE_SECURE";

// External answer endpoint
pub const AZURE_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const AZURE_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const AZURE_OPENAI_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const AZURE_OPENAI_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-10-21";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";
