//! Sign-in, registration and profile management for Workdesk.
//!
//! [`AuthClient`] talks to the hosted auth service or, when no backend is
//! configured, to a local SQLite user directory. [`SessionManager`] owns the
//! signed-in session on top of it.

pub mod backend;
pub mod error;
pub mod local;
pub mod models;
pub mod session;
pub mod storage;
pub mod supabase;

pub use backend::AuthClient;
pub use error::AuthError;
pub use local::{LocalAuthBackend, DEMO_EMAIL, DEMO_PASSWORD};
pub use models::{AuthSession, NotificationMethod, ProfileUpdate, UserProfile};
pub use session::{SessionManager, SessionState};
pub use storage::SessionCache;
pub use supabase::SupabaseAuth;
