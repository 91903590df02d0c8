//! # geomemo
//!
//! Storage core for a location-tagged memory app: users register with
//! email/password, save "memories" (a photo, a GPS coordinate, an
//! optional message), browse them newest-first, and get a discovery
//! feed sampled from other users' memories.
//!
//! ## Architecture
//!
//! - **SQLite backend** - memories, credentials, and the persisted
//!   session, with additive schema migrations
//! - **Preferences file** - JSON mirror of the logged-in user
//! - **Store facade** - [`MemoryStore`] wires the backends together;
//!   every attributed operation takes an explicit [`Session`]
//! - **Feed sampling** - [`feed::pick_random_feed`], pure over a
//!   caller-provided random source
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geomemo::{Config, MemoryStore, NewMemory, Session};
//!
//! let store = MemoryStore::new(Config::default())?;
//!
//! store.credentials().register("a@x.com", "hunter2")?;
//! let session = Session::for_user("a@x.com");
//! store.session().set_current_user("a@x.com")?;
//!
//! let memory = NewMemory::new(jpeg_bytes, 38.7223, -9.1393)
//!     .with_message("rossio at dusk");
//! store.save_memory(memory, &session)?;
//!
//! let candidates = store.discover_candidates(&session)?;
//! let feed = geomemo::feed::pick_random_feed(candidates, 4, &mut rand::thread_rng());
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod feed;
pub mod memory;
pub mod session;
pub mod storage;

pub use auth::CredentialStore;
pub use config::Config;
pub use error::{Error, Result};
pub use memory::{MemoryRecord, MemoryStore, NewMemory};
pub use session::{Session, SessionStore};
