//! # File level api
//!
//! Builders that open PNG carrier files, run the in-memory codec on them and write the
//! results back to disk.
//!
//! ```rust,no_run
//! use stegano_span_core::api;
//!
//! let hidden = api::hide::prepare()
//!     .with_message("Hello, World!")
//!     .from_image_folder("carriers/")
//!     .using_password("SuperSecret42")
//!     .execute()
//!     .expect("Failed to hide message in images");
//!
//! let messages = api::unveil::prepare()
//!     .from_image_folder("carriers/")
//!     .using_password("SuperSecret42")
//!     .execute()
//!     .expect("Failed to unveil messages");
//! assert_eq!(messages[0].message_id, hidden.message_id);
//! ```

pub mod capacity;
pub mod hide;
pub mod shared;
pub mod unveil;

pub use shared::Password;
