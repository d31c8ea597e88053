//! Client side of the bulletin board: model types, paging, form rules and
//! the comment/edit flows, written against the [`BoardStore`] and
//! [`AuthClient`] seams so the same logic drives the command line and the
//! web front end.

pub mod comments;
pub mod edit_guard;
pub mod error;
pub mod messages;
pub mod model;
pub mod ownership;
pub mod pagination;
pub mod posts;
pub mod session;
pub mod settings;
pub mod store;
pub mod validation;

#[cfg(feature = "native")]
mod http_client;

#[cfg(test)]
mod test_support;

pub use comments::{CommentThread, DeleteOutcome};
pub use edit_guard::{EditGate, SaveError, edit_gate, load_edit_gate, save_edit};
pub use error::BoardClientError;
pub use model::{Comment, CurrentUser, Post, PostDraft, display_label};
pub use ownership::is_owner;
pub use pagination::{POSTS_PER_PAGE, Paginator};
pub use session::{Session, Subscription};
pub use settings::{AppSettings, MemoryPreferences, PreferenceStore, Theme};
pub use store::{AuthClient, BoardStore};

#[cfg(feature = "native")]
pub use http_client::{AuthResponse, BoardClientHttp};
#[cfg(feature = "native")]
pub use settings::FilePreferences;
