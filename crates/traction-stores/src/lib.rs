//! Client-side state stores over the Traction API client.
//!
//! Each store owns one resource collection exclusively, keeps its state
//! behind a `parking_lot::RwLock`, and mutates local state only after the
//! server confirms an action. Failed actions record a user-facing message
//! in the store's `error` field and clear the loading flag.

pub mod activity_store;
pub mod auth_store;
pub mod comment_store;
pub mod comment_tree;
pub mod issue_store;
pub mod label_store;
pub mod notification_store;
pub mod project_store;
pub mod team_store;
pub mod workflow_store;
pub mod workspace_store;

pub use activity_store::ActivityStore;
pub use auth_store::AuthStore;
pub use comment_store::CommentStore;
pub use issue_store::IssueStore;
pub use label_store::LabelStore;
pub use notification_store::NotificationStore;
pub use project_store::ProjectStore;
pub use team_store::TeamStore;
pub use workflow_store::WorkflowStore;
pub use workspace_store::WorkspaceStore;
