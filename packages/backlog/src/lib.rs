// ABOUTME: Backlog store and the domain operations built on it
// ABOUTME: Initiatives, ideas and votes, access requests and codes, and the roadmap board

pub mod access;
pub mod board;
pub mod error;
pub mod ideas;
pub mod initiatives;
pub mod store;

// Re-export main types
pub use access::{authorize_admin, AccessRequestInput};
pub use board::{build_board, BoardGroup, RoadmapBoard};
pub use error::{BacklogError, BacklogResult};
pub use ideas::{IdeaPatch, NewIdea};
pub use initiatives::{InitiativePatch, InitiativeQuery, NewInitiative};
pub use store::BacklogStore;
