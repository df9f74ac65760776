//! Refresh-token entity and the derived session view.

pub mod model;
pub mod view;

pub use model::{NewRefreshToken, RefreshToken};
pub use view::SessionView;
