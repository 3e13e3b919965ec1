//! A view-model that loads cards grouped by categories progressively.
//!
//! [`CardsByCategories`] fetches the list of categories first, then pages of cards per category,
//! tracking the status of every card slot with an [`AsyncStatus`].
//! The results are written to a [`CardsState`] owned by the host,
//! such as [`ObservableCardsState`] whose changes can be observed with listeners.
mod async_status;
mod cards_state;
mod engine;
mod error;
mod memory;
mod options;
mod state;
mod structural_map;
mod subscription;

pub use async_status::*;
pub use cards_state::*;
pub use engine::*;
pub use error::*;
pub use memory::*;
pub use options::*;
pub use state::*;
pub use structural_map::*;
pub use subscription::*;
