use serde::{Deserialize, Serialize};

use crate::OptionsError;

/// Page sizes used by [`CardsByCategories`](crate::CardsByCategories).
///
/// Deserializing fills missing fields with their defaults,
/// so a host can keep a partial section in its own configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Categories whose first cards are requested by `preload`.
    pub number_of_categories_to_preload: usize,
    /// Cards requested for each category when it is first loaded.
    pub number_of_cards_to_preload: usize,
    /// Categories requested by each `load_more_categories`.
    pub number_of_load_more_categories: usize,
    /// Cards requested by each `load_more_cards`.
    pub number_of_load_more_cards: usize,
}

impl Options {
    pub const DEFAULT: Self = Self {
        number_of_categories_to_preload: 3,
        number_of_cards_to_preload: 5,
        number_of_load_more_categories: 1,
        number_of_load_more_cards: 2,
    };

    pub fn with_categories_to_preload(mut self, n: usize) -> Self {
        self.number_of_categories_to_preload = n;
        self
    }
    pub fn with_cards_to_preload(mut self, n: usize) -> Self {
        self.number_of_cards_to_preload = n;
        self
    }
    pub fn with_load_more_categories(mut self, n: usize) -> Self {
        self.number_of_load_more_categories = n;
        self
    }
    pub fn with_load_more_cards(mut self, n: usize) -> Self {
        self.number_of_load_more_cards = n;
        self
    }

    /// Checks that every page size is positive.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let fields = [
            ("number_of_categories_to_preload", self.number_of_categories_to_preload),
            ("number_of_cards_to_preload", self.number_of_cards_to_preload),
            ("number_of_load_more_categories", self.number_of_load_more_categories),
            ("number_of_load_more_cards", self.number_of_load_more_cards),
        ];
        match fields.into_iter().find(|&(_, n)| n == 0) {
            Some((name, _)) => Err(OptionsError(name)),
            None => Ok(()),
        }
    }
}
impl Default for Options {
    fn default() -> Self {
        Self::DEFAULT
    }
}
