use std::{cell::RefCell, rc::Rc};

use derive_ex::derive_ex;
use futures::future::{ready, Ready};

use crate::{
    engine::window::window, AsyncResult, CardsByCategory, LoadError, StructuralKey,
    StructuralMap, WithCardinality,
};

/// Collaborator that serves categories and cards held in memory.
///
/// Fetches complete immediately. Useful for demos, tests and hosts that already hold all the data.
#[derive_ex(Clone, bound())]
pub struct MemoryCatalog<Category: StructuralKey + 'static, Card: 'static>(
    Rc<CatalogData<Category, Card>>,
);

struct CatalogData<Category: StructuralKey, Card> {
    cards: StructuralMap<Category, Vec<Card>>,
    error: RefCell<Option<LoadError>>,
}

impl<Category: StructuralKey + 'static, Card: Clone + 'static> MemoryCatalog<Category, Card> {
    pub fn new(cards: impl IntoIterator<Item = (Category, Vec<Card>)>) -> Self {
        Self(Rc::new(CatalogData {
            cards: cards.into_iter().collect(),
            error: RefCell::new(None),
        }))
    }

    /// Makes every following fetch fail with `error`, or succeed again with `None`.
    pub fn fail_with(&self, error: Option<LoadError>) {
        *self.0.error.borrow_mut() = error;
    }

    pub fn categories(&self) -> Vec<WithCardinality<Category>> {
        self.0
            .cards
            .iter()
            .map(|(category, cards)| (category.clone(), cards.len()))
            .collect()
    }

    /// Cards of `category` in `[offset, offset + limit)`, clamped to the cards that exist.
    pub fn cards(&self, category: &Category, offset: usize, limit: usize) -> Option<&[Card]> {
        let cards = self.0.cards.get(category)?;
        Some(&cards[window(cards.len(), offset, limit)])
    }

    pub fn load_categories(&self) -> Ready<Result<Vec<WithCardinality<Category>>, LoadError>> {
        ready(match self.current_error() {
            Some(e) => Err(e),
            None => Ok(self.categories()),
        })
    }

    /// Returns the requested page of every requested category. Unknown categories are omitted.
    pub fn load_cards_by_category(
        &self,
        categories: Vec<Category>,
        offset: usize,
        limit: usize,
    ) -> Ready<Result<CardsByCategory<Category, Card>, LoadError>> {
        if let Some(e) = self.current_error() {
            return ready(Err(e));
        }
        let page = categories
            .into_iter()
            .filter_map(|category| {
                let cards = self
                    .cards(&category, offset, limit)?
                    .iter()
                    .cloned()
                    .map(AsyncResult::ok)
                    .collect();
                Some((category, cards))
            })
            .collect();
        ready(Ok(page))
    }

    fn current_error(&self) -> Option<LoadError> {
        self.0.error.borrow().clone()
    }
}
