use derive_ex::derive_ex;
use serde::{Deserialize, Serialize};

use crate::{AsyncResult, State, StructuralKey, StructuralMap, Subscription};


/// A category paired with the total number of cards it holds.
pub type WithCardinality<Category> = (Category, usize);

/// Slots of every category, one [`AsyncResult`] per card position.
pub type CardsByCategory<Category, Card> = StructuralMap<Category, Vec<AsyncResult<Card>>>;

pub type CategoriesStatus<Category> = AsyncResult<Vec<WithCardinality<Category>>>;
pub type CardsByCategoryStatus<Category, Card> = AsyncResult<CardsByCategory<Category, Card>>;

/// Storage owned by the host that the engine reads and writes.
///
/// Each `submit_*` call must apply the transform and store its result in a single step.
pub trait CardsState<Category: StructuralKey, Card> {
    fn categories(&self) -> CategoriesStatus<Category>;
    fn submit_category_changes(
        &self,
        f: impl FnOnce(&CategoriesStatus<Category>) -> CategoriesStatus<Category>,
    );

    fn cards_by_category(&self) -> CardsByCategoryStatus<Category, Card>;
    fn submit_cards_by_category_changes(
        &self,
        f: impl FnOnce(
            &CardsByCategoryStatus<Category, Card>,
        ) -> CardsByCategoryStatus<Category, Card>,
    );
}

/// [`CardsState`] made of two [`State`] cells that notify listeners on every change.
#[derive_ex(Clone, bound())]
pub struct ObservableCardsState<Category: StructuralKey + 'static, Card: 'static> {
    categories: State<CategoriesStatus<Category>>,
    cards_by_category: State<CardsByCategoryStatus<Category, Card>>,
}

impl<Category: StructuralKey + 'static, Card: 'static> ObservableCardsState<Category, Card> {
    /// Creates a state whose values are both `NotAsked`.
    pub fn new() -> Self {
        Self {
            categories: State::new(AsyncResult::NotAsked),
            cards_by_category: State::new(AsyncResult::NotAsked),
        }
    }

    /// Creates a state holding the values of a snapshot taken by [`snapshot`](Self::snapshot).
    pub fn from_snapshot(snapshot: CardsSnapshot<Category, Card>) -> Self {
        Self {
            categories: State::new(snapshot.categories),
            cards_by_category: State::new(snapshot.cards_by_category),
        }
    }

    pub fn snapshot(&self) -> CardsSnapshot<Category, Card>
    where
        Category: Clone,
        Card: Clone,
    {
        CardsSnapshot {
            categories: self.categories.get(),
            cards_by_category: self.cards_by_category.get(),
        }
    }

    pub fn categories_state(&self) -> &State<CategoriesStatus<Category>> {
        &self.categories
    }
    pub fn cards_by_category_state(&self) -> &State<CardsByCategoryStatus<Category, Card>> {
        &self.cards_by_category
    }

    pub fn subscribe_categories(
        &self,
        f: impl Fn(&CategoriesStatus<Category>) + 'static,
    ) -> Subscription {
        self.categories.subscribe(f)
    }
    pub fn subscribe_cards_by_category(
        &self,
        f: impl Fn(&CardsByCategoryStatus<Category, Card>) + 'static,
    ) -> Subscription {
        self.cards_by_category.subscribe(f)
    }
}
impl<Category: StructuralKey + 'static, Card: 'static> Default
    for ObservableCardsState<Category, Card>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Category, Card> CardsState<Category, Card> for ObservableCardsState<Category, Card>
where
    Category: StructuralKey + 'static,
    Card: Clone + 'static,
{
    fn categories(&self) -> CategoriesStatus<Category> {
        self.categories.get()
    }
    fn submit_category_changes(
        &self,
        f: impl FnOnce(&CategoriesStatus<Category>) -> CategoriesStatus<Category>,
    ) {
        self.categories.submit(f)
    }

    fn cards_by_category(&self) -> CardsByCategoryStatus<Category, Card> {
        self.cards_by_category.get()
    }
    fn submit_cards_by_category_changes(
        &self,
        f: impl FnOnce(
            &CardsByCategoryStatus<Category, Card>,
        ) -> CardsByCategoryStatus<Category, Card>,
    ) {
        self.cards_by_category.submit(f)
    }
}

/// Plain copy of both values of an [`ObservableCardsState`].
///
/// Lets a host preload state in one place (for example while rendering on a server),
/// ship it serialized, and hydrate a new state with it elsewhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "Category: Serialize, Card: Serialize",
    deserialize = "Category: Deserialize<'de>, Card: Deserialize<'de>"
))]
pub struct CardsSnapshot<Category: StructuralKey, Card> {
    pub categories: CategoriesStatus<Category>,
    pub cards_by_category: CardsByCategoryStatus<Category, Card>,
}
