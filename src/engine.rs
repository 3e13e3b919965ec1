use std::{future::Future, rc::Rc};

use futures::{
    future::LocalBoxFuture,
    task::{LocalSpawn, LocalSpawnExt},
    FutureExt,
};
use tracing::{debug, warn};

use crate::{
    AsyncResult, AsyncStatus, CardsByCategory, CardsByCategoryStatus, CardsState,
    CategoriesStatus, LoadError, ObservableCardsState, Options, OptionsError, StructuralKey,
    WithCardinality,
};

pub(crate) mod window;


type LoadCategoriesFn<Category> =
    dyn Fn() -> LocalBoxFuture<'static, Result<Vec<WithCardinality<Category>>, LoadError>>;
type LoadCardsFn<Category, Card> = dyn Fn(
    Vec<Category>,
    usize,
    usize,
) -> LocalBoxFuture<'static, Result<CardsByCategory<Category, Card>, LoadError>>;

/// View-model that loads cards grouped by categories page by page.
///
/// `preload` fetches the categories with their cardinalities and the first cards of the first categories.
/// `load_more_categories` and `load_more_cards` then fetch further pages.
/// Every fetch marks the slots it addresses as `Loading`,
/// and writes its outcome back to exactly those slots when it completes.
///
/// All results are observed through the [`CardsState`] given to [`new`](Self::new);
/// the operations themselves never fail.
pub struct CardsByCategories<Category, Card, S = ObservableCardsState<Category, Card>>(
    Rc<Engine<Category, Card, S>>,
)
where
    Category: StructuralKey + 'static,
    Card: Clone + 'static,
    S: CardsState<Category, Card> + 'static;

struct Engine<Category: StructuralKey + 'static, Card: 'static, S> {
    state: S,
    load_categories: Box<LoadCategoriesFn<Category>>,
    load_cards_by_category: Box<LoadCardsFn<Category, Card>>,
    options: Options,
    spawner: Box<dyn LocalSpawn>,
}

impl<Category, Card, S> CardsByCategories<Category, Card, S>
where
    Category: StructuralKey + 'static,
    Card: Clone + 'static,
    S: CardsState<Category, Card> + 'static,
{
    /// Creates a view-model over `state`.
    ///
    /// `load_categories` returns every category with the number of cards it holds.
    /// `load_cards_by_category` returns the cards in `[offset, offset + limit)` of the given categories.
    /// Fetches are driven by `spawner`.
    pub fn new<LC, FC, LB, FB>(
        state: S,
        load_categories: LC,
        load_cards_by_category: LB,
        options: Options,
        spawner: impl LocalSpawn + 'static,
    ) -> Result<Self, OptionsError>
    where
        LC: Fn() -> FC + 'static,
        FC: Future<Output = Result<Vec<WithCardinality<Category>>, LoadError>> + 'static,
        LB: Fn(Vec<Category>, usize, usize) -> FB + 'static,
        FB: Future<Output = Result<CardsByCategory<Category, Card>, LoadError>> + 'static,
    {
        options.validate()?;
        Ok(Self(Rc::new(Engine {
            state,
            load_categories: Box::new(move || load_categories().boxed_local()),
            load_cards_by_category: Box::new(move |categories, offset, limit| {
                load_cards_by_category(categories, offset, limit).boxed_local()
            }),
            options,
            spawner: Box::new(spawner),
        })))
    }

    pub fn categories(&self) -> CategoriesStatus<Category> {
        self.0.state.categories()
    }
    pub fn cards_by_category(&self) -> CardsByCategoryStatus<Category, Card> {
        self.0.state.cards_by_category()
    }
    pub fn options(&self) -> &Options {
        &self.0.options
    }
    pub fn state(&self) -> &S {
        &self.0.state
    }

    /// Loads the categories, then the first cards of the first categories.
    ///
    /// Calling it again restarts from scratch; fetches still in flight are merged when they complete.
    pub fn preload(&self) {
        debug!("preload");
        let engine = &self.0;
        engine.state.submit_category_changes(|_| AsyncStatus::Loading);
        engine
            .state
            .submit_cards_by_category_changes(|_| AsyncStatus::Loading);

        let fetch = (engine.load_categories)();
        let this = engine.clone();
        if let Err(e) = engine.spawn(async move {
            let result = fetch.await;
            this.categories_loaded(result);
        }) {
            engine.fail_categories(e);
        }
    }

    /// Loads the first cards of the next categories whose cards have not been requested yet.
    ///
    /// Does nothing until `preload` has succeeded, or once every category has been requested.
    pub fn load_more_categories(&self) {
        let engine = &self.0;
        let (Some(categories), Some(cards)) = (
            engine.state.categories().ok_value(),
            engine.state.cards_by_category().ok_value(),
        ) else {
            debug!("load_more_categories: categories are not loaded");
            return;
        };
        let from = categories
            .iter()
            .take_while(|(category, cardinality)| {
                *cardinality == 0
                    || cards
                        .get(category)
                        .is_some_and(|slots| slots.iter().any(|s| !s.is_not_asked()))
            })
            .count();
        if from >= categories.len() {
            debug!(from, "load_more_categories: no more categories");
            return;
        }
        let to = categories
            .len()
            .min(from + engine.options.number_of_load_more_categories);
        debug!(from, to, "load_more_categories");
        engine.load_cards(
            categories[from..to].to_vec(),
            0,
            engine.options.number_of_cards_to_preload,
        );
    }

    /// Loads the next cards of `category`, starting at its first slot that has not been requested yet.
    ///
    /// Does nothing for an unknown category, or when all its cards have been requested.
    pub fn load_more_cards(&self, category: &Category) {
        let engine = &self.0;
        let (Some(categories), Some(cards)) = (
            engine.state.categories().ok_value(),
            engine.state.cards_by_category().ok_value(),
        ) else {
            debug!("load_more_cards: categories are not loaded");
            return;
        };
        let Some(slots) = cards.get(category) else {
            debug!("load_more_cards: unknown category");
            return;
        };
        let Some(offset) = slots.iter().position(AsyncStatus::is_not_asked) else {
            debug!("load_more_cards: no more cards");
            return;
        };
        let not_asked = slots[offset..]
            .iter()
            .take_while(|s| s.is_not_asked())
            .count();
        let limit = not_asked.min(engine.options.number_of_load_more_cards);
        let canonical = category.canonical();
        let target = categories
            .into_iter()
            .find(|(c, _)| c.canonical() == canonical)
            .unwrap_or_else(|| (category.clone(), slots.len()));
        debug!(offset, limit, "load_more_cards");
        engine.load_cards(vec![target], offset, limit);
    }

    /// Turns the failed slots of `category` back into `NotAsked`,
    /// so that following `load_more_cards` calls request them again.
    pub fn reset_failed_cards(&self, category: &Category) {
        debug!("reset_failed_cards");
        self.0.state.submit_cards_by_category_changes(|current| {
            window::patch_loaded(current, |cards| window::reset_failed(cards, category))
        });
    }
}
impl<Category, Card, S> Clone for CardsByCategories<Category, Card, S>
where
    Category: StructuralKey + 'static,
    Card: Clone + 'static,
    S: CardsState<Category, Card> + 'static,
{
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<Category, Card, S> Engine<Category, Card, S>
where
    Category: StructuralKey + 'static,
    Card: Clone + 'static,
    S: CardsState<Category, Card> + 'static,
{
    fn spawn(&self, task: impl Future<Output = ()> + 'static) -> Result<(), LoadError> {
        self.spawner.spawn_local(task).map_err(|e| {
            warn!("failed to spawn a fetch: {e}");
            LoadError::from_error(&e)
        })
    }

    fn categories_loaded(
        self: &Rc<Self>,
        result: Result<Vec<WithCardinality<Category>>, LoadError>,
    ) {
        let categories = match result {
            Ok(categories) => categories,
            Err(e) => {
                warn!("failed to load categories: {e}");
                return self.fail_categories(e);
            }
        };
        debug!(count = categories.len(), "categories loaded");
        let skeleton = window::skeleton(&categories);
        let preload = categories
            .iter()
            .take(self.options.number_of_categories_to_preload)
            .cloned()
            .collect();
        self.state
            .submit_category_changes(|_| AsyncResult::ok(categories));
        self.state
            .submit_cards_by_category_changes(|_| AsyncResult::ok(skeleton));
        self.load_cards(preload, 0, self.options.number_of_cards_to_preload);
    }

    fn fail_categories(&self, e: LoadError) {
        let e_cards = e.clone();
        self.state
            .submit_category_changes(|_| AsyncResult::error(e));
        self.state
            .submit_cards_by_category_changes(|_| AsyncResult::error(e_cards));
    }

    /// Requests the window `[offset, offset + limit)` of every target.
    fn load_cards(
        self: &Rc<Self>,
        targets: Vec<WithCardinality<Category>>,
        offset: usize,
        limit: usize,
    ) {
        if targets.is_empty() || limit == 0 {
            return;
        }
        self.state.submit_cards_by_category_changes(|current| {
            window::patch_loaded(current, |cards| {
                window::mark_loading(cards, &targets, offset, limit)
            })
        });

        let requested: Vec<Category> = targets.into_iter().map(|(c, _)| c).collect();
        let fetch = (self.load_cards_by_category)(requested.clone(), offset, limit);
        let this = self.clone();
        let failed = requested.clone();
        if let Err(e) = self.spawn(async move {
            let result = fetch.await;
            this.cards_loaded(&requested, offset, limit, result);
        }) {
            self.cards_loaded(&failed, offset, limit, Err(e));
        }
    }

    fn cards_loaded(
        &self,
        requested: &[Category],
        offset: usize,
        limit: usize,
        result: Result<CardsByCategory<Category, Card>, LoadError>,
    ) {
        match result {
            Ok(loaded) => {
                debug!(categories = requested.len(), offset, limit, "cards loaded");
                self.state.submit_cards_by_category_changes(|current| {
                    window::patch_loaded(current, |cards| {
                        window::merge_loaded(cards, requested, &loaded, offset, limit)
                    })
                });
            }
            Err(e) => {
                warn!(
                    categories = requested.len(),
                    offset,
                    limit,
                    "failed to load cards: {e}"
                );
                self.state.submit_cards_by_category_changes(|current| {
                    window::patch_loaded(current, |cards| {
                        window::merge_failed(cards, requested, &e, offset, limit)
                    })
                });
            }
        }
    }
}
