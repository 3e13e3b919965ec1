use std::ops::Range;

use crate::{
    AsyncResult, AsyncStatus, CardsByCategory, CardsByCategoryStatus, LoadError, StructuralKey,
    WithCardinality,
};


/// Index range `[offset, offset + limit)` clamped to a sequence of `len` slots.
pub(crate) fn window(len: usize, offset: usize, limit: usize) -> Range<usize> {
    let start = offset.min(len);
    start..start + limit.min(len - start)
}

/// Applies `f` to the cards when they are loaded. Any other status is kept as is.
pub(crate) fn patch_loaded<Category: StructuralKey, Card: Clone>(
    current: &CardsByCategoryStatus<Category, Card>,
    f: impl FnOnce(&CardsByCategory<Category, Card>) -> CardsByCategory<Category, Card>,
) -> CardsByCategoryStatus<Category, Card> {
    match current {
        AsyncStatus::Done(Ok(cards)) => AsyncStatus::ok(f(cards)),
        other => other.clone(),
    }
}

/// Builds the slots of every category, all of them `NotAsked`.
pub(crate) fn skeleton<Category: StructuralKey, Card>(
    categories: &[WithCardinality<Category>],
) -> CardsByCategory<Category, Card> {
    categories
        .iter()
        .map(|(category, cardinality)| {
            let slots = (0..*cardinality).map(|_| AsyncStatus::NotAsked).collect();
            (category.clone(), slots)
        })
        .collect()
}

/// Turns the `NotAsked` slots of the window of each target into `Loading`.
///
/// The sequence of each target ends up with exactly `cardinality` slots.
pub(crate) fn mark_loading<Category: StructuralKey, Card: Clone>(
    cards: &CardsByCategory<Category, Card>,
    targets: &[WithCardinality<Category>],
    offset: usize,
    limit: usize,
) -> CardsByCategory<Category, Card> {
    let mut cards = cards.clone();
    for (category, cardinality) in targets {
        let old = cards.get(category).map(Vec::as_slice).unwrap_or_default();
        let w = window(*cardinality, offset, limit);
        let slots = (0..*cardinality)
            .map(|i| match old.get(i) {
                Some(AsyncStatus::NotAsked) | None if w.contains(&i) => AsyncStatus::Loading,
                Some(slot) => slot.clone(),
                None => AsyncStatus::NotAsked,
            })
            .collect();
        cards.set(category.clone(), slots);
    }
    cards
}

/// Writes the loaded slots into the window `[offset, offset + limit)` of each requested category.
///
/// Categories that are not requested or not known are ignored.
/// Slots of the window that are still `Loading` but were not returned become `NotAsked` again.
pub(crate) fn merge_loaded<Category: StructuralKey, Card: Clone>(
    cards: &CardsByCategory<Category, Card>,
    requested: &[Category],
    loaded: &CardsByCategory<Category, Card>,
    offset: usize,
    limit: usize,
) -> CardsByCategory<Category, Card> {
    let mut cards = cards.clone();
    for category in requested {
        let Some(slots) = cards.get_mut(category) else {
            continue;
        };
        let returned = loaded.get(category).map(Vec::as_slice).unwrap_or_default();
        let w = window(slots.len(), offset, limit);
        for (i, slot) in slots[w].iter_mut().enumerate() {
            match returned.get(i) {
                Some(value) => *slot = value.clone(),
                None if slot.is_loading() => *slot = AsyncStatus::NotAsked,
                None => {}
            }
        }
    }
    cards
}

/// Fails the `Loading` slots of the window of each requested category.
pub(crate) fn merge_failed<Category: StructuralKey, Card: Clone>(
    cards: &CardsByCategory<Category, Card>,
    requested: &[Category],
    error: &LoadError,
    offset: usize,
    limit: usize,
) -> CardsByCategory<Category, Card> {
    let mut cards = cards.clone();
    for category in requested {
        let Some(slots) = cards.get_mut(category) else {
            continue;
        };
        let w = window(slots.len(), offset, limit);
        for slot in &mut slots[w] {
            if slot.is_loading() {
                *slot = AsyncResult::error(error.clone());
            }
        }
    }
    cards
}

pub(crate) fn reset_failed<Category: StructuralKey, Card: Clone>(
    cards: &CardsByCategory<Category, Card>,
    category: &Category,
) -> CardsByCategory<Category, Card> {
    let mut cards = cards.clone();
    if let Some(slots) = cards.get_mut(category) {
        for slot in slots.iter_mut().filter(|s| s.is_error()) {
            *slot = AsyncStatus::NotAsked;
        }
    }
    cards
}
