use cards_by_cats::*;
use futures::executor::LocalPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn render(slots: &[AsyncResult<String>]) -> String {
    slots
        .iter()
        .map(|s| match s.kind() {
            StatusKind::NotAsked => '.',
            StatusKind::Loading => 'L',
            StatusKind::Ok => '#',
            StatusKind::Error => '!',
        })
        .collect()
}

fn print(engine: &CardsByCategories<String, String>) {
    match engine.cards_by_category() {
        AsyncStatus::Done(Ok(cards)) => cards.for_each(|slots, category| {
            println!("{category:>12} {}", render(slots));
        }),
        other => println!("cards: {}", other.kind()),
    }
    println!();
}

fn main() -> Result<(), OptionsError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "cards_by_cats=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let sizes = [
        ("Category 1", 35),
        ("Category 2", 23),
        ("Category 3", 41),
        ("Category 4", 31),
        ("Category 5", 22),
    ];
    let catalog = MemoryCatalog::new(sizes.map(|(category, n)| {
        let cards = (1..=n).map(|i| format!("{category} - Card {i}")).collect();
        (category.to_string(), cards)
    }));
    let mut pool = LocalPool::new();
    let engine = CardsByCategories::new(
        ObservableCardsState::new(),
        {
            let catalog = catalog.clone();
            move || catalog.load_categories()
        },
        {
            let catalog = catalog.clone();
            move |categories, offset, limit| {
                catalog.load_cards_by_category(categories, offset, limit)
            }
        },
        Options::default()
            .with_categories_to_preload(2)
            .with_cards_to_preload(4),
        pool.spawner(),
    )?;
    let _s = engine
        .state()
        .subscribe_categories(|c| println!("categories: {}", c.kind()));

    engine.preload();
    pool.run_until_stalled();
    print(&engine);

    engine.load_more_categories();
    engine.load_more_cards(&"Category 1".to_string());
    pool.run_until_stalled();
    print(&engine);

    catalog.fail_with(Some(LoadError::new("backend unavailable")));
    engine.load_more_cards(&"Category 2".to_string());
    pool.run_until_stalled();
    print(&engine);

    catalog.fail_with(None);
    engine.reset_failed_cards(&"Category 2".to_string());
    engine.load_more_cards(&"Category 2".to_string());
    pool.run_until_stalled();
    print(&engine);
    Ok(())
}
