//! End-to-end flows for the destination control: real catalog source,
//! in-memory history, manual clock.

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use trip_search::history::{HistoryStore, MemoryHistory};
use trip_search::model::types::SuggestItem;
use trip_search::suggest::{CatalogSource, SuggestSource};
use trip_search::ui::autocomplete::{Autocomplete, FetchRequest, KeyOutcome};
use trip_search::ui::compose::{ComposedList, TRENDING_GROUP_TITLE};
use trip_search::ui::debounce::QUERY_DEBOUNCE;

fn settle() -> Duration {
    QUERY_DEBOUNCE + Duration::from_millis(10)
}

/// Open the control and run its standby trending fetch to completion.
async fn open_settled(control: &mut Autocomplete<MemoryHistory>, source: &CatalogSource) {
    let req = control.open_via_focus().expect("opening issues a fetch");
    match req {
        FetchRequest::Trending { token } => {
            let outcome = source.trending().await;
            assert!(control.apply_trending(token, outcome));
        }
        FetchRequest::Suggest { token, query } => {
            let outcome = source.suggest(&query).await;
            assert!(control.apply_results(token, outcome));
        }
    }
}

/// Type a query, wait out the debounce, run the fetch to completion.
async fn type_settled(
    control: &mut Autocomplete<MemoryHistory>,
    source: &CatalogSource,
    text: &str,
) {
    let start = Instant::now();
    control.set_query(text, start);
    match control.tick(start + settle()) {
        Some(FetchRequest::Suggest { token, query }) => {
            let outcome = source.suggest(&query).await;
            assert!(control.apply_results(token, outcome));
        }
        other => panic!("expected a suggest fetch, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_query_shows_only_the_trending_group() {
    let source = CatalogSource::new();
    let mut control = Autocomplete::new(None, MemoryHistory::new());
    open_settled(&mut control, &source).await;

    match control.composed() {
        ComposedList::Standby(groups) => {
            assert_eq!(groups.len(), 1, "no history yet, so no history group");
            assert_eq!(groups[0].title, TRENDING_GROUP_TITLE);
            assert_eq!(groups[0].items.len(), 3);
        }
        other => panic!("expected standby groups, got {other:?}"),
    }

    assert_eq!(control.on_key(KeyCode::Down), KeyOutcome::Handled);
    assert_eq!(control.highlight(), Some(0));
}

#[tokio::test]
async fn typing_selects_a_suggestion_and_records_history() {
    let source = CatalogSource::new();
    let mut control = Autocomplete::new(None, MemoryHistory::new());
    open_settled(&mut control, &source).await;
    type_settled(&mut control, &source, "ber").await;

    match control.composed() {
        ComposedList::Results(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].label, "Berlin");
        }
        other => panic!("expected results, got {other:?}"),
    }
    assert_eq!(control.highlight(), Some(0), "fresh results seed the first row");

    let selected = match control.on_key(KeyCode::Enter) {
        KeyOutcome::Selected(item) => item,
        other => panic!("expected a selection, got {other:?}"),
    };
    assert_eq!(selected.label, "Berlin");
    assert!(!control.is_open());
    assert_eq!(control.query(), "Berlin");
    assert_eq!(control.history().len(), 1);
    assert_eq!(control.history()[0].label, "Berlin");
}

#[tokio::test]
async fn unmatched_query_offers_free_text_entry() {
    let source = CatalogSource::new();
    let mut control = Autocomplete::new(None, MemoryHistory::new());
    open_settled(&mut control, &source).await;
    type_settled(&mut control, &source, "xyz").await;

    assert_eq!(
        control.composed(),
        ComposedList::NoResults {
            query: "xyz".into()
        }
    );

    match control.on_key(KeyCode::Enter) {
        KeyOutcome::Selected(item) => {
            assert_eq!(item.id, "free:xyz");
            assert_eq!(item.label, "xyz");
            assert!(item.is_free());
        }
        other => panic!("expected a free-text selection, got {other:?}"),
    }
}

#[tokio::test]
async fn selection_history_feeds_the_next_standby_list() {
    let source = CatalogSource::new();
    let mut history = MemoryHistory::new();
    history.record(SuggestItem::new("loc:shiraz", "Shiraz"));
    let mut control = Autocomplete::new(None, history);
    open_settled(&mut control, &source).await;

    match control.composed() {
        ComposedList::Standby(groups) => {
            assert_eq!(groups.len(), 2, "history group plus trending group");
            assert_eq!(groups[0].items[0].label, "Shiraz");
        }
        other => panic!("{other:?}"),
    }

    // Flat cursor walks history first, then trending (3 items): len 4.
    for _ in 0..4 {
        control.on_key(KeyCode::Down);
    }
    assert_eq!(control.highlight(), Some(3));
    control.on_key(KeyCode::Down);
    assert_eq!(control.highlight(), Some(0), "wraps around");
}

#[tokio::test]
async fn reselecting_a_destination_moves_it_to_the_front() {
    let source = CatalogSource::new();
    let mut control = Autocomplete::new(None, MemoryHistory::new());

    for query in ["ber", "ham", "ber"] {
        open_settled(&mut control, &source).await;
        type_settled(&mut control, &source, query).await;
        match control.on_key(KeyCode::Enter) {
            KeyOutcome::Selected(_) => {}
            other => panic!("{other:?}"),
        }
    }

    let labels: Vec<_> = control.history().iter().map(|e| e.label.clone()).collect();
    assert_eq!(labels, ["Berlin", "Hamburg"], "no duplicate, front-loaded");
}

#[tokio::test]
async fn escape_closes_without_touching_the_form_value() {
    let source = CatalogSource::new();
    let mut control = Autocomplete::new(None, MemoryHistory::new());
    open_settled(&mut control, &source).await;
    type_settled(&mut control, &source, "ber").await;

    assert_eq!(control.on_key(KeyCode::Esc), KeyOutcome::Closed);
    assert!(!control.is_open());
    assert!(control.history().is_empty(), "nothing was selected");
    assert_eq!(control.query(), "ber", "typed text survives the close");
}

#[tokio::test]
async fn rapid_typing_fetches_once_with_the_final_value() {
    let source = CatalogSource::new();
    let mut control = Autocomplete::new(None, MemoryHistory::new());
    open_settled(&mut control, &source).await;

    let start = Instant::now();
    control.set_query("b", start);
    control.set_query("be", start + Duration::from_millis(80));
    control.set_query("ber", start + Duration::from_millis(160));

    // Still inside the window measured from the last keystroke.
    assert_eq!(control.tick(start + Duration::from_millis(300)), None);

    match control.tick(start + Duration::from_millis(160) + settle()) {
        Some(FetchRequest::Suggest { query, .. }) => assert_eq!(query, "ber"),
        other => panic!("expected exactly one suggest fetch, got {other:?}"),
    }
    assert_eq!(control.tick(start + Duration::from_secs(5)), None);
}
