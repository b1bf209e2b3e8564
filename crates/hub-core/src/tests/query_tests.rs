//! Tests for query-string state: codec round-trips and the store driving the pipeline

use super::fixtures::*;
use crate::HubSearch;
use crate::config::SearchConfig;
use crate::filter::{FilterKey, FilterState, OS_LINUX, OS_MAC, OS_WINDOWS, OsiLicenses};
use crate::index::IndexStore;
use crate::query::{QueryCodec, QueryStore, SearchQueryState, UrlQueryCodec};
use hub_types::SortType;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn arb_filter() -> impl Strategy<Value = (FilterKey, String)> {
    prop_oneof![
        prop::sample::select(vec![OS_LINUX, OS_MAC, OS_WINDOWS])
            .prop_map(|os| (FilterKey::OperatingSystem, os.to_string())),
        prop::sample::select(vec!["3.8", "3.9", "3.10", "3.12.1"])
            .prop_map(|v| (FilterKey::PythonVersion, v.to_string())),
        Just((FilterKey::License, "openSource".to_string())),
        Just((FilterKey::DevelopmentStatus, "stable".to_string())),
        prop::sample::select(vec!["reader", "writer", "sample_data", "widget", "theme"])
            .prop_map(|t| (FilterKey::PluginType, t.to_string())),
        "[A-Za-z][A-Za-z &/+=?#%.-]{0,15}".prop_map(|a| (FilterKey::Authors, a)),
        "[A-Za-z][A-Za-z ]{0,15}".prop_map(|t| (FilterKey::WorkflowStep, t)),
        "[A-Za-z][A-Za-z ]{0,15}".prop_map(|t| (FilterKey::SupportedData, t)),
        "\\.[a-z0-9]{1,4}".prop_map(|e| (FilterKey::ReaderFileExtensions, e)),
        "\\.[a-z0-9]{1,4}".prop_map(|e| (FilterKey::WriterFileExtensions, e)),
    ]
}

/// States the store can actually reach: Relevance only with a query
fn arb_state() -> impl Strategy<Value = SearchQueryState> {
    (
        "[A-Za-z0-9 &=?#%+.]{0,12}",
        prop::sample::select(SortType::ALL.to_vec()),
        1usize..40,
        prop::collection::vec(arb_filter(), 0..8),
    )
        .prop_map(|(query, sort, page, filters)| {
            let mut state = SearchQueryState {
                query,
                sort,
                page,
                filters: filters.into_iter().collect::<FilterState>(),
            };
            if !state.has_query() && state.sort == SortType::Relevance {
                state.sort = SortType::ReleaseDate;
            }
            state
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_url_round_trip(state in arb_state()) {
        let codec = UrlQueryCodec::default();
        let encoded = codec.encode(&state);
        prop_assert_eq!(codec.decode(&encoded), state);
    }

    #[test]
    fn prop_encoding_is_canonical(state in arb_state()) {
        let codec = UrlQueryCodec::default();
        let encoded = codec.encode(&state);
        prop_assert_eq!(codec.encode(&codec.decode(&encoded)), encoded);
    }

    #[test]
    fn prop_decode_never_panics(input in ".{0,64}") {
        let state = UrlQueryCodec::default().decode(&input);
        prop_assert!(state.page >= 1);
        prop_assert!(state.has_query() || state.sort != SortType::Relevance);
    }
}

#[test]
fn test_store_drives_pipeline() {
    let codec = UrlQueryCodec::new(SortType::ReleaseDate);
    let mut store = QueryStore::new(Box::new(codec), "");
    let hub = Rc::new(RefCell::new(HubSearch::with_licenses(
        IndexStore::from_records(sample_index()),
        SearchConfig::default(),
        OsiLicenses::builtin(),
    )));

    let rendered: Rc<RefCell<Vec<Vec<String>>>> = Rc::default();
    let sink = Rc::clone(&rendered);
    let pipeline = Rc::clone(&hub);
    store.subscribe(move |state| {
        let mut hub = pipeline.borrow_mut();
        let page = hub.run(state);
        sink.borrow_mut().push(names(&page.items).into_iter().map(String::from).collect());
    });

    store.set_query("video");
    store.set_filter(FilterKey::OperatingSystem, OS_MAC, true);
    store.set_query("");

    let rendered = rendered.borrow();
    assert_eq!(rendered[0], vec!["napari_video"]);
    assert_eq!(rendered[1], vec!["napari_video"]);
    assert_eq!(
        rendered[2],
        vec![
            "napari-segment-blobs-and-things-with-membranes",
            "napari-aicsimageio",
            "napari_video",
        ]
    );
    assert_eq!(store.encoded(), "operatingSystem=mac");
}

#[test]
fn test_shared_url_reproduces_results() {
    let url = "https://napari-hub.org/?search=segment&workflowStep=Image+segmentation&sort=totalInstalls";
    let state = UrlQueryCodec::default().decode(url);
    let mut hub = HubSearch::with_licenses(
        IndexStore::from_records(sample_index()),
        SearchConfig::default(),
        OsiLicenses::builtin(),
    );
    let page = hub.run(&state);
    assert_eq!(
        names(&page.items),
        vec![
            "napari-segment-blobs-and-things-with-membranes",
            "cellpose-napari",
        ]
    );
}
