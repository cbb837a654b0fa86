use proptest::prelude::{prop_assert_eq, proptest};
use shiftrich::core::{Field, InputParameters, View, analyze};
use shiftrich::storage::{
    FileStore, MemoryStore, ParameterStore, load_or_default, reset_params, save_params,
};

fn edited_params() -> InputParameters {
    InputParameters::default()
        .with_raw_field(Field::SharedArea, "2,250")
        .with_raw_field(Field::RehabBudgetOverride, "$65,000")
        .with_raw_field(Field::MortgageAnnualRatePct, "6.125%")
        .with_raw_field(Field::MonthlyHoa, "45")
        .with_view(View::Rental)
}

#[test]
fn file_store_persist_reload_is_identity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let params = edited_params();

    save_params(&FileStore::new(dir.path()), &params).expect("save");
    let reloaded = load_or_default(&FileStore::new(dir.path()));

    assert_eq!(reloaded, params);
    assert_eq!(analyze(&reloaded), analyze(&params));
}

#[test]
fn reset_restores_defaults_after_any_edits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());
    save_params(&store, &edited_params()).expect("save");

    assert_eq!(reset_params(&store).expect("reset"), InputParameters::default());
    assert_eq!(load_or_default(&store), InputParameters::default());
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());
    std::fs::write(store.path(), b"\x00\x01 not json").expect("write corrupt file");

    assert_eq!(load_or_default(&store), InputParameters::default());
}

proptest! {
    #[test]
    fn prop_memory_store_round_trip(
        cents in proptest::collection::vec(-100_000_000_000i64..100_000_000_000, Field::ALL.len()),
        view in 0usize..3
    ) {
        let views = [View::Rehab, View::Resell, View::Rental];
        let params = Field::ALL
            .into_iter()
            .zip(cents)
            .fold(InputParameters::default(), |p, (field, c)| p.with_field(field, c as f64 / 100.0))
            .with_view(views[view]);

        let store = MemoryStore::new();
        save_params(&store, &params).expect("save");
        prop_assert_eq!(load_or_default(&store), params);

        reset_params(&store).expect("reset");
        prop_assert_eq!(store.load().expect("load"), None);
        prop_assert_eq!(load_or_default(&store), InputParameters::default());
    }
}
