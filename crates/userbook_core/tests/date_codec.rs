use userbook_core::{to_canonical, to_display, to_picker, to_sort_key};

const MALFORMED: &[&str] = &[
    "",
    " ",
    "-",
    "--",
    "99-99-9999",
    "00-00-0000",
    "31-02-2030",
    "2030-13-40",
    "2030--15",
    "1-2-3-4",
    "15/03/2030",
    "tomorrow",
    "١٥-٠٣-٢٠٣٠",
    "99999999999999999999-1-1",
    "2030-03-15T25:00:00Z",
];

#[test]
fn malformed_dates_never_panic_and_degrade() {
    for input in MALFORMED {
        let picker = to_picker(input);
        let canonical = to_canonical(input);
        let display = to_display(input);
        let key = to_sort_key(input);

        assert_eq!(display, *input, "unparseable `{input}` should display verbatim");
        assert_eq!(key, 0, "unparseable `{input}` should sort as oldest");
        assert!(!picker.is_empty() || input.is_empty());
        assert!(!canonical.is_empty() || input.is_empty());
    }
}

#[test]
fn picker_input_from_a_date_control_is_stored_canonical() {
    let stored = to_canonical("2031-01-09");
    assert_eq!(stored, "09-01-2031");
    assert_eq!(to_picker(&stored), "2031-01-09");
    assert_eq!(to_display(&stored), "Jan 9, 2031");
}

#[test]
fn every_day_of_a_leap_year_round_trips_and_sorts() {
    let mut previous = i64::MIN;
    for month in 1..=12u32 {
        for day in 1..=31u32 {
            let canonical = format!("{day:02}-{month:02}-2024");
            let key = to_sort_key(&canonical);
            assert_eq!(to_canonical(&to_picker(&canonical)), canonical);
            if key == 0 {
                // Impossible calendar day such as 30-02-2024.
                continue;
            }
            assert!(key > previous, "{canonical} should sort after the previous day");
            previous = key;
        }
    }
}
