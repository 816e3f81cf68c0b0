#![no_main]

//! Filter, paging and row rendering over fuzzed complaints.
//!
//! Titles and search text can contain any Unicode; truncation must stay on
//! character boundaries and pages must never exceed the page size.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::num::NonZeroUsize;

use grievance::board::ComplaintBoard;
use grievance::commands::list::{format_row, render};
use grievance::normalize::normalize_batch;

#[derive(Arbitrary, Debug)]
struct BoardInput {
    titles: Vec<String>,
    statuses: Vec<String>,
    search: String,
    page: usize,
    page_size: u8,
}

fuzz_target!(|input: BoardInput| {
    let records = input
        .titles
        .iter()
        .take(50)
        .enumerate()
        .map(|(i, title)| {
            serde_json::json!({
                "uniqueID": format!("GRV-{}", i),
                "title": title,
                "status": input.statuses.get(i).cloned().unwrap_or_default(),
            })
        })
        .collect();

    let page_size = NonZeroUsize::new(input.page_size as usize).unwrap_or(NonZeroUsize::MIN);
    let mut board = ComplaintBoard::new(page_size);
    let ticket = board.begin_loading();
    board.load(ticket, normalize_batch(records));
    board.set_search(input.search);
    board.set_page(input.page);

    let page = board.page();
    assert!(page.items.len() <= page_size.get());
    assert!(page.number >= 1 && page.number <= page.total_pages.max(1));
    for complaint in &page.items {
        let _ = format_row(complaint, true);
    }
    let _ = render(&page, true);
});
