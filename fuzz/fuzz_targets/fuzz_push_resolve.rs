#![no_main]

use arbitrary::Arbitrary;
use dockgrid_core::{CellRect, GridItem};
use dockgrid_layout::{
    CollisionStrategy, LayoutError, Resolution, ResolveOptions, find_overlaps, normalize_layout,
    resolve,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    cols: u8,
    items: Vec<(u8, u8, u8, u8)>,
    moves: Vec<(u8, u8, u8, u8)>,
}

fuzz_target!(|input: Input| {
    let cols = u32::from(input.cols % 24) + 1;
    let seeds: Vec<GridItem> = input
        .items
        .iter()
        .take(24)
        .enumerate()
        .map(|(i, &(x, y, w, h))| {
            GridItem::new(
                format!("w{i}"),
                u32::from(x % 32),
                u32::from(y % 32),
                u32::from(w % 8),
                u32::from(h % 6),
            )
        })
        .collect();
    if seeds.is_empty() {
        return;
    }
    let mut items = normalize_layout(&seeds, cols);

    for &(pick, strategy, x, y) in input.moves.iter().take(32) {
        let moving = items[usize::from(pick) % items.len()].clone();
        let strategy = CollisionStrategy::ALL[usize::from(strategy) % 3];
        let proposal = CellRect::new(u32::from(x % 32), u32::from(y % 32), moving.w, moving.h);
        match resolve(
            &items,
            &moving.id,
            proposal,
            cols,
            strategy,
            ResolveOptions::default(),
        ) {
            Ok(Resolution::Applied(next)) => {
                assert_eq!(next.len(), items.len(), "item count changed");
                assert!(next.iter().all(|item| item.fits(cols)), "item out of bounds");
                assert!(find_overlaps(&next).is_empty(), "overlap after {strategy}");
                items = next;
            }
            Ok(Resolution::Rejected { conflicts }) => {
                assert_eq!(strategy, CollisionStrategy::Prevent);
                assert!(!conflicts.is_empty());
            }
            Err(LayoutError::ResolutionFault { .. }) => {}
            Err(error @ LayoutError::UnknownItem { .. }) => panic!("{error}"),
        }
    }
});
