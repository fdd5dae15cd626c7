#![no_main]

use dockgrid_layout::{LayoutSnapshot, find_overlaps, normalize_layout};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut snapshot) = serde_json::from_str::<LayoutSnapshot>(text) else {
        return;
    };
    if snapshot.validate().is_err() {
        return;
    }

    // Decoded snapshots must survive restore-time repair.
    let cols = snapshot.cols.min(256);
    let items = normalize_layout(&snapshot.to_items::<()>(), cols);
    assert_eq!(items.len(), snapshot.items.len(), "unique ids must all survive");
    assert!(items.iter().all(|item| item.fits(cols)), "item out of bounds");
    assert!(find_overlaps(&items).is_empty(), "overlap after normalize");

    let hash = snapshot.state_hash();
    snapshot.canonicalize();
    assert_eq!(hash, snapshot.state_hash(), "hash depends on item order");

    let encoded = serde_json::to_string(&snapshot).expect("re-encode");
    let decoded: LayoutSnapshot = serde_json::from_str(&encoded).expect("re-decode");
    assert_eq!(decoded, snapshot);
});
