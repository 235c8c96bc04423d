//! Channel Memory Tests
//!
//! Tests for frequency validation, sentinel handling and default seeding.
//! Run with: cargo test --test storage_tests

use rox2x_firmware::config::{EMPTY_SLOT, MEDIUM_SIZE, SLOT_SIZE};
use rox2x_firmware::storage::{FrequencyStore, MediumError, PersistentMedium, RamMedium, StoreError};
use rox2x_firmware::types::Frequency;

type Medium = RamMedium<MEDIUM_SIZE>;

const NINE_CHANNELS: [u32; 9] = [
    143_500_000,
    144_000_000,
    144_390_000,
    144_800_000,
    145_000_000,
    145_500_000,
    145_800_000,
    146_000_000,
    146_500_000,
];

fn fresh_store() -> FrequencyStore<Medium> {
    let mut store = FrequencyStore::new(Medium::new());
    store.initialize_medium().unwrap();
    store
}

fn hz(list: &[Frequency]) -> Vec<u32> {
    list.iter().map(|f| f.as_hz()).collect()
}

fn word(medium: &Medium, slot: usize) -> u32 {
    let offset = slot * SLOT_SIZE;
    let bytes: [u8; 4] = medium.committed()[offset..offset + 4].try_into().unwrap();
    u32::from_le_bytes(bytes)
}

// =============================================================================
// Recall Tests
// =============================================================================

#[test]
fn recall_fresh_medium_seeds_defaults() {
    let mut store = fresh_store();

    let list = store.recall().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(hz(&list), vec![144_710_000, 145_000_000]);
}

#[test]
fn recall_after_invalid_store_seeds_defaults() {
    let mut store = fresh_store();

    store.store(&[]).unwrap();
    assert_eq!(hz(&store.recall().unwrap()), vec![144_710_000, 145_000_000]);

    store.store(&[999_999_999, 145_000_000]).unwrap();
    assert_eq!(hz(&store.recall().unwrap()), vec![144_710_000, 145_000_000]);
}

#[test]
fn recall_stops_at_first_invalid() {
    let mut store = fresh_store();

    store
        .store(&[144_800_000, 145_200_000, 999_999_999, 145_500_000])
        .unwrap();
    let list = store.recall().unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(hz(&list), vec![144_800_000, 145_200_000]);
}

#[test]
fn recall_single_channel() {
    let mut store = fresh_store();

    store.store(&[145_500_000]).unwrap();
    assert_eq!(hz(&store.recall().unwrap()), vec![145_500_000]);
}

#[test]
fn recall_all_nine() {
    let mut store = fresh_store();

    store.store(&NINE_CHANNELS).unwrap();
    let list = store.recall().unwrap();

    assert_eq!(list.len(), 9);
    assert_eq!(hz(&list), NINE_CHANNELS.to_vec());
}

#[test]
fn recall_count_always_in_range() {
    for n in 0..=NINE_CHANNELS.len() {
        let mut store = fresh_store();
        store.store(&NINE_CHANNELS[..n]).unwrap();
        let count = store.recall().unwrap().len();
        assert!((1..=9).contains(&count), "count {count} for {n} stored");
    }
}

#[test]
fn recall_ignores_garbage_after_sentinel() {
    let mut image = [0u8; 16];
    image[0..4].copy_from_slice(&144_800_000u32.to_le_bytes());
    image[4..8].copy_from_slice(&EMPTY_SLOT.to_le_bytes());
    image[8..12].copy_from_slice(&145_000_000u32.to_le_bytes());
    image[12..16].copy_from_slice(&145_100_000u32.to_le_bytes());

    let mut store = FrequencyStore::new(Medium::with_contents(&image));
    store.initialize_medium().unwrap();

    assert_eq!(hz(&store.recall().unwrap()), vec![144_800_000]);
}

#[test]
fn recall_full_medium_stops_at_slot_count() {
    // A valid word right after the ninth slot must not grow the list
    let mut image = [0u8; 40];
    for (slot, freq) in NINE_CHANNELS.iter().chain([145_000_000].iter()).enumerate() {
        image[slot * SLOT_SIZE..(slot + 1) * SLOT_SIZE].copy_from_slice(&freq.to_le_bytes());
    }

    let mut store = FrequencyStore::new(Medium::with_contents(&image));
    store.initialize_medium().unwrap();

    assert_eq!(hz(&store.recall().unwrap()), NINE_CHANNELS.to_vec());
}

#[test]
fn recall_rejects_out_of_band_words() {
    for raw in [0u32, 143_499_999, 146_500_001, 7_074_000] {
        let mut store = FrequencyStore::new(Medium::with_contents(&raw.to_le_bytes()));
        store.initialize_medium().unwrap();
        assert_eq!(store.recall().unwrap().len(), 2, "raw word {raw}");
    }
}

// =============================================================================
// Store Tests
// =============================================================================

#[test]
fn store_writes_sentinel_after_valid_run() {
    let mut store = fresh_store();

    store.store(&[144_800_000, 145_200_000]).unwrap();
    let medium = store.medium();

    assert_eq!(word(medium, 0), 144_800_000);
    assert_eq!(word(medium, 1), 145_200_000);
    assert_eq!(word(medium, 2), EMPTY_SLOT);
}

#[test]
fn store_leaves_later_slots_untouched() {
    let mut store = fresh_store();

    store.store(&NINE_CHANNELS).unwrap();
    store.store(&[145_000_000, 0]).unwrap();
    let medium = store.medium();

    assert_eq!(word(medium, 0), 145_000_000);
    assert_eq!(word(medium, 1), EMPTY_SLOT);
    assert_eq!(word(medium, 2), NINE_CHANNELS[2]);
    assert_eq!(word(medium, 8), NINE_CHANNELS[8]);
}

#[test]
fn store_full_list_writes_no_sentinel() {
    let mut store = fresh_store();

    store.store(&NINE_CHANNELS).unwrap();
    let medium = store.medium();

    // Slot 10 would start right after the ninth word; it stays erased
    assert_eq!(word(medium, 9), EMPTY_SLOT);
    assert_eq!(medium.committed()[9 * SLOT_SIZE..].iter().filter(|b| **b != 0xFF).count(), 0);
}

#[test]
fn store_ignores_entries_past_nine() {
    let mut store = fresh_store();

    let mut values = NINE_CHANNELS.to_vec();
    values.push(145_000_000);
    store.store(&values).unwrap();

    assert_eq!(store.recall().unwrap().len(), 9);
    assert_eq!(word(store.medium(), 9), EMPTY_SLOT);
}

#[test]
fn store_commits_once() {
    let mut store = fresh_store();

    store.store(&NINE_CHANNELS).unwrap();
    assert_eq!(store.medium().commit_count(), 1);
}

#[test]
fn store_survives_power_cycle() {
    let mut store = fresh_store();
    store.store(&[144_800_000, 145_200_000]).unwrap();

    let mut medium = store.into_inner();
    medium.reload();

    let mut store = FrequencyStore::new(medium);
    store.initialize_medium().unwrap();
    assert_eq!(hz(&store.recall().unwrap()), vec![144_800_000, 145_200_000]);
}

#[test]
fn round_trip_is_idempotent() {
    for seed in [&[][..], &[144_800_000, 145_200_000][..], &NINE_CHANNELS[..]] {
        let mut store = fresh_store();
        store.store(seed).unwrap();

        let first = store.recall().unwrap();
        store.store(&hz(&first)).unwrap();
        let second = store.recall().unwrap();

        assert_eq!(first, second);
    }
}

// =============================================================================
// Medium Tests
// =============================================================================

#[test]
fn medium_requires_begin() {
    let mut store = FrequencyStore::new(Medium::new());

    assert_eq!(store.recall(), Err(StoreError::Medium(MediumError::NotInitialized)));
    assert_eq!(store.store(&NINE_CHANNELS), Err(StoreError::Medium(MediumError::NotInitialized)));
}

#[test]
fn medium_too_small_is_reported() {
    let mut store = FrequencyStore::new(RamMedium::<16>::new());

    assert_eq!(store.initialize_medium(), Err(StoreError::Medium(MediumError::TooLarge)));
}

#[test]
fn medium_bounds_checked() {
    let mut medium = RamMedium::<8>::new();
    medium.begin(8).unwrap();

    assert_eq!(medium.put_u32(4, 1), Ok(()));
    assert_eq!(medium.put_u32(5, 1), Err(MediumError::OutOfBounds));
    assert_eq!(medium.get_u32(usize::MAX), Err(MediumError::OutOfBounds));
}

#[test]
fn medium_uncommitted_writes_lost_on_reload() {
    let mut medium = RamMedium::<8>::new();
    medium.begin(8).unwrap();

    medium.put_u32(0, 145_000_000).unwrap();
    assert_eq!(medium.get_u32(0), Ok(145_000_000));

    medium.reload();
    medium.begin(8).unwrap();
    assert_eq!(medium.get_u32(0), Ok(EMPTY_SLOT));
}

#[test]
fn store_error_display() {
    let err: StoreError<MediumError> = StoreError::Medium(MediumError::OutOfBounds);
    assert_eq!(err.to_string(), "persistent medium error: OutOfBounds");
}
