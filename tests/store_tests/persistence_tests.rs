//! On-disk layout, reopen, open flags and damaged streams

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use bcdb::{BcdbError, Config, LogStore, StoreOptions, SyncStrategy};
use tempfile::TempDir;

use crate::{append_sample_records, setup_temp_store};

fn idx_path(root: &Path) -> PathBuf {
    root.join("bcdb").join("idx")
}

fn data_path(root: &Path) -> PathBuf {
    root.join("bcdb").join("data")
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_index_layout_is_bit_exact() {
    let (temp, mut store) = setup_temp_store();

    store.append(1234, b"Test123!").unwrap();
    store.append(0x0102_0304, b"").unwrap();
    store.append(7, b"xyz").unwrap();

    let idx = fs::read(idx_path(temp.path())).unwrap();
    assert_eq!(
        idx,
        vec![
            0xD2, 0x04, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, // 1234, 8
            0x04, 0x03, 0x02, 0x01, 0x00, 0x00, 0x00, 0x00, // 0x01020304, 0
            0x07, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, // 7, 3
        ]
    );

    let data = fs::read(data_path(temp.path())).unwrap();
    assert_eq!(data, b"Test123!xyz");
}

#[test]
fn test_reads_store_written_by_hand() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("bcdb")).unwrap();

    let mut idx = Vec::new();
    for (id, size) in [(10u32, 2u32), (20, 3)] {
        idx.extend_from_slice(&id.to_le_bytes());
        idx.extend_from_slice(&size.to_le_bytes());
    }
    fs::write(idx_path(temp.path()), idx).unwrap();
    fs::write(data_path(temp.path()), b"hiyou").unwrap();

    let mut store = LogStore::open_path(temp.path()).unwrap();

    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.get_by_id(20).unwrap().payload, "you");
    assert_eq!(store.get_by_index(0).unwrap().payload, "hi");
}

// =============================================================================
// Reopen Tests
// =============================================================================

#[test]
fn test_reopen_keeps_records_and_appends_at_end() {
    let temp = TempDir::new().unwrap();

    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        append_sample_records(&mut store);
        store.close().unwrap();
    }

    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(store.get_by_id(5678).unwrap().payload, "Test456!");

        store.append(4, b"four").unwrap();
        assert_eq!(store.count().unwrap(), 4);
        assert_eq!(store.get_by_index(3).unwrap().payload, "four");
        assert_eq!(store.get_by_index(0).unwrap().payload, "Test123!");
    }
}

#[test]
fn test_open_with_truncate_discards_contents() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        append_sample_records(&mut store);
    }

    let options = StoreOptions::default().truncate(true);
    let mut store = LogStore::open_with(temp.path(), options).unwrap();

    assert_eq!(store.count().unwrap(), 0);
    assert!(!store.has_index_by_id(1234).unwrap());
    assert_eq!(fs::metadata(data_path(temp.path())).unwrap().len(), 0);
}

#[test]
fn test_open_read_only() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        append_sample_records(&mut store);
    }

    let mut store = LogStore::open_with(temp.path(), StoreOptions::read_only()).unwrap();

    assert_eq!(store.count().unwrap(), 3);
    assert_eq!(store.get_by_id(9012).unwrap().payload, "Test789!");
    assert!(matches!(store.append(1, b"nope"), Err(BcdbError::Io(_))));
    store.close().unwrap();
}

#[test]
fn test_open_read_only_without_files_fails() {
    let temp = TempDir::new().unwrap();

    let result = LogStore::open_with(temp.path(), StoreOptions::read_only());

    assert!(matches!(result, Err(BcdbError::Io(_))));
}

#[test]
fn test_open_with_no_access_flags_fails() {
    let temp = TempDir::new().unwrap();

    let result = LogStore::open_with(temp.path(), StoreOptions::new());

    assert!(matches!(result, Err(BcdbError::Config(_))));
}

#[test]
fn test_sync_every_write() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .root_dir(temp.path())
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    let mut store = LogStore::open(config).unwrap();

    append_sample_records(&mut store);

    assert_eq!(store.config().sync_strategy, SyncStrategy::EveryWrite);
    assert_eq!(fs::metadata(idx_path(temp.path())).unwrap().len(), 24);
}

#[test]
fn test_sync_every_n_entries() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .root_dir(temp.path())
        .sync_strategy(SyncStrategy::EveryNEntries { count: 2 })
        .build();
    let mut store = LogStore::open(config).unwrap();

    append_sample_records(&mut store);
    store.sync().unwrap();

    assert_eq!(store.count().unwrap(), 3);
}

// =============================================================================
// Damaged Store Tests
// =============================================================================

fn append_raw(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

#[test]
fn test_torn_index_tail() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        store.append(1, b"one").unwrap();
        store.append(2, b"two").unwrap();
    }
    append_raw(&idx_path(temp.path()), &[3, 0, 0]);

    let mut store = LogStore::open_path(temp.path()).unwrap();

    // Partial entry is not counted and ends an identifier probe
    assert_eq!(store.count().unwrap(), 2);
    assert!(store.has_index_by_id(2).unwrap());
    assert!(!store.has_index_by_id(3).unwrap());

    // Records before the tear still resolve
    assert_eq!(store.get_by_index(1).unwrap().payload, "two");
    assert_eq!(store.get_by_id(1).unwrap().payload, "one");

    // A scan that has to cross the tear reports damage, not absence
    assert!(matches!(store.get_by_index(2), Err(BcdbError::CorruptStore(_))));
    assert!(matches!(store.get_by_id(99), Err(BcdbError::CorruptStore(_))));

    let report = store.verify().unwrap();
    assert_eq!(report.entries, 2);
    assert_eq!(report.torn_index_bytes, 3);
    assert!(!report.is_consistent());
}

#[test]
fn test_short_data_stream() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        store.append(1, b"first").unwrap();
        store.append(2, b"second").unwrap();
    }

    // Index written, payload cut short (crash between the two writes)
    let data = OpenOptions::new().write(true).open(data_path(temp.path())).unwrap();
    data.set_len(8).unwrap();
    drop(data);

    let mut store = LogStore::open_path(temp.path()).unwrap();

    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.get_by_index(0).unwrap().payload, "first");
    assert!(matches!(store.get_by_index(1), Err(BcdbError::CorruptStore(_))));
    assert!(matches!(store.get_by_id(2), Err(BcdbError::CorruptStore(_))));

    let records: Vec<_> = store.records().unwrap().collect();
    assert_eq!(records.len(), 2);
    assert!(records[0].is_ok());
    assert!(matches!(records[1], Err(BcdbError::CorruptStore(_))));

    let report = store.verify().unwrap();
    assert_eq!(report.expected_data_len, 11);
    assert_eq!(report.actual_data_len, 8);
    assert_eq!(report.missing_data_bytes(), 3);
    assert_eq!(report.orphaned_data_bytes(), 0);
}

#[test]
fn test_append_refused_after_torn_index_tail() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        store.append(1, b"one").unwrap();
    }
    append_raw(&idx_path(temp.path()), &[3, 0, 0]);

    let mut store = LogStore::open_path(temp.path()).unwrap();
    let result = store.append(2, b"two");

    assert!(matches!(result, Err(BcdbError::CorruptStore(_))));
    assert_eq!(fs::metadata(idx_path(temp.path())).unwrap().len(), 11);
    assert_eq!(fs::read(data_path(temp.path())).unwrap(), b"one");
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.get_by_id(1).unwrap().payload, "one");
}

#[test]
fn test_append_refused_after_short_data() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        store.append(1, b"first").unwrap();
        store.append(2, b"second").unwrap();
    }

    // Index entry for record 2 made it to disk, its payload did not
    let data = OpenOptions::new().write(true).open(data_path(temp.path())).unwrap();
    data.set_len(5).unwrap();
    drop(data);

    let mut store = LogStore::open_path(temp.path()).unwrap();

    assert!(matches!(store.append(3, b"third!"), Err(BcdbError::CorruptStore(_))));
    assert!(matches!(store.append(4, b"fourth"), Err(BcdbError::CorruptStore(_))));

    // Nothing shifted: record 2 is still reported as damaged, not as record 3's bytes
    assert_eq!(fs::metadata(idx_path(temp.path())).unwrap().len(), 16);
    assert_eq!(fs::metadata(data_path(temp.path())).unwrap().len(), 5);
    assert!(matches!(store.get_by_id(2), Err(BcdbError::CorruptStore(_))));
    assert!(matches!(store.get_by_id(3), Err(BcdbError::NotFound(3))));
    assert_eq!(store.get_by_id(1).unwrap().payload, "first");
}

#[test]
fn test_append_refused_after_orphaned_data() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        store.append(1, b"abc").unwrap();
    }
    append_raw(&data_path(temp.path()), b"stray");

    let mut store = LogStore::open_path(temp.path()).unwrap();

    assert!(matches!(store.append(2, b"next"), Err(BcdbError::CorruptStore(_))));
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(fs::metadata(data_path(temp.path())).unwrap().len(), 8);
}

#[test]
fn test_append_after_reopen_of_consistent_store() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        store.append(1, b"").unwrap();
        store.append(2, b"two").unwrap();
    }

    let mut store = LogStore::open_path(temp.path()).unwrap();
    store.append(3, b"three").unwrap();

    assert!(store.verify().unwrap().is_consistent());
    assert_eq!(store.get_by_id(3).unwrap().payload, "three");
}

#[test]
fn test_verify_consistent_store() {
    let (_temp, mut store) = setup_temp_store();
    append_sample_records(&mut store);

    let report = store.verify().unwrap();

    assert!(report.is_consistent());
    assert_eq!(report.entries, 3);
    assert_eq!(report.expected_data_len, 24);
    assert_eq!(report.actual_data_len, 24);

    // Verification is a read; appends continue normally
    store.append(1, b"z").unwrap();
    assert!(store.verify().unwrap().is_consistent());
}

#[test]
fn test_verify_orphaned_data() {
    let temp = TempDir::new().unwrap();
    {
        let mut store = LogStore::open_path(temp.path()).unwrap();
        store.append(1, b"abc").unwrap();
    }
    append_raw(&data_path(temp.path()), b"stray");

    let mut store = LogStore::open_path(temp.path()).unwrap();
    let report = store.verify().unwrap();

    assert_eq!(report.orphaned_data_bytes(), 5);
    assert!(!report.is_consistent());
    assert_eq!(store.get_by_id(1).unwrap().payload, "abc");
}
