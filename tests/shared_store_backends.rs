//! Store behaviour over the real OS backends
//!
//! Shared memory segments are process-global, so every test uses a fresh
//! namespace and runs serially.

use algos::{
    object_region_name, BackendKind, MmapBackend, RegionBackend, RegionError, SharedStore,
    ShmBackend, StoreError,
};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::collections::{BTreeSet, HashMap, HashSet};
use test_case::test_case;
use uuid::Uuid;

fn unique_namespace() -> String {
    // short enough for platforms with tight shm name limits
    format!("t{}", &Uuid::new_v4().simple().to_string()[..12])
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test_case(BackendKind::SharedMemory ; "shared memory")]
#[test_case(BackendKind::MmapFile ; "mmap file")]
#[serial]
fn test_lifecycle(kind: BackendKind) {
    let ns = unique_namespace();
    let mut store = SharedStore::open_or_create(&ns, kind).unwrap();
    assert_eq!(store.read_index().unwrap(), set(&[ns.as_str()]));

    store.write("a", &vec![1u8, 2, 3]).unwrap();
    assert_eq!(store.read::<Vec<u8>>("a").unwrap(), vec![1, 2, 3]);
    assert!(matches!(
        store.write("a", &vec![9u8]),
        Err(StoreError::HandleAlreadyExists(_))
    ));
    assert_eq!(store.read::<Vec<u8>>("a").unwrap(), vec![1, 2, 3]);

    store.update("a", &vec![4u8]).unwrap();
    assert_eq!(store.read::<Vec<u8>>("a").unwrap(), vec![4]);
    assert_eq!(store.read_index().unwrap(), set(&[ns.as_str(), "a"]));

    store.delete("a").unwrap();
    assert!(matches!(store.read::<Vec<u8>>("a"), Err(StoreError::HandleNotFound(_))));
    assert_eq!(store.read_index().unwrap(), set(&[ns.as_str()]));

    store.erase().unwrap();
    assert!(matches!(store.read_index(), Err(StoreError::NotInitialized(_))));
}

#[test]
#[serial]
fn test_scenario_over_shared_memory() {
    let ns = unique_namespace();
    let mut store = SharedStore::open_or_create(&ns, BackendKind::SharedMemory).unwrap();

    let a = vec!["Kolmogorov".to_string(), "Markov".to_string(), "Gauss".to_string()];
    let c: HashMap<String, HashSet<String>> =
        HashMap::from([("hello".to_string(), HashSet::from(["world".to_string()]))]);
    store.write("a", &a).unwrap();
    store.write("b", &42i64).unwrap();
    store.write("c", &c).unwrap();

    assert_eq!(store.read::<Vec<String>>("a").unwrap(), a);
    assert_eq!(store.read::<i64>("b").unwrap(), 42);
    assert_eq!(store.read::<HashMap<String, HashSet<String>>>("c").unwrap(), c);

    store.erase().unwrap();
    assert!(matches!(store.read::<Vec<String>>("a"), Err(StoreError::NotInitialized(_))));
}

#[test]
#[serial]
fn test_erase_unlinks_shared_memory_regions() {
    let ns = unique_namespace();
    let mut store = SharedStore::open_or_create(&ns, BackendKind::SharedMemory).unwrap();
    store.write("x", &1u32).unwrap();
    store.write("y", &2u32).unwrap();
    store.erase().unwrap();

    let shm = ShmBackend::new();
    for name in [ns.clone(), object_region_name(&ns, "x"), object_region_name(&ns, "y")] {
        assert!(
            matches!(shm.attach(&name), Err(RegionError::NotFound(_))),
            "{name} should be gone"
        );
    }
}

#[test]
#[serial]
fn test_regions_outlive_the_store_that_wrote_them() {
    let ns = unique_namespace();
    {
        let mut writer = SharedStore::open_or_create(&ns, BackendKind::SharedMemory).unwrap();
        writer.write("kept", &"still here").unwrap();
    }

    let mut reader = SharedStore::open_or_create(&ns, BackendKind::SharedMemory).unwrap();
    assert_eq!(reader.read_index().unwrap(), set(&[ns.as_str(), "kept"]));
    assert_eq!(reader.read::<String>("kept").unwrap(), "still here");
    reader.erase().unwrap();
}

#[test]
#[serial]
fn test_mmap_stores_share_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let ns = unique_namespace();

    let mut first =
        SharedStore::with_backend(&ns, Box::new(MmapBackend::in_dir(dir.path()).unwrap())).unwrap();
    first.write("a", &3.5f64).unwrap();

    let mut second =
        SharedStore::with_backend(&ns, Box::new(MmapBackend::in_dir(dir.path()).unwrap())).unwrap();
    assert_eq!(second.read::<f64>("a").unwrap(), 3.5);

    second.erase().unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    // the first instance is still live but its namespace is gone
    assert!(first.read_index().is_err());
}

#[test]
#[serial]
fn test_private_mmap_tempdir_is_released_on_erase() {
    let backend = MmapBackend::new().unwrap();
    let root = backend.root().to_path_buf();
    let mut store = SharedStore::with_backend("private", Box::new(backend)).unwrap();
    store.write("a", &1u8).unwrap();
    assert!(root.join("private_a").exists());

    store.erase().unwrap();
    assert!(!root.exists());
}
