// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use configdrive::locator::allocate_working_dir;
use configdrive::{
    ConfigDriveError, ConfigDriveLocator, ConfigDriveOptions, ConfigDriveService, DiscoveryResult,
    MetadataService, Result, SearchRequest, ServiceState, list_files,
};

#[derive(Clone, Copy)]
enum Outcome {
    Found,
    NotFound,
    Broken,
}

/// Materializes a small OpenStack tree instead of scanning devices.
struct FakeLocator {
    outcome: Outcome,
    target: PathBuf,
    locates: Arc<AtomicUsize>,
}

impl ConfigDriveLocator for FakeLocator {
    fn locate(&mut self, _request: &SearchRequest) -> Result<DiscoveryResult> {
        self.locates.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Found => {
                let latest = self.target.join("openstack").join("latest");
                fs::create_dir_all(&latest)?;
                fs::write(latest.join("meta_data.json"), br#"{"uuid":"42"}"#)?;
                fs::write(latest.join("user_data"), [0xde, 0xad, 0xbe, 0xef])?;
                fs::create_dir_all(self.target.join("ec2"))?;
                Ok(DiscoveryResult::Found {
                    working_dir: self.target.clone(),
                })
            }
            Outcome::NotFound => Ok(DiscoveryResult::NotFound),
            Outcome::Broken => Err(anyhow::anyhow!("device enumeration failed").into()),
        }
    }

    fn target_path(&self) -> &Path {
        &self.target
    }
}

struct Harness {
    selections: Arc<AtomicUsize>,
    locates: Arc<AtomicUsize>,
    targets: Arc<std::sync::Mutex<Vec<PathBuf>>>,
}

impl Harness {
    fn service(outcome: Outcome, options: ConfigDriveOptions) -> (ConfigDriveService, Self) {
        let harness = Self {
            selections: Arc::default(),
            locates: Arc::default(),
            targets: Arc::default(),
        };

        let selections = harness.selections.clone();
        let locates = harness.locates.clone();
        let targets = harness.targets.clone();
        let service = ConfigDriveService::with_selector(
            options,
            Box::new(move || -> Result<Box<dyn ConfigDriveLocator>> {
                selections.fetch_add(1, Ordering::SeqCst);
                let target = allocate_working_dir()?;
                targets.lock().unwrap().push(target.clone());
                Ok(Box::new(FakeLocator {
                    outcome,
                    target,
                    locates: locates.clone(),
                }))
            }),
        );
        (service, harness)
    }

    fn target(&self) -> PathBuf {
        self.targets.lock().unwrap()[0].clone()
    }
}

#[test]
fn load_read_cleanup_round_trip() {
    let (mut service, harness) = Harness::service(Outcome::Found, ConfigDriveOptions::default());
    assert_eq!(service.state(), ServiceState::Inactive);

    assert!(service.load().unwrap());
    assert_eq!(service.state(), ServiceState::Active);
    let dir = service.working_dir().unwrap().to_path_buf();
    assert_eq!(dir, harness.target());

    assert_eq!(
        service.get_data("openstack/latest/meta_data.json").unwrap(),
        br#"{"uuid":"42"}"#
    );
    assert_eq!(
        service.get_data("openstack/latest/user_data").unwrap(),
        [0xde, 0xad, 0xbe, 0xef]
    );
    assert_eq!(
        service.get_text("./openstack//latest/../latest/meta_data.json").unwrap(),
        r#"{"uuid":"42"}"#
    );
    assert_eq!(
        list_files(&dir).unwrap(),
        [
            PathBuf::from("openstack/latest/meta_data.json"),
            PathBuf::from("openstack/latest/user_data"),
        ]
    );

    service.cleanup();
    assert_eq!(service.state(), ServiceState::Inactive);
    assert!(service.working_dir().is_none());
    assert!(!dir.exists());
    assert!(
        service
            .get_data("openstack/latest/meta_data.json")
            .unwrap_err()
            .is_invalid_state()
    );
}

#[test]
fn missing_entries_are_not_existing_metadata() {
    let (mut service, _harness) = Harness::service(Outcome::Found, ConfigDriveOptions::default());
    service.load().unwrap();

    for path in ["openstack/latest/vendor_data.json", "openstack", "ec2"] {
        match service.get_data(path) {
            Err(ConfigDriveError::NotExistingMetadata { path: full }) => {
                assert!(full.ends_with(path));
            }
            other => panic!("{path}: unexpected {other:?}"),
        }
    }

    service.cleanup();
}

#[test]
fn absent_drive_is_not_an_error() {
    let (mut service, harness) = Harness::service(Outcome::NotFound, ConfigDriveOptions::default());

    assert!(!service.load().unwrap());
    assert_eq!(service.state(), ServiceState::NotFound);
    assert!(service.working_dir().is_none());
    assert!(service.get_data("openstack/latest/meta_data.json").unwrap_err().is_invalid_state());

    // The locator's directory exists until cleanup removes it.
    let target = harness.target();
    assert!(target.is_dir());
    service.cleanup();
    assert!(!target.exists());
}

#[test]
fn invalid_configuration_never_selects_a_locator() {
    let options = ConfigDriveOptions::default().with_types(["iso", "udf"]);
    let (mut service, harness) = Harness::service(Outcome::Found, options);

    let err = service.load().unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(err.to_string(), r#"Invalid Config Drive types ["udf"]"#);
    assert_eq!(service.state(), ServiceState::Inactive);
    assert_eq!(harness.selections.load(Ordering::SeqCst), 0);
    assert_eq!(harness.locates.load(Ordering::SeqCst), 0);
}

#[test]
fn locator_failure_propagates() {
    let (mut service, harness) = Harness::service(Outcome::Broken, ConfigDriveOptions::default());

    let err = service.load().unwrap_err();
    assert!(matches!(err, ConfigDriveError::Environment(_)));
    assert_eq!(service.state(), ServiceState::Inactive);

    service.cleanup();
    assert!(!harness.target().exists());
}

#[test]
fn load_twice_is_rejected_while_active() {
    let (mut service, harness) = Harness::service(Outcome::Found, ConfigDriveOptions::default());
    service.load().unwrap();

    assert!(service.load().unwrap_err().is_invalid_state());
    assert_eq!(service.state(), ServiceState::Active);
    assert_eq!(harness.locates.load(Ordering::SeqCst), 1);

    service.cleanup();
}

#[test]
fn cleanup_is_idempotent() {
    let (mut service, harness) = Harness::service(Outcome::Found, ConfigDriveOptions::default());
    service.cleanup();

    service.load().unwrap();
    let target = harness.target();
    fs::remove_dir_all(&target).unwrap();

    service.cleanup();
    service.cleanup();
    assert_eq!(service.state(), ServiceState::Inactive);
}

#[test]
fn legacy_flags_reach_the_locator() {
    let options = ConfigDriveOptions {
        raw_hdd: true,
        ..ConfigDriveOptions::empty()
    };
    let (mut service, _harness) = Harness::service(Outcome::NotFound, options);

    service.load().unwrap();
    assert_eq!(
        service.request().unwrap().to_string(),
        "types: iso | locations: hdd"
    );
    service.cleanup();
}

#[test]
fn reads_are_shared_across_threads() {
    let (mut service, _harness) = Harness::service(Outcome::Found, ConfigDriveOptions::default());
    service.load().unwrap();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let data = service.get_data("openstack/latest/user_data").unwrap();
                assert_eq!(data.len(), 4);
            });
        }
    });

    service.cleanup();
}
