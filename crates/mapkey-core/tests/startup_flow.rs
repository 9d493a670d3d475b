use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use mapkey_core::defines::ResolvedSecret;
use mapkey_core::metadata::{BuildMetadata, DART_DEFINES};
use mapkey_core::startup::{
    run_startup, run_startup_with, MapsSdk, PluginHost, StartupError, StartupOptions,
    StartupOutcome,
};

/// 记录调用顺序的测试替身（同时充当 SDK 与宿主）。
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

struct Sdk<'a>(&'a std::cell::RefCell<Recorder>);
struct Host<'a>(&'a std::cell::RefCell<Recorder>);

impl MapsSdk for Sdk<'_> {
    fn provide_api_key(&mut self, api_key: ResolvedSecret) {
        self.0
            .borrow_mut()
            .events
            .push(format!("sdk:{}", api_key.into_inner()));
    }
}

impl PluginHost for Host<'_> {
    fn register_plugins(&mut self) {
        self.0.borrow_mut().events.push("plugins".to_string());
    }
}

fn run(metadata: &BuildMetadata) -> (Result<StartupOutcome, StartupError>, Vec<String>) {
    let recorder = std::cell::RefCell::new(Recorder::default());
    let result = run_startup(metadata, &mut Sdk(&recorder), &mut Host(&recorder));
    (result, recorder.into_inner().events)
}

#[test]
fn success_initializes_sdk_once_then_registers_plugins() {
    let metadata =
        BuildMetadata::from_entries([(DART_DEFINES, STANDARD.encode("GOOGLE_MAPS_KEY=k1"))]);
    let (result, events) = run(&metadata);
    assert_eq!(result, Ok(StartupOutcome::SdkInitialized));
    assert_eq!(events, ["sdk:k1", "plugins"]);
}

#[test]
fn key_not_found_skips_sdk_but_registers_plugins() {
    let metadata = BuildMetadata::from_entries([(DART_DEFINES, STANDARD.encode("OTHER=1"))]);
    let (result, events) = run(&metadata);
    assert_eq!(result, Ok(StartupOutcome::KeyNotFound));
    assert_eq!(events, ["plugins"]);
}

#[test]
fn empty_manifest_is_not_found_not_fatal() {
    let metadata = BuildMetadata::from_entries([(DART_DEFINES, "")]);
    let (result, events) = run(&metadata);
    assert_eq!(result, Ok(StartupOutcome::KeyNotFound));
    assert_eq!(events, ["plugins"]);
}

#[test]
fn missing_manifest_is_fatal_and_calls_nothing() {
    let metadata = BuildMetadata::from_entries([("OTHER_KEY", "x")]);
    let (result, events) = run(&metadata);
    assert_eq!(
        result,
        Err(StartupError::ManifestMissing {
            key: DART_DEFINES.to_string()
        })
    );
    assert!(events.is_empty());
}

#[test]
fn non_string_manifest_is_fatal() {
    let metadata = BuildMetadata::from_json_str(r#"{ "DART_DEFINES": ["a", "b"] }"#).unwrap();
    let (result, events) = run(&metadata);
    let err = result.unwrap_err();
    assert!(matches!(err, StartupError::ManifestInvalid { .. }));
    assert!(err.to_string().contains(DART_DEFINES));
    assert!(events.is_empty());
}

#[test]
fn fatal_error_message_names_missing_key() {
    let metadata = BuildMetadata::default();
    let (result, _) = run(&metadata);
    assert_eq!(
        result.unwrap_err().to_string(),
        "DART_DEFINES is missing in build metadata"
    );
}

#[test]
fn custom_options_select_other_keys() {
    let metadata = BuildMetadata::from_entries([(
        "CUSTOM_DEFINES",
        STANDARD.encode("OTHER_MAPS_KEY=k2"),
    )]);
    let options = StartupOptions {
        manifest_key: "CUSTOM_DEFINES".to_string(),
        target_key: "OTHER_MAPS_KEY".to_string(),
    };
    let recorder = std::cell::RefCell::new(Recorder::default());
    let result = run_startup_with(
        &options,
        &metadata,
        &mut Sdk(&recorder),
        &mut Host(&recorder),
    );
    assert_eq!(result, Ok(StartupOutcome::SdkInitialized));
    assert_eq!(recorder.into_inner().events, ["sdk:k2", "plugins"]);
}
