//! requireMock Integration Tests
//!
//! Loads the project under tests/fixtures/test_root. Script sources are not
//! executed; `FixtureEvaluator` builds the exports each fixture file defines,
//! performing the same requires through the module scope.

use regex::Regex;
use spacey_mock_runtime::{
    Function, LoadOutcome, ModuleEvaluator, ModuleScope, Result, Runtime, RuntimeConfig,
    RuntimeError, Value,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .canonicalize()
        .unwrap()
}

/// Requester standing in for the test file next to test_root
fn test_file() -> PathBuf {
    fixtures_dir().join("require_mock_test.js")
}

/// Builds the exports of the fixture scripts
struct FixtureEvaluator {
    root: PathBuf,
}

/// `{ get/setModuleStateValue }` backed by a shared state object
fn module_state_exports(exports: &Value) {
    let state = Value::object_from([("value", Value::string("default"))]);

    let setter_state = state.clone();
    exports.set(
        "setModuleStateValue",
        Value::Function(Function::native("setModuleStateValue", move |args| {
            setter_state.set("value", args.first().cloned().unwrap_or_default());
            Ok(Value::Undefined)
        })),
    );
    exports.set(
        "getModuleStateValue",
        Value::Function(Function::native("getModuleStateValue", move |_| {
            Ok(state.get("value").unwrap_or_default())
        })),
    );
}

impl ModuleEvaluator for FixtureEvaluator {
    fn evaluate(&self, path: &Path, scope: &ModuleScope<'_>) -> Result<LoadOutcome> {
        let relative = path
            .strip_prefix(&self.root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();
        let exports = Value::object();

        match relative.as_str() {
            "RegularModule.js" => {
                module_state_exports(&exports);
                exports.set("isRealModule", Value::Boolean(true));
            }
            "ManuallyMocked.js" => {
                exports.set("isManualMockModule", Value::Boolean(false));
            }
            "__mocks__/ManuallyMocked.js" => {
                exports.set("isManualMockModule", Value::Boolean(true));
                let only = scope.require("OnlyRequiredFromMock")?;
                exports.set(
                    "onlyRequiredFromMockModuleValue",
                    only.get("value").unwrap_or_default(),
                );
                module_state_exports(&exports);
            }
            "OnlyRequiredFromMock.js" => {
                exports.set("value", Value::string("banana banana banana"));
            }
            "Circular.js" => {
                let this = scope.require("./Circular")?;
                exports.set("self", this);
            }
            "subdir1/MyModule.js"
            | "subdir2/MyModule.js"
            | "subdir1/__mocks__/MyModule.js"
            | "subdir2/__mocks__/MyModule.js" => {
                exports.set("modulePath", Value::string(relative.clone()));
            }
            _ => {
                return Err(RuntimeError::evaluation(path, "no fixture for this file"));
            }
        }

        Ok(LoadOutcome::Evaluated(exports))
    }
}

async fn create_runtime() -> Runtime {
    let root = fixtures_dir().join("test_root");
    let evaluator = Arc::new(FixtureEvaluator { root: root.clone() });
    Runtime::create(RuntimeConfig::new(root), evaluator)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_uses_manual_mocks_before_automocking() {
    let runtime = create_runtime().await;
    let exports = runtime
        .require_mock(runtime.mock_root_path(), "ManuallyMocked")
        .unwrap();
    assert_eq!(exports.get("isManualMockModule"), Some(Value::Boolean(true)));
}

#[tokio::test]
async fn test_resolves_modules_only_referenced_from_mocks() {
    let runtime = create_runtime().await;
    let exports = runtime
        .require_mock(runtime.mock_root_path(), "ManuallyMocked")
        .unwrap();
    assert_eq!(
        exports.get("onlyRequiredFromMockModuleValue"),
        Some(Value::string("banana banana banana"))
    );
}

#[tokio::test]
async fn test_stores_and_reuses_manual_mock_exports() {
    let runtime = create_runtime().await;
    let root = runtime.mock_root_path().to_path_buf();

    let exports = runtime.require_mock(&root, "ManuallyMocked").unwrap();
    let set = exports.get("setModuleStateValue").unwrap();
    set.as_function()
        .unwrap()
        .call(&[Value::string("test value")])
        .unwrap();

    let exports = runtime.require_mock(&root, "ManuallyMocked").unwrap();
    let get = exports.get("getModuleStateValue").unwrap();
    assert_eq!(
        get.as_function().unwrap().call(&[]).unwrap(),
        Value::string("test value")
    );
}

#[tokio::test]
async fn test_automocks_named_modules_without_manual_mock() {
    let runtime = create_runtime().await;
    let exports = runtime
        .require_mock(runtime.mock_root_path(), "RegularModule")
        .unwrap();
    let getter = exports.get("getModuleStateValue").unwrap();
    assert_eq!(getter.get("_isMockFunction"), Some(Value::Boolean(true)));
    assert_eq!(exports.get("isRealModule"), Some(Value::Boolean(true)));
}

#[tokio::test]
async fn test_automocks_relative_path_without_extension() {
    let runtime = create_runtime().await;
    let exports = runtime
        .require_mock(&test_file(), "./test_root/RegularModule")
        .unwrap();
    assert!(exports.get("getModuleStateValue").unwrap().is_mock_function());
}

#[tokio::test]
async fn test_automocks_relative_path_with_extension() {
    let runtime = create_runtime().await;
    let exports = runtime
        .require_mock(&test_file(), "./test_root/RegularModule.js")
        .unwrap();
    assert!(exports.get("getModuleStateValue").unwrap().is_mock_function());

    // Every spelling of the same file shares one mock.
    let named = runtime
        .require_mock(runtime.mock_root_path(), "RegularModule")
        .unwrap();
    let bare = runtime
        .require_mock(&test_file(), "./test_root/RegularModule")
        .unwrap();
    assert!(exports.same(&named));
    assert!(exports.same(&bare));
}

#[tokio::test]
async fn test_native_module_reports_loader_error() {
    let runtime = create_runtime().await;
    let err = runtime
        .require_mock(&test_file(), "./test_root/NativeModule.node")
        .unwrap_err();
    assert!(matches!(err, RuntimeError::NativeModuleLoad { .. }));

    let expected = Regex::new(
        r"NativeModule.node: file too short|not a valid Win\d+ application|not a mach-o file",
    )
    .unwrap();
    let message = err.to_string();
    assert!(expected.is_match(&message), "unexpected message: {}", message);
}

#[tokio::test]
async fn test_stores_and_reuses_automocked_named_exports() {
    let runtime = create_runtime().await;
    let root = runtime.mock_root_path().to_path_buf();

    let exports = runtime.require_mock(&root, "RegularModule").unwrap();
    exports.set("externalMutation", Value::string("test value"));
    let exports = runtime.require_mock(&root, "RegularModule").unwrap();
    assert_eq!(
        exports.get("externalMutation"),
        Some(Value::string("test value"))
    );
}

#[tokio::test]
async fn test_stores_and_reuses_automocked_relative_exports() {
    let runtime = create_runtime().await;

    let exports = runtime
        .require_mock(&test_file(), "./test_root/RegularModule")
        .unwrap();
    exports.set("externalMutation", Value::string("test value"));
    let exports = runtime
        .require_mock(&test_file(), "./test_root/RegularModule")
        .unwrap();
    assert_eq!(
        exports.get("externalMutation"),
        Some(Value::string("test value"))
    );
}

#[tokio::test]
async fn test_multiple_host_modules_return_correct_module() {
    let runtime = create_runtime().await;
    let root = runtime.mock_root_path().to_path_buf();

    let fs = runtime.require_mock(&root, "fs").unwrap();
    assert!(fs.get("existsSync").unwrap().is_mock_function());

    let events = runtime.require_mock(&root, "events").unwrap();
    let emitter = events.get("EventEmitter").unwrap();
    assert!(!emitter.is_undefined());
    assert!(!events.same(&fs));
}

#[tokio::test]
async fn test_throws_on_missing_named_module() {
    let runtime = create_runtime().await;
    let err = runtime
        .require_mock(runtime.mock_root_path(), "DoesntExist")
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().starts_with("Cannot find module 'DoesntExist' from "));
}

#[tokio::test]
async fn test_uses_closest_manual_mock_when_duplicates_exist() {
    let runtime = create_runtime().await;
    let root = runtime.mock_root_path().to_path_buf();

    let exports1 = runtime.require_mock(&root, "./subdir1/MyModule").unwrap();
    assert_eq!(
        exports1.get("modulePath"),
        Some(Value::string("subdir1/__mocks__/MyModule.js"))
    );

    let exports2 = runtime.require_mock(&root, "./subdir2/MyModule").unwrap();
    assert_eq!(
        exports2.get("modulePath"),
        Some(Value::string("subdir2/__mocks__/MyModule.js"))
    );
}

#[tokio::test]
async fn test_mock_root_path_is_inside_root_dir() {
    let runtime = create_runtime().await;
    assert_eq!(
        runtime.mock_root_path(),
        fixtures_dir().join("test_root/root.js")
    );
}

#[tokio::test]
async fn test_real_module_is_separate_from_mock() {
    let runtime = create_runtime().await;
    let root = runtime.mock_root_path().to_path_buf();

    let real = runtime.require_module(&root, "RegularModule").unwrap();
    let mock = runtime.require_mock(&root, "RegularModule").unwrap();
    assert!(!real.get("getModuleStateValue").unwrap().is_mock_function());
    assert!(!real.same(&mock));

    let subdir = runtime.require_module(&root, "./subdir1/MyModule").unwrap();
    assert_eq!(
        subdir.get("modulePath"),
        Some(Value::string("subdir1/MyModule.js"))
    );
}

#[tokio::test]
async fn test_json_module_mock_keeps_data() {
    let runtime = create_runtime().await;
    let mock = runtime
        .require_mock(runtime.mock_root_path(), "./settings.json")
        .unwrap();
    assert_eq!(mock.get("retries"), Some(Value::Number(3.0)));
    assert_eq!(mock.get("name"), Some(Value::string("fixture")));
}

#[tokio::test]
async fn test_registered_factory_wins_over_manual_mock() {
    let runtime = create_runtime().await;
    let root = runtime.mock_root_path().to_path_buf();

    runtime
        .set_mock(&root, "ManuallyMocked", || {
            Ok(Value::object_from([("fromFactory", Value::Boolean(true))]))
        })
        .unwrap();
    let exports = runtime.require_mock(&root, "ManuallyMocked").unwrap();
    assert_eq!(exports.get("fromFactory"), Some(Value::Boolean(true)));
    assert!(exports.get("isManualMockModule").is_none());
}

#[tokio::test]
async fn test_self_require_is_circular() {
    let runtime = create_runtime().await;
    let err = runtime
        .require_module(runtime.mock_root_path(), "Circular")
        .unwrap_err();
    assert!(matches!(err, RuntimeError::CircularDependency(_)));
}

#[tokio::test]
async fn test_reset_module_registry_drops_mock_state() {
    let runtime = create_runtime().await;
    let root = runtime.mock_root_path().to_path_buf();

    let exports = runtime.require_mock(&root, "RegularModule").unwrap();
    exports.set("externalMutation", Value::string("test value"));
    runtime.reset_module_registry();

    let exports = runtime.require_mock(&root, "RegularModule").unwrap();
    assert!(exports.get("externalMutation").is_none());
}
