//! Behaviour tests for session configuration toggles.
//!
//! Release builds must name every toggle explicitly and refuse insecure
//! combinations.

use std::cell::RefCell;
use std::collections::HashMap;

use actix_web::cookie::SameSite;
use mockable::MockEnv;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use waterlog::inbound::http::session_config::{
    ALLOW_EPHEMERAL_ENV, BuildMode, COOKIE_SECURE_ENV, KEY_FILE_ENV, SAMESITE_ENV,
    SessionConfigError, SessionSettings, session_settings_from_env,
};
use waterlog::test_support::TempKeyFile;

struct SessionConfigWorld {
    vars: RefCell<HashMap<&'static str, String>>,
    mode: RefCell<BuildMode>,
    outcome: RefCell<Option<Result<SessionSettings, SessionConfigError>>>,
    key_files: RefCell<Vec<TempKeyFile>>,
}

impl SessionConfigWorld {
    fn new() -> Self {
        Self {
            vars: RefCell::new(HashMap::new()),
            mode: RefCell::new(BuildMode::Release),
            outcome: RefCell::new(None),
            key_files: RefCell::new(Vec::new()),
        }
    }

    fn set_env_var(&self, name: &'static str, value: &str) {
        self.vars.borrow_mut().insert(name, value.to_owned());
    }

    fn add_key_file(&self, len: usize) {
        let file = TempKeyFile::new(len).expect("key file creation should succeed");
        self.set_env_var(KEY_FILE_ENV, &file.path_str());
        self.key_files.borrow_mut().push(file);
    }

    fn evaluate(&self) {
        let vars = self.vars.borrow().clone();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        let result = session_settings_from_env(&env, *self.mode.borrow());
        *self.outcome.borrow_mut() = Some(result);
    }

    fn with_settings(&self, check: impl FnOnce(&SessionSettings)) {
        let outcome = self.outcome.borrow();
        let settings = outcome
            .as_ref()
            .expect("evaluation result")
            .as_ref()
            .expect("expected settings to succeed");
        check(settings);
    }

    fn error_matches(&self, predicate: impl FnOnce(&SessionConfigError) -> bool) {
        let outcome = self.outcome.borrow();
        match outcome.as_ref().expect("evaluation result") {
            Ok(_) => panic!("expected settings to fail"),
            Err(error) => assert!(predicate(error), "unexpected error: {error}"),
        }
    }
}

#[fixture]
fn world() -> SessionConfigWorld {
    SessionConfigWorld::new()
}

#[given("a release build configuration")]
fn a_release_build_configuration(world: &SessionConfigWorld) {
    *world.mode.borrow_mut() = BuildMode::Release;
}

#[given("SESSION_COOKIE_SECURE is set to {value}")]
fn cookie_secure_is_set(world: &SessionConfigWorld, value: String) {
    world.set_env_var(COOKIE_SECURE_ENV, &value);
}

#[given("SESSION_SAMESITE is set to {value}")]
fn same_site_is_set(world: &SessionConfigWorld, value: String) {
    world.set_env_var(SAMESITE_ENV, &value);
}

#[given("SESSION_ALLOW_EPHEMERAL is set to {value}")]
fn allow_ephemeral_is_set(world: &SessionConfigWorld, value: String) {
    world.set_env_var(ALLOW_EPHEMERAL_ENV, &value);
}

#[given("a session key file with {len} bytes")]
fn a_session_key_file(world: &SessionConfigWorld, len: usize) {
    world.add_key_file(len);
}

#[when("the session configuration is loaded")]
fn the_session_configuration_is_loaded(world: &SessionConfigWorld) {
    world.evaluate();
}

#[then("the configuration load succeeds")]
fn the_configuration_load_succeeds(world: &SessionConfigWorld) {
    world.with_settings(|settings| assert_eq!(settings.key_fingerprint().len(), 16));
}

#[then("the cookie secure flag is true")]
fn the_cookie_secure_flag_is_true(world: &SessionConfigWorld) {
    world.with_settings(|settings| assert!(settings.cookie_secure));
}

#[then("the SameSite policy is Strict")]
fn the_same_site_policy_is_strict(world: &SessionConfigWorld) {
    world.with_settings(|settings| assert_eq!(settings.same_site, SameSite::Strict));
}

#[then("the configuration load fails due to missing SESSION_COOKIE_SECURE")]
fn fails_missing_cookie_secure(world: &SessionConfigWorld) {
    world.error_matches(|error| {
        matches!(
            error,
            SessionConfigError::MissingEnv {
                name: COOKIE_SECURE_ENV
            }
        )
    });
}

#[then("the configuration load fails because ephemeral keys are not allowed")]
fn fails_ephemeral_not_allowed(world: &SessionConfigWorld) {
    world.error_matches(|error| matches!(error, SessionConfigError::EphemeralNotAllowed));
}

#[then("the configuration load fails because SameSite=None requires secure cookies")]
fn fails_insecure_same_site_none(world: &SessionConfigWorld) {
    world.error_matches(|error| matches!(error, SessionConfigError::InsecureSameSiteNone));
}

#[then("the configuration load fails because the key is too short")]
fn fails_key_too_short(world: &SessionConfigWorld) {
    world.error_matches(|error| {
        matches!(error, SessionConfigError::KeyTooShort { length: 16, .. })
    });
}

#[scenario(path = "tests/features/session_config.feature", index = 0)]
fn explicit_release_settings(world: SessionConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/session_config.feature", index = 1)]
fn missing_secure_toggle(world: SessionConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/session_config.feature", index = 2)]
fn ephemeral_key_rejected(world: SessionConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/session_config.feature", index = 3)]
fn same_site_none_rejected(world: SessionConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/session_config.feature", index = 4)]
fn short_key_rejected(world: SessionConfigWorld) {
    drop(world);
}
