use super::{apply_env, apply_file, Settings};

use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_match_client_endpoints() {
    let settings = Settings::default();
    assert_eq!(settings.server_bind, "127.0.0.1:8080");
    assert!(settings.seed_demo_orders);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        "bind_addr = \"0.0.0.0:9000\"\nseed_demo_orders = false\n",
    );
    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert!(!settings.seed_demo_orders);
}

#[test]
fn unreadable_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "bind_addr = [");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_legacy_name() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env(&[
            ("SERVER_BIND", "127.0.0.1:7000"),
            ("APP__BIND_ADDR", "127.0.0.1:7001"),
            ("APP__SEED_DEMO_ORDERS", "false"),
        ]),
    );
    assert_eq!(settings.server_bind, "127.0.0.1:7001");
    assert!(!settings.seed_demo_orders);
}

#[test]
fn invalid_seed_flag_keeps_previous_value() {
    let mut settings = Settings::default();
    apply_env(&mut settings, env(&[("APP__SEED_DEMO_ORDERS", "maybe")]));
    assert!(settings.seed_demo_orders);
}
