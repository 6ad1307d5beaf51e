//! Environment overrides live in their own test binary: they mutate the
//! process environment, which other config tests must not observe.

use std::env;

use rectree::config::Settings;

#[test]
fn given_env_vars_when_load_then_override_files_and_defaults() {
    env::set_var("RECTREE_SERIALIZE__KEY_CHILDREN", "kids");
    env::set_var("RECTREE_SERIALIZE__EMPTY_CHILDREN", "false");
    env::set_var("RECTREE_LINK__KEY_PARENT", "parent_id");

    let settings = Settings::load_from(None, None);

    env::remove_var("RECTREE_SERIALIZE__KEY_CHILDREN");
    env::remove_var("RECTREE_SERIALIZE__EMPTY_CHILDREN");
    env::remove_var("RECTREE_LINK__KEY_PARENT");

    let settings = settings.expect("load settings");
    assert_eq!(settings.serialize.key_children, "kids");
    assert!(!settings.serialize.empty_children);
    assert_eq!(settings.link.key_parent, "parent_id");
    assert_eq!(settings.link.key_id, "id");
}
