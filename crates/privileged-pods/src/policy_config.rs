use std::collections::HashSet;

use crate::settings::Settings;

/// The trust policy: identities allowed to schedule privileged Pods.
///
/// Built once before any request is evaluated and never changed
/// afterwards. Lookups are exact, case-sensitive string matches.
/// Empty names are never stored, so an unconfigured policy trusts nobody,
/// not even a request carrying an empty username.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    trusted_users: HashSet<String>,
    trusted_groups: HashSet<String>,
    skip_init_containers: bool,
    skip_ephemeral_containers: bool,
}

impl PolicyConfig {
    pub fn new<U, G>(users: U, groups: G) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        PolicyConfig {
            trusted_users: non_empty(users),
            trusted_groups: non_empty(groups),
            ..Default::default()
        }
    }

    /// Build the policy from comma separated lists, like the ones found
    /// inside of the `TRUSTED_USERS` and `TRUSTED_GROUPS` environment
    /// variables.
    pub fn from_delimited(users: &str, groups: &str) -> Self {
        Self::new(users.split(','), groups.split(','))
    }

    pub fn with_skip_init_containers(mut self, skip: bool) -> Self {
        self.skip_init_containers = skip;
        self
    }

    pub fn with_skip_ephemeral_containers(mut self, skip: bool) -> Self {
        self.skip_ephemeral_containers = skip;
        self
    }

    pub fn is_user_trusted(&self, user: &str) -> bool {
        self.trusted_users.contains(user)
    }

    pub fn is_group_trusted(&self, group: &str) -> bool {
        self.trusted_groups.contains(group)
    }

    pub fn skip_init_containers(&self) -> bool {
        self.skip_init_containers
    }

    pub fn skip_ephemeral_containers(&self) -> bool {
        self.skip_ephemeral_containers
    }

    pub fn trusted_users(&self) -> impl Iterator<Item = &str> {
        self.trusted_users.iter().map(String::as_str)
    }

    pub fn trusted_groups(&self) -> impl Iterator<Item = &str> {
        self.trusted_groups.iter().map(String::as_str)
    }
}

impl From<&Settings> for PolicyConfig {
    fn from(settings: &Settings) -> Self {
        PolicyConfig::new(
            settings.trusted_users.iter().cloned(),
            settings.trusted_groups.iter().cloned(),
        )
        .with_skip_init_containers(settings.skip_init_containers)
        .with_skip_ephemeral_containers(settings.skip_ephemeral_containers)
    }
}

fn non_empty<I>(names: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    names
        .into_iter()
        .map(Into::into)
        .filter(|name: &String| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn empty_delimited_strings_trust_nobody() {
        let config = PolicyConfig::from_delimited("", "");

        assert!(!config.is_user_trusted(""));
        assert!(!config.is_group_trusted(""));
        assert_eq!(config.trusted_users().count(), 0);
        assert_eq!(config.trusted_groups().count(), 0);
    }

    #[test]
    fn empty_segments_are_dropped() {
        let config = PolicyConfig::from_delimited("alice,,bob,", ",admins");

        let mut users: Vec<&str> = config.trusted_users().collect();
        users.sort();
        assert_eq!(users, vec!["alice", "bob"]);
        assert_eq!(config.trusted_groups().collect::<Vec<_>>(), vec!["admins"]);
        assert!(!config.is_user_trusted(""));
    }

    #[rstest]
    #[case::exact_match("alice", true)]
    #[case::other_user("bob", true)]
    #[case::case_sensitive("Alice", false)]
    #[case::no_trimming(" alice", false)]
    #[case::no_prefix_match("ali", false)]
    #[case::unknown("mallory", false)]
    fn user_lookup(#[case] user: &str, #[case] trusted: bool) {
        let config = PolicyConfig::from_delimited("alice,bob", "");

        assert_eq!(config.is_user_trusted(user), trusted);
    }

    #[rstest]
    #[case::exact_match("system:masters", true)]
    #[case::case_sensitive("SYSTEM:MASTERS", false)]
    #[case::no_wildcards("system:*", false)]
    fn group_lookup(#[case] group: &str, #[case] trusted: bool) {
        let config = PolicyConfig::new(Vec::<String>::new(), ["system:masters"]);

        assert_eq!(config.is_group_trusted(group), trusted);
    }

    #[test]
    fn build_from_settings() {
        let settings = Settings {
            trusted_users: vec!["alice".to_owned()],
            trusted_groups: vec!["admins".to_owned(), "ops".to_owned()],
            skip_init_containers: true,
            skip_ephemeral_containers: false,
        };

        let config = PolicyConfig::from(&settings);

        assert!(config.is_user_trusted("alice"));
        assert!(config.is_group_trusted("admins"));
        assert!(config.is_group_trusted("ops"));
        assert!(!config.is_group_trusted("alice"));
        assert!(config.skip_init_containers());
        assert!(!config.skip_ephemeral_containers());
    }

    #[test]
    fn default_settings_trust_nobody() {
        let config = PolicyConfig::from(&Settings::default());

        assert_eq!(config, PolicyConfig::default());
        assert!(!config.is_user_trusted(""));
        assert!(!config.is_group_trusted(""));
    }
}
