//! Builtin catalog of well-known platforms.
//!
//! These definitions ship with the crate so a scanner is usable without a
//! `probe-definitions/` directory. Each entry passes the same validation as
//! loaded definitions; the registry constructor enforces that.

use crate::definition::{
    HttpMethod, PlatformMetadata, ProbeDefinition, RequestSpec, SuccessPredicate,
};
use handlescan_core::{PlatformCategory, PlatformId};
use std::collections::BTreeMap;

fn entry(
    id: &str,
    name: &str,
    category: PlatformCategory,
    url_template: &str,
    predicate: SuccessPredicate,
) -> ProbeDefinition {
    ProbeDefinition {
        platform: PlatformMetadata {
            id: PlatformId::new(id).expect("builtin platform id is valid"),
            name: name.to_string(),
            category,
        },
        request: RequestSpec {
            url_template: url_template.to_string(),
            method: HttpMethod::Get,
            timeout_secs: None,
            headers: BTreeMap::new(),
        },
        predicate,
    }
}

/// Build the builtin probe definitions.
///
/// The set mirrors the platforms the scanner has always probed: profile
/// pages addressed by handle, classified on the status code alone.
#[must_use]
pub fn builtin_definitions() -> Vec<ProbeDefinition> {
    let default = SuccessPredicate::default;

    vec![
        entry(
            "github",
            "GitHub",
            PlatformCategory::Developer,
            "https://github.com/{username}",
            default(),
        ),
        entry(
            "gitlab",
            "GitLab",
            PlatformCategory::Developer,
            "https://gitlab.com/{username}",
            default(),
        ),
        entry(
            "reddit",
            "Reddit",
            PlatformCategory::SocialMedia,
            "https://www.reddit.com/user/{username}",
            SuccessPredicate {
                found: vec![200],
                not_found: vec![404, 403],
            },
        ),
        entry(
            "x-twitter",
            "X (Twitter)",
            PlatformCategory::SocialMedia,
            "https://x.com/{username}",
            default(),
        ),
        entry(
            "instagram",
            "Instagram",
            PlatformCategory::SocialMedia,
            "https://www.instagram.com/{username}/",
            default(),
        ),
        entry(
            "tiktok",
            "TikTok",
            PlatformCategory::SocialMedia,
            "https://www.tiktok.com/@{username}",
            default(),
        ),
        entry(
            "mastodon-social",
            "Mastodon (mastodon.social)",
            PlatformCategory::SocialMedia,
            "https://mastodon.social/@{username}",
            default(),
        ),
        entry(
            "telegram",
            "Telegram",
            PlatformCategory::Messaging,
            "https://t.me/{username}",
            default(),
        ),
        entry(
            "medium",
            "Medium",
            PlatformCategory::Content,
            "https://medium.com/@{username}",
            default(),
        ),
        entry(
            "twitch",
            "Twitch",
            PlatformCategory::Content,
            "https://www.twitch.tv/{username}",
            default(),
        ),
        entry(
            "dev-to",
            "DEV Community",
            PlatformCategory::Developer,
            "https://dev.to/{username}",
            default(),
        ),
        entry(
            "pinterest",
            "Pinterest",
            PlatformCategory::SocialMedia,
            "https://www.pinterest.com/{username}/",
            default(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use handlescan_core::Username;

    #[test]
    fn test_builtin_definitions_are_valid() {
        let definitions = builtin_definitions();
        assert!(!definitions.is_empty());

        for definition in &definitions {
            definition
                .validate()
                .unwrap_or_else(|e| panic!("builtin definition invalid: {e}"));
        }
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let definitions = builtin_definitions();
        let ids: std::collections::HashSet<_> =
            definitions.iter().map(ProbeDefinition::id).collect();
        assert_eq!(ids.len(), definitions.len());
    }

    #[test]
    fn test_builtin_url_building() {
        let definitions = builtin_definitions();
        let target = Username::new("johndoe").expect("valid handle");

        for definition in &definitions {
            let url = definition.build_url(&target);
            assert!(url.contains("johndoe"), "URL missing handle: {url}");
            assert!(!url.contains("{username}"), "unreplaced slot: {url}");
        }
    }
}
