use crate::models::trainer::{TrainerIdentity, TrainerPattern};

/// Normalize raw recognition output for matching
///
/// Lowercases, collapses whitespace, maps the curly apostrophe to the
/// straight one, drops the artifact characters recognizers emit (replacement
/// character, zero-width space, non-breaking space) and trims stray edge
/// punctuation. Idempotent, so callers may normalize defensively.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter_map(|c| match c {
            '\u{fffd}' | '\u{200b}' => None,
            '\u{a0}' => Some(' '),
            '\u{2019}' => Some('\''),
            other => Some(other),
        })
        .collect();

    let collapsed = cleaned
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    collapsed
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '.' | ',' | ';' | ':' | '!' | '?'))
        .to_string()
}

/// Match normalized text against an ordered pattern set
///
/// First matching rule wins. Text matching nothing is the common case
/// (recognition noise, non-battle frames) and returns `None`.
pub fn match_trainer(text: &str, patterns: &[TrainerPattern]) -> Option<TrainerIdentity> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return None;
    }
    patterns.iter().find_map(|p| p.matches(&normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_set() -> Vec<TrainerPattern> {
        vec![
            TrainerPattern::team("cheren", "Cheren"),
            TrainerPattern::team("n", "N"),
            TrainerPattern::numbered_rival_team(),
            TrainerPattern::bare_rival_team(),
            TrainerPattern::misread(r"\brivalt'?s\s+team\b", "Rival"),
        ]
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Cheren\u{2019}s   TEAM  "), "cheren's team");
        assert_eq!(normalize("\"leader roark\""), "leader roark");
        assert_eq!(normalize("riv\u{fffd}al's\u{a0}team"), "rival's team");
        assert_eq!(normalize(normalize("N\u{2019}s Team").as_str()), "n's team");
    }

    #[test]
    fn test_rival_variant_family() {
        let patterns = team_set();
        let rival = TrainerIdentity::named("Rival");

        assert_eq!(match_trainer("rival's team", &patterns), Some(rival.clone()));
        assert_eq!(match_trainer("rivals team", &patterns), Some(rival.clone()));
        assert_eq!(match_trainer("rivalt's team", &patterns), Some(rival));
        assert_eq!(
            match_trainer("rival 2's team", &patterns),
            Some(TrainerIdentity::numbered("Rival", 2))
        );
        assert_eq!(
            match_trainer("rival2's team", &patterns),
            Some(TrainerIdentity::numbered("Rival", 2))
        );
    }

    #[test]
    fn test_curly_apostrophe_resolves() {
        let patterns = team_set();
        assert_eq!(
            match_trainer("Rival 3\u{2019}s Team", &patterns),
            Some(TrainerIdentity::numbered("Rival", 3))
        );
    }

    #[test]
    fn test_substring_name_does_not_collide() {
        let patterns = team_set();
        // "n" must not fire inside another trainer's name.
        assert_eq!(match_trainer("rolan's team", &patterns), None);
        assert_eq!(
            match_trainer("n's team", &patterns),
            Some(TrainerIdentity::named("N"))
        );
    }

    #[test]
    fn test_dual_title_alias_is_one_identity() {
        let patterns = vec![
            TrainerPattern::leader("steven", "Steven"),
            TrainerPattern::leader("champion", "Steven"),
        ];
        let by_name = match_trainer("steven", &patterns);
        let by_title = match_trainer("champion", &patterns);
        assert_eq!(by_name, Some(TrainerIdentity::named("Steven")));
        assert_eq!(by_name, by_title);
    }

    #[test]
    fn test_garbage_is_a_miss_not_an_error() {
        let patterns = team_set();
        assert_eq!(match_trainer("", &patterns), None);
        assert_eq!(match_trainer("~~@#!! |||", &patterns), None);
        assert_eq!(match_trainer("wild encounter", &patterns), None);
    }

    #[test]
    fn test_first_match_wins() {
        // Numbered rule ahead of the bare rule claims the numbered text.
        let patterns = vec![
            TrainerPattern::numbered_rival_team(),
            TrainerPattern::bare_rival_team(),
        ];
        assert_eq!(
            match_trainer("rival 4's team", &patterns),
            Some(TrainerIdentity::numbered("Rival", 4))
        );
    }
}
