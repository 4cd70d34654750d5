use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical trainer identity resolved from header text
///
/// `number` carries the battle number for recurring trainers
/// ("Rival 2" is the second rival fight, not a different trainer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TrainerIdentity {
    pub name: String,
    pub number: Option<u32>,
}

impl TrainerIdentity {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            number: None,
        }
    }

    pub fn numbered(name: &str, number: u32) -> Self {
        Self {
            name: name.to_string(),
            number: Some(number),
        }
    }
}

impl fmt::Display for TrainerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{} {}", self.name, n),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A single text-matching rule over normalized OCR text
///
/// Rules are pure predicates; all anchoring is done with word boundaries so a
/// trainer whose name is a suffix of another's ("n" inside "rolan") cannot
/// collide. The tag records why the rule exists, which keeps OCR-noise
/// variants additive data instead of branching code.
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// Exact display name in the generation's header style.
    Exact {
        pattern: Regex,
        veto: Option<Regex>,
    },
    /// Recurring-trainer header with a battle number; the capture group is
    /// the number.
    Numbered { pattern: Regex },
    /// A known OCR misread registered as an extra spelling.
    Misread { pattern: Regex },
}

/// One entry of a profile's ordered pattern set
#[derive(Debug, Clone)]
pub struct TrainerPattern {
    rule: MatchRule,
    canonical: String,
}

// Pattern sources are fixed crate data, so compilation cannot fail at runtime.
fn compile(source: &str) -> Regex {
    Regex::new(source).unwrap()
}

impl TrainerPattern {
    /// "[name]'s Team" header (apostrophe optional, OCR drops it often)
    pub fn team(name: &str, canonical: &str) -> Self {
        let escaped = regex::escape(&name.to_lowercase());
        Self {
            rule: MatchRule::Exact {
                pattern: compile(&format!(r"\b{}'?s\s+team\b", escaped)),
                veto: None,
            },
            canonical: canonical.to_string(),
        }
    }

    /// "Rival N's Team" header, resolving to the numbered rival battle
    pub fn numbered_rival_team() -> Self {
        Self {
            rule: MatchRule::Numbered {
                pattern: compile(r"\brival\s*(\d+)\s*'?s\s+team\b"),
            },
            canonical: "Rival".to_string(),
        }
    }

    /// "Rival's Team" header without a battle number
    pub fn bare_rival_team() -> Self {
        Self {
            rule: MatchRule::Exact {
                pattern: compile(r"\brival'?s\s+team\b"),
                veto: None,
            },
            canonical: "Rival".to_string(),
        }
    }

    /// "Leader [name]" / "Champion [name]" / "Elite Four [name]" header,
    /// or the bare name standing alone in the header bar
    ///
    /// The title alternative tolerates recognition running the words together
    /// ("leadermisty") and the common first-letter misreads of "Leader".
    /// Vetoed when the header names a generic "Gentleman" trainer, whose
    /// given name would otherwise collide with boss names.
    pub fn leader(name: &str, canonical: &str) -> Self {
        let escaped = regex::escape(&name.to_lowercase());
        Self {
            rule: MatchRule::Exact {
                pattern: compile(&format!(
                    r"(?:[ld1i]eader|champion|elite\s*four|elite)\s*{esc}\b|\b{esc}\b",
                    esc = escaped
                )),
                veto: Some(compile(r"\bgentleman\b")),
            },
            canonical: canonical.to_string(),
        }
    }

    /// "Rival N" header (no possessive) used by the Leader-style generations
    pub fn numbered_rival_leader() -> Self {
        Self {
            rule: MatchRule::Numbered {
                pattern: compile(r"\brival\s*(\d+)\b"),
            },
            canonical: "Rival".to_string(),
        }
    }

    /// Extra spelling produced by recognition noise, mapped onto an existing
    /// canonical identity
    pub fn misread(pattern_source: &str, canonical: &str) -> Self {
        Self {
            rule: MatchRule::Misread {
                pattern: compile(pattern_source),
            },
            canonical: canonical.to_string(),
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Test the rule against normalized text
    pub fn matches(&self, text: &str) -> Option<TrainerIdentity> {
        match &self.rule {
            MatchRule::Exact { pattern, veto } => {
                if let Some(veto) = veto {
                    if veto.is_match(text) {
                        return None;
                    }
                }
                if pattern.is_match(text) {
                    Some(TrainerIdentity::named(&self.canonical))
                } else {
                    None
                }
            }
            MatchRule::Numbered { pattern } => {
                let caps = pattern.captures(text)?;
                let number = caps.get(1)?.as_str().parse::<u32>().ok()?;
                Some(TrainerIdentity::numbered(&self.canonical, number))
            }
            MatchRule::Misread { pattern } => {
                if pattern.is_match(text) {
                    Some(TrainerIdentity::named(&self.canonical))
                } else {
                    None
                }
            }
        }
    }
}
