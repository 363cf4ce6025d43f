//! Text helpers shared by extraction and the downstream steps.

/// Stable id slug of a display name: lowercase alphanumeric words joined by `-`.
/// Apostrophes are dropped rather than split on.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch == '\'' || ch == '’' {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Strip BSData emphasis markup (`^^`, `**`) and collapse whitespace.
pub fn clean_text(raw: &str) -> String {
    raw.replace("^^", "")
        .replace("**", "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text inside the trailing parentheses of a name: `"Guard (Spear)"` -> `Spear`.
pub fn trailing_parenthetical(name: &str) -> Option<&str> {
    let trimmed = name.trim_end();
    let body = trimmed.strip_suffix(')')?;
    let open = body.rfind('(')?;
    let inner = body[open + 1..].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_handles_punctuation_and_apostrophes() {
        assert_eq!(slugify("Custodian Guard"), "custodian-guard");
        assert_eq!(slugify("Emperor's Champion"), "emperors-champion");
        assert_eq!(slugify("  Shield-Captain on Dawneagle Jetbike "), "shield-captain-on-dawneagle-jetbike");
        assert_eq!(slugify("Guardian spear (Melee)"), "guardian-spear-melee");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn clean_text_strips_markup() {
        assert_eq!(
            clean_text("Each time a ^^**Monster**^^ unit\n   is  selected"),
            "Each time a Monster unit is selected"
        );
    }

    #[test]
    fn trailing_parenthetical_extracts_inner_text() {
        assert_eq!(trailing_parenthetical("Custodian Guard (Guardian Spear)"), Some("Guardian Spear"));
        assert_eq!(trailing_parenthetical("Custodian Guard"), None);
        assert_eq!(trailing_parenthetical("Odd ()"), None);
        assert_eq!(trailing_parenthetical("A (b) (Blade) "), Some("Blade"));
    }
}
