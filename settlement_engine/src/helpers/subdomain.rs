use rand::Rng;

/// Builds a subdomain candidate for a new reseller store from its business name.
///
/// The first attempt is the plain slug; subsequent attempts append a short random suffix. The
/// caller owns the uniqueness loop: it inserts the candidate and regenerates on a UNIQUE-constraint
/// collision, so two concurrent registrations for the same business name cannot both claim the
/// plain slug.
pub fn subdomain_candidate(business_name: &str, attempt: u32) -> String {
    let slug = slugify(business_name);
    if attempt == 0 {
        slug
    } else {
        let suffix: u16 = rand::thread_rng().gen_range(100..10_000);
        format!("{slug}-{suffix}")
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "store".to_string()
    } else {
        slug.chars().take(40).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_slug_on_first_attempt() {
        assert_eq!(subdomain_candidate("Gem Palace", 0), "gem-palace");
        assert_eq!(subdomain_candidate("  The  Loot &  Box!! ", 0), "the-loot-box");
    }

    #[test]
    fn retries_get_a_suffix() {
        let candidate = subdomain_candidate("Gem Palace", 1);
        assert!(candidate.starts_with("gem-palace-"));
        assert!(candidate.len() > "gem-palace-".len());
    }

    #[test]
    fn unusable_names_fall_back_to_a_default() {
        assert_eq!(subdomain_candidate("!!!", 0), "store");
        assert_eq!(subdomain_candidate("", 0), "store");
    }
}
