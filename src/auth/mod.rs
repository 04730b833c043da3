pub mod extractor;
pub mod jwt;
pub mod password;
pub mod token;

/// Accounts are keyed by the trimmed, lowercased address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Gamer@Test.COM "), "gamer@test.com");
    }
}
