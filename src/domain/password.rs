use zxcvbn::zxcvbn;

const MIN_LENGTH: usize = 8;
const MIN_STRENGTH_SCORE: u8 = 3;

/// Context-aware password strength check. Returns a human-readable warning when
/// the password is short or easy to guess; the username counts as a known input.
pub fn password_weakness(password: &str, username: &str) -> Option<String> {
    if password.chars().count() < MIN_LENGTH {
        return Some(format!("Password is shorter than {} characters", MIN_LENGTH));
    }

    let estimate = zxcvbn(password, &[username]);
    let score = estimate.score() as u8;

    if score < MIN_STRENGTH_SCORE {
        let feedback = estimate.feedback()
            .and_then(|f| f.warning().map(|w| w.to_string()))
            .unwrap_or_else(|| "Password is too weak".to_string());
        return Some(format!("Weak password (score {}/4): {}", score, feedback));
    }

    None
}
