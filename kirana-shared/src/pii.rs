use std::fmt;

/// Renders a phone-style identifier with everything but the trailing two
/// characters masked, so identities never land raw in log output.
///
/// Wrap at the log call site: `info!("vendor {}", MaskedPhone(&phone))`.
pub struct MaskedPhone<'a>(pub &'a str);

impl fmt::Display for MaskedPhone<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.0.chars().count();
        if count <= 2 {
            return write!(f, "**");
        }
        for _ in 0..count - 2 {
            write!(f, "*")?;
        }
        for c in self.0.chars().skip(count - 2) {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for MaskedPhone<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_all_but_last_two() {
        assert_eq!(MaskedPhone("9876543210").to_string(), "********10");
    }

    #[test]
    fn test_short_values_fully_masked() {
        assert_eq!(MaskedPhone("91").to_string(), "**");
        assert_eq!(MaskedPhone("").to_string(), "**");
    }
}
