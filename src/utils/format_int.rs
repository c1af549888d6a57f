/// Integer printed with `'` between groups of three digits: `1'234'567`.
pub struct NiceInt(u128);

impl NiceInt {
    pub fn from(value: impl Into<u128>) -> Self {
        Self(value.into())
    }

    pub fn from_usize(value: usize) -> Self {
        Self(value as u128)
    }

    pub fn from_f64(value: f64) -> Self {
        Self(value.max(0.) as u128)
    }
}

impl std::fmt::Display for NiceInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.to_string();
        let lead = digits.len() % 3;
        for (i, ch) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - lead) % 3 == 0 {
                f.write_str("'")?;
            }
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}
