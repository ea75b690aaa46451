use std::fmt::{self, Debug, Formatter};

/// An optional password, that never shows up in logs.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Password(Option<String>);

impl Password {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(password) => write!(f, "Password({})", "*".repeat(password.len())),
            None => write!(f, "Password(None)"),
        }
    }
}

impl From<Option<String>> for Password {
    fn from(password: Option<String>) -> Self {
        Self(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self(Some(password.to_string()))
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self(Some(password))
    }
}

impl AsRef<Option<String>> for Password {
    fn as_ref(&self) -> &Option<String> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_from_options_and_strings() {
        let password: Password = None.into();
        assert_eq!(password.as_ref(), &None);
        assert!(!password.is_set());

        let password: Password = "password".into();
        assert_eq!(password.as_deref(), Some("password"));
        assert_eq!(Password::from(String::from("password")), password);
    }

    #[test]
    fn should_mask_itself_in_debug_output() {
        let password: Password = None.into();
        assert_eq!(format!("{password:?}"), "Password(None)");

        let password: Password = "Secret42".into();
        assert_eq!(format!("{password:?}"), "Password(********)");
    }
}
