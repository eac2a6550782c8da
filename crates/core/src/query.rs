//! Question composition from a residence/destination pick.

/// The residence and destination picked for one question.
///
/// Rebuilt from picker input on every page render. The two entries may be equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    residence: String,
    destination: String,
}

impl Selection {
    pub fn new(residence: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            residence: residence.into(),
            destination: destination.into(),
        }
    }

    pub fn residence(&self) -> &str {
        &self.residence
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn with_residence(self, residence: impl Into<String>) -> Self {
        Self {
            residence: residence.into(),
            ..self
        }
    }

    pub fn with_destination(self, destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..self
        }
    }

    pub fn question(&self) -> String {
        compose(&self.residence, &self.destination)
    }
}

/// Builds the tax-break question. Names are inserted verbatim; keeping them
/// non-empty is up to the caller.
pub fn compose(residence: &str, destination: &str) -> String {
    format!(
        "I live in {residence} and I am donating money to {destination}, would I get a tax break?"
    )
}
