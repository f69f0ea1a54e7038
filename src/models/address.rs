//! Addresses.

/// Whether an address is used for shipping or billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressKind {
    /// Parcel destination.
    #[default]
    Shipping,
    /// Invoice destination.
    Billing,
}

/// Military routing codes for APO/FPO/DPO addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilitaryCode {
    /// Army/Air Post Office.
    Apo,
    /// Fleet Post Office.
    Fpo,
    /// Diplomatic Post Office.
    Dpo,
}

impl MilitaryCode {
    /// The routing code as printed on a label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apo => "APO",
            Self::Fpo => "FPO",
            Self::Dpo => "DPO",
        }
    }
}

/// A shipping or billing address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub kind: AddressKind,
    pub is_default: bool,
    /// Present for military addresses, which use the routing code in place
    /// of city and state.
    pub military: Option<MilitaryCode>,
}

impl Address {
    /// Create a civilian shipping address.
    #[must_use]
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: country.into(),
            kind: AddressKind::Shipping,
            is_default: false,
            military: None,
        }
    }

    /// Format the address for a shipping label.
    #[must_use]
    pub fn label(&self) -> String {
        match self.military {
            Some(code) => format!("{}\n{} {}", self.street, code.as_str(), self.postal_code),
            None => format!(
                "{}\n{}, {} {}\n{}",
                self.street, self.city, self.state, self.postal_code, self.country
            ),
        }
    }

    /// Whether every required field is present. Military addresses need a
    /// routing code instead of a state.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let base = !self.street.is_empty()
            && !self.city.is_empty()
            && !self.postal_code.is_empty()
            && !self.country.is_empty();

        if self.military.is_some() {
            base
        } else {
            base && !self.state.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn civilian() -> Address {
        Address::new("12 Elm St", "Springfield", "IL", "62704", "US")
    }

    #[test]
    fn civilian_label_has_three_lines() {
        let address = civilian();

        assert_eq!(address.label(), "12 Elm St\nSpringfield, IL 62704\nUS");
    }

    #[test]
    fn military_label_uses_routing_code() {
        let mut address = civilian();
        address.military = Some(MilitaryCode::Apo);

        assert_eq!(address.label(), "12 Elm St\nAPO 62704");
    }

    #[test]
    fn missing_state_only_matters_for_civilian_addresses() {
        let mut address = civilian();
        address.state = String::new();

        assert!(!address.is_complete());

        address.military = Some(MilitaryCode::Fpo);

        assert!(address.is_complete());
    }
}
