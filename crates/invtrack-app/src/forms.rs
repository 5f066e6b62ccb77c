// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Item, ItemPayload};
use std::num::IntErrorKind;

pub const NAME_REQUIRED: &str = "Name is required";
pub const QUANTITY_NOT_POSITIVE: &str = "Quantity must be > 0";
pub const QUANTITY_TOO_LARGE: &str = "Quantity is too large";

const BLANK_QUANTITY: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Quantity,
    Location,
}

impl FormField {
    pub const ALL: [Self; 4] = [Self::Name, Self::Description, Self::Quantity, Self::Location];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Quantity => "quantity",
            Self::Location => "location",
        }
    }
}

/// Text staging copy of an item's editable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    pub name: String,
    pub description: String,
    pub quantity: String,
    pub location: String,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            quantity: BLANK_QUANTITY.to_owned(),
            location: String::new(),
        }
    }
}

impl FormDraft {
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone().unwrap_or_default(),
            quantity: item.quantity.to_string(),
            location: item.location.clone().unwrap_or_default(),
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
            FormField::Quantity => &self.quantity,
            FormField::Location => &self.location,
        }
    }

    pub fn set_field(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Description => self.description = value,
            FormField::Quantity => self.quantity = value,
            FormField::Location => self.location = value,
        }
    }

    /// `None` when the quantity text is not a whole number.
    pub fn quantity_value(&self) -> Option<i64> {
        self.quantity.trim().parse().ok()
    }

    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        if self.name.trim().is_empty() {
            errors.name = Some(NAME_REQUIRED.to_owned());
        }
        match self.quantity.trim().parse::<i64>() {
            Ok(quantity) if quantity > 0 => {}
            Err(error) if *error.kind() == IntErrorKind::PosOverflow => {
                errors.quantity = Some(QUANTITY_TOO_LARGE.to_owned());
            }
            _ => errors.quantity = Some(QUANTITY_NOT_POSITIVE.to_owned()),
        }
        errors
    }

    pub fn to_payload(&self) -> Result<ItemPayload, FormErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let Some(quantity) = self.quantity_value() else {
            return Err(errors);
        };
        Ok(ItemPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            quantity,
            location: self.location.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<String>,
    pub quantity: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none()
    }

    pub fn for_field(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Name => self.name.as_deref(),
            FormField::Quantity => self.quantity.as_deref(),
            FormField::Description | FormField::Location => None,
        }
    }

    pub fn summary(&self) -> String {
        [self.name.as_deref(), self.quantity.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<&str>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FormDraft, FormErrors, FormField, NAME_REQUIRED, QUANTITY_NOT_POSITIVE, QUANTITY_TOO_LARGE,
    };
    use crate::{Item, ItemId};

    fn draft(name: &str, quantity: &str) -> FormDraft {
        FormDraft {
            name: name.to_owned(),
            quantity: quantity.to_owned(),
            ..FormDraft::default()
        }
    }

    #[test]
    fn blank_name_variants_are_rejected() {
        for name in ["", " ", "\t", "   \n "] {
            let errors = draft(name, "3").validate();
            assert_eq!(errors.name.as_deref(), Some(NAME_REQUIRED), "name {name:?}");
            assert_eq!(errors.quantity, None);
        }
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        for quantity in ["0", "-1", "-250"] {
            let errors = draft("Chair", quantity).validate();
            assert_eq!(
                errors.quantity.as_deref(),
                Some(QUANTITY_NOT_POSITIVE),
                "quantity {quantity:?}"
            );
            assert_eq!(errors.name, None);
        }
    }

    #[test]
    fn unparseable_quantity_counts_as_not_positive() {
        for quantity in ["", "abc", "1.5"] {
            let errors = draft("Chair", quantity).validate();
            assert_eq!(errors.quantity.as_deref(), Some(QUANTITY_NOT_POSITIVE));
        }
    }

    #[test]
    fn oversized_quantity_gets_its_own_message() {
        let errors = draft("Chair", "99999999999999999999").validate();
        assert_eq!(errors.quantity.as_deref(), Some(QUANTITY_TOO_LARGE));

        let errors = draft("Chair", "-99999999999999999999").validate();
        assert_eq!(errors.quantity.as_deref(), Some(QUANTITY_NOT_POSITIVE));
        assert!(draft("Chair", "99999999999999999999").to_payload().is_err());
    }

    #[test]
    fn optional_fields_are_never_validated() {
        let errors = draft("Chair", "1").validate();
        assert!(errors.is_empty());
    }

    #[test]
    fn to_payload_coerces_quantity_and_keeps_text_verbatim() {
        let mut form = draft("Chair", " 5 ");
        form.location = "Room A".to_owned();
        let payload = form.to_payload().expect("valid draft");
        assert_eq!(payload.quantity, 5);
        assert_eq!(payload.location, "Room A");
        assert_eq!(payload.description, "");
    }

    #[test]
    fn to_payload_returns_all_errors() {
        let errors = draft(" ", "0").to_payload().expect_err("invalid draft");
        assert_eq!(
            errors,
            FormErrors {
                name: Some(NAME_REQUIRED.to_owned()),
                quantity: Some(QUANTITY_NOT_POSITIVE.to_owned()),
            }
        );
        assert_eq!(errors.summary(), "Name is required; Quantity must be > 0");
    }

    #[test]
    fn from_item_defaults_missing_optional_text() {
        let item = Item {
            id: ItemId::new(3),
            name: "Desk".to_owned(),
            description: None,
            quantity: 2,
            location: None,
            created_at: None,
        };
        let form = FormDraft::from_item(&item);
        assert_eq!(form.name, "Desk");
        assert_eq!(form.quantity, "2");
        assert_eq!(form.description, "");
        assert_eq!(form.location, "");
    }

    #[test]
    fn set_field_round_trips_through_field_accessor() {
        let mut form = FormDraft::default();
        for field in FormField::ALL {
            form.set_field(field, field.label().to_owned());
            assert_eq!(form.field(field), field.label());
        }
    }
}
