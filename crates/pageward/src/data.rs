//! Test data generation with field overrides.
//!
//! [`DataGenerator::create`] returns a [`TextBoxData`] whose fields are random
//! unless overridden. Overrides are applied verbatim: the generator never
//! validates or normalizes them, so negative-path data like
//! `"invalid-email"` or an empty string passes through untouched.
//!
//! Randomness comes from the thread-local RNG, so a shared generator has no
//! lock contention. Pass an explicit RNG (e.g. a seeded `StdRng`) to
//! reproduce a record.

use fake::faker::address::en::{BuildingNumber, StreetName};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields of the Text Box form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextBoxField {
    /// Person name
    FullName,
    /// Email address
    Email,
    /// Street address
    CurrentAddress,
    /// Street address
    PermanentAddress,
}

impl TextBoxField {
    /// All fields in form order
    pub const ALL: [Self; 4] = [
        Self::FullName,
        Self::Email,
        Self::CurrentAddress,
        Self::PermanentAddress,
    ];

    /// Field name as serialized
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::CurrentAddress => "currentAddress",
            Self::PermanentAddress => "permanentAddress",
        }
    }

    /// Draw a random value of this field's semantic type
    pub fn random_value<R: Rng + ?Sized>(self, rng: &mut R) -> String {
        match self {
            Self::FullName => Name().fake_with_rng(rng),
            Self::Email => SafeEmail().fake_with_rng(rng),
            Self::CurrentAddress | Self::PermanentAddress => street_address(rng),
        }
    }
}

impl fmt::Display for TextBoxField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn street_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    format!("{number} {street}")
}

/// A Text Box form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBoxData {
    /// Full name
    pub full_name: String,
    /// Email
    pub email: String,
    /// Current address
    pub current_address: String,
    /// Permanent address
    pub permanent_address: String,
}

impl TextBoxData {
    /// Value of a field
    #[must_use]
    pub fn get(&self, field: TextBoxField) -> &str {
        match field {
            TextBoxField::FullName => &self.full_name,
            TextBoxField::Email => &self.email,
            TextBoxField::CurrentAddress => &self.current_address,
            TextBoxField::PermanentAddress => &self.permanent_address,
        }
    }

    /// Replace a field
    pub fn set(&mut self, field: TextBoxField, value: String) {
        match field {
            TextBoxField::FullName => self.full_name = value,
            TextBoxField::Email => self.email = value,
            TextBoxField::CurrentAddress => self.current_address = value,
            TextBoxField::PermanentAddress => self.permanent_address = value,
        }
    }

    /// Fields paired with their values, in form order
    pub fn fields(&self) -> impl Iterator<Item = (TextBoxField, &str)> {
        TextBoxField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }

    /// Fully random record
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            full_name: TextBoxField::FullName.random_value(rng),
            email: TextBoxField::Email.random_value(rng),
            current_address: TextBoxField::CurrentAddress.random_value(rng),
            permanent_address: TextBoxField::PermanentAddress.random_value(rng),
        }
    }
}

/// Partial record; present fields override generated values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextBoxOverrides {
    /// Full name override
    pub full_name: Option<String>,
    /// Email override
    pub email: Option<String>,
    /// Current address override
    pub current_address: Option<String>,
    /// Permanent address override
    pub permanent_address: Option<String>,
}

impl TextBoxOverrides {
    /// No overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the full name
    #[must_use]
    pub fn full_name(mut self, value: impl Into<String>) -> Self {
        self.full_name = Some(value.into());
        self
    }

    /// Override the email
    #[must_use]
    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// Override the current address
    #[must_use]
    pub fn current_address(mut self, value: impl Into<String>) -> Self {
        self.current_address = Some(value.into());
        self
    }

    /// Override the permanent address
    #[must_use]
    pub fn permanent_address(mut self, value: impl Into<String>) -> Self {
        self.permanent_address = Some(value.into());
        self
    }

    /// Check whether a field is overridden
    #[must_use]
    pub const fn contains(&self, field: TextBoxField) -> bool {
        match field {
            TextBoxField::FullName => self.full_name.is_some(),
            TextBoxField::Email => self.email.is_some(),
            TextBoxField::CurrentAddress => self.current_address.is_some(),
            TextBoxField::PermanentAddress => self.permanent_address.is_some(),
        }
    }

    /// Lower into an ordered builder
    #[must_use]
    pub fn into_builder(self) -> TextBoxDataBuilder {
        let mut builder = TextBoxDataBuilder::new();
        let present = [
            (TextBoxField::FullName, self.full_name),
            (TextBoxField::Email, self.email),
            (TextBoxField::CurrentAddress, self.current_address),
            (TextBoxField::PermanentAddress, self.permanent_address),
        ];
        for (field, value) in present {
            if let Some(value) = value {
                builder = builder.set(field, value);
            }
        }
        builder
    }
}

/// Builds a record from a random base plus ordered overrides.
///
/// Later overrides of the same field win. No cross-field validation.
#[derive(Debug, Clone, Default)]
pub struct TextBoxDataBuilder {
    overrides: Vec<(TextBoxField, String)>,
}

impl TextBoxDataBuilder {
    /// Create a builder with no overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a field
    #[must_use]
    pub fn set(mut self, field: TextBoxField, value: impl Into<String>) -> Self {
        self.overrides.push((field, value.into()));
        self
    }

    /// Number of overrides recorded
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Build with the thread-local RNG
    #[must_use]
    pub fn build(self) -> TextBoxData {
        self.build_with_rng(&mut rand::thread_rng())
    }

    /// Build with an explicit RNG
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> TextBoxData {
        let mut data = TextBoxData::random(rng);
        for (field, value) in self.overrides {
            data.set(field, value);
        }
        data
    }
}

/// Generator for Text Box records
#[derive(Debug, Clone, Copy, Default)]
pub struct DataGenerator;

impl DataGenerator {
    /// Create a generator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Random record with `overrides` applied
    #[must_use]
    pub fn create(&self, overrides: TextBoxOverrides) -> TextBoxData {
        overrides.into_builder().build()
    }

    /// Random record with `overrides` applied, drawing from `rng`
    pub fn create_with_rng<R: Rng + ?Sized>(
        &self,
        overrides: TextBoxOverrides,
        rng: &mut R,
    ) -> TextBoxData {
        overrides.into_builder().build_with_rng(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    mod generator_tests {
        use super::*;

        #[test]
        fn test_default_fields_are_populated() {
            let data = DataGenerator::new().create(TextBoxOverrides::new());
            for (field, value) in data.fields() {
                assert!(!value.trim().is_empty(), "{field} was blank");
            }
        }

        #[test]
        fn test_default_email_is_well_formed() {
            for _ in 0..20 {
                let data = DataGenerator::new().create(TextBoxOverrides::new());
                let (local, domain) = data.email.split_once('@').unwrap();
                assert!(!local.is_empty());
                assert!(domain.contains('.'));
            }
        }

        #[test]
        fn test_invalid_email_passes_through() {
            let data = DataGenerator::new().create(TextBoxOverrides::new().email("invalid-email"));
            assert_eq!(data.email, "invalid-email");
            assert!(!data.full_name.is_empty());
        }

        #[test]
        fn test_empty_override_is_kept() {
            let data = DataGenerator::new().create(TextBoxOverrides::new().email(""));
            assert_eq!(data.email, "");
        }

        #[test]
        fn test_whitespace_override_is_not_trimmed() {
            let data =
                DataGenerator::new().create(TextBoxOverrides::new().full_name("  Ada  "));
            assert_eq!(data.full_name, "  Ada  ");
        }

        #[test]
        fn test_repeated_calls_differ() {
            let generator = DataGenerator::new();
            let a = generator.create(TextBoxOverrides::new());
            let b = generator.create(TextBoxOverrides::new());
            assert_ne!(a, b);
        }

        #[test]
        fn test_seeded_rng_is_reproducible() {
            let generator = DataGenerator::new();
            let a = generator.create_with_rng(TextBoxOverrides::new(), &mut StdRng::seed_from_u64(7));
            let b = generator.create_with_rng(TextBoxOverrides::new(), &mut StdRng::seed_from_u64(7));
            assert_eq!(a, b);
        }

        #[test]
        fn test_overrides_deserialize_from_partial_json() {
            let overrides: TextBoxOverrides =
                serde_json::from_str(r#"{"email":"invalid-email"}"#).unwrap();
            assert!(overrides.contains(TextBoxField::Email));
            assert!(!overrides.contains(TextBoxField::FullName));
        }

        #[test]
        fn test_record_serializes_camel_case() {
            let data = DataGenerator::new().create(TextBoxOverrides::new().full_name("Ada"));
            let json = serde_json::to_value(&data).unwrap();
            assert_eq!(json["fullName"], "Ada");
            assert!(json.get("permanentAddress").is_some());
        }
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_last_write_wins() {
            let data = TextBoxDataBuilder::new()
                .set(TextBoxField::Email, "first@example.com")
                .set(TextBoxField::Email, "second@example.com")
                .build();
            assert_eq!(data.email, "second@example.com");
        }

        #[test]
        fn test_overrides_lower_to_builder() {
            let builder = TextBoxOverrides::new()
                .permanent_address("B")
                .full_name("A")
                .into_builder();
            assert_eq!(builder.override_count(), 2);

            let data = builder.build();
            assert_eq!(data.full_name, "A");
            assert_eq!(data.permanent_address, "B");
            assert!(!data.email.is_empty());
        }

        #[test]
        fn test_no_cross_field_validation() {
            let data = TextBoxDataBuilder::new()
                .set(TextBoxField::CurrentAddress, "same")
                .set(TextBoxField::PermanentAddress, "same")
                .build();
            assert_eq!(data.current_address, data.permanent_address);
        }
    }

    fn overrides_strategy() -> impl Strategy<Value = TextBoxOverrides> {
        (
            proptest::option::of(".*"),
            proptest::option::of(".*"),
            proptest::option::of(".*"),
            proptest::option::of(".*"),
        )
            .prop_map(|(full_name, email, current_address, permanent_address)| {
                TextBoxOverrides {
                    full_name,
                    email,
                    current_address,
                    permanent_address,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_present_overrides_are_verbatim(overrides in overrides_strategy(), seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let data = DataGenerator::new().create_with_rng(overrides.clone(), &mut rng);

            if let Some(v) = &overrides.full_name {
                prop_assert_eq!(&data.full_name, v);
            }
            if let Some(v) = &overrides.email {
                prop_assert_eq!(&data.email, v);
            }
            if let Some(v) = &overrides.current_address {
                prop_assert_eq!(&data.current_address, v);
            }
            if let Some(v) = &overrides.permanent_address {
                prop_assert_eq!(&data.permanent_address, v);
            }
        }

        #[test]
        fn prop_absent_fields_are_generated(overrides in overrides_strategy()) {
            let data = DataGenerator::new().create(overrides.clone());
            for field in TextBoxField::ALL {
                if !overrides.contains(field) {
                    prop_assert!(!data.get(field).is_empty());
                }
            }
        }
    }
}
