//! Text Box page object.
//!
//! Holds the form's locators and drives them through any [`BrowserDriver`].
//! Every operation runs as a named step.

use crate::data::{TextBoxData, TextBoxField};
use crate::driver::BrowserDriver;
use crate::locator::{Locator, Selector};
use crate::result::PagewardResult;
use crate::step::step;

/// Locators of the Text Box form and its output panel
#[derive(Debug, Clone)]
pub struct TextBoxPage {
    full_name_input: Locator,
    email_input: Locator,
    address_input: Locator,
    permanent_address_input: Locator,
    submit_button: Locator,
    received_full_name: Locator,
    received_email: Locator,
    received_address: Locator,
    received_permanent_address: Locator,
}

impl Default for TextBoxPage {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBoxPage {
    /// Build the page's locators
    #[must_use]
    pub fn new() -> Self {
        let form = || Selector::css("#userForm");
        Self {
            full_name_input: Locator::from_selector(
                Selector::placeholder("Full Name").within(form()),
            )
            .describe("Full Name Input"),
            email_input: Locator::from_selector(
                Selector::placeholder("name@example.com").within(form()),
            )
            .describe("Email Input"),
            address_input: Locator::from_selector(
                Selector::placeholder("Current Address").within(form()),
            )
            .describe("Address Input"),
            permanent_address_input: Locator::new("textarea.form-control#permanentAddress")
                .describe("Permanent Address Input"),
            submit_button: Locator::from_selector(Selector::role("button", "Submit"))
                .describe("Submit Button"),
            received_full_name: Locator::new("#output #name").describe("Received Full Name"),
            received_email: Locator::new("#output #email").describe("Received Email"),
            received_address: Locator::new("#output #currentAddress")
                .describe("Received Address"),
            received_permanent_address: Locator::new("#output #permanentAddress")
                .describe("Received Permanent Address"),
        }
    }

    /// Input locator for a field
    #[must_use]
    pub const fn input(&self, field: TextBoxField) -> &Locator {
        match field {
            TextBoxField::FullName => &self.full_name_input,
            TextBoxField::Email => &self.email_input,
            TextBoxField::CurrentAddress => &self.address_input,
            TextBoxField::PermanentAddress => &self.permanent_address_input,
        }
    }

    /// Output locator for a field
    #[must_use]
    pub const fn output(&self, field: TextBoxField) -> &Locator {
        match field {
            TextBoxField::FullName => &self.received_full_name,
            TextBoxField::Email => &self.received_email,
            TextBoxField::CurrentAddress => &self.received_address,
            TextBoxField::PermanentAddress => &self.received_permanent_address,
        }
    }

    /// Submit button locator
    #[must_use]
    pub const fn submit_button(&self) -> &Locator {
        &self.submit_button
    }

    /// Type every field of `data` into the form.
    ///
    /// # Errors
    ///
    /// Driver errors when an input is missing or not editable.
    pub async fn fill_form<D>(&self, driver: &mut D, data: &TextBoxData) -> PagewardResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        step("Fill Text Box Form", async {
            for (field, value) in data.fields() {
                let handle = driver.locate(self.input(field)).await?;
                driver.fill(&handle, value).await?;
            }
            Ok(())
        })
        .await
    }

    /// Assert each input holds exactly the value from `data`.
    ///
    /// # Errors
    ///
    /// `ValueMismatch` for the first input that differs.
    pub async fn validate_form_data<D>(
        &self,
        driver: &mut D,
        data: &TextBoxData,
    ) -> PagewardResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        step("Validate Text Box Form", async {
            for (field, value) in data.fields() {
                let handle = driver.locate(self.input(field)).await?;
                driver.assert_has_value(&handle, value).await?;
            }
            Ok(())
        })
        .await
    }

    /// Click the submit button.
    ///
    /// # Errors
    ///
    /// Driver errors when the button cannot be clicked.
    pub async fn submit<D>(&self, driver: &mut D) -> PagewardResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        step("Submit Text Box Form", async {
            let handle = driver.locate(&self.submit_button).await?;
            driver.click(&handle).await
        })
        .await
    }

    /// Assert the output panel echoes every field of `data`.
    ///
    /// # Errors
    ///
    /// `ValueMismatch` for the first output line missing its value.
    pub async fn validate_submitted_data<D>(
        &self,
        driver: &mut D,
        data: &TextBoxData,
    ) -> PagewardResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        step("Validate Submitted Data", async {
            for (field, value) in data.fields() {
                let handle = driver.locate(self.output(field)).await?;
                driver.assert_contains_text(&handle, value).await?;
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataGenerator, TextBoxOverrides};
    use crate::mock::MockDriver;
    use crate::result::PagewardError;

    async fn on_text_box() -> MockDriver {
        let mut driver = MockDriver::new();
        driver
            .navigate_to("https://demoqa.com/text-box")
            .await
            .unwrap();
        driver
    }

    fn sample() -> TextBoxData {
        DataGenerator::new().create(
            TextBoxOverrides::new()
                .full_name("Ada Lovelace")
                .email("ada@example.com")
                .current_address("12 Analytical Row")
                .permanent_address("1 Engine Street"),
        )
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_descriptions() {
            let page = TextBoxPage::new();
            assert_eq!(page.input(TextBoxField::Email).description(), "Email Input");
            assert_eq!(page.submit_button().description(), "Submit Button");
            assert_eq!(
                page.output(TextBoxField::PermanentAddress).description(),
                "Received Permanent Address"
            );
        }

        #[test]
        fn test_inputs_scoped_to_form() {
            let page = TextBoxPage::new();
            assert_eq!(
                page.input(TextBoxField::FullName).selector(),
                &Selector::placeholder("Full Name").within(Selector::css("#userForm"))
            );
        }
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_then_validate() {
            let mut driver = on_text_box().await;
            let page = TextBoxPage::new();
            let data = sample();

            page.fill_form(&mut driver, &data).await.unwrap();
            page.validate_form_data(&mut driver, &data).await.unwrap();

            assert_eq!(
                driver.value_of(page.input(TextBoxField::FullName).selector()),
                Some("Ada Lovelace")
            );
        }

        #[tokio::test]
        async fn test_validate_detects_mismatch() {
            let mut driver = on_text_box().await;
            let page = TextBoxPage::new();
            let data = sample();
            page.fill_form(&mut driver, &data).await.unwrap();

            let mut other = data.clone();
            other.email = "someone@else.org".to_string();
            let err = page.validate_form_data(&mut driver, &other).await.unwrap_err();
            match err {
                PagewardError::ValueMismatch {
                    description,
                    expected,
                    actual,
                } => {
                    assert_eq!(description, "Email Input");
                    assert_eq!(expected, "someone@else.org");
                    assert_eq!(actual, "ada@example.com");
                }
                other => panic!("expected ValueMismatch, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_fill_off_page_fails() {
            let mut driver = MockDriver::new();
            driver
                .navigate_to("https://demoqa.com/elements")
                .await
                .unwrap();
            let page = TextBoxPage::new();
            let err = page.fill_form(&mut driver, &sample()).await.unwrap_err();
            assert!(matches!(err, PagewardError::ElementNotFound { .. }));
        }
    }

    mod submit_tests {
        use super::*;

        #[tokio::test]
        async fn test_submit_echoes_data() {
            let mut driver = on_text_box().await;
            let page = TextBoxPage::new();
            let data = sample();

            page.fill_form(&mut driver, &data).await.unwrap();
            page.submit(&mut driver).await.unwrap();
            page.validate_submitted_data(&mut driver, &data)
                .await
                .unwrap();
            assert!(driver.was_called("click:Submit Button"));
        }

        #[tokio::test]
        async fn test_unsubmitted_output_does_not_match() {
            let mut driver = on_text_box().await;
            let page = TextBoxPage::new();
            let data = sample();

            page.fill_form(&mut driver, &data).await.unwrap();
            let err = page
                .validate_submitted_data(&mut driver, &data)
                .await
                .unwrap_err();
            assert!(matches!(err, PagewardError::ValueMismatch { .. }));
        }

        #[tokio::test]
        async fn test_invalid_email_submits_without_output() {
            let mut driver = on_text_box().await;
            let page = TextBoxPage::new();
            let data = DataGenerator::new().create(TextBoxOverrides::new().email("invalid-email"));

            page.fill_form(&mut driver, &data).await.unwrap();
            page.submit(&mut driver).await.unwrap();

            let err = page
                .validate_submitted_data(&mut driver, &data)
                .await
                .unwrap_err();
            assert!(matches!(err, PagewardError::ValueMismatch { .. }));
        }

        #[tokio::test]
        async fn test_empty_email_submits() {
            let mut driver = on_text_box().await;
            let page = TextBoxPage::new();
            let data = DataGenerator::new().create(TextBoxOverrides::new().email(""));

            page.fill_form(&mut driver, &data).await.unwrap();
            page.submit(&mut driver).await.unwrap();
            page.validate_submitted_data(&mut driver, &data)
                .await
                .unwrap();
        }
    }
}
