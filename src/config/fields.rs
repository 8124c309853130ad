use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// A CSS selector expected to identify one element on the live page.
///
/// Several elements may match; resolution always takes the first. Zero
/// matches within the implicit wait is an unrecoverable fault.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "selector '{}'", self.0)
    }
}

/// Normalize a spreadsheet header: strip all whitespace, uppercase.
///
/// "First Name" and "FIRSTNAME" address the same field.
pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// The standard columns of the challenge form.
const STANDARD_FIELDS: &[(&str, &str)] = &[
    ("FIRSTNAME", "input[ng-reflect-name='labelFirstName']"),
    ("LASTNAME", "input[ng-reflect-name='labelLastName']"),
    ("COMPANYNAME", "input[ng-reflect-name='labelCompanyName']"),
    ("ROLEINCOMPANY", "input[ng-reflect-name='labelRole']"),
    ("ADDRESS", "input[ng-reflect-name='labelAddress']"),
    ("EMAIL", "input[ng-reflect-name='labelEmail']"),
    ("PHONENUMBER", "input[ng-reflect-name='labelPhone']"),
];

/// Immutable mapping from normalized column headers to input locators.
///
/// Built once at startup and shared read-only for the whole run.
#[derive(Debug, Clone)]
pub struct FieldTable {
    entries: HashMap<String, Locator>,
}

impl FieldTable {
    /// The built-in table for the standard seven columns.
    pub fn standard() -> Self {
        let entries = STANDARD_FIELDS
            .iter()
            .map(|(header, selector)| (header.to_string(), Locator::new(*selector)))
            .collect();
        Self { entries }
    }

    /// The standard table with per-column overrides applied. Override keys
    /// are normalized, so "First Name" and "FIRSTNAME" both hit the same
    /// entry; unknown keys add new columns.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut table = Self::standard();
        for (header, selector) in overrides {
            table
                .entries
                .insert(normalize_header(header), Locator::new(selector.clone()));
        }
        table
    }

    /// Look up the locator for a normalized header.
    pub fn get(&self, header: &str) -> Option<&Locator> {
        self.entries.get(header)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::standard()
    }
}
