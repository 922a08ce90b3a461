//! Login page hidden-field extraction.
//!
//! The portal's login page carries the handshake parameters as hidden
//! `<input>` elements: the encryption salt (by element id), and the
//! `execution` and `lt` tokens (by input name). Extraction sits behind
//! the [`FieldExtractor`] trait so the parsing strategy stays swappable;
//! the default implementation scans input tags with regexes.

use regex::Regex;

use crate::error::{Result, RollwatchError};

/// Element id of the hidden input carrying the encryption salt.
pub const SALT_FIELD_ID: &str = "pwdEncryptSalt";

/// Input name of the mandatory execution token.
pub const EXECUTION_FIELD: &str = "execution";

/// Input name of the optional lt token.
pub const LT_FIELD: &str = "lt";

/// Addresses a hidden input on the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSelector<'a> {
    /// Match by the element's `id` attribute.
    Id(&'a str),
    /// Match by the element's `name` attribute.
    Name(&'a str),
}

/// Capability interface for pulling field values out of an HTML document.
pub trait FieldExtractor {
    /// Returns the `value` attribute of the first input matching
    /// `selector`, or `None` if no such input exists.
    fn extract_value(&self, document: &str, selector: InputSelector<'_>) -> Option<String>;
}

/// Regex-backed [`FieldExtractor`].
///
/// Scans `<input ...>` tags and inspects their attributes, tolerating
/// attribute reordering and either quote style. Good enough for the
/// portal's server-rendered markup; anything fancier should get a real
/// HTML parser behind the same trait.
#[derive(Debug)]
pub struct RegexExtractor {
    input_tag: Regex,
    id_attr: Regex,
    name_attr: Regex,
    value_attr: Regex,
}

fn attr_regex(attr: &str) -> Regex {
    // Leading \s keeps e.g. data-id from matching as id.
    Regex::new(&format!(r#"(?is)\s{attr}\s*=\s*(?:"([^"]*)"|'([^']*)')"#))
        .expect("static attribute pattern is valid")
}

fn attr_value(re: &Regex, tag: &str) -> Option<String> {
    re.captures(tag)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
}

impl RegexExtractor {
    /// Build an extractor with precompiled patterns.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input_tag: Regex::new(r"(?is)<input\b[^>]*>").expect("static input pattern is valid"),
            id_attr: attr_regex("id"),
            name_attr: attr_regex("name"),
            value_attr: attr_regex("value"),
        }
    }
}

impl Default for RegexExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for RegexExtractor {
    fn extract_value(&self, document: &str, selector: InputSelector<'_>) -> Option<String> {
        for tag in self.input_tag.find_iter(document) {
            let tag = tag.as_str();
            let matched = match selector {
                InputSelector::Id(id) => {
                    attr_value(&self.id_attr, tag).is_some_and(|v| v == id)
                }
                InputSelector::Name(name) => {
                    attr_value(&self.name_attr, tag).is_some_and(|v| v == name)
                }
            };
            if matched {
                return attr_value(&self.value_attr, tag);
            }
        }
        None
    }
}

/// Handshake parameters extracted from the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Server-issued encryption salt, unique per page fetch.
    pub salt: String,
    /// Opaque token identifying this login transaction.
    pub execution: String,
    /// Legacy CAS token; empty when the page does not carry one.
    pub lt: String,
}

impl LoginForm {
    /// Extract the handshake parameters from a login page document.
    ///
    /// # Errors
    ///
    /// Returns [`RollwatchError::PageParse`] naming the missing field when
    /// the salt or execution token is absent or empty.
    pub fn from_document(extractor: &dyn FieldExtractor, document: &str) -> Result<Self> {
        let salt = extractor
            .extract_value(document, InputSelector::Id(SALT_FIELD_ID))
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RollwatchError::PageParse {
                field: SALT_FIELD_ID.to_string(),
            })?;

        let execution = extractor
            .extract_value(document, InputSelector::Name(EXECUTION_FIELD))
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RollwatchError::PageParse {
                field: EXECUTION_FIELD.to_string(),
            })?;

        let lt = extractor
            .extract_value(document, InputSelector::Name(LT_FIELD))
            .unwrap_or_default();

        Ok(Self {
            salt,
            execution,
            lt,
        })
    }
}
