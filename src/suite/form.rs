//! Static description of the contact form under test

use crate::utils::config::SuiteConfig;

/// Payload submitted by the injection probe
pub const XSS_PAYLOAD: &str = "<script>alert('XSS');</script>";

/// Message text used while probing required-field validation
pub const REQUIRED_PROBE_MESSAGE: &str = "Missatge prova validació obligatòria";

/// WPForms marker class on required field containers
const REQUIRED_MARKER_CLASS: &str = "wpforms-field-required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    FirstName,
    LastName,
    Email,
    Message,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::FirstName => "First name",
            FieldKind::LastName => "Last name",
            FieldKind::Email => "Email",
            FieldKind::Message => "Message",
        }
    }

    /// A value the form should accept for this field
    pub fn valid_value(&self) -> &'static str {
        match self {
            FieldKind::FirstName => "Test",
            FieldKind::LastName => "User",
            FieldKind::Email => "test@example.com",
            FieldKind::Message => "Missatge de prova",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub id: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// The form's field set and submit control, bound to configured ids
#[derive(Debug, Clone)]
pub struct ContactForm {
    pub fields: Vec<FieldDescriptor>,
    pub submit_id: String,
}

impl ContactForm {
    pub fn from_config(config: &SuiteConfig) -> Self {
        let ids = &config.fields;
        Self {
            fields: vec![
                FieldDescriptor {
                    id: ids.first_name.clone(),
                    kind: FieldKind::FirstName,
                    required: true,
                },
                FieldDescriptor {
                    id: ids.last_name.clone(),
                    kind: FieldKind::LastName,
                    required: true,
                },
                FieldDescriptor {
                    id: ids.email.clone(),
                    kind: FieldKind::Email,
                    required: true,
                },
                FieldDescriptor {
                    id: ids.message.clone(),
                    kind: FieldKind::Message,
                    required: false,
                },
            ],
            submit_id: config.submit_id.clone(),
        }
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.required)
    }

    /// The id probed to decide whether the form page is still shown
    pub fn first_field_id(&self) -> &str {
        &self.fields[0].id
    }
}

/// Best-effort check for a "this field is required" marker. A native
/// `required` attribute with any value counts, as does the WPForms marker
/// class or any class mentioning "required". Advisory only.
pub fn has_required_marker(required_attr: Option<&str>, class_attr: Option<&str>) -> bool {
    if required_attr.is_some() {
        return true;
    }
    match class_attr {
        Some(classes) => {
            classes.contains(REQUIRED_MARKER_CLASS) || classes.to_lowercase().contains("required")
        }
        None => false,
    }
}
