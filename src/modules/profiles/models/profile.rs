use serde::{Deserialize, Serialize};

/// A way of reaching a profile (phone number, email, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,

    #[serde(rename = "type", default)]
    pub contact_type: String,

    #[serde(default)]
    pub detail: String,
}

impl Contact {
    /// Whether the contact is a phone number
    ///
    /// `msisdn`/`phone` typed contacts qualify, as does any detail made only
    /// of digits with an optional leading `+`.
    pub fn is_phone_like(&self) -> bool {
        let kind = self.contact_type.trim().to_ascii_lowercase();
        if kind == "msisdn" || kind == "phone" {
            return true;
        }

        let detail = self.detail.trim();
        let digits = detail.strip_prefix('+').unwrap_or(detail);
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    }
}

/// Profile as returned by the profile collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,

    #[serde(default)]
    pub contacts: Vec<Contact>,
}

impl Profile {
    pub fn contact(&self, contact_id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == contact_id)
    }
}
