use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::domain::activity::ActivityKind;
use crate::domain::types::SanitizedText;
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// Manual entry in the client activity log.
pub struct ActivityForm {
    #[validate(length(min = 1, max = 64))]
    pub kind: String,
    #[validate(length(min = 1))]
    pub text: String,
}

pub struct ActivityPayload {
    pub kind: ActivityKind,
    pub payload: Value,
}

impl TryFrom<ActivityForm> for ActivityPayload {
    type Error = FormError;

    fn try_from(form: ActivityForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let text = SanitizedText::new(form.text).map_err(|_| FormError::InvalidText)?;
        Ok(Self {
            kind: ActivityKind::from(form.kind.trim()),
            payload: json!({ "text": text.as_str() }),
        })
    }
}
