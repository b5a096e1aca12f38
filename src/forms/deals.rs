use serde::Deserialize;

use crate::domain::types::SanitizedText;
use crate::forms::FormError;

#[derive(Debug, Deserialize)]
pub struct RejectDealForm {
    pub reason: String,
}

impl TryFrom<RejectDealForm> for SanitizedText {
    type Error = FormError;

    fn try_from(form: RejectDealForm) -> Result<Self, Self::Error> {
        SanitizedText::new(form.reason).map_err(|_| FormError::InvalidText)
    }
}
