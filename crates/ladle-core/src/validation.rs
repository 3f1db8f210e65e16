//! Draft validation. Runs before the pipeline touches any store, so a
//! rejected draft costs no network calls and leaves no orphaned state.

use thiserror::Error;

use crate::models::Draft;

/// Maximum number of attachment slots a draft may carry.
pub const MAX_ATTACHMENT_SLOTS: usize = 10;

/// Maximum size of a single attachment in bytes (10 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// Maximum length of the title field in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// A draft that cannot be submitted.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing required field(s): {}", .missing.join(", "))]
    MissingFields { missing: Vec<&'static str> },

    #[error("title exceeds {} characters", MAX_TITLE_CHARS)]
    TitleTooLong,

    #[error("{count} attachment slots exceed the limit of {}", MAX_ATTACHMENT_SLOTS)]
    TooManyAttachments { count: usize },

    #[error("attachment in slot {slot} is empty")]
    EmptyAttachment { slot: usize },

    #[error("attachment in slot {slot} is {size} bytes, over the {} byte limit", MAX_ATTACHMENT_BYTES)]
    AttachmentTooLarge { slot: usize, size: usize },

    #[error("attachment in slot {slot} has no filename")]
    MissingFilename { slot: usize },
}

/// Checks every submittable-draft rule. Required text fields are collected
/// together so the caller sees the full list in one pass; attachment rules
/// report the first offending slot.
pub fn validate_draft(draft: &Draft) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    if draft.owner_id.is_nil() {
        missing.push("owner_id");
    }
    if draft.title.trim().is_empty() {
        missing.push("title");
    }
    if draft.overview.trim().is_empty() {
        missing.push("overview");
    }
    if draft.ingredients.trim().is_empty() {
        missing.push("ingredients");
    }
    if draft.instructions.trim().is_empty() {
        missing.push("instructions");
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields { missing });
    }

    if draft.title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong);
    }

    if draft.attachments.len() > MAX_ATTACHMENT_SLOTS {
        return Err(ValidationError::TooManyAttachments {
            count: draft.attachments.len(),
        });
    }

    for (slot, attachment) in draft.attachments.iter().enumerate() {
        let Some(attachment) = attachment else {
            continue;
        };
        if attachment.filename.trim().is_empty() {
            return Err(ValidationError::MissingFilename { slot });
        }
        if attachment.bytes.is_empty() {
            return Err(ValidationError::EmptyAttachment { slot });
        }
        if attachment.size_bytes() > MAX_ATTACHMENT_BYTES {
            return Err(ValidationError::AttachmentTooLarge {
                slot,
                size: attachment.size_bytes(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attachment;
    use std::time::Duration;
    use uuid::Uuid;

    fn draft() -> Draft {
        Draft {
            owner_id: Uuid::new_v4(),
            title: "Khmer Soup".to_string(),
            overview: "Sour lemongrass soup".to_string(),
            prep_time: Duration::from_secs(900),
            cook_time: Duration::from_secs(2400),
            ingredients: "lemongrass, galangal".to_string(),
            instructions: "Simmer everything.".to_string(),
            note: None,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn accepts_complete_draft() {
        assert!(validate_draft(&draft()).is_ok());
    }

    #[test]
    fn accepts_draft_with_empty_slots() {
        let mut d = draft();
        d.attachments = vec![None, Some(Attachment::new(vec![1u8], "soup.jpg")), None];
        assert!(validate_draft(&d).is_ok());
    }

    #[test]
    fn collects_all_missing_fields() {
        let mut d = draft();
        d.title = "  ".to_string();
        d.ingredients = String::new();
        let err = validate_draft(&d).unwrap_err();
        match err {
            ValidationError::MissingFields { missing } => {
                assert_eq!(missing, vec!["title", "ingredients"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_nil_owner() {
        let mut d = draft();
        d.owner_id = Uuid::nil();
        let err = validate_draft(&d).unwrap_err();
        assert!(matches!(err, ValidationError::MissingFields { .. }));
    }

    #[test]
    fn rejects_overlong_title() {
        let mut d = draft();
        d.title = "x".repeat(MAX_TITLE_CHARS + 1);
        assert!(matches!(
            validate_draft(&d).unwrap_err(),
            ValidationError::TitleTooLong
        ));
    }

    #[test]
    fn rejects_too_many_slots() {
        let mut d = draft();
        d.attachments = (0..MAX_ATTACHMENT_SLOTS + 1)
            .map(|_| Some(Attachment::new(vec![1u8], "a.jpg")))
            .collect();
        assert!(matches!(
            validate_draft(&d).unwrap_err(),
            ValidationError::TooManyAttachments { count } if count == MAX_ATTACHMENT_SLOTS + 1
        ));
    }

    #[test]
    fn rejects_oversized_attachment_with_slot_index() {
        let mut d = draft();
        d.attachments = vec![
            Some(Attachment::new(vec![1u8], "ok.jpg")),
            Some(Attachment::new(vec![0u8; MAX_ATTACHMENT_BYTES + 1], "big.jpg")),
        ];
        assert!(matches!(
            validate_draft(&d).unwrap_err(),
            ValidationError::AttachmentTooLarge { slot: 1, .. }
        ));
    }

    #[test]
    fn rejects_attachment_without_filename() {
        let mut d = draft();
        d.attachments = vec![Some(Attachment::new(vec![1u8], ""))];
        assert!(matches!(
            validate_draft(&d).unwrap_err(),
            ValidationError::MissingFilename { slot: 0 }
        ));
    }

    #[test]
    fn rejects_empty_attachment_bytes() {
        let mut d = draft();
        d.attachments = vec![Some(Attachment::new(Vec::<u8>::new(), "soup.jpg"))];
        assert!(matches!(
            validate_draft(&d).unwrap_err(),
            ValidationError::EmptyAttachment { slot: 0 }
        ));
    }
}
