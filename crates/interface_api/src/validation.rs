//! Request validation helpers

use validator::Validate;

use crate::error::{ApiError, FieldError};

/// Runs validator-derived rules and converts failures to the API envelope
pub fn validate_request<T: Validate>(request: &T) -> Result<(), ApiError> {
    request.validate().map_err(|errors| {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for '{field}'")),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(fields)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        name: String,
        #[validate(email(message = "Email address is not valid"))]
        email: String,
    }

    #[test]
    fn collects_all_field_errors() {
        let sample = Sample {
            name: "ab".to_string(),
            email: "nope".to_string(),
        };

        let err = validate_request(&sample).unwrap_err();
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "email");
                assert_eq!(fields[1].field, "name");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_request_passes() {
        let sample = Sample {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
        };
        assert!(validate_request(&sample).is_ok());
    }
}
