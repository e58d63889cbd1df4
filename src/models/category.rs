use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// DTO for creating a category (admin only).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(custom(function = "validate_category_name"))]
    pub name: String,
}

/// Category names are joined with commas in listings, so commas are not allowed.
fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    let ok = (2..=30).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("category_name")
            .with_message("Category name must be 2-30 letters, digits, spaces, '-' or '_'".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names() {
        assert!(validate_category_name("Science").is_ok());
        assert!(validate_category_name("Home and Garden").is_ok());
        assert!(validate_category_name("").is_err());
        assert!(validate_category_name("a,b").is_err());
    }
}
