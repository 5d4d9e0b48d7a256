//! Permission and validation checks run before any mutation.
//!
//! Every guard is a plain predicate: it looks only at the values it is given and
//! returns `Err(GuardError)` describing the first problem it finds.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::GuardError;
use crate::types::{Actor, RecipeDraft, SavePurpose};

pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 10_000;
pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 720;
pub const MAX_NAME_LENGTH: usize = 150;

pub fn can_modify_recipe(actor: &Actor, author_id: Uuid) -> Result<(), GuardError> {
    if actor.id == author_id || actor.is_admin() {
        Ok(())
    } else {
        Err(GuardError::NotAuthor)
    }
}

pub fn can_follow(
    follower_id: Uuid,
    author_id: Uuid,
    already_following: bool,
) -> Result<(), GuardError> {
    if follower_id == author_id {
        return Err(GuardError::SelfFollow);
    }
    if already_following {
        return Err(GuardError::AlreadyFollowing);
    }
    Ok(())
}

pub fn can_save(purpose: SavePurpose, already_saved: bool) -> Result<(), GuardError> {
    if already_saved {
        Err(GuardError::AlreadySaved(purpose))
    } else {
        Ok(())
    }
}

pub fn validate_amount(amount: i32) -> Result<(), GuardError> {
    if (MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
        Ok(())
    } else {
        Err(GuardError::AmountOutOfRange {
            min: MIN_AMOUNT,
            max: MAX_AMOUNT,
            got: amount,
        })
    }
}

pub fn validate_cooking_time(minutes: i32) -> Result<(), GuardError> {
    if (MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&minutes) {
        Ok(())
    } else {
        Err(GuardError::CookingTimeOutOfRange {
            min: MIN_COOKING_TIME,
            max: MAX_COOKING_TIME,
            got: minutes,
        })
    }
}

fn validate_length(field: &'static str, value: &str) -> Result<(), GuardError> {
    if value.trim().is_empty() {
        return Err(GuardError::Blank { field });
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(GuardError::TooLong {
            field,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Recipe names must say something: digits and punctuation alone are rejected.
pub fn validate_name(name: &str) -> Result<(), GuardError> {
    validate_length("Name", name)?;
    if !name.chars().any(char::is_alphabetic) {
        return Err(GuardError::NoLetters { field: "Name" });
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), GuardError> {
    validate_length("Username", username)?;
    if username.trim().eq_ignore_ascii_case("me") {
        return Err(GuardError::ReservedUsername);
    }
    Ok(())
}

pub fn validate_recipe(draft: &RecipeDraft) -> Result<(), GuardError> {
    validate_name(&draft.name)?;

    if draft.text.trim().is_empty() {
        return Err(GuardError::Blank { field: "Text" });
    }

    validate_cooking_time(draft.cooking_time)?;

    if draft.tags.is_empty() {
        return Err(GuardError::Missing("tag"));
    }
    let mut seen_tags = HashSet::new();
    if !draft.tags.iter().all(|id| seen_tags.insert(*id)) {
        return Err(GuardError::Duplicate("tag"));
    }

    if draft.ingredients.is_empty() {
        return Err(GuardError::Missing("ingredient"));
    }
    let mut seen_ingredients = HashSet::new();
    for ingredient in &draft.ingredients {
        if !seen_ingredients.insert(ingredient.id) {
            return Err(GuardError::Duplicate("ingredient"));
        }
        validate_amount(ingredient.amount)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DraftIngredient, Role};

    fn draft() -> RecipeDraft {
        RecipeDraft {
            name: "Pancakes".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
            tags: vec![Uuid::new_v4()],
            ingredients: vec![
                DraftIngredient {
                    id: Uuid::new_v4(),
                    amount: 200,
                },
                DraftIngredient {
                    id: Uuid::new_v4(),
                    amount: 2,
                },
            ],
        }
    }

    #[test]
    fn test_author_can_modify() {
        let author = Uuid::new_v4();
        let actor = Actor {
            id: author,
            role: Role::User,
        };
        assert_eq!(can_modify_recipe(&actor, author), Ok(()));
    }

    #[test]
    fn test_admin_can_modify_anything() {
        let actor = Actor {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert_eq!(can_modify_recipe(&actor, Uuid::new_v4()), Ok(()));
    }

    #[test]
    fn test_stranger_cannot_modify() {
        let actor = Actor {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        let err = can_modify_recipe(&actor, Uuid::new_v4()).unwrap_err();
        assert_eq!(err, GuardError::NotAuthor);
        assert!(err.is_permission());
    }

    #[test]
    fn test_follow_rules() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert_eq!(can_follow(me, other, false), Ok(()));
        assert_eq!(can_follow(me, me, false), Err(GuardError::SelfFollow));
        assert_eq!(can_follow(me, other, true), Err(GuardError::AlreadyFollowing));
    }

    #[test]
    fn test_save_twice_is_rejected() {
        assert_eq!(can_save(SavePurpose::Favourite, false), Ok(()));
        let err = can_save(SavePurpose::ShoppingList, true).unwrap_err();
        assert_eq!(err, GuardError::AlreadySaved(SavePurpose::ShoppingList));
        assert_eq!(err.to_string(), "Recipe is already in your shopping list");
    }

    #[test]
    fn test_amount_bounds() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(10_000).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-5).is_err());
        assert!(validate_amount(10_001).is_err());
    }

    #[test]
    fn test_cooking_time_bounds() {
        assert!(validate_cooking_time(1).is_ok());
        assert!(validate_cooking_time(720).is_ok());
        assert!(validate_cooking_time(0).is_err());
        assert!(validate_cooking_time(721).is_err());
    }

    #[test]
    fn test_name_needs_letters() {
        assert!(validate_name("Борщ").is_ok());
        assert_eq!(
            validate_name("12345"),
            Err(GuardError::NoLetters { field: "Name" })
        );
        assert_eq!(validate_name("   "), Err(GuardError::Blank { field: "Name" }));
        assert!(matches!(
            validate_name(&"a".repeat(151)),
            Err(GuardError::TooLong { .. })
        ));
    }

    #[test]
    fn test_username_me_is_reserved() {
        assert!(validate_username("alice").is_ok());
        assert_eq!(validate_username("ME"), Err(GuardError::ReservedUsername));
        assert_eq!(validate_username("me"), Err(GuardError::ReservedUsername));
    }

    #[test]
    fn test_valid_recipe() {
        assert_eq!(validate_recipe(&draft()), Ok(()));
    }

    #[test]
    fn test_recipe_without_tags_or_ingredients() {
        let mut no_tags = draft();
        no_tags.tags.clear();
        assert_eq!(validate_recipe(&no_tags), Err(GuardError::Missing("tag")));

        let mut no_ingredients = draft();
        no_ingredients.ingredients.clear();
        assert_eq!(
            validate_recipe(&no_ingredients),
            Err(GuardError::Missing("ingredient"))
        );
    }

    #[test]
    fn test_recipe_duplicates() {
        let mut dup_tags = draft();
        dup_tags.tags.push(dup_tags.tags[0]);
        assert_eq!(validate_recipe(&dup_tags), Err(GuardError::Duplicate("tag")));

        let mut dup_ingredients = draft();
        let first = dup_ingredients.ingredients[0];
        dup_ingredients.ingredients.push(first);
        assert_eq!(
            validate_recipe(&dup_ingredients),
            Err(GuardError::Duplicate("ingredient"))
        );
    }

    #[test]
    fn test_recipe_with_bad_amount() {
        let mut bad = draft();
        bad.ingredients[1].amount = 0;
        assert!(matches!(
            validate_recipe(&bad),
            Err(GuardError::AmountOutOfRange { got: 0, .. })
        ));
    }

    #[test]
    fn test_recipe_with_blank_text() {
        let mut bad = draft();
        bad.text = "\n\t".to_string();
        assert_eq!(validate_recipe(&bad), Err(GuardError::Blank { field: "Text" }));
    }
}
