use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ingredient occurrence inside a recipe on a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl IngredientAmount {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>, amount: i32) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
            amount,
        }
    }
}

/// Total amount of one (name, unit) pair across a whole shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Why a user saved a recipe. Favourites and the shopping list share one relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePurpose {
    Favourite,
    ShoppingList,
}

impl SavePurpose {
    pub const ALL: &'static [SavePurpose] = &[SavePurpose::Favourite, SavePurpose::ShoppingList];

    pub fn as_str(&self) -> &'static str {
        match self {
            SavePurpose::Favourite => "favourite",
            SavePurpose::ShoppingList => "shopping_list",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "favourite" => Some(SavePurpose::Favourite),
            "shopping_list" => Some(SavePurpose::ShoppingList),
            _ => None,
        }
    }

    /// Human readable name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            SavePurpose::Favourite => "favourites",
            SavePurpose::ShoppingList => "shopping list",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Unknown values fall back to the least privileged role.
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// The user performing an operation, as far as the guards care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Recipe contents as submitted for creation, before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<DraftIngredient>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftIngredient {
    pub id: Uuid,
    pub amount: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_purpose_round_trips_through_str() {
        for purpose in SavePurpose::ALL {
            assert_eq!(SavePurpose::from_str(purpose.as_str()), Some(*purpose));
        }
        assert_eq!(SavePurpose::from_str("cart"), None);
    }

    #[test]
    fn test_unknown_role_is_user() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("superuser"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }
}
