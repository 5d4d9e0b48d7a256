// Mirrors the tables owned by the deployment's migration tooling.

diesel::table! {
    users (id) {
        id -> Uuid,
        #[max_length = 254]
        email -> Varchar,
        #[max_length = 150]
        username -> Varchar,
        #[max_length = 50]
        first_name -> Varchar,
        #[max_length = 150]
        last_name -> Varchar,
        #[max_length = 25]
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tags (id) {
        id -> Uuid,
        #[max_length = 150]
        name -> Varchar,
        #[max_length = 7]
        color -> Varchar,
        #[max_length = 150]
        slug -> Varchar,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Uuid,
        #[max_length = 150]
        name -> Varchar,
        #[max_length = 150]
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    recipes (id) {
        id -> Uuid,
        author_id -> Uuid,
        #[max_length = 150]
        name -> Varchar,
        image -> Nullable<Varchar>,
        text -> Text,
        cooking_time -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Uuid,
        tag_id -> Uuid,
    }
}

diesel::table! {
    recipe_ingredients (id) {
        id -> Uuid,
        recipe_id -> Uuid,
        ingredient_id -> Uuid,
        amount -> Int4,
    }
}

diesel::table! {
    saved_recipes (id) {
        id -> Uuid,
        user_id -> Uuid,
        recipe_id -> Uuid,
        #[max_length = 25]
        purpose -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    follows (id) {
        id -> Uuid,
        user_id -> Uuid,
        author_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(saved_recipes -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(
    follows,
    ingredients,
    recipe_ingredients,
    recipe_tags,
    recipes,
    saved_recipes,
    tags,
    users,
);
