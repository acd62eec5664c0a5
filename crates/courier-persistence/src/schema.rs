//! Esquema Diesel (generado manualmente). Reemplazable con `diesel print-schema`.

diesel::table! {
    users (id) {
        id -> Uuid,
        username -> Text,
        display_name -> Text,
        phone -> Text,
        role -> Text,
    }
}

diesel::table! {
    statuses (id) {
        id -> Uuid,
        category -> Text,
        name -> Text,
    }
}

diesel::table! {
    orders (id) {
        id -> Uuid,
        code -> Text,
        created_by -> Uuid,
        status_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    payments (id) {
        id -> Uuid,
        order_id -> Uuid,
        amount_cents -> BigInt,
        status_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    workflow_steps (code) {
        code -> Text,
        role -> Text,
        name -> Text,
        description -> Text,
        order_index -> Integer,
    }
}

diesel::table! {
    workflow_progress (id) {
        id -> Uuid,
        user_id -> Uuid,
        order_id -> Uuid,
        step_code -> Text,
        completed -> Bool,
        completed_at -> Timestamptz,
        details -> Text,
    }
}

diesel::joinable!(orders -> statuses (status_id));
diesel::joinable!(payments -> orders (order_id));
diesel::joinable!(workflow_progress -> users (user_id));
diesel::joinable!(workflow_progress -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    statuses,
    orders,
    payments,
    workflow_steps,
    workflow_progress,
);
