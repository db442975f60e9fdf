table! {
    notes (id) {
        id -> Int8,
        name -> Text,
        text -> Nullable<Text>,
    }
}
