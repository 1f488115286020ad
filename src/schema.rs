table! {
    users (id) {
        id -> Integer,
        email -> Text,
        login -> Text,
        name -> Text,
        birthday -> Date,
    }
}

table! {
    mpa (id) {
        id -> Integer,
        name -> Text,
    }
}

table! {
    genres (id) {
        id -> Integer,
        name -> Text,
    }
}

table! {
    films (id) {
        id -> Integer,
        name -> Text,
        description -> Text,
        release_date -> Date,
        duration -> Integer,
        mpa_id -> Integer,
    }
}

table! {
    film_genres (film_id, genre_id) {
        film_id -> Integer,
        genre_id -> Integer,
    }
}

table! {
    likes (film_id, user_id) {
        film_id -> Integer,
        user_id -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    friends (user_id, friend_id) {
        user_id -> Integer,
        friend_id -> Integer,
        status -> Text,
        created_at -> Timestamp,
    }
}

joinable!(films -> mpa (mpa_id));
joinable!(film_genres -> films (film_id));
joinable!(film_genres -> genres (genre_id));
joinable!(likes -> films (film_id));
joinable!(likes -> users (user_id));

allow_tables_to_appear_in_same_query!(users, mpa, genres, films, film_genres, likes, friends,);
